use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_MODEL: &str = "OPENROUTER_MODEL";
pub const ENV_REFERER: &str = "OPENROUTER_REFERER";
pub const ENV_TITLE: &str = "OPENROUTER_TITLE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Radius of the innermost candidate ring.
    pub base_radius: f32,
    pub radius_step: f32,
    pub radius_levels: usize,
    pub min_angles: usize,
    pub angles_per_level: usize,
    /// Extra clearance kept between circle edges.
    pub buffer: f32,
    /// Distance kept from the canvas edges when clamping.
    pub edge_padding: f32,
    /// Diameter assumed for items placed by `arrange_around`.
    pub new_item_size: f32,
    pub fallback_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: 150.0,
            radius_step: 50.0,
            radius_levels: 5,
            min_angles: 8,
            angles_per_level: 4,
            buffer: 10.0,
            edge_padding: 20.0,
            new_item_size: 80.0,
            fallback_radius: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub default_max_items: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            default_max_items: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub min_node_size: f32,
    pub max_node_size: f32,
    pub size_per_char: f32,
    pub root_size: f32,
    pub history_capacity: usize,
    pub bounce_delay_ms: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_node_size: 60.0,
            max_node_size: 160.0,
            size_per_char: 0.8,
            root_size: 120.0,
            history_capacity: 50,
            bounce_delay_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub temperature: f32,
    /// Target length of each generated idea, in words.
    pub approx_length: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            referer: None,
            title: None,
            temperature: 0.8,
            approx_length: 12,
        }
    }
}

impl GenerationConfig {
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(v) = non_empty(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = non_empty(ENV_MODEL) {
            self.model = v;
        }
        if let Some(v) = non_empty(ENV_REFERER) {
            self.referer = Some(v);
        }
        if let Some(v) = non_empty(ENV_TITLE) {
            self.title = Some(v);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub extract: ExtractConfig,
    pub canvas: CanvasConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    base_radius: Option<f32>,
    radius_step: Option<f32>,
    radius_levels: Option<usize>,
    min_angles: Option<usize>,
    angles_per_level: Option<usize>,
    buffer: Option<f32>,
    edge_padding: Option<f32>,
    new_item_size: Option<f32>,
    fallback_radius: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractConfigFile {
    default_max_items: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasConfigFile {
    min_node_size: Option<f32>,
    max_node_size: Option<f32>,
    size_per_char: Option<f32>,
    root_size: Option<f32>,
    history_capacity: Option<usize>,
    bounce_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigFile {
    endpoint: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    referer: Option<String>,
    title: Option<String>,
    temperature: Option<f32>,
    approx_length: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    extract: Option<ExtractConfigFile>,
    canvas: Option<CanvasConfigFile>,
    generation: Option<GenerationConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.base_radius {
            config.layout.base_radius = v;
        }
        if let Some(v) = layout.radius_step {
            config.layout.radius_step = v;
        }
        if let Some(v) = layout.radius_levels {
            config.layout.radius_levels = v;
        }
        if let Some(v) = layout.min_angles {
            config.layout.min_angles = v;
        }
        if let Some(v) = layout.angles_per_level {
            config.layout.angles_per_level = v;
        }
        if let Some(v) = layout.buffer {
            config.layout.buffer = v;
        }
        if let Some(v) = layout.edge_padding {
            config.layout.edge_padding = v;
        }
        if let Some(v) = layout.new_item_size {
            config.layout.new_item_size = v;
        }
        if let Some(v) = layout.fallback_radius {
            config.layout.fallback_radius = v;
        }
    }

    if let Some(extract) = parsed.extract
        && let Some(v) = extract.default_max_items
    {
        if v == 0 {
            anyhow::bail!("extract.defaultMaxItems must be positive");
        }
        config.extract.default_max_items = v;
    }

    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.min_node_size {
            config.canvas.min_node_size = v;
        }
        if let Some(v) = canvas.max_node_size {
            config.canvas.max_node_size = v;
        }
        if let Some(v) = canvas.size_per_char {
            config.canvas.size_per_char = v;
        }
        if let Some(v) = canvas.root_size {
            config.canvas.root_size = v;
        }
        if let Some(v) = canvas.history_capacity {
            config.canvas.history_capacity = v;
        }
        if let Some(v) = canvas.bounce_delay_ms {
            config.canvas.bounce_delay_ms = v;
        }
        if config.canvas.min_node_size > config.canvas.max_node_size {
            anyhow::bail!(
                "canvas.minNodeSize ({}) exceeds canvas.maxNodeSize ({})",
                config.canvas.min_node_size,
                config.canvas.max_node_size
            );
        }
    }

    if let Some(generation) = parsed.generation {
        if let Some(v) = generation.endpoint {
            config.generation.endpoint = v;
        }
        if let Some(v) = generation.model {
            config.generation.model = v;
        }
        if generation.api_key.is_some() {
            config.generation.api_key = generation.api_key;
        }
        if generation.referer.is_some() {
            config.generation.referer = generation.referer;
        }
        if generation.title.is_some() {
            config.generation.title = generation.title;
        }
        if let Some(v) = generation.temperature {
            config.generation.temperature = v;
        }
        if let Some(v) = generation.approx_length {
            config.generation.approx_length = v;
        }
    }

    Ok(config)
}
