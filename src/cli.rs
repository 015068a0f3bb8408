use crate::canvas::Canvas;
use crate::config::{Config, load_config};
use crate::dump::{CanvasDump, read_canvas_dump, write_canvas_dump};
use crate::extract::extract_items_with_config;
use crate::generate::{ChatRequest, GenerationOptions, expansion_prompt};
use crate::layout::{CanvasBounds, arrange_around_detailed};
use crate::model::{CircleNode, Point};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "mindcanvas",
    version,
    about = "Mind-map layout and model-response extraction"
)]
pub struct Args {
    /// Config JSON file
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract structured items from raw model output
    Extract {
        /// Input file or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Maximum number of items (0 uses the configured default)
        #[arg(short = 'n', long = "count", default_value_t = 0)]
        count: usize,
    },
    /// Place new items around an anchor, avoiding obstacles
    Arrange {
        /// Anchor center as X,Y
        #[arg(short = 'a', long = "anchor", value_parser = parse_point)]
        anchor: Point,

        /// Number of items to place
        #[arg(short = 'n', long = "count")]
        count: usize,

        /// JSON file with an array of {id, center: {x, y}, size, minimized}
        #[arg(long = "obstacles")]
        obstacles: Option<PathBuf>,

        /// Obstacle id to ignore
        #[arg(long = "exclude")]
        exclude: Option<String>,

        /// Canvas width (0 disables clamping)
        #[arg(short = 'w', long = "width", default_value_t = 0.0)]
        width: f32,

        /// Canvas height (0 disables clamping)
        #[arg(short = 'H', long = "height", default_value_t = 0.0)]
        height: f32,
    },
    /// Print the chat-completion request body for expanding an idea
    Prompt {
        /// Idea to expand
        #[arg(short = 't', long = "text")]
        text: String,

        #[arg(short = 'n', long = "count", default_value_t = 5)]
        count: usize,
    },
    /// Apply a model response to a node of a dumped canvas
    Expand {
        /// Canvas dump (JSON)
        #[arg(long = "canvas")]
        canvas: PathBuf,

        /// Node to expand
        #[arg(long = "node")]
        node: String,

        /// Raw model output file or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        #[arg(short = 'n', long = "count", default_value_t = 5)]
        count: usize,

        /// Output canvas dump. Defaults to stdout.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct PlacementOutput {
    x: f32,
    y: f32,
    center: Point,
    fallback: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.generation.apply_env();

    match args.command {
        Command::Extract { input, count } => {
            let text = read_input(input.as_deref())?;
            let items = extract_items_with_config(&text, count, &config.extract);
            if items.is_empty() {
                log::warn!("no items could be extracted");
            }
            print_json(&items)
        }
        Command::Arrange {
            anchor,
            count,
            obstacles,
            exclude,
            width,
            height,
        } => {
            let obstacles = match obstacles {
                Some(path) => read_obstacles(&path)?,
                None => Vec::new(),
            };
            let placements = arrange_around_detailed(
                anchor,
                count,
                &obstacles,
                exclude.as_deref(),
                CanvasBounds::new(width, height),
                &config.layout,
            );
            let output: Vec<PlacementOutput> = placements
                .into_iter()
                .map(|placement| PlacementOutput {
                    x: placement.position.x,
                    y: placement.position.y,
                    center: placement.center,
                    fallback: placement.fallback,
                })
                .collect();
            print_json(&output)
        }
        Command::Prompt { text, count } => {
            let options = GenerationOptions::from_config(count, &config.generation);
            let prompt = expansion_prompt(&text, &options);
            print_json(&ChatRequest::new(&config.generation, &prompt, &options))
        }
        Command::Expand {
            canvas,
            node,
            input,
            count,
            output,
        } => {
            let mut canvas = read_canvas_dump(&canvas)
                .with_context(|| format!("reading canvas dump {}", canvas.display()))?;
            let raw = read_input(input.as_deref())?;
            let created = expand_from_text(&mut canvas, &node, &raw, count, &config)?;
            log::info!("created {} nodes under {node}", created.len());
            match output {
                Some(path) => write_canvas_dump(&path, &canvas),
                None => print_json(&CanvasDump::from_canvas(&canvas)),
            }
        }
    }
}

fn expand_from_text(
    canvas: &mut Canvas,
    node: &str,
    raw: &str,
    count: usize,
    config: &Config,
) -> Result<Vec<String>> {
    canvas.begin_expansion(node, count, &config.generation)?;
    Ok(canvas.complete_expansion(node, raw, config)?)
}

fn parse_point(value: &str) -> std::result::Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|err| format!("invalid coordinate `{part}`: {err}"))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}

fn read_obstacles(path: &Path) -> Result<Vec<CircleNode>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading obstacles {}", path.display()))?;
    Ok(serde_json::from_str(&contents)?)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer_pretty(&mut lock, value)?;
    writeln!(lock)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_anchor_points() {
        assert_eq!(parse_point("10, -2.5"), Ok(Point::new(10.0, -2.5)));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn args_parse_subcommands() {
        let args = Args::try_parse_from([
            "mindcanvas",
            "arrange",
            "--anchor",
            "100,200",
            "-n",
            "3",
            "-w",
            "800",
        ])
        .unwrap();
        match args.command {
            Command::Arrange {
                anchor,
                count,
                width,
                height,
                ..
            } => {
                assert_eq!(anchor, Point::new(100.0, 200.0));
                assert_eq!(count, 3);
                assert_eq!(width, 800.0);
                assert_eq!(height, 0.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn expands_dumped_canvas() {
        let config = Config::default();
        let mut canvas = Canvas::default();
        let root = canvas.add_root("idea", Point::new(600.0, 600.0), &config.canvas);
        let created =
            expand_from_text(&mut canvas, &root, "```\n- a\n- b\n```", 5, &config).unwrap();
        assert_eq!(created.len(), 2);
        assert!(expand_from_text(&mut canvas, "nope", "- a", 5, &config).is_err());
    }
}
