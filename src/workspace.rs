use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::config::{ExtractConfig, GenerationConfig};
use crate::error::CanvasError;
use crate::extract::extract_items_with_config;
use crate::generate::{GenerationOptions, Prompt};
use crate::model::Item;

/// Number of points requested from argument-style workspaces.
const ARGUMENT_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkspaceKind {
    Argument,
    CounterArgument,
    Script,
    Debate,
}

impl WorkspaceKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "argument" | "arguments" => Some(Self::Argument),
            "counter" | "counter-argument" | "counterargument" => Some(Self::CounterArgument),
            "script" => Some(Self::Script),
            "debate" => Some(Self::Debate),
            _ => None,
        }
    }

    fn produces_points(self) -> bool {
        matches!(self, Self::Argument | Self::CounterArgument)
    }

    fn instruction(self) -> &'static str {
        match self {
            Self::Argument => {
                "Build the strongest supporting arguments that connect the ideas below."
            }
            Self::CounterArgument => {
                "Raise the strongest counter-arguments and objections to the ideas below."
            }
            Self::Script => {
                "Write a short, engaging narration script that walks through the ideas below."
            }
            Self::Debate => {
                "Write a debate between two speakers, PRO and CON, about the ideas below. \
                 Alternate turns and prefix each with the speaker name."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum WorkspaceOutput {
    Points(Vec<Item>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub kind: WorkspaceKind,
    pub node_ids: Vec<String>,
    pub output: Option<WorkspaceOutput>,
}

impl Workspace {
    pub fn new(kind: WorkspaceKind, node_ids: Vec<String>) -> Self {
        Self {
            kind,
            node_ids,
            output: None,
        }
    }

    /// Workspace over the canvas's current selection.
    pub fn from_selection(kind: WorkspaceKind, canvas: &Canvas) -> Self {
        Self::new(kind, canvas.selected())
    }

    pub fn add_node(&mut self, id: &str) {
        if !self.node_ids.iter().any(|existing| existing == id) {
            self.node_ids.push(id.to_string());
        }
    }

    pub fn remove_node(&mut self, id: &str) {
        self.node_ids.retain(|existing| existing != id);
    }

    pub fn prompt(
        &self,
        canvas: &Canvas,
        config: &GenerationConfig,
    ) -> Result<(Prompt, GenerationOptions), CanvasError> {
        let ideas: Vec<&str> = self
            .node_ids
            .iter()
            .filter_map(|id| canvas.node(id))
            .map(|node| node.content.full.as_str())
            .collect();
        if ideas.is_empty() {
            return Err(CanvasError::EmptyWorkspace);
        }
        let format = if self.kind.produces_points() {
            format!(
                "Reply with only a JSON array of {ARGUMENT_POINTS} objects with the keys \
                 \"full\", \"phrase\", \"short\", \"emoji\" and \"type\"."
            )
        } else {
            "Reply with plain text only.".to_string()
        };
        let system = format!("{} {format}", self.kind.instruction());
        let user = ideas
            .iter()
            .map(|idea| format!("- {idea}"))
            .collect::<Vec<_>>()
            .join("\n");
        let count = if self.kind.produces_points() {
            ARGUMENT_POINTS
        } else {
            1
        };
        Ok((
            Prompt { system, user },
            GenerationOptions::from_config(count, config),
        ))
    }

    /// Stores the model's answer. Argument kinds keep the extracted points,
    /// the others keep the trimmed text. Returns whether anything usable was
    /// found.
    pub fn apply_response(&mut self, raw_text: &str, config: &ExtractConfig) -> bool {
        let output = if self.kind.produces_points() {
            let items = extract_items_with_config(raw_text, ARGUMENT_POINTS, config);
            if items.is_empty() {
                return false;
            }
            WorkspaceOutput::Points(items)
        } else {
            let text = raw_text.trim();
            if text.is_empty() {
                return false;
            }
            WorkspaceOutput::Text(text.to_string())
        };
        self.output = Some(output);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::model::Point;

    fn canvas_with_two() -> (Canvas, Vec<String>) {
        let config = CanvasConfig::default();
        let mut canvas = Canvas::default();
        let a = canvas.add_node("cities need trees", Point::new(0.0, 0.0), &config);
        let b = canvas.add_node("shade lowers energy bills", Point::new(300.0, 0.0), &config);
        (canvas, vec![a, b])
    }

    #[test]
    fn prompt_lists_selected_ideas() {
        let (mut canvas, ids) = canvas_with_two();
        canvas.select(&ids[1]).unwrap();
        let workspace = Workspace::from_selection(WorkspaceKind::Debate, &canvas);
        let (prompt, options) = workspace
            .prompt(&canvas, &GenerationConfig::default())
            .unwrap();
        assert_eq!(prompt.user, "- shade lowers energy bills");
        assert!(prompt.system.contains("PRO and CON"));
        assert_eq!(options.count, 1);
    }

    #[test]
    fn empty_workspace_is_an_error() {
        let (canvas, _) = canvas_with_two();
        let workspace = Workspace::new(WorkspaceKind::Script, vec!["missing".to_string()]);
        assert_eq!(
            workspace.prompt(&canvas, &GenerationConfig::default()),
            Err(CanvasError::EmptyWorkspace)
        );
    }

    #[test]
    fn argument_output_is_extracted() {
        let (_, ids) = canvas_with_two();
        let mut workspace = Workspace::new(WorkspaceKind::Argument, ids);
        let config = ExtractConfig::default();
        assert!(workspace.apply_response("1. Trees cool streets\n2. Trees store carbon", &config));
        let Some(WorkspaceOutput::Points(points)) = &workspace.output else {
            panic!("expected points");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].full, "Trees store carbon");
    }

    #[test]
    fn script_output_keeps_text() {
        let mut workspace = Workspace::new(WorkspaceKind::Script, Vec::new());
        assert!(!workspace.apply_response("   ", &ExtractConfig::default()));
        assert!(workspace.apply_response("  Once upon a time.\n", &ExtractConfig::default()));
        assert_eq!(
            workspace.output,
            Some(WorkspaceOutput::Text("Once upon a time.".to_string()))
        );
    }

    #[test]
    fn membership_is_deduplicated() {
        let mut workspace = Workspace::new(WorkspaceKind::Argument, Vec::new());
        workspace.add_node("a");
        workspace.add_node("a");
        workspace.add_node("b");
        workspace.remove_node("a");
        assert_eq!(workspace.node_ids, ["b"]);
        assert_eq!(WorkspaceKind::from_token("Counter"), Some(WorkspaceKind::CounterArgument));
    }
}
