pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dump;
pub mod error;
pub mod extract;
pub mod generate;
pub mod history;
pub mod layout;
pub mod model;
pub mod workspace;

pub use canvas::{Canvas, DropOutcome, ExpansionRequest, node_size};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use error::{CanvasError, GenerateError};
pub use extract::{extract_items, extract_items_with_config};
pub use generate::Generator;
pub use history::History;
pub use layout::{CanvasBounds, arrange_around, arrange_around_detailed, nodes_collide};
pub use model::{CircleNode, Item, Node, Point};
pub use workspace::{Workspace, WorkspaceKind, WorkspaceOutput};
