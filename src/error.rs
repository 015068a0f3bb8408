use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("no API key configured (set {0})")]
    MissingApiKey(&'static str),
    #[error("generation request failed: {0}")]
    Transport(String),
    #[error("generation endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
    #[error("completion contained no message content")]
    EmptyCompletion,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanvasError {
    #[error("unknown node `{0}`")]
    UnknownNode(String),
    #[error("an expansion of node `{0}` is already in flight")]
    ExpansionInFlight(String),
    #[error("no expansion of node `{0}` is pending")]
    NoExpansionPending(String),
    #[error("workspace has no nodes on the canvas")]
    EmptyWorkspace,
    #[error(transparent)]
    Generate(#[from] GenerateError),
}
