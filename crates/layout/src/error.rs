use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("No triples found for visualization")]
    Empty,

    #[error("Graph has {nodes} nodes, above the layout limit of {limit}")]
    TooLarge { nodes: usize, limit: usize },

    #[error("Failed to render graph image: {0}")]
    Render(String),
}

impl LayoutError {
    pub fn kind(&self) -> &'static str {
        match self {
            LayoutError::Empty => "ParseYieldEmpty",
            LayoutError::TooLarge { .. } => "ValidationError",
            LayoutError::Render(_) => "RenderError",
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
