//! Error types for shallow rendering

use render_tree::TreeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShallowError>;

#[derive(Debug, Error)]
pub enum ShallowError {
    #[error("`{0}` is not supported by shallow rendering.")]
    Unsupported(&'static str),

    #[error("Element type `{0}` cannot be rendered by the one-level renderer")]
    InvalidElementType(String),

    #[error("Nothing has been rendered yet")]
    NotRendered,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl ShallowError {
    /// A simulated error no boundary caught
    pub fn is_uncaught(&self) -> bool {
        matches!(self, ShallowError::Tree(TreeError::Uncaught(_)))
    }
}
