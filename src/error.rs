//! Error taxonomy shared by the matrix builder, the solvers and the loaders.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TspError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed or inconsistent input (mismatched dimensions, NaN coordinates, bad edges)
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Zero points were supplied
    #[error("empty input: at least one point is required")]
    EmptyInput,
    /// Fewer nodes than the solver was configured to accept
    #[error("insufficient nodes: found {found}, at least {required} required to define a cycle")]
    InsufficientNodes { found: usize, required: usize },
    /// The solve would exceed a node-count or memory ceiling
    #[error("resource exhaustion: {nodes} nodes exceeds {limit} ({detail})")]
    ResourceExhaustion {
        nodes: usize,
        limit: usize,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, TspError>;

impl TspError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn resource_exhaustion(nodes: usize, limit: usize, detail: impl Into<String>) -> Self {
        Self::ResourceExhaustion {
            nodes,
            limit,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_violation() {
        let err = TspError::InsufficientNodes { found: 1, required: 3 };
        assert!(err.to_string().contains("found 1"));

        let err = TspError::resource_exhaustion(30, 20, "node ceiling");
        assert!(err.to_string().contains("30 nodes exceeds 20"));

        assert!(TspError::EmptyInput.to_string().contains("empty"));
    }
}
