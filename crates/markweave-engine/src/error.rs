use thiserror::Error;

use crate::parsing::registry::{Domain, Phase};

/// Configuration errors of a recognizer set.
///
/// Malformed Markdown never produces an error: every input degrades to the
/// fallback recognizers. These variants only signal a broken registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("node type `{node_type}` is registered more than once in the {phase} phase")]
    DuplicateNodeType { phase: Phase, node_type: String },

    #[error("no parse hook is registered for node type `{node_type}`")]
    MissingParser { node_type: String },

    #[error("no {domain} fallback recognizer is registered")]
    MissingFallback { domain: Domain },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
