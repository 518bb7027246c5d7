//! Error types for the analysis pipeline.

use thiserror::Error;

use crate::data::provider::ProviderError;

/// Errors raised while building a dividend profile.
///
/// Pipeline steps never catch each other's errors: whichever step fails first
/// is the error the caller sees.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("statistics error: {0}")]
    Statistics(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AnalysisError {
    pub(crate) fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }
}
