use super::states::RequestStatus;
use thiserror::Error;

fn format_targets(targets: &[RequestStatus]) -> String {
    if targets.is_empty() {
        return "none (terminal state)".to_string();
    }
    targets
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors produced by the transition validator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error(
        "invalid status transition from {current} to {target}; valid transitions: {}",
        format_targets(.allowed)
    )]
    InvalidTransition {
        current: RequestStatus,
        target: RequestStatus,
        allowed: Vec<RequestStatus>,
    },
}

impl TransitionError {
    /// The legal targets from the state the transition was attempted from
    pub fn allowed_targets(&self) -> &[RequestStatus] {
        match self {
            Self::InvalidTransition { allowed, .. } => allowed,
        }
    }
}

pub type TransitionResult<T> = std::result::Result<T, TransitionError>;
