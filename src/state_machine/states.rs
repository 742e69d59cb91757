use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified lifecycle states for reviewable requests.
///
/// Both workflow instances (approval requests, warranty claims) draw their
/// states from this one set; each instance's transition table decides which
/// subset is actually reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Initial state when a request is created. Accepts the legacy alias
    /// `pending` on input; always serializes as `submitted`.
    #[serde(alias = "pending")]
    Submitted,
    /// Request has been picked up by a reviewer
    InReview,
    /// Request was approved by a reviewer
    Approved,
    /// Request was rejected by a reviewer
    Rejected,
    /// Approved request has been carried out
    Resolved,
    /// Request was cancelled before a decision
    Cancelled,
}

impl RequestStatus {
    /// States that carry a review decision; entering one sets `decision_date`
    pub fn is_decision_bearing(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Rejected | Self::Resolved | Self::Cancelled
        )
    }

    pub const ALL: [RequestStatus; 6] = [
        Self::Submitted,
        Self::InReview,
        Self::Approved,
        Self::Rejected,
        Self::Resolved,
        Self::Cancelled,
    ];
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::InReview => write!(f, "in_review"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Resolved => write!(f, "resolved"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            // legacy alias from the approval workflow's original naming
            "pending" => Ok(Self::Submitted),
            "in_review" => Ok(Self::InReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "resolved" => Ok(Self::Resolved),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid request status: {s}")),
        }
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Submitted
    }
}
