use super::errors::{TransitionError, TransitionResult};
use super::states::RequestStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

use RequestStatus::*;

/// The two workflow instances served by the engine. Each kind selects a
/// transition table and a backing table name; the lifecycle service itself
/// is identical across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    Approval,
    WarrantyClaim,
}

impl WorkflowKind {
    pub fn transition_table(&self) -> &'static TransitionTable {
        match self {
            Self::Approval => &APPROVAL_TABLE,
            Self::WarrantyClaim => &WARRANTY_CLAIM_TABLE,
        }
    }

    /// State assigned to newly created requests of this kind
    pub fn initial_status(&self) -> RequestStatus {
        Submitted
    }

    /// Every status this workflow can observe, in declaration order.
    /// Statistics enumerate exactly this set.
    pub fn statuses(&self) -> &'static [RequestStatus] {
        match self {
            Self::Approval => &[Submitted, Approved, Rejected, Cancelled],
            Self::WarrantyClaim => &[Submitted, InReview, Approved, Rejected, Resolved, Cancelled],
        }
    }

    /// Backing table for this workflow instance
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Approval => "approval_requests",
            Self::WarrantyClaim => "warranty_claims",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approval => write!(f, "approval"),
            Self::WarrantyClaim => write!(f, "warranty_claim"),
        }
    }
}

/// The authoritative map of legal status edges for one workflow kind.
///
/// The table is data rather than branching code so both workflow instances
/// parameterize the same lifecycle service. States without an entry have no
/// outgoing edges and are therefore terminal; self-transitions are illegal
/// unless explicitly listed (none are).
#[derive(Debug)]
pub struct TransitionTable {
    edges: &'static [(RequestStatus, &'static [RequestStatus])],
}

/// Approval requests decide directly out of the initial state.
static APPROVAL_TABLE: TransitionTable = TransitionTable {
    edges: &[(Submitted, &[Approved, Rejected, Cancelled])],
};

/// Warranty claims pass through review, and an approved claim stays open
/// until the repair or replacement is resolved.
static WARRANTY_CLAIM_TABLE: TransitionTable = TransitionTable {
    edges: &[
        (Submitted, &[InReview, Cancelled]),
        (InReview, &[Approved, Rejected, Cancelled]),
        (Approved, &[Resolved, Cancelled]),
    ],
};

impl TransitionTable {
    /// Legal targets from `current`; empty for terminal states
    pub fn allowed_from(&self, current: RequestStatus) -> &'static [RequestStatus] {
        self.edges
            .iter()
            .find(|(from, _)| *from == current)
            .map(|(_, targets)| *targets)
            .unwrap_or(&[])
    }

    /// A state with no outgoing edges is terminal
    pub fn is_terminal(&self, status: RequestStatus) -> bool {
        self.allowed_from(status).is_empty()
    }

    /// The only authority on whether a requested state change is legal
    pub fn validate(&self, current: RequestStatus, target: RequestStatus) -> TransitionResult<()> {
        let allowed = self.allowed_from(current);
        if allowed.contains(&target) {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition {
                current,
                target,
                allowed: allowed.to_vec(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_edges() {
        let table = WorkflowKind::Approval.transition_table();
        assert!(table.validate(Submitted, Approved).is_ok());
        assert!(table.validate(Submitted, Rejected).is_ok());
        assert!(table.validate(Submitted, Cancelled).is_ok());
        assert!(table.validate(Submitted, InReview).is_err());
        assert!(table.validate(Submitted, Resolved).is_err());
    }

    #[test]
    fn test_warranty_claim_edges() {
        let table = WorkflowKind::WarrantyClaim.transition_table();
        assert!(table.validate(Submitted, InReview).is_ok());
        assert!(table.validate(InReview, Approved).is_ok());
        assert!(table.validate(Approved, Resolved).is_ok());
        assert!(table.validate(Approved, Cancelled).is_ok());
        // review cannot be skipped
        assert!(table.validate(Submitted, Approved).is_err());
        // resolution only follows approval
        assert!(table.validate(InReview, Resolved).is_err());
    }

    #[test]
    fn test_terminal_states_have_no_edges() {
        for kind in [WorkflowKind::Approval, WorkflowKind::WarrantyClaim] {
            let table = kind.transition_table();
            for terminal in [Rejected, Resolved, Cancelled] {
                assert!(table.is_terminal(terminal), "{kind}: {terminal}");
                for target in RequestStatus::ALL {
                    assert!(table.validate(terminal, target).is_err());
                }
            }
        }
        // approved is terminal for approvals but not for claims
        assert!(WorkflowKind::Approval.transition_table().is_terminal(Approved));
        assert!(!WorkflowKind::WarrantyClaim.transition_table().is_terminal(Approved));
    }

    #[test]
    fn test_self_transitions_rejected() {
        for kind in [WorkflowKind::Approval, WorkflowKind::WarrantyClaim] {
            let table = kind.transition_table();
            for status in RequestStatus::ALL {
                assert!(
                    table.validate(status, status).is_err(),
                    "{kind}: self-transition on {status} must be rejected"
                );
            }
        }
    }

    #[test]
    fn test_every_non_terminal_state_can_cancel() {
        for kind in [WorkflowKind::Approval, WorkflowKind::WarrantyClaim] {
            let table = kind.transition_table();
            for status in kind.statuses() {
                if !table.is_terminal(*status) {
                    assert!(
                        table.validate(*status, Cancelled).is_ok(),
                        "{kind}: {status} should allow cancellation"
                    );
                }
            }
        }
    }

    #[test]
    fn test_invalid_transition_error_carries_legal_set() {
        let table = WorkflowKind::WarrantyClaim.transition_table();
        let err = table.validate(Submitted, Approved).unwrap_err();
        assert_eq!(err.allowed_targets(), &[InReview, Cancelled]);
    }
}
