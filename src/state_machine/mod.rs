// State machine module for the reviewable-request lifecycle
//
// The transition tables are data, not branching code: each workflow kind
// supplies its own table and the validator consults nothing else.

pub mod errors;
pub mod states;
pub mod transitions;

// Re-export main types for convenient access
pub use errors::{TransitionError, TransitionResult};
pub use states::RequestStatus;
pub use transitions::{TransitionTable, WorkflowKind};
