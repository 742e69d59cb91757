// Persistence layer: the request entity, the store seam, and the Postgres
// implementation.

pub mod request;
pub mod store;

pub use request::{NewReviewRequest, PgRequestStore, ReviewRequest};
pub use store::{CasOutcome, RequestStore, StatusChange, StoreError};
