pub mod health;
pub mod requests;
