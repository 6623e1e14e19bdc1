//! The credentialed, metered video API.

mod adapter;
pub mod models;

pub use adapter::{PrimaryAdapter, is_valid_api_key};
