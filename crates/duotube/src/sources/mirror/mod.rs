//! The keyless mirror pool and its adapter.

mod adapter;
pub mod models;
mod pool;

pub use adapter::MirrorAdapter;
pub use pool::MirrorPool;
