//! duotube: video search and playback data from two interchangeable backends.
//!
//! A credentialed, metered primary API and a pool of keyless mirror
//! instances answer the same questions in different shapes. This crate
//! normalizes both into one record type and fails over between them.
//!
//! ## Core Types
//!
//! - [`Aggregator`] - Source selection, cross-source failover and bookkeeping
//! - [`CanonicalVideo`] - The source-agnostic video record
//! - [`SourceError`] - Every failure the library can report
//!
//! ## Sources
//!
//! - [`sources::PrimaryAdapter`] - The metered API, key checked before every request
//! - [`sources::MirrorAdapter`] - Mirror requests with bounded instance failover
//! - [`sources::MirrorPool`] - Allow-listed instance selection and health checks
//!
//! ## State
//!
//! - [`store::Preferences`] - Typed access to the persisted key/value store
//! - [`store::FileStore`] / [`store::MemoryStore`] - Store backends

pub mod aggregator;
pub mod config;
pub mod error;
pub mod filters;
pub mod format;
pub mod http;
pub mod model;
pub mod normalize;
pub mod playback;
pub mod retry;
pub mod sources;
pub mod store;

#[cfg(test)]
mod test_support;

pub use aggregator::{Advisory, Aggregator, Fetched, MirrorStatus, Operation, Ticket};
pub use config::ClientConfig;
pub use error::{Result, SourceError};
pub use filters::{Facet, SearchFilters};
pub use model::{
    CanonicalVideo, ChannelInfo, Count, FormatStream, RecommendedVideo, SourceKind, VideoDetails,
};
