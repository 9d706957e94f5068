//! Core types and error definitions for the clubrag content assistant.
//!
//! This crate provides the foundational types shared across all clubrag crates:
//! the error taxonomy, the organization profile that seeds the knowledge store,
//! and the records describing events and external trend signals.
//!
//! # Main types
//!
//! - [`RagError`]: Unified error enum for every clubrag subsystem.
//! - [`RagResult`]: Convenience alias for `Result<T, RagError>`.
//! - [`OrganizationProfile`]: Section-keyed description of an organization.
//! - [`EventDetails`]: The event a piece of content is drafted for.
//! - [`TrendItem`]: A trending video record (title, URL, hashtags).

/// Error taxonomy.
pub mod error;
/// Event records supplied by front ends.
pub mod event;
/// Organization profile loading and section classification.
pub mod profile;
/// Trend records and hashtag extraction.
pub mod trends;

pub use error::{RagError, RagResult};
pub use event::EventDetails;
pub use profile::{OrganizationProfile, ProfileSection, KEYWORDS_SECTION};
pub use trends::{collect_hashtags, extract_hashtags, TrendItem};
