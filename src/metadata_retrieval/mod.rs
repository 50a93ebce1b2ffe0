/// Data structures and traits for playlist metadata retrieval.
///
/// This module provides the episode structure produced by the AnimeVost
/// API client, as well as the provider trait the orchestrator downloads
/// through, so tests can substitute a canned playlist source.
mod animevost;
mod animevost_types;

pub use animevost::{AnimevostProvider, DEFAULT_API_BASE};

use thiserror::Error;

/// Errors that can occur during metadata retrieval operations.
#[derive(Debug, Error)]
pub enum MetadataRetrievalError {
    /// Request to the API failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the API's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),
}

/// A single downloadable episode of a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    /// Episode number, parsed from the leading token of the name
    pub number: u32,
    /// The episode name as reported by the API
    pub name: String,
    /// Stream URLs to try in order: high definition first, then standard
    pub candidate_urls: Vec<String>,
    /// True when the name had no parseable leading number and 1 was assumed
    pub number_defaulted: bool,
}

/// Trait for sources that can describe a playlist.
///
/// Implementors resolve a numeric playlist id into a directory-ready title
/// and an ordered list of downloadable episodes.
pub trait PlaylistProvider {
    /// Fetches the playlist title as a filesystem-safe slug.
    ///
    /// Returns `Ok(None)` when the source reports no usable title; callers
    /// are expected to fall back to a generated directory name.
    fn fetch_title(&self, id: u64) -> Result<Option<String>, MetadataRetrievalError>;

    /// Fetches the episodes of a playlist, sorted ascending by number.
    ///
    /// The sort is stable: episodes sharing a number keep the order the
    /// source returned them in.
    fn fetch_playlist(&self, id: u64) -> Result<Vec<Episode>, MetadataRetrievalError>;
}
