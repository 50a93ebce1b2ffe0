//! Playlist page URL parsing
//!
//! AnimeVost playlist pages carry their numeric id as the leading piece of
//! the final path segment, e.g.
//! `https://animevost.org/tip/tv/2147-naruto-shippuuden.html` -> 2147.

use std::num::ParseIntError;
use thiserror::Error;

/// Errors that can occur while resolving a playlist id from a page URL
#[derive(Debug, Error)]
pub enum PlaylistUrlError {
    /// The final path segment does not start with a numeric id
    #[error("No numeric playlist id in the final path segment of {url}: {source}")]
    InvalidId { url: String, source: ParseIntError },
}

/// Resolves the numeric playlist id from a playlist page URL
///
/// Takes the last `/`-separated segment of the URL and parses everything
/// before the first `-` as a base-10 integer. No normalization is applied:
/// a URL ending in `/` has an empty final segment and fails to parse.
///
/// # Examples
///
/// ```
/// use animevost_dl::playlist_id_from_url;
///
/// let id = playlist_id_from_url("https://animevost.org/tip/tv/2147-naruto.html").unwrap();
/// assert_eq!(id, 2147);
/// ```
pub fn playlist_id_from_url(url: &str) -> Result<u64, PlaylistUrlError> {
    // rsplit always yields at least one piece, even for an empty string
    let segment = url.rsplit('/').next().unwrap_or_default();
    let id_part = segment.split('-').next().unwrap_or_default();

    id_part.parse().map_err(|source| PlaylistUrlError::InvalidId {
        url: url.to_string(),
        source,
    })
}
