/// AnimeVost metadata provider implementation.
use super::animevost_types::{InfoResponse, PlaylistEntry};
use super::{Episode, MetadataRetrievalError, PlaylistProvider};
use crate::title::playlist_slug;
use serde::de::DeserializeOwned;

/// Base URL of the public AnimeVost API.
pub const DEFAULT_API_BASE: &str = "https://api.animevost.org/v1";

/// Metadata provider for the AnimeVost API.
///
/// Both endpoints are queried with a form-encoded POST carrying the
/// playlist id; responses are JSON.
pub struct AnimevostProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl AnimevostProvider {
    /// Creates a provider querying the given API base URL.
    ///
    /// Pass [`DEFAULT_API_BASE`] for the public API.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// POSTs `id=<id>` to `<base>/<endpoint>` and decodes the JSON body.
    fn post_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: u64,
    ) -> Result<T, MetadataRetrievalError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .form(&[("id", id)])
            .send()
            .map_err(|e| MetadataRetrievalError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MetadataRetrievalError::RequestFailed(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .map_err(|e| MetadataRetrievalError::ParseFailed(e.to_string()))
    }

    /// Converts a playlist entry to an episode, or None if the entry has
    /// no usable name or no stream URL.
    fn convert_entry(entry: PlaylistEntry) -> Option<Episode> {
        let name = entry.name.filter(|name| !name.is_empty())?;

        let candidate_urls: Vec<String> = [entry.hd, entry.std]
            .into_iter()
            .flatten()
            .filter(|url| !url.is_empty())
            .collect();
        if candidate_urls.is_empty() {
            return None;
        }

        let parsed_number = name
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<u32>().ok());

        Some(Episode {
            // Some sources name specials without a leading number; those
            // all land on episode 1 and the orchestrator warns about it.
            number: parsed_number.unwrap_or(1),
            name,
            candidate_urls,
            number_defaulted: parsed_number.is_none(),
        })
    }

    /// Converts the raw playlist array into sorted episodes.
    fn convert_playlist(entries: Vec<PlaylistEntry>) -> Vec<Episode> {
        let mut episodes: Vec<Episode> = entries
            .into_iter()
            .filter_map(Self::convert_entry)
            .collect();

        // sort_by_key is stable: entries sharing a number keep API order
        episodes.sort_by_key(|episode| episode.number);
        episodes
    }
}

impl PlaylistProvider for AnimevostProvider {
    fn fetch_title(&self, id: u64) -> Result<Option<String>, MetadataRetrievalError> {
        let response: InfoResponse = self.post_request("info", id)?;

        let status_ok = response
            .state
            .is_some_and(|state| state.status == "ok");
        if !status_ok {
            return Ok(None);
        }

        let title = response
            .data
            .into_iter()
            .next()
            .and_then(|entry| entry.title);

        Ok(title
            .map(|title| playlist_slug(&title))
            .filter(|slug| !slug.is_empty()))
    }

    fn fetch_playlist(&self, id: u64) -> Result<Vec<Episode>, MetadataRetrievalError> {
        let entries: Vec<PlaylistEntry> = self.post_request("playlist", id)?;
        Ok(Self::convert_playlist(entries))
    }
}
