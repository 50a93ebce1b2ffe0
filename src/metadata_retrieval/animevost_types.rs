/// AnimeVost API response types for deserialization.
///
/// These structures mirror the JSON response format of the AnimeVost API.
/// Every field is optional or defaulted: the orchestrator tolerates
/// partially-filled responses instead of failing the whole playlist.
use serde::Deserialize;

/// The top-level response of the `info` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct InfoResponse {
    /// Request state reported by the API
    #[serde(default)]
    pub state: Option<InfoState>,
    /// Matching playlists; the first entry describes the requested id
    #[serde(default)]
    pub data: Vec<InfoEntry>,
}

/// State object of an `info` response.
#[derive(Debug, Deserialize)]
pub(super) struct InfoState {
    /// `"ok"` when the request succeeded
    #[serde(default)]
    pub status: String,
}

/// A single playlist description in an `info` response.
#[derive(Debug, Deserialize)]
pub(super) struct InfoEntry {
    /// Raw playlist title, usually with a bracketed release suffix
    #[serde(default)]
    pub title: Option<String>,
}

/// A single entry of the `playlist` endpoint's JSON array.
#[derive(Debug, Deserialize)]
pub(super) struct PlaylistEntry {
    /// Episode name; its first whitespace-delimited token is the number
    #[serde(default)]
    pub name: Option<String>,
    /// High-definition stream URL
    #[serde(default)]
    pub hd: Option<String>,
    /// Standard-definition stream URL
    #[serde(default)]
    pub std: Option<String>,
}
