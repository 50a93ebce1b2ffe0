//! animevost-dl - Download the episodes of AnimeVost playlists
//!
//! This library resolves a playlist page URL to its numeric id, queries
//! the AnimeVost JSON API for the playlist title and episode stream URLs,
//! and sequentially downloads every episode into a per-playlist directory,
//! reporting progress through a callback.

mod episode_download;
mod metadata_retrieval;
mod playlist_url;
mod title;

use metadata_retrieval::{AnimevostProvider, PlaylistProvider};

// Re-export error types
pub use episode_download::DownloadError;
pub use metadata_retrieval::MetadataRetrievalError;
pub use playlist_url::PlaylistUrlError;

pub use episode_download::{DownloadStatus, EpisodeDownloader};
pub use metadata_retrieval::{DEFAULT_API_BASE, Episode};
pub use playlist_url::playlist_id_from_url;
pub use title::playlist_slug;

use std::path::PathBuf;
use thiserror::Error;

/// Progress event emitted while downloading a playlist
///
/// These events allow library users to track progress and render status,
/// or to stay silent by ignoring them.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Processing of a playlist URL started
    Started { url: String },

    /// The playlist id was resolved from the URL
    PlaylistResolved { id: u64 },

    /// Title and episode metadata are being fetched
    FetchingMetadata { id: u64 },

    /// The API reported no usable title; a fallback directory name is used
    MissingTitle { id: u64 },

    /// Metadata fetched; downloads into `directory` are about to start
    PlaylistFetched {
        directory: String,
        episode_count: usize,
    },

    /// An episode name had no leading number and was assigned number 1
    EpisodeNumberDefaulted { name: String },

    /// Several episodes share a number and will write the same file name
    DuplicateEpisodeNumber { number: u32 },

    /// An episode download is starting
    DownloadingEpisode {
        index: usize,
        total: usize,
        number: u32,
    },

    /// The target file already exists; the episode is skipped
    AlreadyDownloaded { path: PathBuf },

    /// A candidate stream URL failed; the next quality tier is tried
    QualityFallback { url: String, reason: String },

    /// Bytes arrived for the episode currently downloading
    ///
    /// `total` is present when the server reported a Content-Length.
    DownloadProgress { received: u64, total: Option<u64> },

    /// An episode was fully written to disk
    EpisodeDownloaded { path: PathBuf, bytes: u64 },

    /// Every candidate URL failed; a truncated file may remain at `path`
    EpisodeAbandoned { path: PathBuf },

    /// All episodes of the playlist were processed
    Completed { episode_count: usize },
}

/// Configuration for a playlist download run
///
/// Immutable for the duration of a run; shared by every playlist URL.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Base URL of the AnimeVost API
    pub api_base: String,
    /// Directory the per-playlist directories are created under
    pub destination_root: PathBuf,
}

impl FetchOptions {
    /// Creates options targeting the public AnimeVost API, downloading
    /// into per-playlist directories under `destination_root`.
    pub fn new(destination_root: impl Into<PathBuf>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            destination_root: destination_root.into(),
        }
    }
}

/// Top-level error type for playlist download operations
#[derive(Debug, Error)]
pub enum AnimevostDlError {
    /// The playlist page URL carries no numeric id
    #[error("Playlist URL error: {0}")]
    PlaylistUrl(#[from] PlaylistUrlError),

    /// Error while talking to the metadata API
    #[error("Metadata retrieval error: {0}")]
    MetadataRetrieval(#[from] MetadataRetrievalError),

    /// Error while downloading an episode
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),
}

/// Downloads every episode of the playlist behind one page URL
///
/// Resolves the numeric playlist id from `url`, fetches the title and the
/// episode list from the API configured in `options`, and downloads each
/// episode in ascending number order into
/// `<destination_root>/<title-slug>/<NNNN><ext>`. Episodes whose target
/// file already exists are skipped; an episode whose every stream URL
/// fails is abandoned and the remaining episodes are still processed.
///
/// Progress events are emitted through the provided callback, allowing
/// callers to render status and progress, or remain silent.
///
/// # Arguments
///
/// * `url` - The playlist page URL
/// * `options` - API endpoint and destination directory configuration
/// * `progress_callback` - Closure called with progress events
///
/// # Examples
///
/// ```no_run
/// use animevost_dl::{download_playlist, FetchOptions, ProgressEvent};
///
/// let options = FetchOptions::new(std::env::current_dir().unwrap());
/// download_playlist(
///     "https://animevost.org/tip/tv/2147-naruto-shippuuden.html",
///     &options,
///     |event| {
///         if let ProgressEvent::EpisodeDownloaded { path, .. } = event {
///             println!("saved {}", path.display());
///         }
///     },
/// )
/// .unwrap();
/// ```
pub fn download_playlist<F>(
    url: &str,
    options: &FetchOptions,
    mut progress_callback: F,
) -> Result<(), AnimevostDlError>
where
    F: FnMut(ProgressEvent),
{
    progress_callback(ProgressEvent::Started {
        url: url.to_string(),
    });

    let id = playlist_id_from_url(url)?;
    progress_callback(ProgressEvent::PlaylistResolved { id });

    let provider = AnimevostProvider::new(&options.api_base);
    run_playlist(&provider, id, options, &mut progress_callback)
}

/// Fetches metadata from `provider` and downloads every episode.
fn run_playlist<P, F>(
    provider: &P,
    id: u64,
    options: &FetchOptions,
    progress_callback: &mut F,
) -> Result<(), AnimevostDlError>
where
    P: PlaylistProvider,
    F: FnMut(ProgressEvent),
{
    progress_callback(ProgressEvent::FetchingMetadata { id });

    let title = provider.fetch_title(id)?;
    let playlist = provider.fetch_playlist(id)?;

    let directory = match title {
        Some(slug) => slug,
        None => {
            progress_callback(ProgressEvent::MissingTitle { id });
            format!("playlist-{id}")
        }
    };
    let save_dir = options.destination_root.join(&directory);

    progress_callback(ProgressEvent::PlaylistFetched {
        directory,
        episode_count: playlist.len(),
    });

    for episode in &playlist {
        if episode.number_defaulted {
            progress_callback(ProgressEvent::EpisodeNumberDefaulted {
                name: episode.name.clone(),
            });
        }
    }
    // The playlist is sorted, so colliding numbers sit next to each other
    for pair in playlist.windows(2) {
        if pair[0].number == pair[1].number {
            progress_callback(ProgressEvent::DuplicateEpisodeNumber {
                number: pair[0].number,
            });
        }
    }

    let downloader = EpisodeDownloader::new()?;
    let total = playlist.len();

    for (index, episode) in playlist.iter().enumerate() {
        progress_callback(ProgressEvent::DownloadingEpisode {
            index,
            total,
            number: episode.number,
        });

        let file_stem = format!("{:04}", episode.number);
        downloader.download(
            &file_stem,
            &episode.candidate_urls,
            &save_dir,
            progress_callback,
        )?;
    }

    progress_callback(ProgressEvent::Completed {
        episode_count: total,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canned playlist source for orchestrator tests.
    struct StubProvider {
        title: Option<String>,
        episodes: Vec<Episode>,
    }

    impl PlaylistProvider for StubProvider {
        fn fetch_title(&self, _id: u64) -> Result<Option<String>, MetadataRetrievalError> {
            Ok(self.title.clone())
        }

        fn fetch_playlist(&self, _id: u64) -> Result<Vec<Episode>, MetadataRetrievalError> {
            Ok(self.episodes.clone())
        }
    }

    fn unreachable_episode(number: u32, name: &str, defaulted: bool) -> Episode {
        Episode {
            number,
            name: name.to_string(),
            candidate_urls: vec![format!("http://127.0.0.1:1/{number}.mp4")],
            number_defaulted: defaulted,
        }
    }

    #[test]
    fn test_missing_title_falls_back_to_playlist_id_directory() {
        let root = tempfile::tempdir().unwrap();
        let provider = StubProvider {
            title: None,
            episodes: vec![],
        };
        let options = FetchOptions::new(root.path());

        let mut events = Vec::new();
        run_playlist(&provider, 77, &options, &mut |e| events.push(e)).unwrap();

        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::MissingTitle { id: 77 })));
        assert!(events.iter().any(|e| matches!(
            e,
            ProgressEvent::PlaylistFetched { directory, .. } if directory == "playlist-77"
        )));
    }

    #[test]
    fn test_defaulted_and_duplicate_numbers_are_warned_about() {
        let root = tempfile::tempdir().unwrap();
        let provider = StubProvider {
            title: Some("demo".to_string()),
            episodes: vec![
                unreachable_episode(1, "OVA", true),
                unreachable_episode(1, "1 серия", false),
                unreachable_episode(2, "2 серия", false),
            ],
        };
        let options = FetchOptions::new(root.path());

        let mut events = Vec::new();
        run_playlist(&provider, 5, &options, &mut |e| events.push(e)).unwrap();

        assert!(events.iter().any(|e| matches!(
            e,
            ProgressEvent::EpisodeNumberDefaulted { name } if name == "OVA"
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::DuplicateEpisodeNumber { number: 1 })));
        // Every episode is still attempted even though all downloads fail
        let attempts = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::DownloadingEpisode { .. }))
            .count();
        assert_eq!(attempts, 3);
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Completed { episode_count: 3 })));
    }
}
