//! Episode download module
//!
//! This module streams one episode's video data to disk. Candidate stream
//! URLs are tried in quality order: an HTTP error or a broken connection
//! moves on to the next candidate, a write error aborts the playlist.
//! A file that already exists at the target path is never re-downloaded.

use crate::ProgressEvent;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Size of the read buffer used while streaming a response body to disk
const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Errors that abort a download instead of falling back to the next
/// candidate URL
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Failed to build the HTTP client
    #[error("Failed to initialize HTTP client: {source}")]
    ClientInitFailed { source: reqwest::Error },

    /// Failed to create or access the download directory
    #[error("Failed to create download directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the episode file
    #[error("Failed to write episode file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// How a single download call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// The episode was streamed to disk
    Downloaded,
    /// The target file already existed; no network request was made
    AlreadyDownloaded,
    /// Every candidate URL failed; a truncated file may remain
    Failed,
}

/// Why a single candidate URL was given up on
enum CandidateFailure {
    /// The request could not be sent or the connection broke mid-stream
    Network(String),
    /// The server answered with a non-success status
    Http(reqwest::StatusCode),
}

/// Downloads episodes over a shared blocking HTTP client.
///
/// The client is built without a request timeout: episode transfers run
/// for however long the server keeps sending, and a stalled connection
/// blocks until the process is interrupted.
pub struct EpisodeDownloader {
    client: reqwest::blocking::Client,
}

impl EpisodeDownloader {
    /// Creates a downloader with its own HTTP client.
    pub fn new() -> Result<Self, DownloadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|source| DownloadError::ClientInitFailed { source })?;

        Ok(Self { client })
    }

    /// Downloads one episode into `save_dir`.
    ///
    /// The directory is created if missing. The target file name is
    /// `file_stem` plus the extension of the *first* candidate URL, and an
    /// existing target file skips the download entirely. Candidates are
    /// then tried in order; the first successful response is streamed to
    /// the target in fixed-size chunks, emitting
    /// [`ProgressEvent::DownloadProgress`] as bytes arrive. A candidate
    /// that fails leaves a truncated file which the next candidate's
    /// write replaces.
    ///
    /// # Arguments
    ///
    /// * `file_stem` - Target file name without extension (e.g. `0001`)
    /// * `candidate_urls` - Stream URLs in quality order, best first
    /// * `save_dir` - Directory the episode file is written into
    /// * `progress` - Callback receiving download progress events
    ///
    /// # Returns
    ///
    /// The way the call ended; only directory and file-write problems are
    /// returned as errors.
    pub fn download<F>(
        &self,
        file_stem: &str,
        candidate_urls: &[String],
        save_dir: &Path,
        progress: &mut F,
    ) -> Result<DownloadStatus, DownloadError>
    where
        F: FnMut(ProgressEvent),
    {
        fs::create_dir_all(save_dir).map_err(|source| DownloadError::DirectoryCreationFailed {
            path: save_dir.to_path_buf(),
            source,
        })?;

        let extension = candidate_urls.first().map_or("", |url| url_extension(url));
        let target = save_dir.join(format!("{file_stem}{extension}"));

        if target.exists() {
            progress(ProgressEvent::AlreadyDownloaded { path: target });
            return Ok(DownloadStatus::AlreadyDownloaded);
        }

        for url in candidate_urls {
            match self.try_candidate(url, &target, progress) {
                Ok(bytes) => {
                    progress(ProgressEvent::EpisodeDownloaded {
                        path: target,
                        bytes,
                    });
                    return Ok(DownloadStatus::Downloaded);
                }
                Err(TryCandidateError::Fatal(error)) => return Err(error),
                Err(TryCandidateError::Candidate(failure)) => {
                    let reason = match failure {
                        CandidateFailure::Network(message) => message,
                        CandidateFailure::Http(status) => format!("HTTP {status}"),
                    };
                    progress(ProgressEvent::QualityFallback {
                        url: url.clone(),
                        reason,
                    });
                }
            }
        }

        progress(ProgressEvent::EpisodeAbandoned { path: target });
        Ok(DownloadStatus::Failed)
    }

    /// Streams one candidate URL to `target`, returning the byte count.
    fn try_candidate<F>(
        &self,
        url: &str,
        target: &Path,
        progress: &mut F,
    ) -> Result<u64, TryCandidateError>
    where
        F: FnMut(ProgressEvent),
    {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| CandidateFailure::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CandidateFailure::Http(response.status()).into());
        }

        let total = response.content_length();

        // Created (and truncated) only after a successful response, so an
        // earlier candidate's partial data survives exactly until a later
        // candidate starts writing.
        let mut file = File::create(target).map_err(|source| DownloadError::WriteFailed {
            path: target.to_path_buf(),
            source,
        })?;

        let mut received: u64 = 0;
        let mut buffer = [0u8; DOWNLOAD_CHUNK_SIZE];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| CandidateFailure::Network(e.to_string()))?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .map_err(|source| DownloadError::WriteFailed {
                    path: target.to_path_buf(),
                    source,
                })?;

            received += bytes_read as u64;
            progress(ProgressEvent::DownloadProgress { received, total });
        }

        Ok(received)
    }
}

/// Internal split between "try the next candidate" and "abort".
enum TryCandidateError {
    Candidate(CandidateFailure),
    Fatal(DownloadError),
}

impl From<CandidateFailure> for TryCandidateError {
    fn from(failure: CandidateFailure) -> Self {
        TryCandidateError::Candidate(failure)
    }
}

impl From<DownloadError> for TryCandidateError {
    fn from(error: DownloadError) -> Self {
        TryCandidateError::Fatal(error)
    }
}

/// Extension of the file a URL points at, including the leading dot.
///
/// Derived from the last `/`-separated segment; returns an empty string
/// when that segment has no dot past its first character.
fn url_extension(url: &str) -> &str {
    let file_name = url.rsplit('/').next().unwrap_or_default();

    match file_name.rfind('.') {
        Some(index) if index > 0 => &file_name[index..],
        _ => "",
    }
}
