use animevost_dl::{FetchOptions, ProgressEvent, download_playlist};
use clap::Parser;
use humansize::{DECIMAL, format_size};
use std::io::{self, Write};
use std::process;

/// Width of the download progress bar, in characters
const PROGRESS_BAR_WIDTH: usize = 50;

/// Download the episodes of AnimeVost playlists, given their page URLs.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Playlist page URLs, e.g. https://animevost.org/tip/tv/2147-naruto.html
    #[arg(required = true)]
    urls: Vec<String>,
}

/// Renders progress events as status lines and a refreshing progress bar
struct ProgressPrinter {
    bar_width: usize,
    /// Filled cell count of the bar currently on screen, if any
    bar_filled: Option<usize>,
}

impl ProgressPrinter {
    fn new(bar_width: usize) -> Self {
        Self {
            bar_width,
            bar_filled: None,
        }
    }

    fn handle(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { url } => {
                println!("\nFetching playlist from {url}");
            }
            ProgressEvent::PlaylistResolved { id } => {
                println!("Playlist id: {id}");
            }
            ProgressEvent::FetchingMetadata { .. } => {}
            ProgressEvent::MissingTitle { id } => {
                println!("Warning: the API reported no title for playlist {id}, using a fallback directory name");
            }
            ProgressEvent::PlaylistFetched {
                directory,
                episode_count,
            } => {
                println!("Playlist name: {directory}");
                println!("{episode_count} episode(s) to process");
            }
            ProgressEvent::EpisodeNumberDefaulted { name } => {
                println!("Warning: episode '{name}' has no leading number, treating it as episode 1");
            }
            ProgressEvent::DuplicateEpisodeNumber { number } => {
                println!("Warning: several episodes share number {number}; later downloads overwrite earlier ones");
            }
            ProgressEvent::DownloadingEpisode { total, number, .. } => {
                println!("\nDownloading video {number} of {total}");
            }
            ProgressEvent::AlreadyDownloaded { .. } => {
                println!("Video exists, skipping download");
            }
            ProgressEvent::QualityFallback { url, reason } => {
                self.finish_bar();
                println!("Source {url} failed ({reason}), trying next quality");
            }
            ProgressEvent::DownloadProgress { received, total } => {
                // Without a Content-Length there is nothing to scale against
                if let Some(total) = total {
                    self.draw_bar(received, total);
                }
            }
            ProgressEvent::EpisodeDownloaded { path, bytes } => {
                self.finish_bar();
                println!("Saved {} ({})", path.display(), format_size(bytes, DECIMAL));
            }
            ProgressEvent::EpisodeAbandoned { path } => {
                self.finish_bar();
                println!("All sources failed for {}", path.display());
            }
            ProgressEvent::Completed { episode_count } => {
                println!("\nFinished processing {episode_count} episode(s)");
            }
        }
    }

    /// Redraws the fixed-width bar in place when its fill level changed
    fn draw_bar(&mut self, received: u64, total: u64) {
        let filled = if total == 0 {
            self.bar_width
        } else {
            ((received.min(total) * self.bar_width as u64) / total) as usize
        };

        if self.bar_filled == Some(filled) {
            return;
        }
        self.bar_filled = Some(filled);

        print!(
            "\r[{}{}]",
            "=".repeat(filled),
            " ".repeat(self.bar_width - filled)
        );
        io::stdout().flush().ok();
    }

    /// Terminates the in-place bar line, if one is on screen
    fn finish_bar(&mut self) {
        if self.bar_filled.take().is_some() {
            println!();
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let current_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot determine the current directory: {e}");
            process::exit(1);
        }
    };
    let options = FetchOptions::new(current_dir);

    let mut printer = ProgressPrinter::new(PROGRESS_BAR_WIDTH);
    let mut failures = 0usize;

    for url in &cli.urls {
        if let Err(e) = download_playlist(url, &options, |event| printer.handle(event)) {
            printer.finish_bar();
            eprintln!("Error processing {url}: {e}");
            failures += 1;
        }
    }

    if failures > 0 {
        process::exit(1);
    }
}
