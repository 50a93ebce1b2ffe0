//! Playlist title to directory name transformation
//!
//! The AnimeVost API reports titles with a bracketed suffix describing the
//! release, e.g. `"Наруто / Naruto [1-220 из 220]"`. The suffix is stripped
//! and the remainder turned into a filesystem-safe slug used as the
//! per-playlist download directory.

/// Turns an API-reported playlist title into a filesystem-safe slug
///
/// Everything from the last occurrence of `" ["` onward is dropped, then
/// the rest is slugified: alphanumeric characters are lowercased, runs of
/// whitespace, `-` and `_` become a single `-`, and any other character is
/// removed. Unicode letters are kept as-is (lowercased), so Cyrillic
/// titles stay readable.
///
/// Returns an empty string if the title contains no alphanumerics.
pub fn playlist_slug(title: &str) -> String {
    let trimmed = match title.rfind(" [") {
        Some(index) => &title[..index],
        None => title,
    };

    let mut slug = String::with_capacity(trimmed.len());
    let mut pending_separator = false;

    for character in trimmed.chars() {
        if character.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(character.to_lowercase());
        } else if character.is_whitespace() || character == '-' || character == '_' {
            pending_separator = true;
        }
        // Any other punctuation is dropped without acting as a separator
    }

    slug
}
