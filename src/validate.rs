//! Syntactic check for YouTube video URLs. No network access.

use once_cell::sync::Lazy;
use regex::Regex;

static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(youtube|youtu|youtube-nocookie)\.(com|be)/(watch\?v=|embed/|v/|.+\?v=)?([^&=%?]{11})",
    )
    .expect("static URL pattern compiles")
});

/// True if `url` starts with something shaped like a YouTube video link.
/// Anything after the 11-character video id is ignored.
pub fn is_valid(url: &str) -> bool {
    YOUTUBE_URL.is_match(url)
}

/// Extracts the 11-character video id from a valid URL
pub fn video_id(url: &str) -> Option<&str> {
    YOUTUBE_URL
        .captures(url)
        .and_then(|caps| caps.get(6))
        .map(|m| m.as_str())
}
