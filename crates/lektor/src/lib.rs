//! Reassembles adaptive-bitrate player streams into a single muxed file.
//!
//! ```text
//! ┌──────────┐  embed page  ┌────────────┐  renditions  ┌───────────┐
//! │  Lesson  ├──────────────►  Manifest  ├──────────────►  Selector │
//! └──────────┘              └────────────┘              └─────┬─────┘
//!                                                              │ best video / audio
//!        ┌──────────── video.pipe ◄── stream_rendition ◄──────┤
//!  ┌─────▼────┐                                               │
//!  │  ffmpeg  │                                               │
//!  └─────▲────┘                                               │
//!        └──────────── audio.pipe ◄── stream_rendition ◄──────┘
//! ```

pub mod error;
pub mod fetch;
#[cfg(unix)]
pub mod job;
pub mod merge;
pub mod player;
pub mod stream;
pub mod util;

pub use error::{LektorError, LektorResult};
pub use util::http::{BrowserHeaders, HttpClient};

/// Which of the two tracks of a rendition pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
