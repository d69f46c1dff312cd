use super::model::{Manifest, Rendition};
use crate::error::{LektorError, LektorResult};

/// Preferred video sizes, landscape and portrait. Providers are not
/// consistent about which one they report for the same stream.
pub const TARGET_DIMENSIONS: [(u32, u32); 2] = [(1920, 1080), (1080, 1920)];

#[derive(Debug, Clone)]
pub struct Selection {
    pub video: Rendition,
    pub audio: Rendition,
}

impl Selection {
    pub fn select_best(manifest: &Manifest) -> LektorResult<Self> {
        let video = select_video(&manifest.video).ok_or(LektorError::SelectionError("video"))?;
        let audio = select_audio(&manifest.audio).ok_or(LektorError::SelectionError("audio"))?;

        Ok(Self {
            video: video.clone(),
            audio: audio.clone(),
        })
    }
}

/// Highest bitrate wins. Equal bitrates keep the first one listed.
pub fn best_by_bitrate(renditions: &[Rendition]) -> Option<&Rendition> {
    let mut best: Option<&Rendition> = None;
    for rendition in renditions {
        if best.map_or(true, |b| rendition.bitrate > b.bitrate) {
            best = Some(rendition);
        }
    }
    best
}

/// The first rendition matching one of [TARGET_DIMENSIONS] in listed order,
/// otherwise [best_by_bitrate].
pub fn select_video(renditions: &[Rendition]) -> Option<&Rendition> {
    renditions
        .iter()
        .find(|r| TARGET_DIMENSIONS.iter().any(|&(w, h)| r.has_dimensions(w, h)))
        .or_else(|| best_by_bitrate(renditions))
}

pub fn select_audio(renditions: &[Rendition]) -> Option<&Rendition> {
    best_by_bitrate(renditions)
}
