pub mod inspect;
pub mod model;
pub mod select;
pub mod url;

pub use inspect::{canonical_embed_url, extract_manifest_url, ManifestResolver, ResolvedManifest};
pub use model::{Manifest, Rendition, SegmentRef};
pub use select::Selection;

use ::url::Url;

use crate::{error::LektorResult, TrackKind};

/// Everything a streamer needs for one track: the decoded init block and the
/// absolute segment URLs in write order.
#[derive(Debug, Clone)]
pub struct RenditionPlan {
    pub kind: TrackKind,
    pub init_segment: Vec<u8>,
    pub base_url: Url,
    pub segments: Vec<Url>,
}

impl RenditionPlan {
    fn new(kind: TrackKind, rendition: &Rendition, renditions_base: &Url) -> LektorResult<Self> {
        let base_url = url::resolve_relative(renditions_base, &rendition.base_url)?;
        let segments = url::segment_urls(&base_url, rendition)?;

        Ok(Self {
            kind,
            init_segment: rendition.decode_init_segment()?,
            base_url,
            segments,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MediaPlan {
    pub video: RenditionPlan,
    pub audio: RenditionPlan,
}

impl MediaPlan {
    pub fn new(resolved: &ResolvedManifest) -> LektorResult<Self> {
        let selection = Selection::select_best(&resolved.manifest)?;
        tracing::info!(
            "Selected video {}x{} @ {} bps, audio @ {} bps",
            selection.video.width,
            selection.video.height,
            selection.video.bitrate,
            selection.audio.bitrate
        );

        let renditions_base = url::resolve_relative(&resolved.url, &resolved.manifest.base_url)?;

        Ok(Self {
            video: RenditionPlan::new(TrackKind::Video, &selection.video, &renditions_base)?,
            audio: RenditionPlan::new(TrackKind::Audio, &selection.audio, &renditions_base)?,
        })
    }
}
