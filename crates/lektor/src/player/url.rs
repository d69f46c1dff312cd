use url::Url;

use super::model::Rendition;
use crate::error::{LektorError, LektorResult};

const PARENT: &str = "../";

/// Resolves a `../`-prefixed base path against the URL of the document that contains it.
///
/// For `n` occurrences of `../` in `descriptor`, the reference is walked up
/// `n + 1` directories (the reference names a file, not a directory), then
/// the descriptor without its leading `3 * n` characters is appended.
///
/// `https://x.test/a/b/manifest.json` with `../../base/` gives `https://x.test/base/`.
pub fn resolve_relative(reference: &Url, descriptor: &str) -> LektorResult<Url> {
    let levels = descriptor.matches(PARENT).count();

    let mut base = reference.clone();
    base.set_query(None);
    base.set_fragment(None);
    {
        let mut segments = base.path_segments_mut().map_err(|_| {
            LektorError::ManifestParseError(format!("{reference} can not be a base URL"))
        })?;
        for _ in 0..=levels {
            segments.pop();
        }
    }

    let rest = descriptor.get(PARENT.len() * levels..).unwrap_or_default();
    let joined = format!("{}/{rest}", base.as_str().trim_end_matches('/'));
    Ok(Url::parse(&joined)?)
}

/// Absolute segment URLs of `rendition` in listed order.
///
/// Each one is the base followed by the segment text, a `/` is inserted only
/// when the base does not end with one. Segments are appended, not resolved:
/// a leading `/` or a colon does not escape the base.
pub fn segment_urls(base: &Url, rendition: &Rendition) -> LektorResult<Vec<Url>> {
    let base = base.as_str();
    let separator = if base.ends_with('/') { "" } else { "/" };

    rendition
        .segments
        .iter()
        .map(|segment| Ok(Url::parse(&format!("{base}{separator}{}", segment.url))?))
        .collect()
}
