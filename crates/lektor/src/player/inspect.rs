use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::model::Manifest;
use crate::{
    error::{LektorError, LektorResult},
    fetch::ChallengeFetcher,
    util::http::BrowserHeaders,
};

static MANIFEST_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""avc_url":"(.+?)""#).unwrap());
static EMBED_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https://player\.vimeo\.com/video/\d+)").unwrap());

/// Locates the manifest-fetch URL inside the markup of a player embed page.
pub fn extract_manifest_url(page: &str) -> LektorResult<String> {
    let captures = MANIFEST_URL_REGEX.captures(page).ok_or_else(|| {
        LektorError::ManifestParseError("manifest URL not found in embed page".to_string())
    })?;
    Ok(captures[1].replace(r"\u0026", "&").replace(r"\/", "/"))
}

/// Reduces an iframe `src` to the bare player URL, dropping tracking parameters.
pub fn canonical_embed_url(src: &str) -> Option<String> {
    EMBED_URL_REGEX
        .captures(src)
        .map(|captures| captures[1].to_string())
}

#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    /// Document the manifest was fetched from. Every relative path hangs off it.
    pub url: Url,
    pub manifest: Manifest,
}

#[derive(Clone)]
pub struct ManifestResolver {
    fetcher: ChallengeFetcher,
    headers: BrowserHeaders,
}

impl ManifestResolver {
    pub fn new(fetcher: ChallengeFetcher, headers: BrowserHeaders) -> Self {
        Self { fetcher, headers }
    }

    pub async fn resolve(&self, embed_url: &str) -> LektorResult<ResolvedManifest> {
        let headers = self.headers.to_header_map()?;

        let page = self.fetcher.get(embed_url, headers.clone()).await?;
        let manifest_url = extract_manifest_url(&String::from_utf8_lossy(&page))?;
        tracing::debug!("Manifest of {embed_url}: {manifest_url}");

        let url = Url::parse(&manifest_url)?;
        let body = self.fetcher.get(url.as_str(), headers).await?;
        let manifest: Manifest = serde_json::from_slice(&body)
            .map_err(|e| LektorError::ManifestParseError(e.to_string()))?;

        Ok(ResolvedManifest { url, manifest })
    }
}
