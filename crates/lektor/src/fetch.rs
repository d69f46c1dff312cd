use std::{future::Future, time::Duration};

use bytes::Bytes;
use reqwest::header::HeaderMap;

use crate::{
    error::{LektorError, LektorResult},
    util::http::HttpClient,
};

/// Title of the interstitial served instead of the page when a request looks automated.
pub const CHALLENGE_MARKER: &str = "<title>Just a moment...</title>";
/// Whole body of a gateway timeout returned by the CDN in front of the site.
pub const GATEWAY_TIMEOUT_BODY: &str = "error code: 524";

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Total number of attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before every retry.
    pub retry_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            retry_delay: Duration::from_secs(7),
        }
    }
}

/// Classifies a response body. The status code is not inspected.
pub fn detect_challenge(body: &[u8]) -> LektorResult<()> {
    let text = String::from_utf8_lossy(body);
    if text.contains(CHALLENGE_MARKER) {
        Err(LektorError::ChallengeDetected)
    } else if text.trim() == GATEWAY_TIMEOUT_BODY {
        Err(LektorError::Transient524)
    } else {
        Ok(())
    }
}

/// Runs `op` until it succeeds, fails with a non-challenge error, or
/// `options.max_attempts` is used up. The last challenge error is returned then.
pub async fn retry_challenged<T, F, Fut>(options: &FetchOptions, mut op: F) -> LektorResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LektorResult<T>>,
{
    let max_attempts = options.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_challenge() && attempt < max_attempts => {
                tracing::warn!(
                    "{e}, retry in {:?} ({attempt}/{max_attempts})",
                    options.retry_delay
                );
                tokio::time::sleep(options.retry_delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[derive(Clone)]
pub struct ChallengeFetcher {
    client: HttpClient,
    options: FetchOptions,
}

impl ChallengeFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            options: FetchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// GET `url`, retrying the identical request when a challenge marker comes back.
    pub async fn get(&self, url: &str, headers: HeaderMap) -> LektorResult<Bytes> {
        retry_challenged(&self.options, || {
            let request = self.client.get(url).headers(headers.clone());
            async move {
                let body = request.send().await?.bytes().await?;
                detect_challenge(&body)?;
                Ok(body)
            }
        })
        .await
    }
}
