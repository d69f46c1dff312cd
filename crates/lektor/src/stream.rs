use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::{
    error::{LektorError, LektorResult},
    player::RenditionPlan,
    util::http::HttpClient,
    TrackKind,
};

/// Writes the init block of `rendition` followed by every segment, in order.
///
/// Segments are fetched one at a time and each write waits for the consumer,
/// so at most one segment is held in memory. An empty audio segment aborts
/// the stream, as the provider occasionally serves those instead of data.
pub async fn stream_rendition<W>(
    client: &HttpClient,
    rendition: &RenditionPlan,
    writer: &mut W,
) -> LektorResult<()>
where
    W: AsyncWrite + Unpin,
{
    let kind = rendition.kind;
    let total = rendition.segments.len();

    writer.write_all(&rendition.init_segment).await?;

    for (index, url) in rendition.segments.iter().enumerate() {
        let bytes = fetch_segment(client, url).await?;
        if bytes.is_empty() && kind == TrackKind::Audio {
            return Err(LektorError::SegmentFetchError {
                url: url.to_string(),
                reason: "empty audio segment".to_string(),
            });
        }

        writer.write_all(&bytes).await?;
        tracing::debug!(
            "{kind} segment {} / {total} written ({} bytes)",
            index + 1,
            bytes.len()
        );
    }

    writer.flush().await?;
    writer.shutdown().await?;
    tracing::info!("All {total} {kind} segments written.");

    Ok(())
}

/// Plain GET without challenge handling, a bad segment is fatal.
async fn fetch_segment(client: &HttpClient, url: &Url) -> LektorResult<Bytes> {
    let segment_error = |reason: String| LektorError::SegmentFetchError {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| segment_error(e.to_string()))?;
    if !response.status().is_success() {
        return Err(segment_error(format!("HTTP {}", response.status())));
    }

    response.bytes().await.map_err(|e| segment_error(e.to_string()))
}

/// Streams `rendition` into the FIFO at `path`. The endpoint is closed when
/// this returns, successfully or not.
#[cfg(unix)]
pub async fn stream_to_fifo(
    client: &HttpClient,
    rendition: &RenditionPlan,
    path: &std::path::Path,
) -> LektorResult<()> {
    let mut writer = crate::merge::fifo::open_fifo_writer(path).await?;
    stream_rendition(client, rendition, &mut writer).await
}
