//! Buffering helpers for request and response bodies

use bytes::{Buf, Bytes};
use http_body::Body;
use http_body_util::BodyExt;

/// Drains a [`Body`] into a single contiguous [`Bytes`] buffer
///
/// Request bodies are built in memory and GraphQL responses are read whole
/// before they are parsed, so nothing in this workspace streams.
pub async fn body_to_bytes<B>(body: &mut B) -> Result<Bytes, B::Error>
where
    B: Body + Unpin,
    B::Data: Buf,
{
    let collected = BodyExt::collect(body).await?;
    Ok(collected.to_bytes())
}
