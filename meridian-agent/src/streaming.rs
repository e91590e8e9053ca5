use crate::constants::{STREAMING_CHUNK_DELAY_MS, STREAMING_FALLBACK_DELAY_MS};
use futures::stream::BoxStream;
use std::time::Duration;

/// Splits `text` into word-boundary chunks and yields them with an
/// inter-chunk delay floor: ~10ms for models that stream natively, ~20ms
/// for the non-streaming fallback (spec §4.J "Streaming"). The delay lets
/// a slow consumer apply backpressure instead of buffering the whole
/// response.
pub fn stream_response(text: String, streams_natively: bool) -> BoxStream<'static, String> {
    let delay = Duration::from_millis(if streams_natively { STREAMING_CHUNK_DELAY_MS } else { STREAMING_FALLBACK_DELAY_MS });
    Box::pin(async_stream::stream! {
        let mut first = true;
        for chunk in text.split_inclusive(' ') {
            if !first {
                tokio::time::sleep(delay).await;
            }
            first = false;
            yield chunk.to_string();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn reassembles_to_the_original_text() {
        let stream = stream_response("hello there friend".to_string(), true);
        let chunks: Vec<String> = stream.collect().await;
        assert_eq!(chunks.concat(), "hello there friend");
        assert!(chunks.len() > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_yields_no_chunks() {
        let stream = stream_response(String::new(), true);
        let chunks: Vec<String> = stream.collect().await;
        assert!(chunks.is_empty());
    }
}
