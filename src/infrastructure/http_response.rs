// HTTP response utilities for JSON with optional Brotli compression
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};
use bytes::Bytes;
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// Serialize a value to JSON and optionally compress it with Brotli. The
/// compression is done manually instead of through a middleware layer so the
/// content length of the actual payload is known up front.
pub async fn json_response<T: Serialize>(
    data: &T,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let json = serde_json::to_vec(data).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json");

    let payload = if compress {
        let cursor = std::io::Cursor::new(json);
        let mut encoder = BrotliEncoder::new(cursor);
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        builder = builder.header(header::CONTENT_ENCODING, "br");
        compressed
    } else {
        json
    };

    builder
        .header(
            header::CONTENT_LENGTH,
            HeaderValue::from_str(&payload.len().to_string()).unwrap(),
        )
        .body(Body::from(Bytes::from(payload)))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_plain_json_response() {
        let response = json_response(&json!({"ok": true}), false).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    }

    #[tokio::test]
    async fn test_compressed_response_is_marked() {
        let response = json_response(&json!({"ok": true}), true).await.unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "br"
        );
        assert!(response.headers().get(header::CONTENT_LENGTH).is_some());
    }
}
