//! Response writing
//!
//! A [`ResponseWriter`] is bound to a single response. Every write method
//! consumes the writer, so a body can only be produced once per request.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ErrorEnvelope, ErrorKind};
use crate::logger;

/// Serialization strategy for a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMode {
    /// Marshal the value to JSON.
    StructuredJson,
    /// The value is already a byte sequence; write it unmodified.
    RawBytes,
    /// A mode this server does not know how to serialize. Kept representable
    /// so misconfiguration fails closed instead of guessing at the value.
    Other(String),
}

/// Value handed to [`ResponseWriter::write_value`].
#[derive(Debug, Clone)]
pub enum Payload {
    Json(serde_json::Value),
    Bytes(Bytes),
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Json(value) => value.serialize(serializer),
            Self::Bytes(data) => serializer.serialize_bytes(data),
        }
    }
}

/// Failure raised by [`ResponseWriter::write_value`].
#[derive(Debug, Error)]
pub enum WriteError {
    /// JSON serialization failed; nothing has been written.
    #[error("response serialization failed: {0}")]
    Marshal(#[from] serde_json::Error),
    /// The writer was in a mode it cannot serialize. The carried response is
    /// the fail-closed 500 body that must still be sent to the client.
    #[error("error(2): unsupported response type")]
    UnsupportedMode { response: Response<Full<Bytes>> },
}

impl WriteError {
    fn unsupported() -> Self {
        Self::UnsupportedMode {
            response: build_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(b"server error"),
            ),
        }
    }
}

/// Writes exactly one response body in the currently declared content mode.
#[derive(Debug)]
pub struct ResponseWriter {
    mode: ContentMode,
}

impl ResponseWriter {
    pub const fn new() -> Self {
        Self {
            mode: ContentMode::StructuredJson,
        }
    }

    /// Switch the serialization mode for subsequent writes. No I/O.
    pub fn set_mode(&mut self, mode: ContentMode) {
        self.mode = mode;
    }

    /// Serialize `payload` per the current mode into the one response body.
    ///
    /// An unrecognized mode, or a non-byte payload in raw mode, fails
    /// closed: the returned [`WriteError::UnsupportedMode`] carries a fixed
    /// 500 `server error` response for the caller to send.
    pub fn write_value(self, payload: Payload) -> Result<Response<Full<Bytes>>, WriteError> {
        let body = match self.mode {
            ContentMode::StructuredJson => Bytes::from(serde_json::to_vec(&payload)?),
            ContentMode::RawBytes => match payload {
                Payload::Bytes(data) => data,
                Payload::Json(_) => return Err(WriteError::unsupported()),
            },
            ContentMode::Other(_) => return Err(WriteError::unsupported()),
        };
        Ok(build_response(StatusCode::OK, body))
    }

    /// Drain `reader` fully into memory, then build the 200 response in one
    /// operation.
    ///
    /// A read failure propagates with nothing written; the caller is
    /// responsible for emitting an error response instead.
    pub async fn write_file<R>(self, reader: &mut R) -> std::io::Result<Response<Full<Bytes>>>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        Ok(build_response(StatusCode::OK, Bytes::from(data)))
    }

    /// Serialize the catalog envelope for `kind` as the response body.
    ///
    /// An absent kind reports success. Error envelopes always carry an
    /// explicit 200; clients distinguish failures by the embedded `code`.
    pub fn write_error(self, kind: Option<ErrorKind>) -> Response<Full<Bytes>> {
        let envelope = ErrorEnvelope::from(kind.unwrap_or(ErrorKind::Ok));
        let body = serde_json::to_vec(&envelope).unwrap_or_default();
        build_response(StatusCode::OK, Bytes::from(body))
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

fn build_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn log_build_error(kind: &str, err: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {kind} response: {err}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_json_mode_round_trips() {
        let value = json!({"name": "clip", "count": 3});
        let writer = ResponseWriter::new();
        let response = writer.write_value(Payload::Json(value.clone())).unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_bytes(response).await;
        let decoded: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, value);
    }

    #[tokio::test]
    async fn test_raw_mode_writes_bytes_unmodified() {
        let mut writer = ResponseWriter::new();
        writer.set_mode(ContentMode::RawBytes);
        let response = writer
            .write_value(Payload::Bytes(Bytes::from_static(b"\x00\xffraw")))
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await.as_ref(), b"\x00\xffraw");
    }

    #[tokio::test]
    async fn test_unrecognized_mode_fails_closed() {
        for payload in [
            Payload::Json(json!("anything")),
            Payload::Bytes(Bytes::from_static(b"anything")),
        ] {
            let mut writer = ResponseWriter::new();
            writer.set_mode(ContentMode::Other("text/csv".to_string()));
            let err = writer.write_value(payload).unwrap_err();
            let WriteError::UnsupportedMode { response } = err else {
                panic!("expected UnsupportedMode");
            };
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body_bytes(response).await.as_ref(), b"server error");
        }
    }

    #[tokio::test]
    async fn test_raw_mode_rejects_non_byte_payload() {
        let mut writer = ResponseWriter::new();
        writer.set_mode(ContentMode::RawBytes);
        let err = writer.write_value(Payload::Json(json!(42))).unwrap_err();
        assert!(matches!(err, WriteError::UnsupportedMode { .. }));
    }

    #[tokio::test]
    async fn test_write_error_serializes_catalog_envelope() {
        let response = ResponseWriter::new().write_error(Some(ErrorKind::InvalidPath));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_bytes(response).await.as_ref(),
            br#"{"msg":"invalid file path","code":1}"#
        );
    }

    #[tokio::test]
    async fn test_write_error_absent_kind_reports_success() {
        let response = ResponseWriter::new().write_error(None);
        assert_eq!(
            body_bytes(response).await.as_ref(),
            br#"{"msg":"success","code":0}"#
        );
    }

    #[tokio::test]
    async fn test_write_file_buffers_entire_reader() {
        let mut reader: &[u8] = b"file contents here";
        let response = ResponseWriter::new().write_file(&mut reader).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await.as_ref(), b"file contents here");
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::other("disk gone")))
        }
    }

    #[tokio::test]
    async fn test_write_file_propagates_read_failure() {
        let err = ResponseWriter::new()
            .write_file(&mut FailingReader)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "disk gone");
    }
}
