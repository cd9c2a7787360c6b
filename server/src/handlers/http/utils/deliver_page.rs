use anyhow::{Result, anyhow};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Response, StatusCode, header};
use tracing::{debug, error};

use crate::handlers::http::ResponseBody;

pub fn full<T: Into<Bytes>>(chunk: T) -> ResponseBody {
    let bytes: Bytes = chunk.into();
    let full_body: Full<Bytes> = Full::new(bytes);
    full_body.boxed()
}

/// Delivers a plain-text response.
pub fn deliver_text<T: Into<Bytes>>(text: T, status: StatusCode) -> Result<Response<ResponseBody>> {
    let bytes: Bytes = text.into();

    debug!("Delivering text response, size: {} bytes", bytes.len());

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-store")
        .body(full(bytes))
        .map_err(|e: http::Error| {
            error!("Failed to build text response: {}", e);
            anyhow!("Failed to build text response: {}", e)
        })
}
