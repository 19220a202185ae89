//! Request handling for the file retrieval endpoint.
//!
//! One route is served: `GET /u/{file}`. The handler resolves the route
//! variable under the storage root, reads the file, and streams it back,
//! or emits a catalog error envelope.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::fs::File;

use crate::config::ServerContext;
use crate::error::ErrorKind;
use crate::logger;
use crate::resolve;
use crate::response::{self, ResponseWriter};

const ROUTE_PREFIX: &str = "/u/";

/// Main entry point for HTTP request handling.
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    ctx: Arc<ServerContext>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    Ok(dispatch(&method, &path, &ctx).await)
}

async fn dispatch(method: &Method, path: &str, ctx: &ServerContext) -> Response<Full<Bytes>> {
    if method != Method::GET {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return response::build_405_response();
    }

    match path.strip_prefix(ROUTE_PREFIX) {
        // The route variable names a single path segment; a raw slash means
        // the route did not match.
        Some(name) if !name.contains('/') => serve_clip(ctx, name).await,
        _ => response::build_404_response(),
    }
}

/// Serve one file request end to end.
///
/// Failure states each terminate the request with an error envelope: an
/// invalid name never reaches the filesystem, and open or read failures are
/// logged in full but surface only as a generic internal error.
async fn serve_clip(ctx: &ServerContext, raw_name: &str) -> Response<Full<Bytes>> {
    let writer = ResponseWriter::new();

    let name = match percent_decode_str(raw_name).decode_utf8() {
        Ok(name) => name,
        Err(_) => return writer.write_error(Some(ErrorKind::InvalidPath)),
    };

    let filename = match resolve::resolve(&ctx.source_root, &name) {
        Ok(path) => path,
        Err(kind) => return writer.write_error(Some(kind)),
    };

    // The handle is scoped to this request and closed on every exit path.
    let mut file = match File::open(&filename).await {
        Ok(file) => file,
        Err(err) => {
            logger::log_error(&format!("open {}: {err}", filename.display()));
            return writer.write_error(Some(ErrorKind::InternalError));
        }
    };

    match writer.write_file(&mut file).await {
        Ok(resp) => {
            logger::log_served_file(&filename);
            resp
        }
        Err(err) => {
            // The body is fully buffered before any status is sent, so a
            // read failure can still produce a proper error response.
            logger::log_error(&format!("read {}: {err}", filename.display()));
            ResponseWriter::new().write_error(Some(ErrorKind::InternalError))
        }
    }
}
