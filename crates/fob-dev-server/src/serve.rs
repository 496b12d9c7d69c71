//! Request handling for build output.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use fob_dev_middleware::Middleware;

use crate::content_type::content_type_for;

/// axum middleware that serves files from the current build.
///
/// Requests with a configured method wait for a valid build, then resolve
/// against the build output. Anything that doesn't resolve to a file is
/// passed on to `next`.
pub async fn serve_build_output(
    State(middleware): State<Middleware>,
    request: Request,
    next: Next,
) -> Response {
    if !middleware.config().allows_method(request.method().as_str()) {
        return next.run(request).await;
    }

    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let result = match middleware.wait_until_valid(Some(&url)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Error waiting for build {}: {}", url, e);
            return internal_error("Build context unavailable");
        }
    };

    let Some(filename) = middleware.resolve_with(&result, &url) else {
        return next.run(request).await;
    };

    let head = request.method() == Method::HEAD;
    match read(&middleware, filename.clone()).await {
        Ok(content) => file_response(&middleware, &filename, content, head),
        Err(message) => {
            tracing::error!("Error reading {}: {}", filename.display(), message);
            internal_error("Failed to read build output")
        }
    }
}

async fn read(middleware: &Middleware, filename: PathBuf) -> Result<Vec<u8>, String> {
    let fs = Arc::clone(middleware.file_system());
    tokio::task::spawn_blocking(move || fs.read_file(&filename))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

fn file_response(
    middleware: &Middleware,
    filename: &std::path::Path,
    content: Vec<u8>,
    head: bool,
) -> Response {
    let length = content.len();
    let body = if head { Body::empty() } else { Body::from(content) };

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(filename)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    for (name, value) in &middleware.config().headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid response header {}", name),
        }
    }

    response
}

fn internal_error(message: &'static str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain")],
        message,
    )
        .into_response()
}

/// Plain 404 used as the fallback of [`router`](crate::router).
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not found",
    )
        .into_response()
}
