//! Serving build output through axum.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::routing::post;
use fob_dev_config::MiddlewareConfig;
use fob_dev_middleware::test_utils::{EventLog, RecordingReporter, TestCompiler};
use fob_dev_middleware::{
    BuildResult, FileMetadata, MemoryFileSystem, Middleware, OutputFileSystem, RuntimeError,
    RuntimeResult, StaticCompilation,
};
use fob_dev_server::{router, with_build_output};
use tower::ServiceExt;

fn build() -> BuildResult {
    BuildResult::single(
        StaticCompilation::new("/build")
            .with_name("web")
            .with_public_path("/assets/"),
    )
}

fn fixture() -> Arc<MemoryFileSystem> {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.write_file("/build/app.js", "console.log(1)");
    fs.write_file("/build/index.html", "<!doctype html>");
    fs
}

fn attach(config: MiddlewareConfig, fs: Arc<dyn OutputFileSystem>) -> (TestCompiler, Middleware) {
    let compiler = TestCompiler::new();
    let middleware = Middleware::builder(config)
        .file_system(fs)
        .reporter(RecordingReporter::new(EventLog::new()))
        .attach(&compiler)
        .unwrap();
    (compiler, middleware)
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_serves_file_with_headers() {
    let mut config = MiddlewareConfig::default();
    config
        .headers
        .insert("X-Served-By".to_string(), "fob".to_string());
    config
        .headers
        .insert("X-Broken".to_string(), "line\nbreak".to_string());

    let (compiler, middleware) = attach(config, fixture());
    compiler.finish(build());

    let response = router(middleware)
        .oneshot(request(Method::GET, "/assets/app.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/javascript; charset=utf-8"
    );
    assert_eq!(headers[header::CONTENT_LENGTH], "14");
    assert_eq!(headers["x-served-by"], "fob");
    assert!(!headers.contains_key("x-broken"));
    assert_eq!(body_string(response).await, "console.log(1)");
}

#[tokio::test]
async fn test_head_has_length_but_no_body() {
    let (compiler, middleware) = attach(MiddlewareConfig::default(), fixture());
    compiler.finish(build());

    let response = router(middleware)
        .oneshot(request(Method::HEAD, "/assets/app.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "14");
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_directory_index_is_html() {
    let (compiler, middleware) = attach(MiddlewareConfig::default(), fixture());
    compiler.finish(build());

    let response = router(middleware)
        .oneshot(request(Method::GET, "/assets/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(body_string(response).await, "<!doctype html>");
}

#[tokio::test]
async fn test_unresolved_request_falls_through() {
    let (compiler, middleware) = attach(MiddlewareConfig::default(), fixture());
    compiler.finish(build());

    let response = router(middleware)
        .oneshot(request(Method::GET, "/assets/missing.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unlisted_method_reaches_inner_router() {
    let (compiler, middleware) = attach(MiddlewareConfig::default(), fixture());
    compiler.finish(build());

    let app = with_build_output(
        Router::new().route("/assets/app.js", post(|| async { "posted" })),
        middleware,
    );
    let response = app
        .oneshot(request(Method::POST, "/assets/app.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "posted");
}

#[tokio::test]
async fn test_request_during_build_waits() {
    let (compiler, middleware) = attach(MiddlewareConfig::default(), fixture());
    let app = router(middleware);

    let pending = tokio::spawn(app.oneshot(request(Method::GET, "/assets/app.js")));
    tokio::task::yield_now().await;
    // Nothing can be served before the first build completes
    assert!(!pending.is_finished());

    compiler.finish(build());
    let response = pending.await.unwrap().unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "console.log(1)");
}

/// Every `.js` path looks like a file but can't be read.
#[derive(Debug)]
struct UnreadableFileSystem;

impl OutputFileSystem for UnreadableFileSystem {
    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        if path.extension().is_some_and(|ext| ext == "js") {
            Ok(FileMetadata::file(1))
        } else {
            Err(RuntimeError::FileNotFound(path.to_path_buf()))
        }
    }

    fn read_file(&self, _path: &Path) -> RuntimeResult<Vec<u8>> {
        Err(RuntimeError::Io("device unplugged".to_string()))
    }

    fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<String>> {
        Err(RuntimeError::NotADirectory(path.to_path_buf()))
    }
}

#[tokio::test]
async fn test_read_failure_is_server_error() {
    let (compiler, middleware) = attach(MiddlewareConfig::default(), Arc::new(UnreadableFileSystem));
    compiler.finish(build());

    let response = router(middleware)
        .oneshot(request(Method::GET, "/assets/app.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
