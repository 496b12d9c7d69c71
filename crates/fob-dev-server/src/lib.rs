//! # fob-dev-server
//!
//! axum integration for [`fob_dev_middleware`].
//!
//! [`serve_build_output`] is an axum middleware function. Mount it with
//! [`with_build_output`] in front of an existing router, or use [`router`]
//! for a server that only serves build output.
//!
//! ```rust,ignore
//! let middleware = Middleware::builder(config).attach(&compiler)?;
//! let app = fob_dev_server::router(middleware);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

mod content_type;
mod serve;

use axum::Router;
use fob_dev_middleware::Middleware;

pub use content_type::content_type_for;
pub use serve::{not_found, serve_build_output};

/// Layer [`serve_build_output`] over `router`.
///
/// Requests the build output can't answer reach the router's own routes.
pub fn with_build_output(router: Router, middleware: Middleware) -> Router {
    router.layer(axum::middleware::from_fn_with_state(
        middleware,
        serve_build_output,
    ))
}

/// Router serving only build output, answering 404 for everything else.
pub fn router(middleware: Middleware) -> Router {
    with_build_output(Router::new().fallback(not_found), middleware)
}
