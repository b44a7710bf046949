//! Static asset server with live reload via Server-Sent Events.
//!
//! Serves the statics directory, injects the live-reload client into HTML
//! pages and streams compile-cycle pushes to connected browsers.

use crate::dev::SharedState;
use crate::error::{CliError, Result};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    routing::get,
    Router,
};
use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub const SSE_PATH: &str = "/__stoke_sse__";
pub const CLIENT_SCRIPT_PATH: &str = "/__stoke_client__.js";

const CLIENT_SCRIPT: &str = include_str!("../../assets/dev/client.js");

/// HTML pages larger than this are served without the client script.
const MAX_INJECT_BYTES: usize = 16 * 1024 * 1024;

pub struct DevServer {
    state: SharedState,
}

impl DevServer {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Build the router: push endpoint, client script, then static files.
    ///
    /// Layers from the outside in: gzip, CORS, `.min` redirect, script injection.
    pub fn router(&self) -> Router {
        let statics = ServeDir::new(self.state.statics_dir()).append_index_html_on_directories(true);

        Router::new()
            .route(SSE_PATH, get(handle_sse))
            .route(CLIENT_SCRIPT_PATH, get(handle_client_script))
            .fallback_service(statics)
            .layer(middleware::map_response(inject_client_script))
            .layer(middleware::from_fn(redirect_min_assets))
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .with_state(self.state.clone())
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| CliError::Server(format!("Failed to read bound address: {}", e)))?;
        tracing::debug!(%addr, "dev server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }
}

async fn handle_sse(State(state): State<SharedState>) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (_, rx) = state.register_client();
    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
}

async fn handle_client_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        CLIENT_SCRIPT,
    )
}

/// `foo.min.js` and `foo.min.css` are served as their non-minified builds.
async fn redirect_min_assets(request: Request, next: Next) -> Response {
    match unminified_path(request.uri().path()) {
        Some(target) => {
            tracing::debug!(from = request.uri().path(), to = %target, "redirecting minified asset");
            (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
        }
        None => next.run(request).await,
    }
}

fn unminified_path(path: &str) -> Option<String> {
    [".js", ".css"].into_iter().find_map(|ext| {
        let stem = path.strip_suffix(ext)?.strip_suffix(".min")?;
        Some(format!("{}{}", stem, ext))
    })
}

async fn inject_client_script(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"));
    if !is_html || response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_INJECT_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "failed to buffer HTML response");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read page").into_response();
        }
    };

    let html = inject_script_tag(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Insert the client script tag before the last `</body>`, or append it.
fn inject_script_tag(html: &str) -> String {
    let script_tag = format!(r#"<script src="{}"></script>"#, CLIENT_SCRIPT_PATH);

    match html.rfind("</body>") {
        Some(pos) => {
            let mut result = String::with_capacity(html.len() + script_tag.len() + 4);
            result.push_str(&html[..pos]);
            result.push_str(&script_tag);
            result.push('\n');
            result.push_str(&html[pos..]);
            result
        }
        None => format!("{}\n{}", html, script_tag),
    }
}
