mod api;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
    Router,
};
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};

use crate::storage::UploadDir;

/// Room for the multipart framing around a maximum-size file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    uploads: Arc<UploadDir>,
    slots: Arc<Semaphore>,
    max_file_size: u64,
    file_id_length: usize,
}

impl AppState {
    pub fn new(
        uploads: Arc<UploadDir>,
        max_file_size: u64,
        max_concurrent_tasks: usize,
        file_id_length: usize,
    ) -> Self {
        Self {
            uploads,
            // a zero limit would park every upload forever
            slots: Arc::new(Semaphore::new(max_concurrent_tasks.max(1))),
            max_file_size,
            file_id_length,
        }
    }
}

pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(error) => {
                tracing::warn!(%error, %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let body_limit = usize::try_from(state.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    api::create_router()
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum::middleware::from_fn(server_header_middleware))
}

async fn server_header_middleware<B>(req: Request<B>, next: Next<B>) -> Response {
    let mut resp = next.run(req).await;
    if let Ok(server) = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")).parse()
    {
        resp.headers_mut().insert(header::SERVER, server);
    }
    resp
}
