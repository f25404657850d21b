pub mod handler;

use crate::access::AccessPolicy;
use crate::movies::{Movie, MovieLookup};
use crate::services::AuthorService;
use crate::views::{AuthorView, BookView};
use anyhow::Context;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Collaborators shared by every request. Each one is swappable at construction.
#[derive(Clone)]
pub struct AppState {
    author_service: Arc<dyn AuthorService>,
    access_policy: Arc<dyn AccessPolicy>,
    movie_lookup: Arc<dyn MovieLookup>,
}

impl AppState {
    pub fn new(
        author_service: impl AuthorService,
        access_policy: impl AccessPolicy,
        movie_lookup: impl MovieLookup,
    ) -> Self {
        Self {
            author_service: Arc::new(author_service),
            access_policy: Arc::new(access_policy),
            movie_lookup: Arc::new(movie_lookup),
        }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new(state: AppState, config: HttpServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self {
            router: router(state),
            listener,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "listening");
        axum::serve(self.listener, self.router)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .route(OPENAPI_PATH, get(openapi))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/authors", post(handler::create_author))
        .route("/authors/by-name", get(handler::find_author_by_name))
        .route("/authors/{id}/books", post(handler::attach_book_to_author))
        .route("/movies/by-title", get(handler::find_movie_by_title))
}

pub const OPENAPI_PATH: &str = "/swagger/demo-0.1.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "demo", version = "0.1"),
    paths(
        handler::create_author,
        handler::attach_book_to_author,
        handler::find_author_by_name,
        handler::find_movie_by_title,
    ),
    components(schemas(
        AuthorView,
        BookView,
        Movie,
        handler::CreateAuthorHttpRequest,
        handler::AttachBookHttpRequest,
    )),
    tags(
        (name = "authors", description = "Authors and their books"),
        (name = "movies", description = "Movie lookup"),
    )
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
