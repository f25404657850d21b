#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bookshelf::access::AccessPolicy;
use bookshelf::database::{DefaultAuthorRepository, establish_pool};
use bookshelf::http::{AppState, router};
use bookshelf::movies::{Movie, MovieLookup, MovieLookupError, MovieTitle};
use bookshelf::repositories::{AuthorRepository, UnitOfWork};
use bookshelf::services::DefaultAuthorService;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Lets every caller through, so tests that are not about access control stay focused.
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn can_access(&self, _username: Option<&str>) -> bool {
        true
    }
}

/// Movie lookup that never finds anything.
pub struct NoMovies;

#[async_trait]
impl MovieLookup for NoMovies {
    async fn find_movie_by_title(
        &self,
        _title: &MovieTitle,
    ) -> Result<Option<Movie>, MovieLookupError> {
        Ok(None)
    }
}

pub async fn repository() -> DefaultAuthorRepository {
    let pool = establish_pool("sqlite::memory:").await.unwrap();
    DefaultAuthorRepository::new(pool)
}

/// Router backed by a fresh in-memory database, plus the repository for direct inspection.
pub async fn app(policy: impl AccessPolicy) -> (Router, DefaultAuthorRepository) {
    let repo = repository().await;
    let state = AppState::new(DefaultAuthorService::new(repo.clone()), policy, NoMovies);
    (router(state), repo)
}

pub async fn save_author(repo: &DefaultAuthorRepository, name: &str) -> i64 {
    let mut work = repo.begin().await.unwrap();
    let author = work
        .save_author(&bookshelf::models::AuthorName::new(name).unwrap())
        .await
        .unwrap();
    work.commit().await.unwrap();
    author.id().get()
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
