use crate::http::AppState;
use crate::models::{
    AttachBookError, AttachBookRequest, AuthorId, AuthorName, BookTitle, CreateAuthorError,
    CreateAuthorRequest, FindAuthorByNameError, FindAuthorByNameRequest, PageCount,
    ValidationError,
};
use crate::movies::{Movie, MovieLookupError, MovieTitle};
use crate::views::AuthorView;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<ApiResponse<T>>);

impl<T: Serialize> ApiSuccess<T> {
    pub const fn new(status: StatusCode, data: T) -> Self {
        Self(status, Json(ApiResponse::new(status, data)))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, self.1).into_response()
    }
}

/// Envelope shared by successful and failed responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    status_code: u16,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    const fn new(status: StatusCode, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ApiResponse::new(status, msg))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

fn internal_server_error(cause: &anyhow::Error) -> ApiError {
    tracing::error!(error = ?cause, "request failed");
    ApiError::InternalServerError("Internal server error".to_string())
}

impl From<CreateAuthorError> for ApiError {
    fn from(err: CreateAuthorError) -> Self {
        internal_server_error(&err.0)
    }
}

impl From<AttachBookError> for ApiError {
    fn from(err: AttachBookError) -> Self {
        match &err {
            AttachBookError::AuthorNotFound { .. } => Self::NotFound(err.to_string()),
            AttachBookError::ReferentialIntegrity { .. } => Self::Conflict(err.to_string()),
            AttachBookError::Other(cause) => internal_server_error(cause),
        }
    }
}

impl From<FindAuthorByNameError> for ApiError {
    fn from(err: FindAuthorByNameError) -> Self {
        internal_server_error(&err.0)
    }
}

impl From<MovieLookupError> for ApiError {
    fn from(err: MovieLookupError) -> Self {
        tracing::error!(error = ?err, "movie lookup failed");
        Self::BadGateway(err.to_string())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAuthorHttpRequest {
    /// The author name
    #[schema(example = "Stephen King")]
    name: Option<String>,
}

impl TryFrom<CreateAuthorHttpRequest> for CreateAuthorRequest {
    type Error = ValidationError;

    fn try_from(value: CreateAuthorHttpRequest) -> Result<Self, Self::Error> {
        let name = AuthorName::from_optional(value.name.as_deref())?;
        Ok(Self::new(name))
    }
}

#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = CreateAuthorHttpRequest,
    responses(
        (status = 201, description = "Author created, returned in `data`", body = AuthorView),
        (status = 400, description = "Blank or missing name"),
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    body: Result<Json<CreateAuthorHttpRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthorView>, ApiError> {
    let Json(body) = body?;
    let req = CreateAuthorRequest::try_from(body)?;
    state
        .author_service
        .create_author(&req)
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::new(StatusCode::CREATED, author))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttachBookHttpRequest {
    /// The book title
    #[schema(example = "Carrie")]
    title: Option<String>,
    /// The number of pages
    #[schema(example = 550, minimum = 1)]
    pages: i32,
}

impl AttachBookHttpRequest {
    fn into_request(self, author_id: AuthorId) -> Result<AttachBookRequest, ValidationError> {
        let title = BookTitle::new(self.title.as_deref().unwrap_or_default())?;
        let pages = PageCount::new(self.pages)?;
        Ok(AttachBookRequest::new(author_id, title, pages))
    }
}

#[utoipa::path(
    post,
    path = "/authors/{id}/books",
    tag = "authors",
    params(("id" = i64, Path, description = "The author id")),
    request_body = AttachBookHttpRequest,
    responses(
        (status = 204, description = "Book attached"),
        (status = 400, description = "Invalid body or author id"),
        (status = 404, description = "Author does not exist"),
        (status = 409, description = "Author was removed while attaching"),
    )
)]
pub async fn attach_book_to_author(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<AttachBookHttpRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let req = body.into_request(AuthorId::new(id))?;
    state
        .author_service
        .attach_book_to_author(&req)
        .await
        .map_err(ApiError::from)
        .map(|()| StatusCode::NO_CONTENT)
}

/// `username` travels as a query parameter to stay compatible with existing clients.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindAuthorByNameQuery {
    /// Exact, case-sensitive author name
    author: Option<String>,
    /// Caller checked against the access policy
    username: Option<String>,
}

#[utoipa::path(
    get,
    path = "/authors/by-name",
    tag = "authors",
    params(FindAuthorByNameQuery),
    responses(
        (status = 200, description = "Author with its books, returned in `data`", body = AuthorView),
        (status = 400, description = "Blank or missing author name"),
        (status = 401, description = "Caller is not allowed"),
        (status = 404, description = "No author with that name"),
    )
)]
pub async fn find_author_by_name(
    State(state): State<AppState>,
    query: Result<Query<FindAuthorByNameQuery>, QueryRejection>,
) -> Result<ApiSuccess<AuthorView>, ApiError> {
    let Query(query) = query?;
    if !state.access_policy.can_access(query.username.as_deref()) {
        return Err(ApiError::Unauthorized("Access denied".to_string()));
    }

    let name = AuthorName::from_optional(query.author.as_deref())?;
    let req = FindAuthorByNameRequest::new(name);
    match state.author_service.find_author_by_name(&req).await? {
        Some(author) => Ok(ApiSuccess::new(StatusCode::OK, author)),
        None => Err(ApiError::NotFound(format!(
            "Author with name \"{}\" does not exist",
            req.name()
        ))),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindMovieQuery {
    /// Free-text movie title
    title: Option<String>,
}

#[utoipa::path(
    get,
    path = "/movies/by-title",
    tag = "movies",
    params(FindMovieQuery),
    responses(
        (status = 200, description = "Matching movie, returned in `data`", body = Movie),
        (status = 400, description = "Blank or missing title"),
        (status = 404, description = "No matching movie"),
        (status = 502, description = "Movie service failed"),
    )
)]
pub async fn find_movie_by_title(
    State(state): State<AppState>,
    query: Result<Query<FindMovieQuery>, QueryRejection>,
) -> Result<ApiSuccess<Movie>, ApiError> {
    let Query(query) = query?;
    let title = MovieTitle::new(query.title.as_deref().unwrap_or_default())?;
    match state.movie_lookup.find_movie_by_title(&title).await? {
        Some(movie) => Ok(ApiSuccess::new(StatusCode::OK, movie)),
        None => Err(ApiError::NotFound(format!(
            "Movie with title \"{title}\" does not exist"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_name_is_a_validation_error() {
        let body: CreateAuthorHttpRequest = serde_json::from_str(r#"{"name":null}"#).unwrap();

        let err = CreateAuthorRequest::try_from(body).unwrap_err();

        assert_eq!(err, ValidationError::BlankAuthorName);
    }

    #[test]
    fn zero_pages_is_a_validation_error() {
        let body: AttachBookHttpRequest =
            serde_json::from_str(r#"{"title":"Carrie","pages":0}"#).unwrap();

        let err = body.into_request(AuthorId::new(1)).unwrap_err();

        assert_eq!(err, ValidationError::PageCountTooSmall { pages: 0 });
    }

    #[test]
    fn attach_errors_map_to_distinct_statuses() {
        let id = AuthorId::new(3);

        let not_found = ApiError::from(AttachBookError::AuthorNotFound { id });
        let conflict = ApiError::from(AttachBookError::ReferentialIntegrity { author_id: id });
        let other = ApiError::from(AttachBookError::Other(anyhow::anyhow!("disk full")));

        assert!(matches!(not_found, ApiError::NotFound(_)));
        assert!(matches!(conflict, ApiError::Conflict(_)));
        assert_eq!(
            other,
            ApiError::InternalServerError("Internal server error".to_string())
        );
    }

    #[test]
    fn error_response_uses_envelope_status() {
        let response = ApiError::Unauthorized("Access denied".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
