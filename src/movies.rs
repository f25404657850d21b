//! Pass-through lookup against the OMDb movie-metadata API.
//!
//! Only `Title` and `Year` are read from the upstream response. Every lookup is a
//! single request; failures are reported, never retried.

use crate::models::ValidationError;
use anyhow::{Context, anyhow, bail};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{StatusCode, Uri};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieTitle(String);

impl MovieTitle {
    /// Rejects blank titles. Anything else is passed upstream exactly as given.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            Err(ValidationError::BlankMovieTitle)
        } else {
            Ok(Self(raw.into()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MovieTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Movie {
    /// The movie title
    #[schema(example = "Carrie")]
    pub title: String,
    /// The movie year
    #[schema(example = "1977")]
    pub year: String,
}

#[derive(Error, Debug)]
pub enum MovieLookupError {
    #[error("Movie service request failed")]
    Transport(#[source] anyhow::Error),
    #[error("Movie service responded with status {0}")]
    Status(StatusCode),
    #[error("Movie service returned malformed JSON")]
    Malformed(#[source] serde_json::Error),
    #[error("Movie service response is missing the {0} field")]
    MissingField(&'static str),
}

#[async_trait]
pub trait MovieLookup: Send + Sync + 'static {
    /// `Ok(None)` when the upstream has no match for the title.
    async fn find_movie_by_title(
        &self,
        title: &MovieTitle,
    ) -> Result<Option<Movie>, MovieLookupError>;
}

#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client<HttpConnector, Empty<Bytes>>,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    /// The connector speaks plain HTTP only, so `https` base URLs are rejected up front.
    pub fn new(base_url: &str, api_key: Option<&str>) -> anyhow::Result<Self> {
        let uri: Uri = base_url
            .parse()
            .with_context(|| format!("Invalid movie service URL {base_url}"))?;
        if uri.scheme_str() != Some("http") {
            bail!("Movie service URL {base_url} must use the http scheme");
        }

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.map(Into::into),
        })
    }

    fn request_uri(&self, title: &MovieTitle) -> Result<Uri, MovieLookupError> {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("t", title.as_str());
        if let Some(api_key) = &self.api_key {
            query.append_pair("apikey", api_key);
        }

        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{}", self.base_url, query.finish())
            .parse::<Uri>()
            .map_err(|err| MovieLookupError::Transport(anyhow!(err)))
    }
}

#[async_trait]
impl MovieLookup for OmdbClient {
    async fn find_movie_by_title(
        &self,
        title: &MovieTitle,
    ) -> Result<Option<Movie>, MovieLookupError> {
        let uri = self.request_uri(title)?;
        tracing::debug!(%title, "looking up movie");

        let res = self
            .client
            .get(uri)
            .await
            .map_err(|err| MovieLookupError::Transport(anyhow!(err)))?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MovieLookupError::Status(status));
        }

        let body = res
            .into_body()
            .collect()
            .await
            .map_err(|err| MovieLookupError::Transport(anyhow!(err)))?
            .to_bytes();

        parse_movie(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Response")]
    response: Option<String>,
}

fn parse_movie(body: &[u8]) -> Result<Option<Movie>, MovieLookupError> {
    let res: OmdbResponse = serde_json::from_slice(body).map_err(MovieLookupError::Malformed)?;
    if res.response.as_deref() == Some("False") {
        return Ok(None);
    }

    let title = res.title.ok_or(MovieLookupError::MissingField("Title"))?;
    let year = res.year.ok_or(MovieLookupError::MissingField("Year"))?;
    Ok(Some(Movie { title, year }))
}
