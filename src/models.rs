use chrono::NaiveDateTime;
use thiserror::Error;

/// Rejection raised while building a request from raw input, before any store interaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Author name must not be blank")]
    BlankAuthorName,
    #[error("Book title must not be blank")]
    BlankBookTitle,
    #[error("Book must have at least 1 page, got {pages}")]
    PageCountTooSmall { pages: i32 },
    #[error("Movie title must not be blank")]
    BlankMovieTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthorId(i64);

impl AuthorId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AuthorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of an author. Stored exactly as given so exact-match lookup finds it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            Err(ValidationError::BlankAuthorName)
        } else {
            Ok(Self(raw.into()))
        }
    }

    /// Absent input is treated the same as blank input.
    pub fn from_optional(raw: Option<&str>) -> Result<Self, ValidationError> {
        Self::new(raw.unwrap_or_default())
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            Err(ValidationError::BlankBookTitle)
        } else {
            Ok(Self(raw.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCount(i32);

impl PageCount {
    pub const MIN: i32 = 1;

    pub const fn new(raw: i32) -> Result<Self, ValidationError> {
        if raw < Self::MIN {
            Err(ValidationError::PageCountTooSmall { pages: raw })
        } else {
            Ok(Self(raw))
        }
    }

    pub const fn new_unchecked(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Author {
    id: AuthorId,
    name: AuthorName,
    date_created: NaiveDateTime,
}

impl Author {
    pub const fn new(id: AuthorId, name: AuthorName, date_created: NaiveDateTime) -> Self {
        Self {
            id,
            name,
            date_created,
        }
    }

    pub const fn id(&self) -> AuthorId {
        self.id
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }

    pub const fn date_created(&self) -> NaiveDateTime {
        self.date_created
    }
}

/// A stored book. The owning author is referenced by id only.
#[derive(Debug, Clone)]
pub struct Book {
    id: i64,
    title: BookTitle,
    pages: PageCount,
    date_created: NaiveDateTime,
    author_id: AuthorId,
}

impl Book {
    pub const fn new(
        id: i64,
        title: BookTitle,
        pages: PageCount,
        date_created: NaiveDateTime,
        author_id: AuthorId,
    ) -> Self {
        Self {
            id,
            title,
            pages,
            date_created,
            author_id,
        }
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn pages(&self) -> PageCount {
        self.pages
    }

    pub const fn date_created(&self) -> NaiveDateTime {
        self.date_created
    }

    pub const fn author_id(&self) -> AuthorId {
        self.author_id
    }
}

#[derive(Debug)]
pub struct CreateAuthorRequest {
    name: AuthorName,
}

impl CreateAuthorRequest {
    pub const fn new(name: AuthorName) -> Self {
        Self { name }
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct CreateAuthorError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct AttachBookRequest {
    author_id: AuthorId,
    title: BookTitle,
    pages: PageCount,
}

impl AttachBookRequest {
    pub const fn new(author_id: AuthorId, title: BookTitle, pages: PageCount) -> Self {
        Self {
            author_id,
            title,
            pages,
        }
    }

    pub const fn author_id(&self) -> AuthorId {
        self.author_id
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn pages(&self) -> PageCount {
        self.pages
    }
}

#[derive(Error, Debug)]
pub enum AttachBookError {
    #[error("Author with id \"{id}\" does not exist")]
    AuthorNotFound { id: AuthorId },
    #[error("Book references author with id \"{author_id}\" which no longer exists")]
    ReferentialIntegrity { author_id: AuthorId },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct FindAuthorRequest {
    id: AuthorId,
}

impl FindAuthorRequest {
    pub const fn new(id: AuthorId) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> AuthorId {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: AuthorId },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct FindAuthorByNameRequest {
    name: AuthorName,
}

impl FindAuthorByNameRequest {
    pub const fn new(name: AuthorName) -> Self {
        Self { name }
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAuthorByNameError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindBooksError(#[from] pub anyhow::Error);

impl From<FindBooksError> for FindAuthorByNameError {
    fn from(err: FindBooksError) -> Self {
        Self(err.0)
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllAuthorsError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
#[error(transparent)]
pub struct DeleteAllError(#[from] pub anyhow::Error);
