use crate::models::{
    AttachBookError, AttachBookRequest, Author, AuthorId, AuthorName, Book, CreateAuthorError,
    DeleteAllError, FindAllAuthorsError, FindAuthorByNameError, FindAuthorError,
    FindAuthorRequest, FindBooksError,
};
use async_trait::async_trait;

#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    type Work: UnitOfWork;

    /// Opens a unit of work. Dropping it without calling [`UnitOfWork::commit`] rolls it back.
    async fn begin(&self) -> anyhow::Result<Self::Work>;

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError>;

    async fn delete_all(&self) -> Result<(), DeleteAllError>;
}

/// Store operations scoped to a single transaction.
#[async_trait]
pub trait UnitOfWork: Send + Sized {
    async fn save_author(&mut self, name: &AuthorName) -> Result<Author, CreateAuthorError>;

    /// Fails with [`AttachBookError::ReferentialIntegrity`] when the author row is missing.
    async fn save_book(&mut self, req: &AttachBookRequest) -> Result<Book, AttachBookError>;

    async fn find_author(&mut self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError>;

    /// Returns the earliest created author with exactly this name.
    async fn find_author_by_name(
        &mut self,
        name: &AuthorName,
    ) -> Result<Option<Author>, FindAuthorByNameError>;

    /// Books in insertion order.
    async fn find_books_by_author(
        &mut self,
        author_id: AuthorId,
    ) -> Result<Vec<Book>, FindBooksError>;

    async fn commit(self) -> anyhow::Result<()>;
}
