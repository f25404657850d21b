use crate::models::{
    AttachBookError, AttachBookRequest, CreateAuthorError, CreateAuthorRequest,
    FindAuthorByNameError, FindAuthorByNameRequest, FindAuthorError, FindAuthorRequest,
};
use crate::repositories::{AuthorRepository, UnitOfWork};
use crate::views::AuthorView;
use async_trait::async_trait;

/// Author/book operations. Each call runs in its own unit of work.
#[async_trait]
pub trait AuthorService: Send + Sync + 'static {
    async fn create_author(
        &self,
        req: &CreateAuthorRequest,
    ) -> Result<AuthorView, CreateAuthorError>;

    async fn attach_book_to_author(&self, req: &AttachBookRequest) -> Result<(), AttachBookError>;

    /// `Ok(None)` when no author has exactly this name.
    async fn find_author_by_name(
        &self,
        req: &FindAuthorByNameRequest,
    ) -> Result<Option<AuthorView>, FindAuthorByNameError>;
}

#[derive(Debug, Clone)]
pub struct DefaultAuthorService<R> {
    repo: R,
}

impl<R: AuthorRepository> DefaultAuthorService<R> {
    pub const fn new(repo: R) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: AuthorRepository> AuthorService for DefaultAuthorService<R> {
    #[tracing::instrument(skip(self))]
    async fn create_author(
        &self,
        req: &CreateAuthorRequest,
    ) -> Result<AuthorView, CreateAuthorError> {
        let mut work = self.repo.begin().await?;
        let author = work.save_author(req.name()).await?;
        work.commit().await?;

        tracing::debug!(id = %author.id(), "author created");
        Ok(AuthorView::from(author))
    }

    #[tracing::instrument(skip(self))]
    async fn attach_book_to_author(&self, req: &AttachBookRequest) -> Result<(), AttachBookError> {
        let mut work = self.repo.begin().await?;

        let author = work
            .find_author(&FindAuthorRequest::new(req.author_id()))
            .await
            .map_err(|err| match err {
                FindAuthorError::NotFound { id } => AttachBookError::AuthorNotFound { id },
                FindAuthorError::Other(err) => AttachBookError::Other(err),
            })?;
        let book = work.save_book(req).await?;
        work.commit().await?;

        tracing::debug!(book_id = book.id(), author_id = %author.id(), "book attached");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_author_by_name(
        &self,
        req: &FindAuthorByNameRequest,
    ) -> Result<Option<AuthorView>, FindAuthorByNameError> {
        let mut work = self.repo.begin().await?;

        let Some(author) = work.find_author_by_name(req.name()).await? else {
            return Ok(None);
        };
        let books = work.find_books_by_author(author.id()).await?;
        work.commit().await?;

        Ok(Some(AuthorView::assemble(author, books)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DefaultAuthorRepository, establish_pool};
    use crate::models::{AuthorId, AuthorName, BookTitle, PageCount};
    use crate::views::BookView;

    async fn service() -> (
        DefaultAuthorService<DefaultAuthorRepository>,
        DefaultAuthorRepository,
    ) {
        let pool = establish_pool("sqlite::memory:").await.unwrap();
        let repo = DefaultAuthorRepository::new(pool);
        (DefaultAuthorService::new(repo.clone()), repo)
    }

    async fn create(service: &impl AuthorService, name: &str) -> AuthorView {
        let req = CreateAuthorRequest::new(AuthorName::new(name).unwrap());
        service.create_author(&req).await.unwrap()
    }

    fn attach(author_id: i64, title: &str, pages: i32) -> AttachBookRequest {
        AttachBookRequest::new(
            AuthorId::new(author_id),
            BookTitle::new(title).unwrap(),
            PageCount::new(pages).unwrap(),
        )
    }

    fn by_name(name: &str) -> FindAuthorByNameRequest {
        FindAuthorByNameRequest::new(AuthorName::new(name).unwrap())
    }

    #[tokio::test]
    async fn create_author_returns_view_with_id_and_no_books() {
        let (service, _) = service().await;

        let author = create(&service, "Stephen King").await;

        assert!(author.id > 0);
        assert_eq!(author.name, "Stephen King");
        assert!(author.books.is_empty());
    }

    #[tokio::test]
    async fn attach_book_to_existing_author() {
        let (service, _) = service().await;
        let author = create(&service, "author name").await;

        service
            .attach_book_to_author(&attach(author.id, "book title", 100))
            .await
            .unwrap();

        let found = service
            .find_author_by_name(&by_name("author name"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            found.books,
            vec![BookView {
                title: "book title".into(),
                pages: 100
            }]
        );
    }

    #[tokio::test]
    async fn attach_book_accepts_single_page() {
        let (service, _) = service().await;
        let author = create(&service, "Stephen King").await;

        let result = service
            .attach_book_to_author(&attach(author.id, "Pamphlet", 1))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn attach_book_to_missing_author_writes_nothing() {
        let (service, repo) = service().await;

        let err = service
            .attach_book_to_author(&attach(404, "t", 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AttachBookError::AuthorNotFound { id } if id == AuthorId::new(404)
        ));
        let mut work = repo.begin().await.unwrap();
        let books = work.find_books_by_author(AuthorId::new(404)).await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn find_author_by_name_assembles_all_books() {
        let (service, _) = service().await;
        let author = create(&service, "X").await;
        for (title, pages) in [("book1", 10), ("book2", 20), ("book3", 30)] {
            service
                .attach_book_to_author(&attach(author.id, title, pages))
                .await
                .unwrap();
        }

        let found = service
            .find_author_by_name(&by_name("X"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, author.id);
        assert_eq!(found.books.len(), 3);
        let books: Vec<_> = found
            .books
            .iter()
            .map(|b| (b.title.as_str(), b.pages))
            .collect();
        assert_eq!(books, [("book1", 10), ("book2", 20), ("book3", 30)]);
    }

    #[tokio::test]
    async fn find_author_by_unknown_name_is_absent() {
        let (service, _) = service().await;
        create(&service, "Stephen King").await;

        let found = service
            .find_author_by_name(&by_name("no-such-name"))
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_names_resolve_to_earliest_author() {
        let (service, repo) = service().await;
        let first = create(&service, "Twin").await;
        create(&service, "Twin").await;

        let found = service
            .find_author_by_name(&by_name("Twin"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, first.id);
        assert_eq!(repo.find_all_authors().await.unwrap().len(), 2);
    }
}
