//! Response-shaped projections of stored authors and books.

use crate::models::{Author, Book};
use serde::Serialize;
use utoipa::ToSchema;

/// An author together with lightweight projections of its books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorView {
    /// The author id
    #[schema(example = 42)]
    pub id: i64,
    /// The author name
    #[schema(example = "Stephen King")]
    pub name: String,
    /// Always present; empty when the author has no books.
    pub books: Vec<BookView>,
}

impl AuthorView {
    /// Joins an author with the books loaded for it. Books keep the order they are given in.
    pub fn assemble(author: Author, books: Vec<Book>) -> Self {
        Self {
            id: author.id().get(),
            name: author.name().to_string(),
            books: books.into_iter().map(BookView::from).collect(),
        }
    }
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        Self::assemble(author, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookView {
    /// The book title
    #[schema(example = "Carrie")]
    pub title: String,
    /// The number of pages
    #[schema(example = 550)]
    pub pages: i32,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self {
            title: book.title().to_string(),
            pages: book.pages().get(),
        }
    }
}
