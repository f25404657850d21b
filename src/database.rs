use crate::models::{
    AttachBookError, AttachBookRequest, Author, AuthorId, AuthorName, Book, BookTitle,
    CreateAuthorError, DeleteAllError, FindAllAuthorsError, FindAuthorByNameError,
    FindAuthorError, FindAuthorRequest, FindBooksError, PageCount,
};
use crate::repositories::{AuthorRepository, UnitOfWork};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens the pool and brings the schema up to date.
///
/// In-memory databases vanish with their last connection, so they get a single connection
/// that is never recycled.
pub async fn establish_pool(path: &str) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(path)
        .with_context(|| format!("Invalid database path {path}"))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool_opts = if is_in_memory(path) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new()
    };
    let pool = pool_opts
        .connect_with(opts)
        .await
        .with_context(|| format!("Failed to open database at {path}"))?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(path, "database ready");
    Ok(pool)
}

fn is_in_memory(path: &str) -> bool {
    path.contains(":memory:") || path.contains("mode=memory")
}

#[derive(Debug, Clone)]
pub struct DefaultAuthorRepository {
    pool: SqlitePool,
}

impl DefaultAuthorRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Author {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let name: &str = row.try_get("name")?;
        let date_created = row.try_get("date_created")?;

        let name = AuthorName::new_unchecked(name);
        Ok(Self::new(AuthorId::new(id), name, date_created))
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let title: &str = row.try_get("title")?;
        let pages = row.try_get("pages")?;
        let date_created = row.try_get("date_created")?;
        let author_id = row.try_get("author_id")?;

        let title = BookTitle::new_unchecked(title);
        let pages = PageCount::new_unchecked(pages);
        Ok(Self::new(
            id,
            title,
            pages,
            date_created,
            AuthorId::new(author_id),
        ))
    }
}

#[async_trait]
impl AuthorRepository for DefaultAuthorRepository {
    type Work = SqliteUnitOfWork;

    async fn begin(&self) -> anyhow::Result<SqliteUnitOfWork> {
        let tx = begin_immediate(&self.pool).await?;
        Ok(SqliteUnitOfWork { tx })
    }

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError> {
        let authors = sqlx::query_as("SELECT id, name, date_created FROM author ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to retrieve all authors");
                FindAllAuthorsError(err)
            })?;

        Ok(authors)
    }

    async fn delete_all(&self) -> Result<(), DeleteAllError> {
        let mut tx = begin_immediate(&self.pool).await?;

        sqlx::query("DELETE FROM book")
            .execute(&mut *tx)
            .await
            .context("Failed to delete all books")?;
        sqlx::query("DELETE FROM author")
            .execute(&mut *tx)
            .await
            .context("Failed to delete all authors")?;

        tx.commit()
            .await
            .context("Failed to commit bulk delete")?;
        Ok(())
    }
}

/// A SQLite transaction. Rolled back on drop unless committed.
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, sqlx::Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn save_author(&mut self, name: &AuthorName) -> Result<Author, CreateAuthorError> {
        let author = sqlx::query_as("INSERT INTO author (name) VALUES (?) RETURNING *")
            .bind(name.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|err| {
                anyhow!(err).context(format!(r#"Failed to create author with name "{name}""#))
            })?;

        Ok(author)
    }

    async fn save_book(&mut self, req: &AttachBookRequest) -> Result<Book, AttachBookError> {
        let book = sqlx::query_as(
            "INSERT INTO book (title, pages, author_id) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(req.title().as_str())
        .bind(req.pages().get())
        .bind(req.author_id().get())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                AttachBookError::ReferentialIntegrity {
                    author_id: req.author_id(),
                }
            } else {
                let err = anyhow!(err).context(format!(
                    r#"Failed to create book "{}" for author with id "{}""#,
                    req.title(),
                    req.author_id()
                ));
                AttachBookError::Other(err)
            }
        })?;

        Ok(book)
    }

    async fn find_author(&mut self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        let author = sqlx::query_as("SELECT id, name, date_created FROM author WHERE id = ?")
            .bind(req.id().get())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|err| {
                if matches!(err, sqlx::Error::RowNotFound) {
                    FindAuthorError::NotFound { id: req.id() }
                } else {
                    let err = anyhow!(err).context(format!(
                        r#"Failed to retrieve author with id "{}""#,
                        req.id()
                    ));
                    FindAuthorError::Other(err)
                }
            })?;

        Ok(author)
    }

    async fn find_author_by_name(
        &mut self,
        name: &AuthorName,
    ) -> Result<Option<Author>, FindAuthorByNameError> {
        let author = sqlx::query_as(
            "SELECT id, name, date_created FROM author WHERE name = ? ORDER BY id LIMIT 1",
        )
        .bind(name.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|err| {
            anyhow!(err).context(format!(r#"Failed to retrieve author with name "{name}""#))
        })?;

        Ok(author)
    }

    async fn find_books_by_author(
        &mut self,
        author_id: AuthorId,
    ) -> Result<Vec<Book>, FindBooksError> {
        let books = sqlx::query_as(
            "SELECT id, title, pages, date_created, author_id FROM book \
             WHERE author_id = ? ORDER BY id",
        )
        .bind(author_id.get())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|err| {
            anyhow!(err).context(format!(
                r#"Failed to retrieve books of author with id "{author_id}""#
            ))
        })?;

        Ok(books)
    }

    async fn commit(self) -> anyhow::Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit transaction")
    }
}

/// Takes the write lock up front, so reads made inside the transaction cannot go stale before
/// its writes. A concurrent writer waits for the commit instead of invalidating the snapshot.
async fn begin_immediate(
    pool: &SqlitePool,
) -> anyhow::Result<Transaction<'static, sqlx::Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .context("Failed to begin transaction")
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.is_foreign_key_violation();
    }

    false
}
