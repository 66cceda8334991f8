//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result};
use async_trait::async_trait;
use shelf_core::ports::BookStore;
use shelf_core::{Book, Review, ShelfError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;

pub struct Database {
    pool: Arc<SqlitePool>,
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    book_id: i64,
    reviewer: String,
    comment: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            reviews: Vec::new(),
        }
    }
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            reviewer: row.reviewer,
            comment: row.comment,
        }
    }
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        tracing::info!("SQLite connection established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// In-memory database for tests. A single connection keeps the one
    /// `:memory:` instance alive for the pool's lifetime.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::run_migrations(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS ix_books_title ON books (title)")
            .execute(pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                book_id INTEGER NOT NULL REFERENCES books (id),
                reviewer TEXT NOT NULL,
                comment TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS ix_reviews_book_id ON reviews (book_id)")
            .execute(pool)
            .await?;

        Ok(())
    }

    async fn book_exists(&self, book_id: i64) -> shelf_core::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM books WHERE id = ?1")
            .bind(book_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(ShelfError::store)?;

        Ok(row.is_some())
    }
}

#[async_trait]
impl BookStore for Database {
    async fn list_books(&self) -> shelf_core::Result<Vec<Book>> {
        let book_rows: Vec<BookRow> =
            sqlx::query_as("SELECT id, title, author FROM books ORDER BY id")
                .fetch_all(&*self.pool)
                .await
                .map_err(ShelfError::store)?;

        let review_rows: Vec<ReviewRow> =
            sqlx::query_as("SELECT id, book_id, reviewer, comment FROM reviews ORDER BY id")
                .fetch_all(&*self.pool)
                .await
                .map_err(ShelfError::store)?;

        // Group reviews by book in memory, two queries total
        let mut by_book: HashMap<i64, Vec<Review>> = HashMap::new();
        for row in review_rows {
            by_book.entry(row.book_id).or_default().push(row.into());
        }

        let books = book_rows
            .into_iter()
            .map(|row| {
                let mut book = Book::from(row);
                book.reviews = by_book.remove(&book.id).unwrap_or_default();
                book
            })
            .collect();

        Ok(books)
    }

    async fn create_book(&self, title: &str, author: &str) -> shelf_core::Result<Book> {
        let result = sqlx::query("INSERT INTO books (title, author) VALUES (?1, ?2)")
            .bind(title)
            .bind(author)
            .execute(&*self.pool)
            .await
            .map_err(ShelfError::store)?;

        Ok(Book {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            author: author.to_string(),
            reviews: Vec::new(),
        })
    }

    async fn list_reviews(&self, book_id: i64) -> shelf_core::Result<Vec<Review>> {
        if !self.book_exists(book_id).await? {
            return Err(ShelfError::BookNotFound(book_id));
        }

        let rows: Vec<ReviewRow> = sqlx::query_as(
            "SELECT id, book_id, reviewer, comment FROM reviews WHERE book_id = ?1 ORDER BY id",
        )
        .bind(book_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(ShelfError::store)?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn create_review(
        &self,
        book_id: i64,
        reviewer: &str,
        comment: &str,
    ) -> shelf_core::Result<Review> {
        if !self.book_exists(book_id).await? {
            return Err(ShelfError::BookNotFound(book_id));
        }

        let result =
            sqlx::query("INSERT INTO reviews (book_id, reviewer, comment) VALUES (?1, ?2, ?3)")
                .bind(book_id)
                .bind(reviewer)
                .bind(comment)
                .execute(&*self.pool)
                .await
                .map_err(ShelfError::store)?;

        Ok(Review {
            id: result.last_insert_rowid(),
            reviewer: reviewer.to_string(),
            comment: comment.to_string(),
        })
    }
}
