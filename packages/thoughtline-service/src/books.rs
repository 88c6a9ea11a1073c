use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, JournalService, NoteRecord, Result};
use thoughtline_storage::models::Book;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateBookRequest {
	pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenameBookRequest {
	pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookRecord {
	pub book_id: Uuid,
	pub name: String,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<Book> for BookRecord {
	fn from(book: Book) -> Self {
		Self { book_id: book.book_id, name: book.name, created_at: book.created_at }
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteBookResponse {
	pub message: String,
	pub book: BookRecord,
}

impl JournalService {
	pub async fn create_book(&self, req: CreateBookRequest) -> Result<BookRecord> {
		let name = req.name.trim();

		if name.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Book name must be non-empty.".to_string(),
			});
		}

		let book: Book = sqlx::query_as(
			"\
INSERT INTO books (book_id, name, created_at)
VALUES ($1, $2, $3)
RETURNING book_id, name, created_at",
		)
		.bind(Uuid::new_v4())
		.bind(name)
		.bind(OffsetDateTime::now_utc())
		.fetch_one(&self.db.pool)
		.await?;

		Ok(book.into())
	}

	pub async fn list_books(&self) -> Result<Vec<BookRecord>> {
		let books: Vec<Book> =
			sqlx::query_as("SELECT book_id, name, created_at FROM books ORDER BY created_at DESC")
				.fetch_all(&self.db.pool)
				.await?;

		Ok(books.into_iter().map(BookRecord::from).collect())
	}

	pub async fn get_book(&self, book_id: Uuid) -> Result<BookRecord> {
		let book: Option<Book> =
			sqlx::query_as("SELECT book_id, name, created_at FROM books WHERE book_id = $1")
				.bind(book_id)
				.fetch_optional(&self.db.pool)
				.await?;

		book.map(BookRecord::from)
			.ok_or_else(|| Error::NotFound { message: "Book not found.".to_string() })
	}

	pub async fn rename_book(&self, book_id: Uuid, req: RenameBookRequest) -> Result<BookRecord> {
		let name = req.name.trim();

		if name.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Book name must be non-empty.".to_string(),
			});
		}

		let book: Option<Book> = sqlx::query_as(
			"UPDATE books SET name = $1 WHERE book_id = $2 RETURNING book_id, name, created_at",
		)
		.bind(name)
		.bind(book_id)
		.fetch_optional(&self.db.pool)
		.await?;

		book.map(BookRecord::from)
			.ok_or_else(|| Error::NotFound { message: "Book not found.".to_string() })
	}

	/// Deletes a book; the `ON DELETE CASCADE` clause on `book_notes.book_id`
	/// removes the book's notes in the same statement.
	pub async fn delete_book(&self, book_id: Uuid) -> Result<DeleteBookResponse> {
		let book: Option<Book> = sqlx::query_as(
			"DELETE FROM books WHERE book_id = $1 RETURNING book_id, name, created_at",
		)
		.bind(book_id)
		.fetch_optional(&self.db.pool)
		.await?;
		let Some(book) = book else {
			return Err(Error::NotFound { message: "Book not found.".to_string() });
		};

		Ok(DeleteBookResponse { message: "Book deleted.".to_string(), book: book.into() })
	}

	/// The two reads are independent, so they are issued jointly.
	pub async fn book_with_notes(
		&self,
		book_id: Uuid,
	) -> Result<(BookRecord, Vec<NoteRecord>)> {
		tokio::try_join!(self.get_book(book_id), self.list_notes(book_id))
	}
}
