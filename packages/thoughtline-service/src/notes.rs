use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, JournalService, Result};
use thoughtline_storage::{models::Note, vector::vector_to_pg};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateNoteRequest {
	pub content: String,
	#[serde(default, with = "crate::time_serde::date::option")]
	pub note_date: Option<Date>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
	#[serde(default)]
	pub content: Option<String>,
	#[serde(default, with = "crate::time_serde::date::option")]
	pub note_date: Option<Date>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteRecord {
	pub note_id: Uuid,
	pub book_id: Uuid,
	pub content: String,
	#[serde(with = "crate::time_serde::date")]
	pub note_date: Date,
}
impl From<Note> for NoteRecord {
	fn from(note: Note) -> Self {
		Self {
			note_id: note.note_id,
			book_id: note.book_id,
			content: note.content,
			note_date: note.note_date,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteNoteResponse {
	pub message: String,
	pub note: NoteRecord,
}

impl JournalService {
	pub async fn create_note(&self, book_id: Uuid, req: CreateNoteRequest) -> Result<NoteRecord> {
		let content = req.content.trim();

		if content.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Note content must be non-empty.".to_string(),
			});
		}

		let book_exists: Option<Uuid> =
			sqlx::query_scalar("SELECT book_id FROM books WHERE book_id = $1")
				.bind(book_id)
				.fetch_optional(&self.db.pool)
				.await?;

		if book_exists.is_none() {
			return Err(Error::NotFound { message: "Book not found.".to_string() });
		}

		let vec = self.embed_text(content).await?;
		let note_date = req.note_date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
		let note: Note = sqlx::query_as(
			"\
INSERT INTO book_notes (note_id, book_id, content, note_date, embedding)
VALUES ($1, $2, $3, $4, $5::text::vector)
RETURNING note_id, book_id, content, note_date",
		)
		.bind(Uuid::new_v4())
		.bind(book_id)
		.bind(content)
		.bind(note_date)
		.bind(vector_to_pg(&vec))
		.fetch_one(&self.db.pool)
		.await?;

		Ok(note.into())
	}

	pub async fn list_notes(&self, book_id: Uuid) -> Result<Vec<NoteRecord>> {
		let notes: Vec<Note> = sqlx::query_as(
			"\
SELECT note_id, book_id, content, note_date
FROM book_notes
WHERE book_id = $1
ORDER BY note_date DESC",
		)
		.bind(book_id)
		.fetch_all(&self.db.pool)
		.await?;

		Ok(notes.into_iter().map(NoteRecord::from).collect())
	}

	pub async fn get_note(&self, note_id: Uuid) -> Result<NoteRecord> {
		let note: Option<Note> = sqlx::query_as(
			"SELECT note_id, book_id, content, note_date FROM book_notes WHERE note_id = $1",
		)
		.bind(note_id)
		.fetch_optional(&self.db.pool)
		.await?;

		note.map(NoteRecord::from)
			.ok_or_else(|| Error::NotFound { message: "Note not found.".to_string() })
	}

	pub async fn update_note(&self, note_id: Uuid, req: UpdateNoteRequest) -> Result<NoteRecord> {
		let content_update = req.content.as_deref().map(str::trim).filter(|c| !c.is_empty());
		let note: Option<Note> = match content_update {
			// Content and embedding travel in one statement so a row can never
			// pair new content with a stale embedding.
			Some(content) => {
				let vec = self.embed_text(content).await?;

				sqlx::query_as(
					"\
UPDATE book_notes
SET content = $1, embedding = $2::text::vector, note_date = COALESCE($3, note_date)
WHERE note_id = $4
RETURNING note_id, book_id, content, note_date",
				)
				.bind(content)
				.bind(vector_to_pg(&vec))
				.bind(req.note_date)
				.bind(note_id)
				.fetch_optional(&self.db.pool)
				.await?
			},
			None => sqlx::query_as(
				"\
UPDATE book_notes
SET note_date = COALESCE($1, note_date)
WHERE note_id = $2
RETURNING note_id, book_id, content, note_date",
			)
			.bind(req.note_date)
			.bind(note_id)
			.fetch_optional(&self.db.pool)
			.await?,
		};

		note.map(NoteRecord::from)
			.ok_or_else(|| Error::NotFound { message: "Note not found.".to_string() })
	}

	pub async fn delete_note(&self, note_id: Uuid) -> Result<DeleteNoteResponse> {
		let note: Option<Note> = sqlx::query_as(
			"\
DELETE FROM book_notes
WHERE note_id = $1
RETURNING note_id, book_id, content, note_date",
		)
		.bind(note_id)
		.fetch_optional(&self.db.pool)
		.await?;
		let Some(note) = note else {
			return Err(Error::NotFound { message: "Note not found.".to_string() });
		};

		Ok(DeleteNoteResponse { message: "Note deleted.".to_string(), note: note.into() })
	}
}
