use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct Book {
	pub book_id: Uuid,
	pub name: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Note {
	pub note_id: Uuid,
	pub book_id: Uuid,
	pub content: String,
	pub note_date: Date,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Thought {
	pub thought_id: Uuid,
	pub content: String,
	pub thought_date: Date,
}
