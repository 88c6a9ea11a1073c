use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, JournalService, Result};
use thoughtline_storage::{models::Thought, vector::vector_to_pg};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateThoughtRequest {
	pub content: String,
	#[serde(default, with = "crate::time_serde::date::option")]
	pub thought_date: Option<Date>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateThoughtRequest {
	#[serde(default)]
	pub content: Option<String>,
	#[serde(default, with = "crate::time_serde::date::option")]
	pub thought_date: Option<Date>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThoughtRecord {
	pub thought_id: Uuid,
	pub content: String,
	#[serde(with = "crate::time_serde::date")]
	pub thought_date: Date,
}
impl From<Thought> for ThoughtRecord {
	fn from(thought: Thought) -> Self {
		Self {
			thought_id: thought.thought_id,
			content: thought.content,
			thought_date: thought.thought_date,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteThoughtResponse {
	pub message: String,
	pub thought: ThoughtRecord,
}

impl JournalService {
	pub async fn create_thought(&self, req: CreateThoughtRequest) -> Result<ThoughtRecord> {
		let content = req.content.trim();

		if content.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Thought content must be non-empty.".to_string(),
			});
		}

		let vec = self.embed_text(content).await?;
		let thought_date = req.thought_date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
		let thought: Thought = sqlx::query_as(
			"\
INSERT INTO thoughts (thought_id, content, thought_date, embedding)
VALUES ($1, $2, $3, $4::text::vector)
RETURNING thought_id, content, thought_date",
		)
		.bind(Uuid::new_v4())
		.bind(content)
		.bind(thought_date)
		.bind(vector_to_pg(&vec))
		.fetch_one(&self.db.pool)
		.await?;

		Ok(thought.into())
	}

	pub async fn list_thoughts(&self) -> Result<Vec<ThoughtRecord>> {
		let thoughts: Vec<Thought> = sqlx::query_as(
			"\
SELECT thought_id, content, thought_date
FROM thoughts
ORDER BY thought_date DESC
LIMIT $1",
		)
		.bind(self.cfg.retrieval.thought_list_cap as i64)
		.fetch_all(&self.db.pool)
		.await?;

		Ok(thoughts.into_iter().map(ThoughtRecord::from).collect())
	}

	pub async fn get_thought(&self, thought_id: Uuid) -> Result<ThoughtRecord> {
		let thought: Option<Thought> = sqlx::query_as(
			"SELECT thought_id, content, thought_date FROM thoughts WHERE thought_id = $1",
		)
		.bind(thought_id)
		.fetch_optional(&self.db.pool)
		.await?;

		thought
			.map(ThoughtRecord::from)
			.ok_or_else(|| Error::NotFound { message: "Thought not found.".to_string() })
	}

	pub async fn update_thought(
		&self,
		thought_id: Uuid,
		req: UpdateThoughtRequest,
	) -> Result<ThoughtRecord> {
		let content_update = req.content.as_deref().map(str::trim).filter(|c| !c.is_empty());
		let thought: Option<Thought> = match content_update {
			// Same single-statement rule as note updates: content and embedding
			// are never written separately.
			Some(content) => {
				let vec = self.embed_text(content).await?;

				sqlx::query_as(
					"\
UPDATE thoughts
SET content = $1, embedding = $2::text::vector, thought_date = COALESCE($3, thought_date)
WHERE thought_id = $4
RETURNING thought_id, content, thought_date",
				)
				.bind(content)
				.bind(vector_to_pg(&vec))
				.bind(req.thought_date)
				.bind(thought_id)
				.fetch_optional(&self.db.pool)
				.await?
			},
			None => sqlx::query_as(
				"\
UPDATE thoughts
SET thought_date = COALESCE($1, thought_date)
WHERE thought_id = $2
RETURNING thought_id, content, thought_date",
			)
			.bind(req.thought_date)
			.bind(thought_id)
			.fetch_optional(&self.db.pool)
			.await?,
		};

		thought
			.map(ThoughtRecord::from)
			.ok_or_else(|| Error::NotFound { message: "Thought not found.".to_string() })
	}

	pub async fn delete_thought(&self, thought_id: Uuid) -> Result<DeleteThoughtResponse> {
		let thought: Option<Thought> = sqlx::query_as(
			"\
DELETE FROM thoughts
WHERE thought_id = $1
RETURNING thought_id, content, thought_date",
		)
		.bind(thought_id)
		.fetch_optional(&self.db.pool)
		.await?;
		let Some(thought) = thought else {
			return Err(Error::NotFound { message: "Thought not found.".to_string() });
		};

		Ok(DeleteThoughtResponse {
			message: "Thought deleted.".to_string(),
			thought: thought.into(),
		})
	}
}
