use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{JournalService, Result};
use thoughtline_storage::vector::vector_to_pg;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
	Thought,
	Note,
}
impl RecordKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Thought => "thought",
			Self::Note => "note",
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchHit {
	pub id: Uuid,
	pub content: String,
	#[serde(with = "crate::time_serde::date")]
	pub date: Date,
	pub distance: f32,
}

/// A transient projection used only while merging ranked results across the
/// two record kinds; never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CombinedHit {
	pub id: Uuid,
	pub kind: RecordKind,
	pub content: String,
	#[serde(with = "crate::time_serde::date")]
	pub date: Date,
	pub distance: f32,
}

impl SearchHit {
	fn tagged(self, kind: RecordKind) -> CombinedHit {
		CombinedHit {
			id: self.id,
			kind,
			content: self.content,
			date: self.date,
			distance: self.distance,
		}
	}
}

pub(crate) fn merge_ranked(
	thoughts: Vec<SearchHit>,
	notes: Vec<SearchHit>,
	limit: usize,
) -> Vec<CombinedHit> {
	let mut combined: Vec<CombinedHit> = thoughts
		.into_iter()
		.map(|hit| hit.tagged(RecordKind::Thought))
		.chain(notes.into_iter().map(|hit| hit.tagged(RecordKind::Note)))
		.collect();

	combined.sort_by(|a, b| a.distance.total_cmp(&b.distance));
	combined.truncate(limit);

	combined
}

impl JournalService {
	pub async fn search_thoughts(&self, query: &str) -> Result<Vec<SearchHit>> {
		let query = query.trim();

		if query.is_empty() {
			return Ok(Vec::new());
		}

		let vec = self.embed_text(query).await?;

		self.nearest_thoughts(&vector_to_pg(&vec), self.cfg.retrieval.search_top_k as i64).await
	}

	/// Scoped search stays notes-only: thoughts are not merged in when a book
	/// is specified.
	pub async fn search_book_notes(&self, book_id: Uuid, query: &str) -> Result<Vec<SearchHit>> {
		let query = query.trim();

		if query.is_empty() {
			return Ok(Vec::new());
		}

		let vec = self.embed_text(query).await?;

		self.nearest_notes(&vector_to_pg(&vec), self.cfg.retrieval.search_top_k as i64, book_id)
			.await
	}

	pub async fn search_all(&self, query: &str) -> Result<Vec<CombinedHit>> {
		let query = query.trim();

		if query.is_empty() {
			return Ok(Vec::new());
		}

		let vec = self.embed_text(query).await?;

		self.rank_across_kinds(&vector_to_pg(&vec), self.cfg.retrieval.search_top_k as usize)
			.await
	}

	/// Fetches the top `limit` of each kind and merges them into a single
	/// distance-ordered sequence capped at `limit`.
	pub(crate) async fn rank_across_kinds(
		&self,
		query_vector: &str,
		limit: usize,
	) -> Result<Vec<CombinedHit>> {
		let (thoughts, notes) = tokio::try_join!(
			self.nearest_thoughts(query_vector, limit as i64),
			self.nearest_all_notes(query_vector, limit as i64),
		)?;

		Ok(merge_ranked(thoughts, notes, limit))
	}

	async fn nearest_thoughts(&self, query_vector: &str, limit: i64) -> Result<Vec<SearchHit>> {
		let hits: Vec<SearchHit> = sqlx::query_as(
			"\
SELECT
	thought_id AS id,
	content,
	thought_date AS date,
	(embedding <=> $1::text::vector)::real AS distance
FROM thoughts
WHERE embedding IS NOT NULL
ORDER BY embedding <=> $1::text::vector
LIMIT $2",
		)
		.bind(query_vector)
		.bind(limit)
		.fetch_all(&self.db.pool)
		.await?;

		Ok(hits)
	}

	async fn nearest_notes(
		&self,
		query_vector: &str,
		limit: i64,
		book_id: Uuid,
	) -> Result<Vec<SearchHit>> {
		let hits: Vec<SearchHit> = sqlx::query_as(
			"\
SELECT
	note_id AS id,
	content,
	note_date AS date,
	(embedding <=> $1::text::vector)::real AS distance
FROM book_notes
WHERE book_id = $3 AND embedding IS NOT NULL
ORDER BY embedding <=> $1::text::vector
LIMIT $2",
		)
		.bind(query_vector)
		.bind(limit)
		.bind(book_id)
		.fetch_all(&self.db.pool)
		.await?;

		Ok(hits)
	}

	async fn nearest_all_notes(&self, query_vector: &str, limit: i64) -> Result<Vec<SearchHit>> {
		let hits: Vec<SearchHit> = sqlx::query_as(
			"\
SELECT
	note_id AS id,
	content,
	note_date AS date,
	(embedding <=> $1::text::vector)::real AS distance
FROM book_notes
WHERE embedding IS NOT NULL
ORDER BY embedding <=> $1::text::vector
LIMIT $2",
		)
		.bind(query_vector)
		.bind(limit)
		.fetch_all(&self.db.pool)
		.await?;

		Ok(hits)
	}
}
