use color_eyre::{Result, eyre};
use uuid::Uuid;

use thoughtline_config::EmbeddingProviderConfig;
use thoughtline_providers::embedding;
use thoughtline_storage::{db::Db, vector::vector_to_pg};

/// One-shot catch-up for rows written before embeddings existed, or after an
/// embedding-model change wiped the columns. Strictly sequential; the first
/// failed embed or write aborts the whole run.
pub async fn run_backfill(db: &Db, cfg: &EmbeddingProviderConfig) -> Result<()> {
	let thoughts = backfill_thoughts(db, cfg).await?;

	tracing::info!(rows = thoughts, "Thought embeddings backfilled.");

	let notes = backfill_notes(db, cfg).await?;

	tracing::info!(rows = notes, "Note embeddings backfilled.");

	Ok(())
}

async fn backfill_thoughts(db: &Db, cfg: &EmbeddingProviderConfig) -> Result<usize> {
	let rows: Vec<(Uuid, String)> =
		sqlx::query_as("SELECT thought_id, content FROM thoughts WHERE embedding IS NULL")
			.fetch_all(&db.pool)
			.await?;

	for (thought_id, content) in &rows {
		let literal = embed_one(cfg, std::slice::from_ref(content)).await?;

		sqlx::query("UPDATE thoughts SET embedding = $1::text::vector WHERE thought_id = $2")
			.bind(literal)
			.bind(thought_id)
			.execute(&db.pool)
			.await?;
	}

	Ok(rows.len())
}

async fn backfill_notes(db: &Db, cfg: &EmbeddingProviderConfig) -> Result<usize> {
	let rows: Vec<(Uuid, String)> =
		sqlx::query_as("SELECT note_id, content FROM book_notes WHERE embedding IS NULL")
			.fetch_all(&db.pool)
			.await?;

	for (note_id, content) in &rows {
		let literal = embed_one(cfg, std::slice::from_ref(content)).await?;

		sqlx::query("UPDATE book_notes SET embedding = $1::text::vector WHERE note_id = $2")
			.bind(literal)
			.bind(note_id)
			.execute(&db.pool)
			.await?;
	}

	Ok(rows.len())
}

async fn embed_one(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<String> {
	let embeddings = embedding::embed(cfg, texts).await?;
	let Some(vec) = embeddings.into_iter().next() else {
		return Err(eyre::eyre!("Embedding provider returned no vectors."));
	};

	if vec.len() != cfg.dimensions as usize {
		return Err(eyre::eyre!("Embedding vector dimension mismatch."));
	}

	Ok(vector_to_pg(&vec))
}
