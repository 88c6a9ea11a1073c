use serde::{Deserialize, Serialize};

use crate::{CombinedHit, Error, JournalService, Result};
use thoughtline_storage::vector::vector_to_pg;

const ANSWER_GUIDELINES: &str = "\
You are a personal journal assistant. Ground every answer in the journal \
entries provided below. When the entries do not contain the answer, say you \
are not sure instead of guessing. Cite entries inline by kind and date, e.g. \
(thought, 2026-08-07). Be concise.";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
	pub q: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
	pub answer: String,
	pub sources: Vec<CombinedHit>,
}

impl JournalService {
	/// Every call is independent: the prompt is assembled from scratch and no
	/// conversation state is kept across calls.
	pub async fn answer(&self, req: ChatRequest) -> Result<ChatResponse> {
		let question = req.q.trim();

		if question.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Chat question must be non-empty.".to_string(),
			});
		}

		let vec = self.embed_text(question).await?;
		let context = self
			.rank_across_kinds(&vector_to_pg(&vec), self.cfg.retrieval.chat_context_k as usize)
			.await?;

		tracing::debug!(records = context.len(), "Assembled chat context.");

		let prompt = build_prompt(question, &context);
		let messages = [serde_json::json!({ "role": "user", "content": prompt })];
		let answer = self
			.providers
			.generation
			.complete(&self.cfg.providers.generation, &messages)
			.await?;
		// Disclosed sources are a prefix of the context block, not a citation
		// count.
		let sources = context
			.into_iter()
			.take(self.cfg.retrieval.chat_source_count as usize)
			.collect();

		Ok(ChatResponse { answer, sources })
	}
}

fn context_line(hit: &CombinedHit) -> String {
	format!("[{} | {}] {}", hit.kind.as_str(), hit.date, hit.content)
}

fn build_prompt(question: &str, context: &[CombinedHit]) -> String {
	let mut prompt = String::from(ANSWER_GUIDELINES);

	prompt.push_str("\n\nJournal entries:\n");

	for hit in context {
		prompt.push_str(&context_line(hit));
		prompt.push('\n');
	}

	prompt.push_str("\nQuestion: ");
	prompt.push_str(question);

	prompt
}
