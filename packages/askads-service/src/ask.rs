use serde::Serialize;

use crate::{AskAdsService, Hit, QueryRequest, Result, context};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
	/// One-based position in the hit list.
	pub index: usize,
	pub title: String,
	pub url: String,
	pub section: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
	pub answer: String,
	pub context: String,
	pub hits: Vec<Hit>,
	pub citations: Vec<Citation>,
	pub augmented: bool,
	pub query_used: String,
}

impl AskAdsService {
	/// Retrieves, builds the context, and asks the chat model for a cited answer.
	///
	/// The answer is always generated for the caller's query, even when retrieval ran with the
	/// augmented one.
	pub async fn ask(&self, req: QueryRequest) -> Result<AskResponse> {
		let outcome = self.retrieve_hits(&req).await?;
		let embedder = self.embedder();
		let context =
			context::build_context(&embedder, &outcome.query_vector, &outcome.hits, &self.cfg)
				.await?;
		let llm = &self.cfg.providers.llm;
		let prompt = user_prompt(&outcome.query, &context);
		let answer = self.providers.generation.generate(llm, &llm.system_prompt, &prompt).await?;
		let citations = citations(&outcome.hits, self.cfg.context.citation_count as usize);

		tracing::info!(
			hits = outcome.hits.len(),
			citations = citations.len(),
			augmented = outcome.augmented,
			"Answer generated."
		);

		Ok(AskResponse {
			answer,
			context,
			hits: outcome.hits,
			citations,
			augmented: outcome.augmented,
			query_used: outcome.query_used,
		})
	}
}

pub fn user_prompt(query: &str, context: &str) -> String {
	format!(
		"Question: {query}\n\nUse the context to answer with bracket citations.\n\nContext:\n{context}"
	)
}

/// Citations for the first `count` hits, in hit order.
pub fn citations(hits: &[Hit], count: usize) -> Vec<Citation> {
	hits.iter()
		.take(count)
		.enumerate()
		.map(|(offset, hit)| Citation {
			index: offset + 1,
			title: if hit.title.trim().is_empty() {
				"(no title)".to_string()
			} else {
				hit.title.clone()
			},
			url: hit.url.clone(),
			section: hit.section.clone(),
		})
		.collect()
}
