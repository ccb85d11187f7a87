use color_eyre::{Result, eyre};
use serde::Deserialize;
use serde_json::Value;

/// Cohere/Jina style body; some services name the list `data` and the score `score`.
#[derive(Debug, Deserialize)]
struct RerankBody {
	#[serde(alias = "data")]
	results: Vec<RankedDoc>,
}

#[derive(Debug, Deserialize)]
struct RankedDoc {
	index: usize,
	#[serde(alias = "score")]
	relevance_score: f32,
}

/// Scores every `(query, doc)` pair with a cross-encoder service.
///
/// The returned scores are aligned with `docs`; documents the service omits score zero.
pub async fn rerank(
	cfg: &askads_config::ProviderConfig,
	query: &str,
	docs: &[String],
) -> Result<Vec<f32>> {
	if docs.is_empty() {
		return Ok(Vec::new());
	}

	let client = crate::client(cfg.timeout_ms)?;
	let body = serde_json::json!({ "model": cfg.model, "query": query, "documents": docs });
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	scores_by_position(json, docs.len())
}

fn scores_by_position(json: Value, doc_count: usize) -> Result<Vec<f32>> {
	let body = serde_json::from_value::<RerankBody>(json)
		.map_err(|err| eyre::eyre!("Unexpected rerank response shape: {err}."))?;
	let mut scores = vec![0.0_f32; doc_count];

	for ranked in body.results.into_iter().filter(|ranked| ranked.index < doc_count) {
		scores[ranked.index] = ranked.relevance_score;
	}

	Ok(scores)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scores_land_on_their_document_positions() {
		let json = serde_json::json!({
			"id": "rr-1",
			"results": [
				{ "index": 2, "relevance_score": 0.75, "document": { "text": "c" } },
				{ "index": 0, "relevance_score": 0.125 }
			]
		});

		assert_eq!(scores_by_position(json, 4).expect("Valid body."), vec![0.125, 0.0, 0.75, 0.0]);
	}

	#[test]
	fn data_and_score_spellings_are_understood() {
		let json = serde_json::json!({ "data": [{ "index": 1, "score": 0.5 }] });

		assert_eq!(scores_by_position(json, 2).expect("Valid body."), vec![0.0, 0.5]);
	}

	#[test]
	fn positions_past_the_batch_are_dropped() {
		let json = serde_json::json!({ "results": [{ "index": 5, "score": 0.9 }] });

		assert_eq!(scores_by_position(json, 1).expect("Valid body."), vec![0.0]);
	}

	#[test]
	fn malformed_bodies_are_errors() {
		for json in [
			serde_json::json!({ "object": "list" }),
			serde_json::json!({ "results": [{ "index": 0 }] }),
			serde_json::json!({ "results": [{ "relevance_score": 0.3 }] }),
		] {
			let err = scores_by_position(json, 1).expect_err("Body must be rejected.");

			assert!(err.to_string().starts_with("Unexpected rerank response shape"));
		}
	}
}
