use askads_config::Augmentation;

use crate::Hit;

/// True when no hit points at a canonical program page.
pub fn needs_augmentation(hits: &[Hit], cfg: &Augmentation) -> bool {
	cfg.enabled && !hits.iter().any(|hit| is_canonical(&hit.url, cfg))
}

pub fn is_canonical(url: &str, cfg: &Augmentation) -> bool {
	let marker = |needle: &str| !needle.is_empty() && url.contains(needle);

	marker(&cfg.canonical_path) || marker(&cfg.identifying_token)
}

/// The query re-run when the first pass misses canonical pages.
pub fn augmented_query(query: &str, cfg: &Augmentation) -> String {
	if cfg.steering_terms.is_empty() {
		return query.to_string();
	}

	format!("{query} {}", cfg.steering_terms)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(url: &str) -> Hit {
		Hit {
			doc_id: url.to_string(),
			title: String::new(),
			url: url.to_string(),
			section: String::new(),
			text: String::new(),
			dense_rank: None,
			sparse_rank: None,
			fused_score: 0.0,
			boosted_score: 0.0,
			relevance: 0.0,
			rerank_score: None,
		}
	}

	#[test]
	fn canonical_path_or_token_suppresses_augmentation() {
		let cfg = Augmentation::default();

		assert!(!needs_augmentation(&[hit("https://x.edu/education/programs/")], &cfg));
		assert!(!needs_augmentation(&[hit("https://x.edu/ms-in-applied-data-science-faq")], &cfg));
		assert!(needs_augmentation(&[hit("https://x.edu/news-events/news/a/")], &cfg));
	}

	#[test]
	fn empty_hit_list_triggers_augmentation() {
		assert!(needs_augmentation(&[], &Augmentation::default()));
	}

	#[test]
	fn disabled_augmentation_never_triggers() {
		let cfg = Augmentation { enabled: false, ..Augmentation::default() };

		assert!(!needs_augmentation(&[], &cfg));
	}

	#[test]
	fn steering_terms_are_appended() {
		let query = augmented_query("When do classes start?", &Augmentation::default());

		assert_eq!(
			query,
			"When do classes start? program site education admissions curriculum \"MS in Applied Data Science\""
		);
	}
}
