use askads_config::RankingBoost;
use askads_domain::boost::boost_score;
use askads_storage::corpus::Corpus;

use crate::ranking::{Candidate, cmp_f32_desc};

/// Sets `boosted_score` on every candidate from its document's URL and section.
pub fn apply_boosts(
	candidates: &mut [Candidate],
	corpus: &Corpus,
	intent: Option<&str>,
	cfg: &RankingBoost,
) {
	for candidate in candidates {
		let (url, section) = corpus
			.get(&candidate.doc_id)
			.map(|doc| (doc.url.as_str(), doc.section.as_str()))
			.unwrap_or(("", ""));

		candidate.boosted_score = boost_score(candidate.fused_score, url, section, intent, cfg);
	}
}

/// Orders candidates by boosted score and keeps the first `size`. Ties keep input order.
pub fn candidate_pool(mut candidates: Vec<Candidate>, size: usize) -> Vec<Candidate> {
	candidates.sort_by(|a, b| cmp_f32_desc(a.boosted_score, b.boosted_score));
	candidates.truncate(size);

	candidates
}
