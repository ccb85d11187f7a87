use askads_config::RankingBoost;

/// Applies the URL and section adjustments to a fused score.
///
/// Rules are additive and evaluated in a fixed order; a URL may trigger several of them.
pub fn boost_score(
	base: f32,
	url: &str,
	section: &str,
	intent: Option<&str>,
	cfg: &RankingBoost,
) -> f32 {
	let mut score = base;
	let exempt =
		intent.map(|intent| cfg.off_intent_exempt.iter().any(|name| name == intent)).unwrap_or(false);

	if !exempt && matches_any(url, &cfg.off_intent_patterns) {
		score -= cfg.off_intent_penalty;
	}
	if matches_any(url, &cfg.high_priority_patterns) {
		score += cfg.high_priority_boost;
	}
	if !cfg.priority_section.is_empty() && section == cfg.priority_section {
		score += cfg.section_boost;
	}
	if matches_any(url, &cfg.low_priority_patterns) {
		score -= cfg.low_priority_penalty;
	}

	score
}

pub fn matches_any(url: &str, patterns: &[String]) -> bool {
	patterns.iter().any(|pattern| !pattern.is_empty() && url.contains(pattern.as_str()))
}

#[cfg(test)]
mod tests {
	use super::*;

	const PROGRAM_URL: &str =
		"https://datascience.uchicago.edu/education/masters-programs/ms-in-applied-data-science/";
	const NEWS_URL: &str = "https://datascience.uchicago.edu/news-events/news/deadline-extended/";

	#[test]
	fn program_page_collects_both_boosts() {
		let cfg = RankingBoost::default();
		let score = boost_score(0.01, PROGRAM_URL, "education", None, &cfg);

		assert!((score - 0.31).abs() < 1e-6);
	}

	#[test]
	fn news_page_is_penalized_twice_outside_capstone() {
		let cfg = RankingBoost::default();
		let score = boost_score(0.5, NEWS_URL, "news", Some("admissions"), &cfg);

		assert!((score - 0.05).abs() < 1e-6);
	}

	#[test]
	fn capstone_intent_skips_off_intent_penalty() {
		let cfg = RankingBoost::default();
		let score = boost_score(0.5, NEWS_URL, "news", Some("capstone"), &cfg);

		assert!((score - 0.3).abs() < 1e-6);
	}

	#[test]
	fn section_must_match_exactly() {
		let cfg = RankingBoost::default();
		let url = "https://example.org/about/";

		assert!((boost_score(0.0, url, "Education", None, &cfg)).abs() < 1e-6);
		assert!((boost_score(0.0, url, "education", None, &cfg) - 0.10).abs() < 1e-6);
	}
}
