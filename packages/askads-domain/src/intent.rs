use askads_config::IntentBucket;

/// Returns the name of the first bucket with a keyword occurring in `query`.
///
/// Matching is a case-insensitive substring test, so `"apply"` also matches
/// `"Applying"`. Buckets are tried in configuration order.
pub fn classify<'a>(query: &str, buckets: &'a [IntentBucket]) -> Option<&'a str> {
	let query = query.to_lowercase();

	buckets
		.iter()
		.find(|bucket| {
			bucket.keywords.iter().any(|keyword| {
				let keyword = keyword.trim().to_lowercase();

				!keyword.is_empty() && query.contains(&keyword)
			})
		})
		.map(|bucket| bucket.name.as_str())
}
