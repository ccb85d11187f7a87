use askads_config::Config;
use askads_domain::redact;

use crate::{Hit, Result, compress, embedder::Embedder};

/// Interleaves from both ends: `h0, h(n-1), h1, h(n-2), ...`.
///
/// Long prompts are attended to most at their start and end, so the strongest hits go there.
/// Lists of two or fewer items are returned unchanged.
pub fn long_context_order<T>(items: Vec<T>) -> Vec<T> {
	if items.len() <= 2 {
		return items;
	}

	let mut slots = items.into_iter().map(Some).collect::<Vec<_>>();
	let mut out = Vec::with_capacity(slots.len());
	let (mut left, mut right) = (0, slots.len() - 1);

	while left <= right {
		out.extend(slots[left].take());

		left += 1;

		if left <= right {
			out.extend(slots[right].take());

			right -= 1;
		}
	}

	out
}

pub fn format_block(index: usize, title: &str, section: &str, url: &str, text: &str) -> String {
	format!("[{index}] {} \u{2022} {} | {}\n{text}", title.trim(), section.trim(), url.trim())
}

/// Builds the prompt context from final hits: reorder, compress, redact, then join.
///
/// An empty hit list yields an empty string.
pub async fn build_context(
	embedder: &Embedder<'_>,
	query_vector: &[f32],
	hits: &[Hit],
	cfg: &Config,
) -> Result<String> {
	let ordered = long_context_order(hits.iter().collect::<Vec<_>>());
	let mut blocks = Vec::with_capacity(ordered.len());

	for (offset, hit) in ordered.into_iter().enumerate() {
		let text = if cfg.compression.enabled {
			compress::compress_passage(
				embedder,
				query_vector,
				&hit.text,
				cfg.compression.top_sentences as usize,
			)
			.await?
		} else {
			hit.text.clone()
		};
		let text = redact::redact(&text, &cfg.context.email_marker, &cfg.context.phone_marker);

		blocks.push(format_block(offset + 1, &hit.title, &hit.section, &hit.url, &text));
	}

	Ok(blocks.join(&cfg.context.separator))
}
