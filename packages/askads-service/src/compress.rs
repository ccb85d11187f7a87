use askads_domain::sentences;

use crate::{
	Result,
	embedder::{Embedder, dot},
};

/// Keeps the `top_sentences` sentences most similar to the query, in their original order.
///
/// Text that splits into no sentences, or into no more than `top_sentences`, is returned as is
/// without calling the embedder.
pub async fn compress_passage(
	embedder: &Embedder<'_>,
	query_vector: &[f32],
	text: &str,
	top_sentences: usize,
) -> Result<String> {
	let parts = sentences::split(text);

	if parts.is_empty() || parts.len() <= top_sentences {
		return Ok(text.to_string());
	}

	let owned = parts.iter().map(|sentence| sentence.to_string()).collect::<Vec<_>>();
	let vectors = embedder.embed_passages(&owned).await?;
	let keep = top_indices(
		&vectors.iter().map(|vector| dot(query_vector, vector)).collect::<Vec<_>>(),
		top_sentences,
	);

	Ok(keep.into_iter().map(|index| parts[index]).collect::<Vec<_>>().join(" "))
}

/// Indices of the `count` largest scores, returned in ascending index order.
fn top_indices(scores: &[f32], count: usize) -> Vec<usize> {
	let mut order = (0..scores.len()).collect::<Vec<_>>();

	order.sort_by(|a, b| crate::ranking::cmp_f32_desc(scores[*a], scores[*b]));
	order.truncate(count);
	order.sort_unstable();

	order
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};

	use askads_config::EmbeddingProviderConfig;

	use super::*;
	use crate::{BoxFuture, EmbeddingProvider};

	struct HashEmbedding {
		dim: u32,
		calls: Arc<AtomicUsize>,
	}

	impl EmbeddingProvider for HashEmbedding {
		fn embed<'a>(
			&'a self,
			_cfg: &'a EmbeddingProviderConfig,
			texts: &'a [String],
		) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let vectors =
				texts.iter().map(|text| askads_testkit::hash_embedding(text, self.dim)).collect();

			Box::pin(async move { Ok(vectors) })
		}
	}

	fn block_on<F: std::future::Future>(future: F) -> F::Output {
		tokio::runtime::Builder::new_current_thread()
			.build()
			.expect("Failed to build runtime.")
			.block_on(future)
	}

	#[test]
	fn top_indices_restore_original_order() {
		assert_eq!(top_indices(&[0.1, 0.9, 0.5, 0.7], 2), vec![1, 3]);
		assert_eq!(top_indices(&[0.3, 0.3, 0.3], 2), vec![0, 1]);
	}

	#[test]
	fn short_passages_are_returned_untouched() {
		let cfg = askads_testkit::test_config(64).providers.embedding;
		let calls = Arc::new(AtomicUsize::new(0));
		let provider = HashEmbedding { dim: 64, calls: calls.clone() };
		let embedder = Embedder::new(&cfg, &provider);
		let text = "  First sentence.   Second one follows.  ";
		let out = block_on(compress_passage(&embedder, &[0.0; 64], text, 2)).expect("Compress.");

		assert_eq!(out, text);
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn long_passages_keep_relevant_sentences_in_order() {
		let cfg = askads_testkit::test_config(1024).providers.embedding;
		let provider = HashEmbedding { dim: 1024, calls: Arc::new(AtomicUsize::new(0)) };
		let embedder = Embedder::new(&cfg, &provider);
		let text = "Deadline details follow here. The campus has a lake. \
			The application deadline is January. Parking is limited downtown.";
		let query = askads_testkit::hash_embedding("query: application deadline", 1024);
		let out = block_on(compress_passage(&embedder, &query, text, 2)).expect("Compress.");

		assert_eq!(out, "Deadline details follow here. The application deadline is January.");
	}
}
