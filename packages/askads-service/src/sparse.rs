//! Lexical retrieval: a TF-IDF vector space fitted once per corpus snapshot.
//!
//! Weights use the smoothed inverse document frequency `ln((1 + n) / (1 + df)) + 1` over raw
//! term counts, and every document row is L2-normalized so a dot product is a cosine.

use std::{
	collections::{BTreeMap, HashMap},
	sync::LazyLock,
};

use regex::Regex;

use askads_config::Sparse;
use askads_storage::models::Document;

use crate::ranking::cmp_f32_desc;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b\w\w+\b").unwrap_or_else(|err| panic!("Invalid token pattern: {err}"))
});

/// The text a document is indexed under.
pub fn document_text(doc: &Document) -> String {
	format!("{} {} {} {}", doc.title, doc.section, doc.url, doc.text)
}

/// Immutable after [`SparseIndex::build`]; a corpus change means a new index.
#[derive(Debug)]
pub struct SparseIndex {
	vocabulary: HashMap<String, usize>,
	idf: Vec<f32>,
	/// Per term: `(document position, normalized weight)` in ascending position order.
	postings: Vec<Vec<(usize, f32)>>,
	doc_count: usize,
	ngram_min: usize,
	ngram_max: usize,
	snapshot_id: String,
}
impl SparseIndex {
	pub fn build(texts: &[String], cfg: &Sparse) -> Self {
		let ngram_min = cfg.ngram_min.max(1) as usize;
		let ngram_max = (cfg.ngram_max as usize).max(ngram_min);
		let doc_count = texts.len();
		let counts = texts
			.iter()
			.map(|text| term_counts(text, ngram_min, ngram_max))
			.collect::<Vec<_>>();
		let mut document_frequency: BTreeMap<&str, u32> = BTreeMap::new();

		for doc_terms in &counts {
			for term in doc_terms.keys() {
				*document_frequency.entry(term.as_str()).or_default() += 1;
			}
		}

		let max_doc_count = cfg.max_df as f64 * doc_count as f64;
		let mut vocabulary = HashMap::new();
		let mut idf = Vec::new();

		// BTreeMap iteration keeps term ids in lexical order.
		for (term, df) in document_frequency {
			if (df as f64) > max_doc_count || df < cfg.min_df {
				continue;
			}

			vocabulary.insert(term.to_string(), idf.len());
			idf.push((((1 + doc_count) as f32) / ((1 + df) as f32)).ln() + 1.0);
		}

		let mut postings = vec![Vec::new(); idf.len()];

		for (position, doc_terms) in counts.iter().enumerate() {
			let row = doc_terms
				.iter()
				.filter_map(|(term, count)| {
					vocabulary.get(term).map(|&term_id| (term_id, *count as f32 * idf[term_id]))
				})
				.collect::<Vec<_>>();
			let norm = row.iter().map(|(_, weight)| weight * weight).sum::<f32>().sqrt();

			if norm <= 0.0 {
				continue;
			}

			for (term_id, weight) in row {
				postings[term_id].push((position, weight / norm));
			}
		}

		let snapshot_id = snapshot_id(texts, cfg);

		if vocabulary.is_empty() && doc_count > 0 {
			tracing::warn!(doc_count, "Sparse index has an empty vocabulary; lexical scores are all zero.");
		}

		Self { vocabulary, idf, postings, doc_count, ngram_min, ngram_max, snapshot_id }
	}

	/// Scores every document against `query` and returns the best `top_n` as
	/// `(document position, cosine)`. Zero scores are included; ties keep corpus order.
	pub fn query(&self, query: &str, top_n: usize) -> Vec<(usize, f32)> {
		let mut scores = vec![0.0_f32; self.doc_count];
		let weights = self.query_weights(query);

		for (term_id, query_weight) in weights {
			for (position, doc_weight) in &self.postings[term_id] {
				scores[*position] += query_weight * doc_weight;
			}
		}

		let mut ranked = scores.into_iter().enumerate().collect::<Vec<_>>();

		// Stable sort: equal scores stay in insertion order.
		ranked.sort_by(|a, b| cmp_f32_desc(a.1, b.1));
		ranked.truncate(top_n);

		ranked
	}

	pub fn vocabulary_size(&self) -> usize {
		self.vocabulary.len()
	}

	pub fn snapshot_id(&self) -> &str {
		&self.snapshot_id
	}

	fn query_weights(&self, query: &str) -> Vec<(usize, f32)> {
		let mut weights = term_counts(query, self.ngram_min, self.ngram_max)
			.into_iter()
			.filter_map(|(term, count)| {
				self.vocabulary.get(&term).map(|&term_id| (term_id, count as f32 * self.idf[term_id]))
			})
			.collect::<Vec<_>>();
		let norm = weights.iter().map(|(_, weight)| weight * weight).sum::<f32>().sqrt();

		if norm <= 0.0 {
			return Vec::new();
		}

		weights.iter_mut().for_each(|(_, weight)| *weight /= norm);

		weights
	}
}

/// Lowercase word tokens of two or more characters.
pub fn tokenize(text: &str) -> Vec<String> {
	let lowered = text.to_lowercase();

	TOKEN.find_iter(&lowered).map(|token| token.as_str().to_string()).collect()
}

fn term_counts(text: &str, ngram_min: usize, ngram_max: usize) -> HashMap<String, u32> {
	let tokens = tokenize(text);
	let mut counts = HashMap::new();

	for n in ngram_min..=ngram_max {
		if n > tokens.len() {
			break;
		}

		for window in tokens.windows(n) {
			*counts.entry(window.join(" ")).or_default() += 1;
		}
	}

	counts
}

fn snapshot_id(texts: &[String], cfg: &Sparse) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(&cfg.max_df.to_le_bytes());
	hasher.update(&cfg.min_df.to_le_bytes());
	hasher.update(&cfg.ngram_min.to_le_bytes());
	hasher.update(&cfg.ngram_max.to_le_bytes());

	for text in texts {
		hasher.update(&(text.len() as u64).to_le_bytes());
		hasher.update(text.as_bytes());
	}

	hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn corpus() -> Vec<String> {
		[
			"application deadline for admissions",
			"application deadline for the summer lab",
			"core courses and electives",
			"capstone project with industry",
			"core courses for the capstone",
		]
		.iter()
		.map(|text| text.to_string())
		.collect()
	}

	#[test]
	fn tokens_are_lowercase_and_at_least_two_chars() {
		assert_eq!(tokenize("A GRE score, TOEFL & 2 letters"), vec![
			"gre", "score", "toefl", "letters"
		]);
	}

	#[test]
	fn bigrams_join_adjacent_tokens() {
		let counts = term_counts("Core courses core courses", 1, 2);

		assert_eq!(counts.get("core courses"), Some(&2));
		assert_eq!(counts.get("courses core"), Some(&1));
		assert_eq!(counts.get("core"), Some(&2));
	}

	#[test]
	fn document_frequency_bounds_prune_terms() {
		let index = SparseIndex::build(&corpus(), &Sparse::default());

		// Singletons such as "industry" fall under min_df.
		assert!(!index.vocabulary.contains_key("industry"));
		assert!(index.vocabulary.contains_key("application deadline"));
		assert!(index.vocabulary.contains_key("core courses"));

		let strict = Sparse { max_df: 0.3, ..Sparse::default() };
		let index = SparseIndex::build(&corpus(), &strict);

		// "for" appears in three of five documents, above 0.3 * 5.
		assert!(!index.vocabulary.contains_key("for"));
	}

	#[test]
	fn query_ranks_by_cosine_and_keeps_corpus_order_on_ties() {
		let index = SparseIndex::build(&corpus(), &Sparse::default());
		let ranked = index.query("capstone", 5);

		assert_eq!(ranked.len(), 5);
		assert_eq!(ranked[0].0, 3);
		assert_eq!(ranked[1].0, 4);
		assert!(ranked[0].1 > 0.0 && ranked[1].1 > 0.0);
		assert_eq!(ranked.iter().skip(2).map(|(position, _)| *position).collect::<Vec<_>>(), vec![
			0, 1, 2
		]);
		assert!(ranked.iter().skip(2).all(|(_, score)| *score == 0.0));
	}

	#[test]
	fn url_and_title_terms_are_searchable() {
		let documents = askads_testkit::sample_documents();
		let texts = documents.iter().map(document_text).collect::<Vec<_>>();
		let bodies = documents.iter().map(|doc| doc.text.clone()).collect::<Vec<_>>();
		let index = SparseIndex::build(&texts, &Sparse::default());

		// "masters" only occurs in the program page URLs.
		assert!(!SparseIndex::build(&bodies, &Sparse::default()).vocabulary.contains_key("masters"));

		let ranked = index.query("masters", documents.len());
		let mut matched =
			ranked[..3].iter().map(|(position, _)| documents[*position].id.as_str()).collect::<Vec<_>>();

		assert!(ranked[..3].iter().all(|(_, score)| *score > 0.0));
		assert!(ranked[3..].iter().all(|(_, score)| *score == 0.0));

		matched.sort();

		assert_eq!(matched, vec![
			askads_testkit::ADMISSIONS_ID,
			askads_testkit::CAPSTONE_ID,
			askads_testkit::CURRICULUM_ID
		]);

		// "applied" only occurs in titles and URLs; it still finds the same pages.
		let ranked = index.query("Applied Data Science", 3);

		assert!(ranked.iter().all(|(position, score)| {
			*score > 0.0 && documents[*position].title.contains("Applied Data Science")
		}));
	}

	#[test]
	fn unknown_query_scores_everything_zero() {
		let index = SparseIndex::build(&corpus(), &Sparse::default());
		let ranked = index.query("zebra", 2);

		assert_eq!(ranked, vec![(0, 0.0), (1, 0.0)]);
	}

	#[test]
	fn tiny_corpus_yields_empty_vocabulary() {
		let texts = vec!["only one document".to_string()];
		let index = SparseIndex::build(&texts, &Sparse::default());

		assert_eq!(index.vocabulary_size(), 0);
		assert_eq!(index.query("document", 3), vec![(0, 0.0)]);
	}

	#[test]
	fn snapshot_id_tracks_corpus_and_knobs() {
		let a = SparseIndex::build(&corpus(), &Sparse::default());
		let b = SparseIndex::build(&corpus(), &Sparse::default());
		let c = SparseIndex::build(&corpus()[..4], &Sparse::default());
		let d = SparseIndex::build(&corpus(), &Sparse { ngram_max: 1, ..Sparse::default() });

		assert_eq!(a.snapshot_id(), b.snapshot_id());
		assert_ne!(a.snapshot_id(), c.snapshot_id());
		assert_ne!(a.snapshot_id(), d.snapshot_id());
	}
}
