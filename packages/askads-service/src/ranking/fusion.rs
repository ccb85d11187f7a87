use std::collections::{HashMap, HashSet};

/// A document surfaced by at least one retrieval channel for the current query.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
	pub doc_id: String,
	/// Zero-based position in the dense list.
	pub dense_rank: Option<u32>,
	/// Zero-based position in the sparse list.
	pub sparse_rank: Option<u32>,
	pub fused_score: f32,
	pub boosted_score: f32,
}

/// Reciprocal rank fusion: each list contributes `1 / (k + rank + 1)` to every id it holds.
///
/// Output is in first-appearance order across the lists; ids absent from every list never
/// appear. Duplicate ids within one list only count at their first position.
pub fn reciprocal_rank_fusion(lists: &[&[String]], k: u32) -> Vec<(String, f32)> {
	let mut order: Vec<(String, f32)> = Vec::new();
	let mut slots: HashMap<&str, usize> = HashMap::new();

	for list in lists {
		let mut seen = HashSet::with_capacity(list.len());

		for (rank, doc_id) in list.iter().enumerate() {
			if !seen.insert(doc_id.as_str()) {
				continue;
			}

			let contribution = 1.0 / (k as f32 + rank as f32 + 1.0);
			let slot = *slots.entry(doc_id.as_str()).or_insert_with(|| {
				order.push((doc_id.clone(), 0.0));

				order.len() - 1
			});

			order[slot].1 += contribution;
		}
	}

	order
}

/// Fuses the dense and sparse id lists into candidates, dense-first in appearance order.
pub fn fuse(dense: &[String], sparse: &[String], k: u32) -> Vec<Candidate> {
	let dense_ranks = first_positions(dense);
	let sparse_ranks = first_positions(sparse);

	reciprocal_rank_fusion(&[dense, sparse], k)
		.into_iter()
		.map(|(doc_id, fused_score)| Candidate {
			dense_rank: dense_ranks.get(doc_id.as_str()).copied(),
			sparse_rank: sparse_ranks.get(doc_id.as_str()).copied(),
			doc_id,
			fused_score,
			boosted_score: fused_score,
		})
		.collect()
}

fn first_positions(list: &[String]) -> HashMap<&str, u32> {
	let mut out = HashMap::with_capacity(list.len());

	for (rank, doc_id) in list.iter().enumerate() {
		out.entry(doc_id.as_str()).or_insert(rank as u32);
	}

	out
}
