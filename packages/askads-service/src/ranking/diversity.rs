//! Maximal marginal relevance selection.
//!
//! This is the usual greedy approximation: each step commits to the locally best candidate and
//! never revisits earlier picks, so the selected set is not guaranteed to maximize the global
//! objective.

use crate::embedder::dot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmrPick {
	/// Index into the candidate pool.
	pub index: usize,
	/// Cosine similarity between the candidate and the query.
	pub relevance: f32,
}

#[derive(Clone, Copy)]
struct Best {
	remaining_pos: usize,
	score: f32,
}
impl Best {
	// Strictly greater keeps the first candidate encountered on ties.
	fn better_than(self, other: Option<Self>) -> bool {
		other.map(|other| self.score > other.score).unwrap_or(true)
	}
}

/// Selects up to `count` pool entries.
///
/// A candidate's relevance term is its cosine to the query plus its entry in `adjustments`
/// (zero when absent), so ranking boosts carry into the selection order. The first pick is the
/// candidate with the highest relevance term. Every later pick maximizes
/// `lambda * relevance - (1 - lambda) * max_similarity_to_selected`. All vectors are expected
/// to be L2-normalized.
pub fn mmr_select(
	query: &[f32],
	candidates: &[Vec<f32>],
	adjustments: &[f32],
	count: usize,
	lambda: f32,
) -> Vec<MmrPick> {
	let relevance = candidates.iter().map(|vector| dot(query, vector)).collect::<Vec<_>>();
	let adjusted = relevance
		.iter()
		.enumerate()
		.map(|(index, cosine)| cosine + adjustments.get(index).copied().unwrap_or(0.0))
		.collect::<Vec<_>>();
	let target = count.min(candidates.len());
	let mut remaining = (0..candidates.len()).collect::<Vec<_>>();
	let mut selected: Vec<usize> = Vec::with_capacity(target);

	while selected.len() < target {
		let mut best: Option<Best> = None;

		for (remaining_pos, &index) in remaining.iter().enumerate() {
			let score = if selected.is_empty() {
				adjusted[index]
			} else {
				let redundancy = selected
					.iter()
					.map(|&chosen| dot(&candidates[index], &candidates[chosen]))
					.fold(f32::NEG_INFINITY, f32::max);

				lambda * adjusted[index] - (1.0 - lambda) * redundancy
			};
			let candidate = Best { remaining_pos, score };

			if candidate.better_than(best) {
				best = Some(candidate);
			}
		}

		let Some(best) = best else {
			break;
		};

		selected.push(remaining.remove(best.remaining_pos));
	}

	selected.into_iter().map(|index| MmrPick { index, relevance: relevance[index] }).collect()
}
