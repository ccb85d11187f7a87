pub mod diversity;
pub mod fusion;
pub mod pool;

pub use diversity::{MmrPick, mmr_select};
pub use fusion::{Candidate, fuse, reciprocal_rank_fusion};
pub use pool::{apply_boosts, candidate_pool};

use std::cmp::Ordering;

/// Descending order for scores; NaN sorts last.
pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
