use serde::{Deserialize, Serialize};

/// One immutable corpus record. `id` is unique within a corpus snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Document {
	pub id: String,
	pub title: String,
	pub url: String,
	pub section: String,
	pub text: String,
}

/// A metadata line as written by the indexer. Every field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DocumentRecord {
	pub id: Option<String>,
	pub title: Option<String>,
	pub url: Option<String>,
	pub section: Option<String>,
	pub text: Option<String>,
}
