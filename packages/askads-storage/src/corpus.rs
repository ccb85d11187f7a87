use std::{collections::HashMap, fs, path::Path};

use uuid::Uuid;

use crate::{
	Error, Result,
	models::{Document, DocumentRecord},
};

const DOCUMENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6a0d_3b8e_4f21_5c7a_9e13_b2d4_c6f8_0a17);

/// The read-only document metadata store, in insertion order.
#[derive(Debug, Clone)]
pub struct Corpus {
	documents: Vec<Document>,
	positions: HashMap<String, usize>,
}
impl Corpus {
	pub fn new(documents: Vec<Document>) -> Result<Self> {
		let mut positions = HashMap::with_capacity(documents.len());

		for (position, doc) in documents.iter().enumerate() {
			if positions.insert(doc.id.clone(), position).is_some() {
				return Err(Error::DuplicateId(doc.id.clone()));
			}
		}

		Ok(Self { documents, positions })
	}

	/// Reads one JSON object per line. Blank lines are skipped.
	pub fn load_jsonl(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
		let mut documents = Vec::new();

		for (index, line) in raw.lines().enumerate() {
			if line.trim().is_empty() {
				continue;
			}

			let record: DocumentRecord = serde_json::from_str(line).map_err(|source| {
				Error::Json { path: path.to_path_buf(), line: index + 1, source }
			})?;

			documents.push(document_from_record(record));
		}

		tracing::debug!(path = %path.display(), doc_count = documents.len(), "Corpus file parsed.");

		Self::new(documents)
	}

	pub fn documents(&self) -> &[Document] {
		&self.documents
	}

	pub fn get(&self, id: &str) -> Option<&Document> {
		self.positions.get(id).map(|position| &self.documents[*position])
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}
}

/// Derives a stable id for a record that was stored without one.
pub fn derived_document_id(url: &str, text: &str) -> String {
	let mut name = Vec::with_capacity(url.len() + text.len() + 1);

	name.extend_from_slice(url.as_bytes());
	name.push(b'\n');
	name.extend_from_slice(text.as_bytes());

	Uuid::new_v5(&DOCUMENT_ID_NAMESPACE, &name).to_string()
}

pub(crate) fn document_from_record(record: DocumentRecord) -> Document {
	let title = record.title.unwrap_or_default();
	let url = record.url.unwrap_or_default();
	let section = record.section.unwrap_or_default();
	let text = record.text.unwrap_or_default();
	let id = match record.id {
		Some(id) if !id.trim().is_empty() => id,
		_ => derived_document_id(&url, &text),
	};

	Document { id, title, url, section, text }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn doc(id: &str) -> Document {
		Document {
			id: id.to_string(),
			title: String::new(),
			url: format!("https://example.org/{id}"),
			section: String::new(),
			text: String::new(),
		}
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		let err = Corpus::new(vec![doc("a"), doc("b"), doc("a")]).expect_err("Expected duplicate.");

		assert!(matches!(err, Error::DuplicateId(id) if id == "a"));
	}

	#[test]
	fn documents_keep_insertion_order() {
		let corpus = Corpus::new(vec![doc("b"), doc("a")]).expect("Corpus must build.");
		let ids = corpus.documents().iter().map(|doc| doc.id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, vec!["b", "a"]);
		assert_eq!(corpus.get("a").map(|doc| doc.url.as_str()), Some("https://example.org/a"));
		assert_eq!(corpus.get("missing"), None);
	}

	#[test]
	fn missing_id_is_derived_deterministically() {
		let record = || DocumentRecord {
			url: Some("https://example.org/x".to_string()),
			text: Some("body".to_string()),
			..Default::default()
		};
		let first = document_from_record(record());
		let second = document_from_record(record());

		assert_eq!(first.id, second.id);
		assert_ne!(first.id, derived_document_id("https://example.org/x", "other"));
		assert!(first.title.is_empty());
	}
}
