use std::collections::HashMap;

use qdrant_client::qdrant::{
	PointId, Query, QueryPointsBuilder, ScrollPointsBuilder, Value, point_id::PointIdOptions,
	value::Kind,
};

use crate::{
	Error, Result,
	corpus::document_from_record,
	models::{Document, DocumentRecord},
};

/// Payload key holding the corpus document id. Points without it fall back to the point id.
pub const DOC_ID_KEY: &str = "doc_id";

const SCROLL_PAGE_SIZE: u32 = 256;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &askads_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Nearest neighbours of `vector` as `(doc_id, cosine_distance)`, in the index's order.
	pub async fn nearest(&self, vector: &[f32], top_n: u32) -> Result<Vec<(String, f32)>> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions, collection expects {}.",
				vector.len(),
				self.vector_dim
			)));
		}
		if top_n == 0 {
			return Ok(Vec::new());
		}

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.with_payload(true)
			.limit(top_n as u64);
		let response = self.client.query(search).await?;
		let mut out = Vec::with_capacity(response.result.len());

		for point in response.result {
			let Some(doc_id) = point_doc_id(point.id.as_ref(), &point.payload) else {
				tracing::warn!(collection = %self.collection, "Skipping point without a document id.");

				continue;
			};

			out.push((doc_id, 1.0 - point.score));
		}

		Ok(out)
	}

	/// Enumerates every stored document from point payloads, page by page.
	pub async fn scroll_documents(&self) -> Result<Vec<Document>> {
		let mut documents = Vec::new();
		let mut offset: Option<PointId> = None;

		loop {
			let mut scroll = ScrollPointsBuilder::new(self.collection.clone())
				.limit(SCROLL_PAGE_SIZE)
				.with_payload(true)
				.with_vectors(false);

			if let Some(offset) = offset.take() {
				scroll = scroll.offset(offset);
			}

			let response = self.client.scroll(scroll).await?;

			for point in response.result {
				let record = DocumentRecord {
					id: point_doc_id(point.id.as_ref(), &point.payload),
					title: payload_string(&point.payload, "title"),
					url: payload_string(&point.payload, "url"),
					section: payload_string(&point.payload, "section"),
					text: payload_string(&point.payload, "text"),
				};

				documents.push(document_from_record(record));
			}

			match response.next_page_offset {
				Some(next) => offset = Some(next),
				None => break,
			}
		}

		tracing::info!(
			collection = %self.collection,
			doc_count = documents.len(),
			"Enumerated documents from vector index."
		);

		Ok(documents)
	}
}

fn point_doc_id(point_id: Option<&PointId>, payload: &HashMap<String, Value>) -> Option<String> {
	payload_string(payload, DOC_ID_KEY).or_else(|| match point_id?.point_id_options.as_ref()? {
		PointIdOptions::Uuid(id) => Some(id.clone()),
		PointIdOptions::Num(num) => Some(num.to_string()),
	})
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}
