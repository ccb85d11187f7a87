pub mod ask;
pub mod augment;
pub mod compress;
pub mod context;
pub mod embedder;
pub mod ranking;
pub mod rerank;
pub mod retrieve;
pub mod sparse;

mod error;

pub use ask::{AskResponse, Citation};
pub use error::{Error, Result};
pub use retrieve::{Hit, QueryRequest, RetrieveResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use serde::Serialize;

use askads_config::{Config, EmbeddingProviderConfig, LlmProviderConfig, ProviderConfig};
use askads_providers::{embedding, generation, rerank as rerank_provider};
use askads_storage::{corpus::Corpus, qdrant::QdrantStore};

use crate::{rerank::LazyReranker, sparse::SparseIndex};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system_prompt: &'a str,
		user_prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

/// Approximate nearest neighbour search over passage vectors.
pub trait DenseIndex
where
	Self: Send + Sync,
{
	/// Returns `(doc_id, cosine_distance)` pairs in the index's native order.
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		top_n: u32,
	) -> BoxFuture<'a, Result<Vec<(String, f32)>>>;

	fn collection(&self) -> &str;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rerank: Arc<dyn RerankProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		rerank: Arc<dyn RerankProvider>,
		generation: Arc<dyn GenerationProvider>,
	) -> Self {
		Self { embedding, rerank, generation }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), rerank: provider.clone(), generation: provider }
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
	pub doc_count: usize,
	pub vocabulary_size: usize,
	pub sparse_snapshot_id: String,
	pub collection: String,
}

/// The loaded corpus, its fitted sparse index, and the external collaborators.
pub struct AskAdsService {
	pub cfg: Config,
	pub corpus: Corpus,
	pub sparse: SparseIndex,
	pub dense: Arc<dyn DenseIndex>,
	pub providers: Providers,
	reranker: LazyReranker,
}
impl AskAdsService {
	pub fn new(cfg: Config, corpus: Corpus, dense: Arc<dyn DenseIndex>) -> Result<Self> {
		Self::with_providers(cfg, corpus, dense, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		corpus: Corpus,
		dense: Arc<dyn DenseIndex>,
		providers: Providers,
	) -> Result<Self> {
		if corpus.is_empty() {
			return Err(Error::Corpus { message: "Corpus has no documents.".to_string() });
		}

		let texts = corpus.documents().iter().map(sparse::document_text).collect::<Vec<_>>();
		let sparse = SparseIndex::build(&texts, &cfg.sparse);

		tracing::info!(
			doc_count = corpus.len(),
			vocabulary_size = sparse.vocabulary_size(),
			snapshot_id = %sparse.snapshot_id(),
			"Sparse index built."
		);

		let reranker = LazyReranker::new(cfg.providers.rerank.clone());

		Ok(Self { cfg, corpus, sparse, dense, providers, reranker })
	}

	/// Connects to the vector index and loads the corpus, falling back to the index payloads
	/// when the metadata file is missing and the fallback is enabled.
	pub async fn open(cfg: Config) -> Result<Self> {
		let store = QdrantStore::new(&cfg.storage.qdrant)?;
		let corpus = load_corpus(&cfg, &store).await?;

		Self::new(cfg, corpus, Arc::new(store))
	}

	pub fn index_info(&self) -> IndexInfo {
		IndexInfo {
			doc_count: self.corpus.len(),
			vocabulary_size: self.sparse.vocabulary_size(),
			sparse_snapshot_id: self.sparse.snapshot_id().to_string(),
			collection: self.dense.collection().to_string(),
		}
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl RerankProvider for DefaultProviders {
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(rerank_provider::rerank(cfg, query, docs))
	}
}

impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system_prompt: &'a str,
		user_prompt: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(generation::generate(cfg, system_prompt, user_prompt))
	}
}

impl DenseIndex for QdrantStore {
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		top_n: u32,
	) -> BoxFuture<'a, Result<Vec<(String, f32)>>> {
		Box::pin(async move { Ok(self.nearest(vector, top_n).await?) })
	}

	fn collection(&self) -> &str {
		&self.collection
	}
}

async fn load_corpus(cfg: &Config, store: &QdrantStore) -> Result<Corpus> {
	let path = cfg.corpus.meta_path.as_path();

	if path.exists() {
		let corpus = Corpus::load_jsonl(path)?;

		tracing::info!(path = %path.display(), doc_count = corpus.len(), "Corpus loaded.");

		return Ok(corpus);
	}
	if !cfg.corpus.build_from_index {
		return Err(Error::Corpus {
			message: format!("Corpus file {} does not exist.", path.display()),
		});
	}

	tracing::warn!(
		path = %path.display(),
		collection = %store.collection,
		"Corpus file missing; enumerating documents from the vector index."
	);

	Ok(Corpus::new(store.scroll_documents().await?)?)
}
