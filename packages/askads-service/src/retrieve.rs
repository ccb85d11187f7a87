use serde::{Deserialize, Serialize};

use askads_domain::intent;

use crate::{
	AskAdsService, Error, Result, augment, context,
	embedder::Embedder,
	ranking::{self, Candidate},
};

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
	pub query: String,
	#[serde(default)]
	pub top_k: Option<u32>,
	#[serde(default)]
	pub shortlist: Option<u32>,
	#[serde(default)]
	pub use_reranker: Option<bool>,
}
impl QueryRequest {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: query.into(), top_k: None, shortlist: None, use_reranker: None }
	}
}

/// A final result: the document plus the scores that placed it.
#[derive(Debug, Clone, Serialize)]
pub struct Hit {
	pub doc_id: String,
	pub title: String,
	pub url: String,
	pub section: String,
	pub text: String,
	pub dense_rank: Option<u32>,
	pub sparse_rank: Option<u32>,
	pub fused_score: f32,
	pub boosted_score: f32,
	/// Cosine between the passage and the query the pipeline ran with. Selection ranks by this
	/// plus the boost adjustment (`boosted_score - fused_score`).
	pub relevance: f32,
	pub rerank_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrieveResponse {
	pub query: String,
	/// The query the returned hits were retrieved with.
	pub query_used: String,
	pub augmented: bool,
	pub intent: Option<String>,
	pub hits: Vec<Hit>,
	pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetrievalParams {
	pub(crate) top_k: u32,
	pub(crate) shortlist: u32,
	pub(crate) use_reranker: bool,
}

pub(crate) struct RetrievalOutcome {
	pub(crate) query: String,
	pub(crate) query_vector: Vec<f32>,
	pub(crate) query_used: String,
	pub(crate) augmented: bool,
	pub(crate) intent: Option<String>,
	pub(crate) hits: Vec<Hit>,
}

impl AskAdsService {
	/// Runs hybrid retrieval and assembles the prompt context, without generation.
	pub async fn retrieve(&self, req: QueryRequest) -> Result<RetrieveResponse> {
		let outcome = self.retrieve_hits(&req).await?;
		let embedder = self.embedder();
		let context =
			context::build_context(&embedder, &outcome.query_vector, &outcome.hits, &self.cfg)
				.await?;

		Ok(RetrieveResponse {
			query: outcome.query,
			query_used: outcome.query_used,
			augmented: outcome.augmented,
			intent: outcome.intent,
			hits: outcome.hits,
			context,
		})
	}

	pub(crate) fn embedder(&self) -> Embedder<'_> {
		Embedder::new(&self.cfg.providers.embedding, self.providers.embedding.as_ref())
	}

	/// First pass plus the optional augmented pass, which replaces the first pass entirely.
	pub(crate) async fn retrieve_hits(&self, req: &QueryRequest) -> Result<RetrievalOutcome> {
		let params = self.resolve_params(req)?;
		let query = req.query.trim().to_string();
		let embedder = self.embedder();
		let query_vector = embedder.embed_query(&query).await?;
		let mut hits = self.run_pipeline(&query, &query_vector, params).await?;
		let mut query_used = query.clone();
		let mut augmented = false;

		if augment::needs_augmentation(&hits, &self.cfg.augmentation) {
			let steered = augment::augmented_query(&query, &self.cfg.augmentation);

			if steered != query {
				tracing::info!(
					query = %query,
					first_pass_hits = hits.len(),
					"No canonical page retrieved; re-running with steering terms."
				);

				let steered_vector = embedder.embed_query(&steered).await?;

				hits = self.run_pipeline(&steered, &steered_vector, params).await?;
				query_used = steered;
				augmented = true;
			}
		}

		let intent =
			intent::classify(&query_used, &self.cfg.ranking.intents).map(|name| name.to_string());

		Ok(RetrievalOutcome { query, query_vector, query_used, augmented, intent, hits })
	}

	fn resolve_params(&self, req: &QueryRequest) -> Result<RetrievalParams> {
		let retrieval = &self.cfg.retrieval;

		if req.query.trim().is_empty() {
			return Err(Error::invalid_request("query must be non-empty."));
		}

		let top_k = req.top_k.unwrap_or(retrieval.top_k);
		let shortlist = req.shortlist.unwrap_or(retrieval.shortlist);

		if !(retrieval.min_top_k..=retrieval.max_top_k).contains(&top_k) {
			return Err(Error::invalid_request(format!(
				"top_k must be between {} and {}.",
				retrieval.min_top_k, retrieval.max_top_k
			)));
		}
		if !(retrieval.min_shortlist..=retrieval.max_shortlist).contains(&shortlist) {
			return Err(Error::invalid_request(format!(
				"shortlist must be between {} and {}.",
				retrieval.min_shortlist, retrieval.max_shortlist
			)));
		}

		Ok(RetrievalParams {
			top_k,
			shortlist,
			use_reranker: req.use_reranker.unwrap_or(self.cfg.ranking.rerank.enabled),
		})
	}

	/// One full pass: retrieve, fuse, boost, pool, diversify, rerank, truncate.
	async fn run_pipeline(
		&self,
		query: &str,
		query_vector: &[f32],
		params: RetrievalParams,
	) -> Result<Vec<Hit>> {
		let documents = self.corpus.documents();
		let dense = self
			.dense
			.query(query_vector, params.shortlist)
			.await?
			.into_iter()
			.map(|(doc_id, _distance)| doc_id)
			.collect::<Vec<_>>();
		let sparse = self
			.sparse
			.query(query, params.shortlist as usize)
			.into_iter()
			.map(|(position, _score)| documents[position].id.clone())
			.collect::<Vec<_>>();
		let mut candidates = ranking::fuse(&dense, &sparse, self.cfg.retrieval.rrf_k);
		let fused_count = candidates.len();

		candidates.retain(|candidate| self.corpus.get(&candidate.doc_id).is_some());

		if candidates.len() < fused_count {
			tracing::debug!(
				dropped = fused_count - candidates.len(),
				"Dropped index hits without corpus metadata."
			);
		}

		let intent = intent::classify(query, &self.cfg.ranking.intents);

		ranking::apply_boosts(&mut candidates, &self.corpus, intent, &self.cfg.ranking.boost);

		let pool_size = params.top_k.max(self.cfg.retrieval.pool_min) as usize;
		let pool = ranking::candidate_pool(candidates, pool_size);

		tracing::debug!(
			dense = dense.len(),
			sparse = sparse.len(),
			fused = fused_count,
			pool = pool.len(),
			intent = intent.unwrap_or("none"),
			"Candidates ranked."
		);

		if pool.is_empty() {
			return Ok(Vec::new());
		}

		let passages = pool
			.iter()
			.filter_map(|candidate| self.corpus.get(&candidate.doc_id))
			.map(|doc| doc.text.clone())
			.collect::<Vec<_>>();
		let passage_vectors = self.embedder().embed_passages(&passages).await?;
		let adjustments = pool
			.iter()
			.map(|candidate| candidate.boosted_score - candidate.fused_score)
			.collect::<Vec<_>>();
		let select = params.top_k.max(self.cfg.retrieval.mmr_min_select) as usize;
		let picks = ranking::mmr_select(
			query_vector,
			&passage_vectors,
			&adjustments,
			select,
			self.cfg.retrieval.mmr_lambda,
		);
		let mut hits = picks
			.into_iter()
			.filter_map(|pick| self.to_hit(&pool[pick.index], pick.relevance))
			.collect::<Vec<_>>();

		if params.use_reranker {
			self.rerank_hits(query, &mut hits).await?;
		}

		hits.truncate(params.top_k as usize);

		Ok(hits)
	}

	async fn rerank_hits(&self, query: &str, hits: &mut Vec<Hit>) -> Result<()> {
		let docs = hits.iter().map(|hit| hit.text.clone()).collect::<Vec<_>>();
		let Some(scores) =
			self.reranker.score(self.providers.rerank.as_ref(), query, &docs).await?
		else {
			return Ok(());
		};

		for (hit, score) in hits.iter_mut().zip(scores) {
			hit.rerank_score = Some(score);
		}

		// Stable, so equal scores keep diversity order.
		hits.sort_by(|a, b| {
			ranking::cmp_f32_desc(
				a.rerank_score.unwrap_or(f32::NAN),
				b.rerank_score.unwrap_or(f32::NAN),
			)
		});

		Ok(())
	}

	fn to_hit(&self, candidate: &Candidate, relevance: f32) -> Option<Hit> {
		let doc = self.corpus.get(&candidate.doc_id)?;

		Some(Hit {
			doc_id: doc.id.clone(),
			title: doc.title.clone(),
			url: doc.url.clone(),
			section: doc.section.clone(),
			text: doc.text.clone(),
			dense_rank: candidate.dense_rank,
			sparse_rank: candidate.sparse_rank,
			fused_score: candidate.fused_score,
			boosted_score: candidate.boosted_score,
			relevance,
			rerank_score: None,
		})
	}
}

