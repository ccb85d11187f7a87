mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Augmentation, Compression, Config, Context, Corpus, DEFAULT_SYSTEM_PROMPT,
	EmbeddingProviderConfig, IntentBucket, LlmProviderConfig, ProviderConfig, Providers, Qdrant,
	Ranking, RankingBoost, RankingRerank, Retrieval, Service, Sparse, Storage, default_intents,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(path, &raw)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::validation("service.http_bind must be non-empty."));
	}
	if cfg.corpus.meta_path.as_os_str().is_empty() {
		return Err(Error::validation("corpus.meta_path must be non-empty."));
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::validation("storage.qdrant.collection must be non-empty."));
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::validation(
			"providers.embedding.dimensions must be greater than zero.",
		));
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::validation(
			"providers.embedding.dimensions must match storage.qdrant.vector_dim.",
		));
	}
	if cfg.providers.embedding.query_prefix == cfg.providers.embedding.passage_prefix {
		return Err(Error::validation(
			"providers.embedding.query_prefix and passage_prefix must differ.",
		));
	}

	let mut keys = vec![
		("embedding", &cfg.providers.embedding.api_key),
		("llm", &cfg.providers.llm.api_key),
	];

	if let Some(rerank) = cfg.providers.rerank.as_ref() {
		keys.push(("rerank", &rerank.api_key));
	}

	for (label, key) in keys {
		if key.trim().is_empty() {
			return Err(Error::validation(format!("Provider {label} api_key must be non-empty.")));
		}
	}

	if !cfg.providers.llm.temperature.is_finite() || cfg.providers.llm.temperature < 0.0 {
		return Err(Error::validation(
			"providers.llm.temperature must be a finite number, zero or greater.",
		));
	}

	validate_sparse(cfg)?;
	validate_retrieval(cfg)?;
	validate_ranking(cfg)?;

	if cfg.compression.top_sentences == 0 {
		return Err(Error::validation("compression.top_sentences must be greater than zero."));
	}

	for (label, marker) in [
		("context.email_marker", &cfg.context.email_marker),
		("context.phone_marker", &cfg.context.phone_marker),
	] {
		if marker.trim().is_empty() {
			return Err(Error::validation(format!("{label} must be non-empty.")));
		}
	}

	if cfg.augmentation.enabled
		&& cfg.augmentation.canonical_path.trim().is_empty()
		&& cfg.augmentation.identifying_token.trim().is_empty()
	{
		return Err(Error::validation(
			"augmentation requires canonical_path or identifying_token when enabled.",
		));
	}

	Ok(())
}

fn validate_sparse(cfg: &Config) -> Result<()> {
	let sparse = &cfg.sparse;

	if !sparse.max_df.is_finite() || sparse.max_df <= 0.0 || sparse.max_df > 1.0 {
		return Err(Error::validation("sparse.max_df must be in the range (0.0, 1.0]."));
	}
	if sparse.min_df == 0 {
		return Err(Error::validation("sparse.min_df must be greater than zero."));
	}
	if sparse.ngram_min == 0 {
		return Err(Error::validation("sparse.ngram_min must be greater than zero."));
	}
	if sparse.ngram_max < sparse.ngram_min {
		return Err(Error::validation("sparse.ngram_max must be at least sparse.ngram_min."));
	}

	Ok(())
}

fn validate_retrieval(cfg: &Config) -> Result<()> {
	let retrieval = &cfg.retrieval;

	if retrieval.min_top_k == 0 {
		return Err(Error::validation("retrieval.min_top_k must be greater than zero."));
	}
	if retrieval.top_k < retrieval.min_top_k {
		return Err(Error::validation("retrieval.top_k must be at least retrieval.min_top_k."));
	}
	if retrieval.top_k > retrieval.max_top_k {
		return Err(Error::validation("retrieval.top_k must not exceed retrieval.max_top_k."));
	}
	if retrieval.min_shortlist == 0 {
		return Err(Error::validation("retrieval.min_shortlist must be greater than zero."));
	}
	if retrieval.shortlist < retrieval.min_shortlist {
		return Err(Error::validation(
			"retrieval.shortlist must be at least retrieval.min_shortlist.",
		));
	}
	if retrieval.shortlist > retrieval.max_shortlist {
		return Err(Error::validation(
			"retrieval.shortlist must not exceed retrieval.max_shortlist.",
		));
	}
	if !retrieval.mmr_lambda.is_finite() {
		return Err(Error::validation("retrieval.mmr_lambda must be a finite number."));
	}
	if !(0.0..=1.0).contains(&retrieval.mmr_lambda) {
		return Err(Error::validation("retrieval.mmr_lambda must be in the range 0.0-1.0."));
	}

	Ok(())
}

fn validate_ranking(cfg: &Config) -> Result<()> {
	let boost = &cfg.ranking.boost;

	for (label, weight) in [
		("off_intent_penalty", boost.off_intent_penalty),
		("high_priority_boost", boost.high_priority_boost),
		("section_boost", boost.section_boost),
		("low_priority_penalty", boost.low_priority_penalty),
	] {
		if !weight.is_finite() || weight < 0.0 {
			return Err(Error::validation(format!(
				"ranking.boost.{label} must be a finite number, zero or greater."
			)));
		}
	}

	for bucket in &cfg.ranking.intents {
		if bucket.name.trim().is_empty() {
			return Err(Error::validation("ranking.intents.name must be non-empty."));
		}
		if bucket.keywords.iter().all(|keyword| keyword.trim().is_empty()) {
			return Err(Error::validation(format!(
				"ranking.intents.{} must list at least one keyword.",
				bucket.name
			)));
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();

	if cfg.service.log_level.is_empty() {
		cfg.service.log_level = "info".to_string();
	}
	if cfg.providers.llm.system_prompt.trim().is_empty() {
		cfg.providers.llm.system_prompt = DEFAULT_SYSTEM_PROMPT.to_string();
	}
	if cfg.providers.rerank.as_ref().map(|rerank| rerank.api_base.trim().is_empty()).unwrap_or(false)
	{
		cfg.providers.rerank = None;
	}

	for bucket in &mut cfg.ranking.intents {
		bucket.keywords.retain(|keyword| !keyword.trim().is_empty());
	}

	cfg.augmentation.steering_terms = cfg.augmentation.steering_terms.trim().to_string();
}
