use std::sync::OnceLock;

use askads_config::ProviderConfig;

use crate::{RerankProvider, Result};

/// Cross-encoder handle resolved on first use.
///
/// Loading fails when the provider section is missing or its headers cannot be built. A failed
/// load is logged once and every later call reports "unavailable" so retrieval proceeds in
/// diversity order. Scoring failures after a successful load are errors.
pub struct LazyReranker {
	cfg: Option<ProviderConfig>,
	loaded: OnceLock<Option<ProviderConfig>>,
}
impl LazyReranker {
	pub fn new(cfg: Option<ProviderConfig>) -> Self {
		Self { cfg, loaded: OnceLock::new() }
	}

	/// Scores every `(query, doc)` pair, or returns `None` when no reranker could be loaded.
	pub async fn score(
		&self,
		provider: &dyn RerankProvider,
		query: &str,
		docs: &[String],
	) -> Result<Option<Vec<f32>>> {
		let Some(cfg) = self.load() else {
			return Ok(None);
		};
		let scores = provider.rerank(cfg, query, docs).await?;

		if scores.len() != docs.len() {
			return Err(crate::Error::Provider {
				message: format!(
					"Reranker returned {} scores for {} documents.",
					scores.len(),
					docs.len()
				),
			});
		}

		Ok(Some(scores))
	}

	fn load(&self) -> Option<&ProviderConfig> {
		self.loaded
			.get_or_init(|| match self.try_load() {
				Ok(cfg) => {
					tracing::info!(model = %cfg.model, "Reranker loaded.");

					Some(cfg)
				},
				Err(message) => {
					tracing::warn!(%message, "Reranker could not be loaded; results keep diversity order.");

					None
				},
			})
			.as_ref()
	}

	fn try_load(&self) -> Result<ProviderConfig, String> {
		let Some(cfg) = self.cfg.as_ref() else {
			return Err("No reranker provider is configured.".to_string());
		};

		askads_providers::auth_headers(&cfg.api_key, &cfg.default_headers)
			.map_err(|err| err.to_string())?;

		Ok(cfg.clone())
	}
}
