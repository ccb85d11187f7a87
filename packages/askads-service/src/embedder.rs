use askads_config::EmbeddingProviderConfig;

use crate::{EmbeddingProvider, Error, Result};

/// Which side of the dual encoder a text is embedded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	Query,
	Passage,
}

/// Wraps the embedding provider so every text carries its role prefix and every vector comes
/// back L2-normalized.
pub struct Embedder<'a> {
	cfg: &'a EmbeddingProviderConfig,
	provider: &'a dyn EmbeddingProvider,
}
impl<'a> Embedder<'a> {
	pub fn new(cfg: &'a EmbeddingProviderConfig, provider: &'a dyn EmbeddingProvider) -> Self {
		Self { cfg, provider }
	}

	pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let mut vectors = self.embed(&[text.to_string()], Role::Query).await?;

		vectors.pop().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vector for the query.".to_string(),
		})
	}

	pub async fn embed_passages(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		self.embed(texts, Role::Passage).await
	}

	pub async fn embed(&self, texts: &[String], role: Role) -> Result<Vec<Vec<f32>>> {
		if texts.is_empty() {
			return Ok(Vec::new());
		}

		let prefix = match role {
			Role::Query => self.cfg.query_prefix.as_str(),
			Role::Passage => self.cfg.passage_prefix.as_str(),
		};
		let inputs = texts.iter().map(|text| format!("{prefix}{text}")).collect::<Vec<_>>();
		let vectors = self.provider.embed(self.cfg, &inputs).await?;

		if vectors.len() != inputs.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} inputs.",
					vectors.len(),
					inputs.len()
				),
			});
		}

		vectors
			.into_iter()
			.map(|mut vector| {
				if vector.len() != self.cfg.dimensions as usize {
					return Err(Error::Provider {
						message: "Embedding vector dimension mismatch.".to_string(),
					});
				}

				l2_normalize(&mut vector);

				Ok(vector)
			})
			.collect()
	}
}

/// Scales `vector` to unit length. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
	let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > f32::EPSILON {
		vector.iter_mut().for_each(|value| *value /= norm);
	}
}

pub fn dot(lhs: &[f32], rhs: &[f32]) -> f32 {
	lhs.iter().zip(rhs).map(|(l, r)| l * r).sum()
}
