use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use askads_service::{AskAdsService, QueryRequest};

#[derive(Debug, Parser)]
#[command(
	version = askads_cli::VERSION,
	rename_all = "kebab",
	styles = askads_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	#[arg(long, value_name = "N")]
	pub shortlist: Option<u32>,
	/// Overrides `ranking.rerank.enabled` for every query.
	#[arg(long, value_name = "BOOL")]
	pub use_reranker: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct EvalDataset {
	pub name: Option<String>,
	pub queries: Vec<EvalQuery>,
}

#[derive(Debug, Deserialize)]
pub struct EvalQuery {
	pub id: Option<String>,
	pub query: String,
	pub expected_urls: Vec<String>,
}

/// Request knobs applied to every query in a run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EvalSettings {
	pub top_k: Option<u32>,
	pub shortlist: Option<u32>,
	pub use_reranker: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
	pub dataset: EvalDatasetInfo,
	pub generated_at: String,
	pub settings: EvalSettings,
	pub summary: EvalSummary,
	pub queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
pub struct EvalDatasetInfo {
	pub name: String,
	pub query_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSummary {
	pub avg_recall_at_k: f64,
	pub avg_precision_at_k: f64,
	pub mean_rr: f64,
	pub mean_ndcg: f64,
	pub augmented_count: usize,
	pub latency_ms_p50: f64,
	pub latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
	pub id: String,
	pub query: String,
	pub query_used: String,
	pub augmented: bool,
	pub expected_count: usize,
	pub retrieved_count: usize,
	pub relevant_count: usize,
	pub recall_at_k: f64,
	pub precision_at_k: f64,
	pub rr: f64,
	pub ndcg: f64,
	pub latency_ms: f64,
	pub expected_urls: Vec<String>,
	pub retrieved_urls: Vec<String>,
}

#[derive(Debug, PartialEq)]
struct Metrics {
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	relevant_count: usize,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = askads_config::load(&args.config)?;

	askads_cli::init_tracing(&config.service.log_level);

	let dataset = load_dataset(&args.dataset)?;
	let service = AskAdsService::open(config).await?;
	let settings =
		EvalSettings { top_k: args.top_k, shortlist: args.shortlist, use_reranker: args.use_reranker };
	let output = evaluate(&service, &dataset, settings).await?;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	Ok(dataset)
}

/// Runs retrieval for every query and scores the returned URLs against the expected ones.
pub async fn evaluate(
	service: &AskAdsService,
	dataset: &EvalDataset,
	settings: EvalSettings,
) -> color_eyre::Result<EvalOutput> {
	let mut reports = Vec::with_capacity(dataset.queries.len());
	let mut latencies_ms = Vec::with_capacity(dataset.queries.len());

	for (index, entry) in dataset.queries.iter().enumerate() {
		let request = QueryRequest {
			top_k: settings.top_k,
			shortlist: settings.shortlist,
			use_reranker: settings.use_reranker,
			..QueryRequest::new(entry.query.clone())
		};
		let started = Instant::now();
		let response = service.retrieve(request).await?;
		let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
		let expected =
			entry.expected_urls.iter().map(|url| normalize_url(url)).collect::<HashSet<_>>();
		let retrieved = unique_urls(response.hits.iter().map(|hit| hit.url.as_str()));
		let metrics = compute_metrics(&retrieved, &expected);
		let id = entry.id.clone().unwrap_or_else(|| format!("q{}", index + 1));

		tracing::debug!(%id, recall = metrics.recall_at_k, latency_ms, "Query evaluated.");

		reports.push(QueryReport {
			id,
			query: entry.query.clone(),
			query_used: response.query_used,
			augmented: response.augmented,
			expected_count: expected.len(),
			retrieved_count: retrieved.len(),
			relevant_count: metrics.relevant_count,
			recall_at_k: metrics.recall_at_k,
			precision_at_k: metrics.precision_at_k,
			rr: metrics.rr,
			ndcg: metrics.ndcg,
			latency_ms,
			expected_urls: entry.expected_urls.clone(),
			retrieved_urls: retrieved,
		});
		latencies_ms.push(latency_ms);
	}

	Ok(EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "eval".to_string()),
			query_count: reports.len(),
		},
		generated_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
		settings,
		summary: summarize(&reports, &latencies_ms),
		queries: reports,
	})
}

/// Trailing slashes and surrounding whitespace do not distinguish pages.
fn normalize_url(url: &str) -> String {
	url.trim().trim_end_matches('/').to_string()
}

fn unique_urls<'a, I>(iter: I) -> Vec<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for url in iter.into_iter().map(normalize_url) {
		if seen.insert(url.clone()) {
			out.push(url);
		}
	}

	out
}

fn compute_metrics(retrieved: &[String], expected: &HashSet<String>) -> Metrics {
	let expected_count = expected.len();
	let mut relevant_count = 0_usize;
	let mut dcg = 0.0_f64;
	let mut first_hit: Option<usize> = None;

	for (idx, url) in retrieved.iter().enumerate() {
		if expected.contains(url) {
			let rank = idx + 1;

			relevant_count += 1;
			dcg += 1.0 / (rank as f64 + 1.0).log2();
			first_hit.get_or_insert(rank);
		}
	}

	let rr = first_hit.map(|rank| 1.0 / rank as f64).unwrap_or(0.0);
	let idcg = (1..=expected_count.min(retrieved.len()))
		.map(|rank| 1.0 / (rank as f64 + 1.0).log2())
		.sum::<f64>();
	let ndcg = if idcg > 0.0 { dcg / idcg } else { 0.0 };
	let precision_at_k =
		if retrieved.is_empty() { 0.0 } else { relevant_count as f64 / retrieved.len() as f64 };
	let recall_at_k =
		if expected_count == 0 { 0.0 } else { relevant_count as f64 / expected_count as f64 };

	Metrics { recall_at_k, precision_at_k, rr, ndcg, relevant_count }
}

fn summarize(reports: &[QueryReport], latencies_ms: &[f64]) -> EvalSummary {
	let count = reports.len().max(1) as f64;
	let mut sorted = latencies_ms.to_vec();

	sorted.sort_by(f64::total_cmp);

	EvalSummary {
		avg_recall_at_k: reports.iter().map(|r| r.recall_at_k).sum::<f64>() / count,
		avg_precision_at_k: reports.iter().map(|r| r.precision_at_k).sum::<f64>() / count,
		mean_rr: reports.iter().map(|r| r.rr).sum::<f64>() / count,
		mean_ndcg: reports.iter().map(|r| r.ndcg).sum::<f64>() / count,
		augmented_count: reports.iter().filter(|r| r.augmented).count(),
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
	}
}

/// Linear interpolation between closest ranks over sorted values.
fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let pos = percentile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use askads_config::{EmbeddingProviderConfig, LlmProviderConfig, ProviderConfig};
	use askads_service::{
		BoxFuture, DenseIndex, EmbeddingProvider, GenerationProvider, Providers, RerankProvider,
	};
	use askads_storage::corpus::Corpus;

	use super::*;

	const DIM: u32 = 256;

	struct HashEmbedding;

	impl EmbeddingProvider for HashEmbedding {
		fn embed<'a>(
			&'a self,
			_cfg: &'a EmbeddingProviderConfig,
			texts: &'a [String],
		) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
			let vectors =
				texts.iter().map(|text| askads_testkit::hash_embedding(text, DIM)).collect();

			Box::pin(async move { Ok(vectors) })
		}
	}

	struct Unused;

	impl RerankProvider for Unused {
		fn rerank<'a>(
			&'a self,
			_cfg: &'a ProviderConfig,
			_query: &'a str,
			_docs: &'a [String],
		) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
			Box::pin(async move { Err(eyre::eyre!("Reranker is not used in evaluation tests.")) })
		}
	}

	impl GenerationProvider for Unused {
		fn generate<'a>(
			&'a self,
			_cfg: &'a LlmProviderConfig,
			_system_prompt: &'a str,
			_user_prompt: &'a str,
		) -> BoxFuture<'a, color_eyre::Result<String>> {
			Box::pin(async move { Err(eyre::eyre!("Generation is not used in evaluation tests.")) })
		}
	}

	struct MemoryIndex(Vec<(String, Vec<f32>)>);

	impl DenseIndex for MemoryIndex {
		fn query<'a>(
			&'a self,
			vector: &'a [f32],
			top_n: u32,
		) -> BoxFuture<'a, askads_service::Result<Vec<(String, f32)>>> {
			Box::pin(async move { Ok(askads_testkit::nearest(&self.0, vector, top_n as usize)) })
		}

		fn collection(&self) -> &str {
			"askads_eval"
		}
	}

	fn service() -> AskAdsService {
		let documents = askads_testkit::sample_documents();
		let points = documents
			.iter()
			.map(|doc| {
				let vector = askads_testkit::hash_embedding(&format!("passage: {}", doc.text), DIM);

				(doc.id.clone(), vector)
			})
			.collect();
		let providers =
			Providers::new(Arc::new(HashEmbedding), Arc::new(Unused), Arc::new(Unused));

		AskAdsService::with_providers(
			askads_testkit::test_config(DIM),
			Corpus::new(documents).expect("Failed to build corpus."),
			Arc::new(MemoryIndex(points)),
			providers,
		)
		.expect("Failed to build service.")
	}

	fn urls(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	#[test]
	fn metrics_score_ranked_matches() {
		let retrieved = urls(&["a", "b", "c", "d"]);
		let expected = urls(&["b", "d", "z"]).into_iter().collect::<HashSet<_>>();
		let metrics = compute_metrics(&retrieved, &expected);
		let dcg = 1.0 / 3.0_f64.log2() + 1.0 / 5.0_f64.log2();
		let idcg = 1.0 + 1.0 / 3.0_f64.log2() + 1.0 / 4.0_f64.log2();

		assert_eq!(metrics.relevant_count, 2);
		assert!((metrics.recall_at_k - 2.0 / 3.0).abs() < 1e-12);
		assert!((metrics.precision_at_k - 0.5).abs() < 1e-12);
		assert!((metrics.rr - 0.5).abs() < 1e-12);
		assert!((metrics.ndcg - dcg / idcg).abs() < 1e-12);
	}

	#[test]
	fn metrics_handle_empty_inputs() {
		let metrics = compute_metrics(&[], &HashSet::new());

		assert_eq!(
			metrics,
			Metrics { recall_at_k: 0.0, precision_at_k: 0.0, rr: 0.0, ndcg: 0.0, relevant_count: 0 }
		);
	}

	#[test]
	fn urls_are_deduplicated_ignoring_trailing_slashes() {
		let unique = unique_urls(["https://x/a/", "https://x/a", " https://x/b"]);

		assert_eq!(unique, urls(&["https://x/a", "https://x/b"]));
	}

	#[test]
	fn percentile_interpolates() {
		assert_eq!(percentile(&[], 0.5), 0.0);
		assert_eq!(percentile(&[1.0, 2.0, 3.0], 0.5), 2.0);
		assert!((percentile(&[0.0, 10.0], 0.95) - 9.5).abs() < 1e-12);
	}

	#[test]
	fn dataset_requires_queries() {
		let path = askads_testkit::write_temp_file("json", r#"{"name":"empty","queries":[]}"#)
			.expect("Failed to write dataset.");

		assert!(load_dataset(&path).is_err());
	}

	#[tokio::test]
	async fn evaluation_reports_every_query() {
		let dataset = EvalDataset {
			name: Some("smoke".to_string()),
			queries: vec![
				EvalQuery {
					id: None,
					query: "How do I apply?".to_string(),
					expected_urls: urls(&[
						"https://datascience.uchicago.edu/education/masters-programs/ms-in-applied-data-science/how-to-apply",
					]),
				},
				EvalQuery {
					id: Some("capstone".to_string()),
					query: "capstone showcase".to_string(),
					expected_urls: Vec::new(),
				},
			],
		};
		let settings = EvalSettings { top_k: Some(6), shortlist: None, use_reranker: Some(false) };
		let output = evaluate(&service(), &dataset, settings).await.expect("Evaluation failed.");

		assert_eq!(output.dataset.query_count, 2);
		assert_eq!(output.queries[0].id, "q1");
		assert_eq!(output.queries[1].id, "capstone");
		// All six documents come back, so the expected page is always found.
		assert_eq!(output.queries[0].recall_at_k, 1.0);
		assert_eq!(output.queries[0].retrieved_count, 6);
		assert_eq!(output.summary.augmented_count, 0);
		assert!(!output.generated_at.is_empty());
	}
}
