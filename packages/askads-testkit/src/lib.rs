//! Fixtures shared by the workspace test suites. Nothing here talks to a network service.

mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
};

use serde_json::Map;

use askads_config::{
	Augmentation, Compression, Config, Context, Corpus, EmbeddingProviderConfig,
	LlmProviderConfig, ProviderConfig, Providers, Qdrant, Ranking, Retrieval, Service, Sparse,
	Storage,
};
use askads_storage::models::Document;

pub const ADMISSIONS_ID: &str = "admissions";
pub const NEWS_ID: &str = "news-deadline";
pub const CURRICULUM_ID: &str = "curriculum";
pub const CAPSTONE_ID: &str = "capstone";
pub const PEOPLE_ID: &str = "people";
pub const EVENTS_ID: &str = "events";

const PROGRAM_BASE: &str =
	"https://datascience.uchicago.edu/education/masters-programs/ms-in-applied-data-science";

/// A complete configuration pointing at unreachable local endpoints.
pub fn test_config(vector_dim: u32) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		corpus: Corpus { meta_path: PathBuf::from("meta.jsonl"), build_from_index: false },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:1".to_string(),
				collection: "askads_test".to_string(),
				vector_dim,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "hash".to_string(),
				dimensions: vector_dim,
				timeout_ms: 1_000,
				default_headers: Map::new(),
				query_prefix: "query: ".to_string(),
				passage_prefix: "passage: ".to_string(),
			},
			rerank: Some(ProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/rerank".to_string(),
				model: "cross-encoder".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			}),
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/chat/completions".to_string(),
				model: "chat".to_string(),
				temperature: 0.2,
				timeout_ms: 1_000,
				default_headers: Map::new(),
				system_prompt: askads_config::DEFAULT_SYSTEM_PROMPT.to_string(),
			},
		},
		sparse: Sparse::default(),
		retrieval: Retrieval::default(),
		ranking: Ranking::default(),
		compression: Compression::default(),
		context: Context::default(),
		augmentation: Augmentation::default(),
	}
}

/// A small program-site corpus: canonical pages plus news, people, and event pages.
pub fn sample_documents() -> Vec<Document> {
	vec![
		doc(
			ADMISSIONS_ID,
			"How to Apply | MS in Applied Data Science",
			&format!("{PROGRAM_BASE}/how-to-apply/"),
			"education",
			"The application deadline for the autumn cohort falls in the spring. \
			 Applicants submit a resume, a statement of purpose, and two letters of recommendation. \
			 The GRE is optional. International applicants submit TOEFL or IELTS scores. \
			 Contact the admissions team at admissions@example.edu or 773-555-0199 with questions.",
		),
		doc(
			NEWS_ID,
			"Deadline extended for the summer research lab",
			"https://datascience.uchicago.edu/news-events/news/summer-lab-deadline-extended/",
			"news",
			"The deadline to apply for the summer research lab has been extended. \
			 The new deadline falls in June. Students from any program may apply before the deadline.",
		),
		doc(
			CURRICULUM_ID,
			"Curriculum | MS in Applied Data Science",
			&format!("{PROGRAM_BASE}/curriculum/"),
			"education",
			"The curriculum includes core courses, electives, and a capstone project. \
			 Students complete twelve courses. Core courses cover statistics, machine learning, \
			 and data engineering. Electives allow a specialization.",
		),
		doc(
			CAPSTONE_ID,
			"Capstone Projects | MS in Applied Data Science",
			&format!("{PROGRAM_BASE}/capstone-projects/"),
			"education",
			"The capstone project pairs students with industry partners. \
			 Teams present their work at the capstone showcase. Projects run over two quarters.",
		),
		doc(
			PEOPLE_ID,
			"Jane Doe",
			"https://datascience.uchicago.edu/people/jane-doe/",
			"people",
			"Jane Doe directs the program. Reach her at jane.doe@example.edu or 773-555-1234.",
		),
		doc(
			EVENTS_ID,
			"Online Information Session",
			"https://datascience.uchicago.edu/news-events/events/online-information-session/",
			"events",
			"Join an online information session about the program. \
			 Admissions staff answer questions about the application.",
		),
	]
}

/// Deterministic bag-of-words embedding: each lowercase alphanumeric token adds weight to a
/// BLAKE3-selected bucket. The result is L2-normalized, or all zeros for token-free text.
pub fn hash_embedding(text: &str, dim: u32) -> Vec<f32> {
	let dim = dim.max(1) as usize;
	let mut vector = vec![0.0_f32; dim];

	for token in text.split(|ch: char| !ch.is_alphanumeric()).filter(|token| !token.is_empty()) {
		let digest = blake3::hash(token.to_lowercase().as_bytes());
		let mut bucket = [0_u8; 8];

		bucket.copy_from_slice(&digest.as_bytes()[..8]);

		vector[(u64::from_le_bytes(bucket) % dim as u64) as usize] += 1.0;
	}

	let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 {
		vector.iter_mut().for_each(|value| *value /= norm);
	}

	vector
}

/// Exhaustive cosine search over pre-normalized vectors, returning `(id, 1 - cosine)`.
pub fn nearest(points: &[(String, Vec<f32>)], query: &[f32], top_n: usize) -> Vec<(String, f32)> {
	let mut scored = points
		.iter()
		.map(|(id, vector)| {
			let dot = vector.iter().zip(query).map(|(a, b)| a * b).sum::<f32>();

			(id.clone(), 1.0 - dot)
		})
		.collect::<Vec<_>>();

	scored.sort_by(|a, b| a.1.total_cmp(&b.1));
	scored.truncate(top_n);

	scored
}

pub fn write_jsonl(documents: &[Document]) -> Result<PathBuf> {
	let mut raw = String::new();

	for doc in documents {
		raw.push_str(&serde_json::to_string(doc)?);
		raw.push('\n');
	}

	write_temp_file("jsonl", &raw)
}

/// Writes `contents` to a fresh file in the system temp directory.
pub fn write_temp_file(extension: &str, contents: &str) -> Result<PathBuf> {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let mut path = env::temp_dir();

	path.push(format!("askads_test_{}_{ordinal}.{extension}", std::process::id()));

	fs::write(&path, contents)?;

	Ok(path)
}

fn doc(id: &str, title: &str, url: &str, section: &str, text: &str) -> Document {
	Document {
		id: id.to_string(),
		title: title.to_string(),
		url: url.to_string(),
		section: section.to_string(),
		text: text.to_string(),
	}
}
