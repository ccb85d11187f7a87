use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful assistant for the University of Chicago MS in Applied Data Science.
Answer ONLY from the provided context. Prefer content from the Education section and the program page.
If top results are news, events, insights, research, or people pages, treat them as lower priority unless the question asks for them.
If the required information is not present in the provided context, say you don't know and suggest checking the official MS-ADS page.
Keep answers specific and concise. Always include bracketed citations like [1], [2] with URLs.
Redact personal emails/phones if present in context.
";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub corpus: Corpus,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub sparse: Sparse,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub compression: Compression,
	#[serde(default)]
	pub context: Context,
	#[serde(default)]
	pub augmentation: Augmentation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Corpus {
	/// JSONL file with one `{id, title, url, section, text}` record per line.
	pub meta_path: PathBuf,
	/// Enumerate documents from the vector index when `meta_path` does not exist.
	#[serde(default = "default_true")]
	pub build_from_index: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Cross-encoder reranker. Absent means reranking is skipped with a warning.
	pub rerank: Option<ProviderConfig>,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
	/// Prepended to every query before embedding; the dual encoder was trained with it.
	#[serde(default = "default_query_prefix")]
	pub query_prefix: String,
	/// Prepended to every passage before embedding.
	#[serde(default = "default_passage_prefix")]
	pub passage_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
	#[serde(default = "default_system_prompt")]
	pub system_prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Sparse {
	/// Terms present in more than this fraction of documents are dropped.
	pub max_df: f32,
	/// Terms present in fewer documents than this are dropped.
	pub min_df: u32,
	pub ngram_min: u32,
	pub ngram_max: u32,
}
impl Default for Sparse {
	fn default() -> Self {
		Self { max_df: 0.9, min_df: 2, ngram_min: 1, ngram_max: 2 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	pub shortlist: u32,
	pub rrf_k: u32,
	pub pool_min: u32,
	pub mmr_lambda: f32,
	pub mmr_min_select: u32,
	/// Request-time bounds on `top_k`, inclusive.
	pub min_top_k: u32,
	pub max_top_k: u32,
	pub min_shortlist: u32,
	pub max_shortlist: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: 6,
			shortlist: 60,
			rrf_k: 60,
			pool_min: 30,
			mmr_lambda: 0.55,
			mmr_min_select: 10,
			min_top_k: 3,
			max_top_k: 12,
			min_shortlist: 10,
			max_shortlist: 100,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub boost: RankingBoost,
	pub intents: Vec<IntentBucket>,
	pub rerank: RankingRerank,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			boost: RankingBoost::default(),
			intents: default_intents(),
			rerank: RankingRerank::default(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingBoost {
	/// URL substrings of canonical program pages.
	pub high_priority_patterns: Vec<String>,
	/// URL substrings of tangential pages.
	pub low_priority_patterns: Vec<String>,
	/// URL substrings penalized unless the query intent is exempt.
	pub off_intent_patterns: Vec<String>,
	pub off_intent_exempt: Vec<String>,
	pub priority_section: String,
	pub off_intent_penalty: f32,
	pub high_priority_boost: f32,
	pub section_boost: f32,
	pub low_priority_penalty: f32,
}
impl Default for RankingBoost {
	fn default() -> Self {
		Self {
			high_priority_patterns: strings(&[
				"/education/masters-programs/ms-in-applied-data-science",
				"/education/masters-programs",
				"/education/",
			]),
			low_priority_patterns: strings(&[
				"/news-events/news/",
				"/news-events/events/",
				"/news-events/insights/",
				"/research/",
				"/people/",
			]),
			off_intent_patterns: strings(&["/news-events/", "/research/"]),
			off_intent_exempt: strings(&["capstone"]),
			priority_section: "education".to_string(),
			off_intent_penalty: 0.25,
			high_priority_boost: 0.20,
			section_boost: 0.10,
			low_priority_penalty: 0.20,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentBucket {
	pub name: String,
	pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingRerank {
	pub enabled: bool,
}
impl Default for RankingRerank {
	fn default() -> Self {
		Self { enabled: true }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Compression {
	pub enabled: bool,
	pub top_sentences: u32,
}
impl Default for Compression {
	fn default() -> Self {
		Self { enabled: true, top_sentences: 8 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Context {
	pub separator: String,
	pub email_marker: String,
	pub phone_marker: String,
	pub citation_count: u32,
}
impl Default for Context {
	fn default() -> Self {
		Self {
			separator: "\n\n---\n\n".to_string(),
			email_marker: "[redacted-email]".to_string(),
			phone_marker: "[redacted-phone]".to_string(),
			citation_count: 5,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Augmentation {
	pub enabled: bool,
	/// A hit whose URL contains this path counts as canonical.
	pub canonical_path: String,
	/// A hit whose URL contains this token counts as canonical.
	pub identifying_token: String,
	/// Appended to the query, after a space, for the second pass.
	pub steering_terms: String,
}
impl Default for Augmentation {
	fn default() -> Self {
		Self {
			enabled: true,
			canonical_path: "/education/".to_string(),
			identifying_token: "ms-in-applied-data-science".to_string(),
			steering_terms:
				"program site education admissions curriculum \"MS in Applied Data Science\""
					.to_string(),
		}
	}
}

pub fn default_intents() -> Vec<IntentBucket> {
	vec![
		IntentBucket {
			name: "admissions".to_string(),
			keywords: strings(&[
				"admission",
				"admissions",
				"apply",
				"application",
				"requirements",
				"prereq",
				"prerequisite",
				"deadline",
				"GRE",
				"TOEFL",
				"IELTS",
				"resume",
				"statement",
				"letters",
			]),
		},
		IntentBucket {
			name: "curriculum".to_string(),
			keywords: strings(&[
				"core",
				"course",
				"courses",
				"curriculum",
				"credit",
				"unit",
				"track",
				"specialization",
				"elective",
			]),
		},
		IntentBucket {
			name: "capstone".to_string(),
			keywords: strings(&["capstone", "project", "showcase", "practicum"]),
		},
	]
}

fn strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

fn default_true() -> bool {
	true
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_query_prefix() -> String {
	"query: ".to_string()
}

fn default_passage_prefix() -> String {
	"passage: ".to_string()
}

fn default_temperature() -> f32 {
	0.2
}

fn default_system_prompt() -> String {
	DEFAULT_SYSTEM_PROMPT.to_string()
}
