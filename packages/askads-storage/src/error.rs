use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read corpus file at {path:?}: {source}")]
	Io { path: PathBuf, source: std::io::Error },
	#[error("Invalid corpus record at {path:?} line {line}: {source}")]
	Json { path: PathBuf, line: usize, source: serde_json::Error },
	#[error("Duplicate document id: {0}")]
	DuplicateId(String),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
