pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Index error: {message}")]
	Index { message: String },
	#[error("Corpus error: {message}")]
	Corpus { message: String },
}
impl Error {
	pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into() }
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<askads_storage::Error> for Error {
	fn from(err: askads_storage::Error) -> Self {
		match err {
			askads_storage::Error::Qdrant(inner) => Self::Index { message: inner.to_string() },
			askads_storage::Error::InvalidArgument(message) => Self::Index { message },
			other => Self::Corpus { message: other.to_string() },
		}
	}
}
