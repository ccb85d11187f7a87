//! Pure domain rules shared by the retrieval pipeline. Nothing here performs I/O.

pub mod boost;
pub mod intent;
pub mod redact;
pub mod sentences;
