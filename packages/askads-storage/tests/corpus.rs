use askads_storage::{Error, corpus::Corpus};

#[test]
fn loads_sample_corpus_in_file_order() {
	let docs = askads_testkit::sample_documents();
	let path = askads_testkit::write_jsonl(&docs).expect("Failed to write corpus.");
	let corpus = Corpus::load_jsonl(&path);

	std::fs::remove_file(&path).expect("Failed to remove corpus.");

	let corpus = corpus.expect("Sample corpus must load.");

	assert_eq!(corpus.documents(), docs.as_slice());
	assert_eq!(corpus.get(&docs[1].id), Some(&docs[1]));
}

#[test]
fn partial_records_are_completed() {
	let raw = concat!(
		"{\"url\": \"https://example.org/a\", \"text\": \"Alpha.\"}\n",
		"\n",
		"{\"id\": \"b\", \"title\": null, \"url\": \"https://example.org/b\"}\n",
	);
	let path = askads_testkit::write_temp_file("jsonl", raw).expect("Failed to write corpus.");
	let corpus = Corpus::load_jsonl(&path);

	std::fs::remove_file(&path).expect("Failed to remove corpus.");

	let corpus = corpus.expect("Partial records must load.");
	let docs = corpus.documents();

	assert_eq!(docs.len(), 2);
	assert_eq!(
		docs[0].id,
		askads_storage::corpus::derived_document_id("https://example.org/a", "Alpha.")
	);
	assert_eq!(docs[1].id, "b");
	assert!(docs[1].title.is_empty());
	assert!(docs[1].text.is_empty());
}

#[test]
fn malformed_line_reports_its_number() {
	let raw = "{\"id\": \"a\"}\nnot json\n";
	let path = askads_testkit::write_temp_file("jsonl", raw).expect("Failed to write corpus.");
	let err = Corpus::load_jsonl(&path).expect_err("Expected parse failure.");

	std::fs::remove_file(&path).expect("Failed to remove corpus.");

	assert!(matches!(err, Error::Json { line: 2, .. }), "Unexpected error: {err}");
}

#[test]
fn missing_file_is_an_io_error() {
	let err = Corpus::load_jsonl(std::path::Path::new("/nonexistent/meta.jsonl"))
		.expect_err("Expected read failure.");

	assert!(matches!(err, Error::Io { .. }));
}
