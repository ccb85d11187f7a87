use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[\w.-]+@[\w.-]+\.\w+").unwrap_or_else(|err| panic!("Invalid email pattern: {err}"))
});
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b(?:\+?\d{1,2}\s*)?(?:\(?\d{3}\)?[\s.-]*)?\d{3}[\s.-]?\d{4}\b")
		.unwrap_or_else(|err| panic!("Invalid phone pattern: {err}"))
});

/// Replaces email addresses and phone numbers with the given markers.
///
/// Emails are replaced first so digits inside an address never reach the phone pattern.
pub fn redact(text: &str, email_marker: &str, phone_marker: &str) -> String {
	let text = EMAIL.replace_all(text, regex::NoExpand(email_marker));

	PHONE.replace_all(&text, regex::NoExpand(phone_marker)).into_owned()
}
