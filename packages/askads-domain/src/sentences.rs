use std::sync::LazyLock;

use regex::Regex;

// Terminal punctuation, the whitespace run after it, and the first character of the next
// sentence. Only the whitespace run is a cut point.
static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[.?!](\s+)[A-Z0-9]")
		.unwrap_or_else(|err| panic!("Invalid sentence boundary pattern: {err}"))
});

/// Splits `text` into trimmed, non-empty sentences.
///
/// A boundary is sentence-ending punctuation followed by whitespace and then an uppercase
/// ASCII letter or a digit. Abbreviations such as "Dr. Smith" are split as well.
pub fn split(text: &str) -> Vec<&str> {
	let text = text.trim();
	let mut out = Vec::new();
	let mut start = 0;

	for captures in BOUNDARY.captures_iter(text) {
		let Some(gap) = captures.get(1) else {
			continue;
		};

		push_trimmed(&mut out, &text[start..gap.start()]);

		start = gap.end();
	}

	push_trimmed(&mut out, &text[start..]);

	out
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
	let piece = piece.trim();

	if !piece.is_empty() {
		out.push(piece);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_terminal_punctuation_before_capital_or_digit() {
		let parts = split("Apply online. Deadlines vary! 3 letters are required? Yes.");

		assert_eq!(parts, vec![
			"Apply online.",
			"Deadlines vary!",
			"3 letters are required?",
			"Yes."
		]);
	}

	#[test]
	fn lowercase_continuation_is_not_a_boundary() {
		assert_eq!(split("Version 2.5 is out. see notes."), vec!["Version 2.5 is out. see notes."]);
	}

	#[test]
	fn adjacent_boundaries_share_no_characters() {
		assert_eq!(split("A. B. C."), vec!["A.", "B.", "C."]);
	}

	#[test]
	fn blank_text_yields_nothing() {
		assert!(split("   \n ").is_empty());
	}
}
