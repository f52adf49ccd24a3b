use unicode_segmentation::UnicodeSegmentation;

const ELLIPSIS: &str = "...";

/// How a candidate string relates to the query, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TextMatch {
	Exact,
	Prefix,
	Substring,
}

/// Query text folded once for case-insensitive comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
	raw: String,
	folded: String,
}
impl NormalizedQuery {
	pub fn new(raw: &str) -> Self {
		let raw = raw.trim().to_string();
		let folded = raw.to_lowercase();

		Self { raw, folded }
	}

	pub fn as_str(&self) -> &str {
		&self.raw
	}

	pub fn is_blank(&self) -> bool {
		self.folded.is_empty()
	}

	pub fn match_text(&self, candidate: &str) -> Option<TextMatch> {
		if self.is_blank() {
			return None;
		}

		let candidate = candidate.to_lowercase();

		if candidate == self.folded {
			Some(TextMatch::Exact)
		} else if candidate.starts_with(&self.folded) {
			Some(TextMatch::Prefix)
		} else if candidate.contains(&self.folded) {
			Some(TextMatch::Substring)
		} else {
			None
		}
	}

	pub fn matches_any<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> bool {
		candidates.into_iter().any(|candidate| self.match_text(candidate).is_some())
	}
}

/// Cuts `text` to at most `max_chars` grapheme clusters, the cut marker included.
pub fn snippet(text: &str, max_chars: usize) -> String {
	let text = text.trim();

	if text.grapheme_indices(true).nth(max_chars).is_none() {
		return text.to_string();
	}

	let keep = max_chars.saturating_sub(char_len(ELLIPSIS));
	let cut = text.grapheme_indices(true).nth(keep).map_or(text.len(), |(cut, _)| cut);

	format!("{}{ELLIPSIS}", text[..cut].trim_end())
}

pub fn char_len(text: &str) -> usize {
	text.graphemes(true).count()
}
