// self
use crate::{
	_prelude::*,
	extract::{ExtractionContext, Extractor, text_content},
	snapshot::StudentSnapshot,
};

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
	// Digit + ordinal level suffix + optional section letter, e.g. `3ème B`, `2nde A`, `6e`.
	Regex::new(r"\b([1-9])\s*((?i:ère|ere|ème|eme|nde|nd|e))(?:\s*([A-Z]))?\b")
		.expect("Class pattern should compile.")
});

/// Extracts the grade-level token from anywhere in the page text.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassExtractor;
impl Extractor for ClassExtractor {
	fn label(&self) -> &'static str {
		"class"
	}

	fn extract(
		&self,
		body: &str,
		_cx: &ExtractionContext,
		snapshot: &mut StudentSnapshot,
	) -> Result<()> {
		let text = text_content(body);

		if let Some(captures) = CLASS_RE.captures(&text) {
			let level = &captures[1];
			let suffix = captures[2].to_lowercase();
			let section = captures.get(3).map(|m| format!(" {}", m.as_str())).unwrap_or_default();

			snapshot.class_name = format!("{level}{suffix}{section}");
		}

		Ok(())
	}
}
