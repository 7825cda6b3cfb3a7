// self
use crate::{
	_prelude::*,
	extract::{ExtractionContext, Extractor},
	snapshot::{StudentSnapshot, UNKNOWN},
};

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("Title pattern should compile.")
});

/// Role labels the portal appends to page titles; stripped from extracted names.
const ROLE_LABELS: [&str; 7] =
	["espace élève", "espace eleve", "élève", "eleve", "parent", "professeur", "student"];

/// Extracts the student display name from the page title, falling back to a name derived from
/// the login identifier (`first.last` → `First Last`).
#[derive(Clone, Copy, Debug, Default)]
pub struct NameExtractor;
impl Extractor for NameExtractor {
	fn label(&self) -> &'static str {
		"name"
	}

	fn extract(
		&self,
		body: &str,
		cx: &ExtractionContext,
		snapshot: &mut StudentSnapshot,
	) -> Result<()> {
		if let Some(name) = name_from_title(body) {
			snapshot.name = name;

			return Ok(());
		}
		if let Some(name) = name_from_identifier(&cx.identifier) {
			snapshot.name = name;
		}

		Ok(())
	}
}

/// Searches the title for the `<product> - <name> - <role label>` pattern.
fn name_from_title(body: &str) -> Option<String> {
	let title = TITLE_RE.captures(body)?.get(1)?.as_str().trim().to_owned();
	let pieces: Vec<&str> = title.split(" - ").map(str::trim).collect();

	if pieces.len() < 2 {
		return None;
	}

	// The name sits between the product prefix and the trailing role label(s).
	let name = pieces[1..]
		.iter()
		.copied()
		.find(|piece| !piece.is_empty() && !is_role_label(piece))?
		.to_owned();

	if name == UNKNOWN { None } else { Some(name) }
}

fn is_role_label(piece: &str) -> bool {
	let lowered = piece.to_lowercase();

	ROLE_LABELS.iter().any(|label| lowered == *label)
}

/// Derives `First Last` from a `first.last`-shaped identifier.
fn name_from_identifier(identifier: &str) -> Option<String> {
	let words: Vec<String> = identifier
		.split(['.', '_', '-'])
		.filter(|word| !word.is_empty() && word.chars().all(char::is_alphabetic))
		.map(capitalize)
		.collect();

	if words.is_empty() { None } else { Some(words.join(" ")) }
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}
