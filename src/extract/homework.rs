// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	extract::{ExtractionContext, Extractor, dedup_key, text_content},
	snapshot::{HomeworkItem, StudentSnapshot, UNKNOWN, color_for_subject},
};

static DUE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b(\d{1,2}/\d{1,2})\b").expect("Due date pattern should compile.")
});

/// Keywords marking a text block as homework-related, lowercased.
const HOMEWORK_KEYWORDS: [&str; 9] = [
	"devoir",
	"exercice",
	"homework",
	"à faire",
	"a faire",
	"à rendre",
	"pour le",
	"apprendre",
	"réviser",
];

/// Upper bound on collected homework items, mirroring the portal frontend's list size.
const HOMEWORK_LIMIT: usize = 10;
/// The soonest assignments are flagged urgent for the frontend.
const URGENT_COUNT: usize = 2;

/// Extracts homework-looking text blocks, deduplicating near-identical ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct HomeworkExtractor;
impl Extractor for HomeworkExtractor {
	fn label(&self) -> &'static str {
		"homework"
	}

	fn extract(
		&self,
		body: &str,
		_cx: &ExtractionContext,
		snapshot: &mut StudentSnapshot,
	) -> Result<()> {
		let text = text_content(body);
		let mut seen = BTreeSet::new();

		for line in text.lines() {
			let line = line.trim();
			let lowered = line.to_lowercase();

			if line.len() < 8 || !HOMEWORK_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
			{
				continue;
			}
			if !seen.insert(dedup_key(line)) {
				continue;
			}

			let (subject, title) = split_subject_prefix(line);
			let due_date = DUE_DATE_RE
				.captures(line)
				.and_then(|captures| captures.get(1))
				.map(|m| m.as_str().to_owned())
				.unwrap_or_else(|| UNKNOWN.to_owned());
			let urgent = snapshot.homework.len() < URGENT_COUNT;
			let color = color_for_subject(&subject).to_owned();

			snapshot.homework.push(HomeworkItem {
				subject,
				title,
				due_date,
				urgent,
				done: false,
				color,
			});

			if snapshot.homework.len() >= HOMEWORK_LIMIT {
				break;
			}
		}

		Ok(())
	}
}

/// Splits a leading `SUBJECT :` prefix off a homework line when one exists.
fn split_subject_prefix(line: &str) -> (String, String) {
	if let Some((prefix, rest)) = line.split_once(':') {
		let prefix = prefix.trim();
		let rest = rest.trim();

		if !prefix.is_empty() && prefix.len() <= 32 && !rest.is_empty() {
			return (prefix.to_owned(), rest.to_owned());
		}
	}

	(UNKNOWN.to_owned(), line.to_owned())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn run(body: &str) -> Vec<HomeworkItem> {
		let mut snapshot = StudentSnapshot::empty();

		HomeworkExtractor
			.extract(body, &ExtractionContext::new("x"), &mut snapshot)
			.expect("Homework extraction should not fault.");

		snapshot.homework
	}

	#[test]
	fn collects_keyword_blocks_with_subject_and_due_date() {
		let body = r#"<ul>
			<li>Mathématiques : exercices 4 et 5 page 112 pour le 12/03</li>
			<li>Anglais : apprendre le vocabulaire</li>
			<li>Cantine fermée mercredi</li>
		</ul>"#;
		let items = run(body);

		assert_eq!(items.len(), 2);
		assert_eq!(items[0].subject, "Mathématiques");
		assert_eq!(items[0].due_date, "12/03");
		assert!(items[0].urgent);
		assert_eq!(items[1].subject, "Anglais");
		assert_eq!(items[1].due_date, UNKNOWN);
	}

	#[test]
	fn near_identical_blocks_are_deduplicated() {
		let body = "<p>Devoir: page 12!</p><p>devoir page 12</p>";
		let items = run(body);

		assert_eq!(items.len(), 1);
	}

	#[test]
	fn only_the_first_two_items_are_urgent() {
		let body = "<li>devoir un page 1</li><li>devoir deux page 2</li><li>devoir trois page 3</li>";
		let items = run(body);

		assert_eq!(items.len(), 3);
		assert!(items[0].urgent && items[1].urgent);
		assert!(!items[2].urgent);
	}
}
