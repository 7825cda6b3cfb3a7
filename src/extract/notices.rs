// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	extract::{ExtractionContext, Extractor, dedup_key, text_content},
	snapshot::{Notice, StudentSnapshot},
};

/// Keywords marking a text block as a portal notice, lowercased.
const NOTICE_KEYWORDS: [&str; 5] =
	["information", "annonce", "actualité", "actualite", "message de"];

const NOTICE_LIMIT: usize = 5;
const TITLE_LIMIT: usize = 80;

/// Extracts information/announcement blocks, deduplicating near-identical ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoticeExtractor;
impl Extractor for NoticeExtractor {
	fn label(&self) -> &'static str {
		"notices"
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

			if line.len() < 12 || !NOTICE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
			{
				continue;
			}
			if !seen.insert(dedup_key(line)) {
				continue;
			}

			snapshot.notices.push(Notice { title: truncate_title(line), body: line.to_owned() });

			if snapshot.notices.len() >= NOTICE_LIMIT {
				break;
			}
		}

		Ok(())
	}
}

fn truncate_title(line: &str) -> String {
	if line.chars().count() <= TITLE_LIMIT {
		return line.to_owned();
	}

	let mut title: String = line.chars().take(TITLE_LIMIT).collect();

	title.push('…');

	title
}
