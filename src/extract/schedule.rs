// self
use crate::{
	_prelude::*,
	extract::{ExtractionContext, Extractor},
	snapshot::{ScheduleEntry, StudentSnapshot, TimeRange, UNSPECIFIED, color_for_subject},
};

static LESSON_RE: LazyLock<Regex> = LazyLock::new(|| {
	// The timetable is rendered as accessibility-only text nodes shaped like
	// `from 9h25 to 10h20 HISTORY` (`de 9h25 à 10h20 HISTOIRE` on French deployments).
	Regex::new(r"(?i)\b(?:from|de)\s+(\d{1,2})\s*h\s*(\d{2})\s+(?:to|à|a)\s+(\d{1,2})\s*h\s*(\d{2})\s+([^<\r\n]+)")
		.expect("Lesson pattern should compile.")
});
static TEACHER_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b(?:M\.|Mme|Mlle|Mr|Mrs|Ms)\s+[A-ZÀ-Þ][\wÀ-ÿ'-]*")
		.expect("Teacher pattern should compile.")
});
static ROOM_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)\b(?:salle|room)\s+([A-Za-z0-9][A-Za-z0-9.-]*)")
		.expect("Room pattern should compile.")
});

/// Subject tokens that mark breaks rather than lessons; such matches are discarded.
const BREAK_LABELS: [&str; 8] = [
	"RECREATION",
	"RÉCRÉATION",
	"PAUSE",
	"BREAK",
	"RECESS",
	"DEJEUNER",
	"DÉJEUNER",
	"LUNCH",
];

/// Extracts timetable entries into today's weekday bucket.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScheduleExtractor;
impl Extractor for ScheduleExtractor {
	fn label(&self) -> &'static str {
		"schedule"
	}

	fn extract(
		&self,
		body: &str,
		cx: &ExtractionContext,
		snapshot: &mut StudentSnapshot,
	) -> Result<()> {
		// Caller-built snapshots may carry fewer buckets than the standard five.
		let Some(entries) = snapshot.schedule.get_mut(cx.bucket()) else {
			return Ok(());
		};

		for captures in LESSON_RE.captures_iter(body) {
			let subject = clean_subject(&captures[5]);

			if subject.is_empty() || is_break(&subject) {
				continue;
			}

			let (Some(start), Some(end)) = (
				minutes(&captures[1], &captures[2]),
				minutes(&captures[3], &captures[4]),
			) else {
				continue;
			};
			// Inverted or empty intervals are discarded, not raised.
			let Some(time) = TimeRange::new(start, end) else {
				continue;
			};
			let container = enclosing_item(body, captures.get(0).map_or(0, |m| m.start()));
			let teacher = container
				.and_then(|block| TEACHER_RE.find(block))
				.map(|m| m.as_str().to_owned())
				.unwrap_or_else(|| UNSPECIFIED.to_owned());
			let room = container
				.and_then(|block| ROOM_RE.captures(block))
				.and_then(|room| room.get(1))
				.map(|m| m.as_str().to_owned())
				.unwrap_or_else(|| UNSPECIFIED.to_owned());
			let color = color_for_subject(&subject).to_owned();

			entries.push(ScheduleEntry { time, subject, teacher, room, color });
		}

		// Sort once after all matches are collected.
		entries.sort_by_key(|entry| entry.time.start_minute());

		Ok(())
	}
}

fn minutes(hours: &str, mins: &str) -> Option<u16> {
	let hours: u16 = hours.parse().ok()?;
	let mins: u16 = mins.parse().ok()?;

	if hours < 24 && mins < 60 { Some(hours * 60 + mins) } else { None }
}

fn clean_subject(raw: &str) -> String {
	let mut subject = String::new();

	for piece in raw.split_whitespace() {
		if !subject.is_empty() {
			subject.push(' ');
		}

		subject.push_str(piece);
	}

	subject
}

fn is_break(subject: &str) -> bool {
	let upper = subject.to_uppercase();

	BREAK_LABELS.iter().any(|label| upper.contains(label))
}

/// Returns the innermost `<li>` block around `position`, the container teacher/room sibling
/// nodes live in. Tags that merely start with `li` (`<link>`, `<line>`) do not count.
fn enclosing_item(body: &str, position: usize) -> Option<&str> {
	let start = body[..position]
		.rmatch_indices("<li")
		.map(|(idx, _)| idx)
		.find(|&idx| {
			matches!(
				body[idx + 3..].chars().next(),
				Some(c) if c == '>' || c == '/' || c.is_whitespace()
			)
		})?;
	let end = body[position..].find("</li>").map(|offset| position + offset)?;

	(start < end).then(|| &body[start..end])
}
