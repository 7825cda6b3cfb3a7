//! Resilient extraction pipeline.
//!
//! The authenticated page's exact markup is unknown in advance and may vary between
//! deployments, so extraction is a sequence of independent, best-effort extractors writing to
//! disjoint snapshot fields. An error inside one extractor is caught and logged at the pipeline
//! level, leaving that extractor's fields at their sentinel defaults; one brittle pattern never
//! blanks the whole snapshot, and the pipeline itself never fails.

/// Class/grade-level extraction.
pub mod class;
/// Grade ratio extraction and averaging.
pub mod grades;
/// Homework block extraction.
pub mod homework;
/// Student display name extraction.
pub mod name;
/// Notice/announcement extraction.
pub mod notices;
/// Timetable extraction.
pub mod schedule;

pub use class::*;
pub use grades::*;
pub use homework::*;
pub use name::*;
pub use notices::*;
pub use schedule::*;

// crates.io
pub use time::Weekday;
use time::OffsetDateTime;
// self
use crate::{
	_prelude::*,
	error::FailureClassification,
	obs::{BridgeStage, StageOutcome, StageSpan, record_stage},
	snapshot::StudentSnapshot,
};
#[cfg(feature = "reqwest")] use crate::session::AuthSession;

static TAG_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Tag pattern should compile."));

/// Per-invocation context shared by every extractor.
#[derive(Clone, Debug)]
pub struct ExtractionContext {
	/// Login identifier, used as a display name fallback; never the secret.
	pub identifier: String,
	/// Weekday the schedule bucket assignment is based on.
	pub weekday: Weekday,
}
impl ExtractionContext {
	/// Creates a context for the identifier, pinned to today's weekday.
	pub fn new(identifier: impl Into<String>) -> Self {
		Self { identifier: identifier.into(), weekday: OffsetDateTime::now_utc().weekday() }
	}

	/// Overrides the weekday; tests pin this for determinism.
	pub fn with_weekday(mut self, weekday: Weekday) -> Self {
		self.weekday = weekday;

		self
	}

	/// Returns the schedule bucket index for the context's weekday.
	pub fn bucket(&self) -> usize {
		weekday_bucket(self.weekday)
	}
}

/// Maps a weekday onto its Monday-first schedule bucket; Saturday and Sunday map to Monday as
/// the nearest instructional day.
pub fn weekday_bucket(weekday: Weekday) -> usize {
	match weekday {
		Weekday::Monday | Weekday::Saturday | Weekday::Sunday => 0,
		Weekday::Tuesday => 1,
		Weekday::Wednesday => 2,
		Weekday::Thursday => 3,
		Weekday::Friday => 4,
	}
}

/// One isolated, best-effort fact extractor.
///
/// Extractors write only to their own snapshot fields, so execution order never affects
/// correctness. Absence of data is not an error; `Err` is reserved for genuine faults and is
/// swallowed (and logged) by the pipeline.
pub trait Extractor: Send + Sync {
	/// Returns a stable label for logging.
	fn label(&self) -> &'static str;

	/// Scans the page body and populates the extractor's snapshot fields.
	fn extract(
		&self,
		body: &str,
		cx: &ExtractionContext,
		snapshot: &mut StudentSnapshot,
	) -> Result<()>;
}

/// Runs every extractor over the authenticated page and merges their outputs.
pub struct ExtractionPipeline {
	extractors: Vec<Box<dyn Extractor>>,
}
impl ExtractionPipeline {
	/// Builds the pipeline from an explicit extractor list.
	pub fn from_extractors(extractors: Vec<Box<dyn Extractor>>) -> Self {
		Self { extractors }
	}

	/// Runs the pipeline over a page body.
	///
	/// Never fails: absent data yields sentinel values, and a snapshot that stayed entirely
	/// empty is flagged with [`FailureClassification::ExtractionEmpty`] rather than raised.
	pub fn run(&self, body: &str, cx: &ExtractionContext) -> StudentSnapshot {
		record_stage(BridgeStage::Extract, StageOutcome::Attempt);

		let _guard = StageSpan::new(BridgeStage::Extract, "run").entered();
		let mut snapshot = StudentSnapshot::empty();

		for extractor in &self.extractors {
			if let Err(_error) = extractor.extract(body, cx, &mut snapshot) {
				#[cfg(feature = "tracing")]
				tracing::warn!(extractor = extractor.label(), error = %_error, "extractor failed");
			}
		}

		snapshot.sort_schedule();

		if snapshot.is_empty() {
			snapshot.diagnostic = Some(FailureClassification::ExtractionEmpty);

			record_stage(BridgeStage::Extract, StageOutcome::Failure);
		} else {
			record_stage(BridgeStage::Extract, StageOutcome::Success);
		}

		snapshot
	}

	/// Runs the pipeline over an authenticated session's final page.
	#[cfg(feature = "reqwest")]
	pub fn extract(&self, session: &AuthSession, cx: &ExtractionContext) -> StudentSnapshot {
		self.run(&session.page().body, cx)
	}
}
impl Default for ExtractionPipeline {
	fn default() -> Self {
		Self::from_extractors(vec![
			Box::new(NameExtractor),
			Box::new(ClassExtractor),
			Box::new(ScheduleExtractor),
			Box::new(HomeworkExtractor),
			Box::new(GradeExtractor),
			Box::new(NoticeExtractor),
		])
	}
}
impl Debug for ExtractionPipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let labels: Vec<_> = self.extractors.iter().map(|extractor| extractor.label()).collect();

		f.debug_struct("ExtractionPipeline").field("extractors", &labels).finish()
	}
}

/// Strips markup and collapses whitespace runs so extractors can scan plain text.
pub(crate) fn text_content(body: &str) -> String {
	let text = TAG_RE.replace_all(body, "\n");
	let mut out = String::with_capacity(text.len());

	for line in text.lines() {
		let line = line.trim();

		if !line.is_empty() {
			out.push_str(line);
			out.push('\n');
		}
	}

	out
}

/// Normalizes a text block into a dedup key: lowercase alphanumerics only.
pub(crate) fn dedup_key(text: &str) -> String {
	text.chars().filter(char::is_ascii_alphanumeric).map(|ch| ch.to_ascii_lowercase()).collect()
}
