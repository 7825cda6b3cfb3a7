//! Normalized student snapshot: the one output record of a bridge invocation.
//!
//! Every field the pipeline cannot confidently extract is set to an explicit sentinel rather
//! than omitted, so downstream consumers always see a stable shape.

// self
use crate::{_prelude::*, error::FailureClassification};

/// Sentinel for facts the pipeline could not extract at all.
pub const UNKNOWN: &str = "unknown";
/// Sentinel for optional schedule details (teacher, room) absent from the page.
pub const UNSPECIFIED: &str = "unspecified";
/// Number of weekday buckets in every schedule: Monday through Friday.
pub const WEEKDAY_BUCKETS: usize = 5;

/// Minutes in a day; the exclusive upper bound for time range ends.
const MINUTES_PER_DAY: u16 = 24 * 60;

/// Half-open interval `[start, end)` in same-day wall-clock minutes.
///
/// `start < end` is an invariant; extractors discard violating inputs instead of raising.
/// Serialized as its `HH:MM-HH:MM` rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeRange {
	start: u16,
	end: u16,
}
impl TimeRange {
	/// Builds a range, rejecting empty or inverted intervals and ends past midnight.
	pub fn new(start: u16, end: u16) -> Option<Self> {
		if start < end && end <= MINUTES_PER_DAY { Some(Self { start, end }) } else { None }
	}

	/// Returns the inclusive start minute, the schedule sort key.
	pub fn start_minute(&self) -> u16 {
		self.start
	}

	/// Returns the exclusive end minute.
	pub fn end_minute(&self) -> u16 {
		self.end
	}
}
impl Display for TimeRange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(
			f,
			"{:02}:{:02}-{:02}:{:02}",
			self.start / 60,
			self.start % 60,
			self.end / 60,
			self.end % 60,
		)
	}
}
impl From<TimeRange> for String {
	fn from(value: TimeRange) -> Self {
		value.to_string()
	}
}
impl TryFrom<String> for TimeRange {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		let parse_minutes = |piece: &str| -> Option<u16> {
			let (hours, minutes) = piece.split_once(':')?;

			Some(hours.parse::<u16>().ok()? * 60 + minutes.parse::<u16>().ok()?)
		};
		let parsed = value.split_once('-').and_then(|(start, end)| {
			Self::new(parse_minutes(start.trim())?, parse_minutes(end.trim())?)
		});

		parsed.ok_or_else(|| format!("invalid time range `{value}`"))
	}
}

/// One lesson inside a weekday bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
	/// Lesson interval.
	pub time: TimeRange,
	/// Subject name as rendered by the portal.
	pub subject: String,
	/// Teacher name, or [`UNSPECIFIED`].
	pub teacher: String,
	/// Room label, or [`UNSPECIFIED`].
	pub room: String,
	/// Keyword-mapped color tag.
	pub color: String,
}

/// One homework assignment, best effort.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkItem {
	/// Subject name, or [`UNKNOWN`].
	pub subject: String,
	/// Assignment text.
	pub title: String,
	/// Due date as `dd/mm`, or [`UNKNOWN`].
	pub due_date: String,
	/// Marks the soonest assignments.
	pub urgent: bool,
	/// Completion flag when the page exposes one.
	pub done: bool,
	/// Keyword-mapped color tag.
	pub color: String,
}

/// One grade, best effort.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeItem {
	/// Subject name, or [`UNKNOWN`].
	pub subject: String,
	/// Achieved value.
	pub value: f32,
	/// Grading scale, typically 20.
	pub out_of: f32,
	/// Grade date as `dd/mm`, or [`UNKNOWN`].
	pub date: String,
	/// Teacher comment, or [`UNKNOWN`].
	pub comment: String,
}

/// One portal notice or announcement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
	/// Short heading derived from the notice text.
	pub title: String,
	/// Full notice text.
	pub body: String,
}

/// Normalized output record describing one student's current academic state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSnapshot {
	/// Student display name, or [`UNKNOWN`].
	pub name: String,
	/// Class/grade label, or [`UNKNOWN`].
	pub class_name: String,
	/// Overall /20 average when grades were found.
	pub average: Option<f32>,
	/// Class rank when the page exposes one.
	pub rank: Option<u32>,
	/// Exactly [`WEEKDAY_BUCKETS`] buckets, Monday first, each sorted by start time.
	pub schedule: Vec<Vec<ScheduleEntry>>,
	/// Upcoming homework.
	pub homework: Vec<HomeworkItem>,
	/// Recent grades.
	pub grades: Vec<GradeItem>,
	/// Portal notices.
	pub notices: Vec<Notice>,
	/// Set to [`FailureClassification::ExtractionEmpty`] when every extractor came back empty.
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub diagnostic: Option<FailureClassification>,
}
impl StudentSnapshot {
	/// Creates the all-sentinel snapshot every pipeline run starts from.
	pub fn empty() -> Self {
		Self {
			name: UNKNOWN.into(),
			class_name: UNKNOWN.into(),
			average: None,
			rank: None,
			schedule: vec![Vec::new(); WEEKDAY_BUCKETS],
			homework: Vec::new(),
			grades: Vec::new(),
			notices: Vec::new(),
			diagnostic: None,
		}
	}

	/// Checks whether no extractor contributed anything beyond sentinels.
	pub fn is_empty(&self) -> bool {
		self.name == UNKNOWN
			&& self.class_name == UNKNOWN
			&& self.average.is_none()
			&& self.rank.is_none()
			&& self.schedule.iter().all(Vec::is_empty)
			&& self.homework.is_empty()
			&& self.grades.is_empty()
			&& self.notices.is_empty()
	}

	/// Re-sorts every weekday bucket by start time ascending.
	pub fn sort_schedule(&mut self) {
		for bucket in &mut self.schedule {
			bucket.sort_by_key(|entry| entry.time.start_minute());
		}
	}
}
impl Default for StudentSnapshot {
	fn default() -> Self {
		Self::empty()
	}
}

/// Maps a subject name onto the portal frontend's color tags; unknown subjects share the
/// indigo default.
pub fn color_for_subject(subject: &str) -> &'static str {
	const COLORS: [(&str, &str); 7] = [
		("math", "bg-indigo-500"),
		("francais", "bg-pink-500"),
		("anglais", "bg-blue-500"),
		("histoire", "bg-amber-500"),
		("svt", "bg-green-500"),
		("physique", "bg-violet-500"),
		("eps", "bg-orange-500"),
	];
	let lowered = subject.to_lowercase();

	COLORS
		.iter()
		.find(|(keyword, _)| lowered.contains(keyword))
		.map(|(_, color)| *color)
		.unwrap_or("bg-indigo-500")
}
