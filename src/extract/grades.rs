// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	extract::{ExtractionContext, Extractor, text_content},
	snapshot::{GradeItem, StudentSnapshot, UNKNOWN},
};

static RATIO_RE: LazyLock<Regex> = LazyLock::new(|| {
	// `value/outOf` with comma decimals accepted, e.g. `14,5/20`.
	Regex::new(r"\b(\d{1,2}(?:[.,]\d{1,2})?)\s*/\s*(\d{1,2}(?:[.,]\d{1,2})?)\b")
		.expect("Ratio pattern should compile.")
});

/// Grading scales are plausibly bounded by /20 in this portal's ecosystem.
const MAX_SCALE: f32 = 20.0;
/// Upper bound on collected grades, mirroring the portal frontend's list size.
const GRADE_LIMIT: usize = 15;

/// Extracts `value/outOf` grade ratios and computes the /20-normalized average.
#[derive(Clone, Copy, Debug, Default)]
pub struct GradeExtractor;
impl Extractor for GradeExtractor {
	fn label(&self) -> &'static str {
		"grades"
	}

	fn extract(
		&self,
		body: &str,
		_cx: &ExtractionContext,
		snapshot: &mut StudentSnapshot,
	) -> Result<()> {
		let text = text_content(body);
		let mut seen = BTreeSet::new();
		let mut total = 0.0_f32;

		for captures in RATIO_RE.captures_iter(&text) {
			let (Some(value), Some(out_of)) =
				(parse_decimal(&captures[1]), parse_decimal(&captures[2]))
			else {
				continue;
			};

			// Dates (`12/03`) and page ratios pass the regex; the plausibility bounds and the
			// value<=outOf constraint weed most of them out.
			if !(0.0..=MAX_SCALE).contains(&value) || out_of <= 0.0 || out_of > MAX_SCALE {
				continue;
			}
			if value > out_of {
				continue;
			}
			if !seen.insert(format!("{}/{}", &captures[1], &captures[2])) {
				continue;
			}

			total += value / out_of * MAX_SCALE;
			snapshot.grades.push(GradeItem {
				subject: UNKNOWN.to_owned(),
				value,
				out_of,
				date: UNKNOWN.to_owned(),
				comment: UNKNOWN.to_owned(),
			});

			if snapshot.grades.len() >= GRADE_LIMIT {
				break;
			}
		}

		if !snapshot.grades.is_empty() {
			let mean = total / snapshot.grades.len() as f32;

			snapshot.average = Some((mean * 10.0).round() / 10.0);
		}

		Ok(())
	}
}

fn parse_decimal(raw: &str) -> Option<f32> {
	raw.replace(',', ".").parse().ok()
}
