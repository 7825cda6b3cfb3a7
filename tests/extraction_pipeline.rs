// self
use pronote_bridge::{
	error::{Error, FailureClassification},
	extract::{ExtractionContext, ExtractionPipeline, Extractor, NameExtractor, Weekday},
	snapshot::{StudentSnapshot, UNKNOWN, WEEKDAY_BUCKETS},
};

/// Mimics the portal's authenticated landing page closely enough to feed every extractor.
const STUDENT_PAGE: &str = r#"<html>
<head><title>PRONOTE - Jane DOE - Espace Élève</title></head>
<body>
	<h2>Classe de 3ème B</h2>
	<ul id="timetable">
		<li>from 10h20 to 11h15 PHYSIQUE CHIMIE <span>M. Bernard</span> <span>salle C7</span></li>
		<li>from 9h25 to 10h20 HISTOIRE <span>Mme Martin</span> <span>salle 204</span></li>
		<li>from 11h15 to 11h30 RECREATION</li>
	</ul>
	<ul id="work">
		<li>Mathématiques : exercices 4 et 5 page 112 pour le 12/03</li>
		<li>Anglais : apprendre le vocabulaire</li>
	</ul>
	<ul id="notes">
		<li>Contrôle : 14,5/20</li>
		<li>Interro : 8/10</li>
	</ul>
	<p>Information : réunion parents-professeurs jeudi à 18h00</p>
</body>
</html>"#;

fn weekday_context() -> ExtractionContext {
	ExtractionContext::new("jane.doe").with_weekday(Weekday::Tuesday)
}

#[test]
fn a_recognizable_page_populates_every_section() {
	let snapshot = ExtractionPipeline::default().run(STUDENT_PAGE, &weekday_context());

	assert_eq!(snapshot.name, "Jane DOE");
	assert_eq!(snapshot.class_name, "3ème B");
	assert_eq!(snapshot.diagnostic, None);

	// Tuesday bucket, sorted by start time, break discarded.
	let bucket = &snapshot.schedule[1];

	assert_eq!(snapshot.schedule.len(), WEEKDAY_BUCKETS);
	assert_eq!(bucket.len(), 2);
	assert_eq!(bucket[0].subject, "HISTOIRE");
	assert_eq!(bucket[0].time.to_string(), "09:25-10:20");
	assert_eq!(bucket[1].subject, "PHYSIQUE CHIMIE");
	assert!(snapshot.schedule[0].is_empty());

	assert_eq!(snapshot.homework.len(), 2);
	assert_eq!(snapshot.homework[0].subject, "Mathématiques");
	assert_eq!(snapshot.homework[0].due_date, "12/03");

	assert_eq!(snapshot.grades.len(), 2);
	assert_eq!(snapshot.average, Some(15.3));

	assert_eq!(snapshot.notices.len(), 1);
	assert!(snapshot.notices[0].body.contains("réunion"));
}

#[test]
fn serialized_snapshots_keep_the_wire_shape() {
	let snapshot = ExtractionPipeline::default().run(STUDENT_PAGE, &weekday_context());
	let json = serde_json::to_string(&snapshot).expect("Snapshot should serialize.");

	assert!(json.contains("\"className\":\"3ème B\""));
	assert!(json.contains("\"dueDate\":\"12/03\""));
	assert!(json.contains("\"09:25-10:20\""));
	assert!(!json.contains("diagnostic"));
}

#[test]
fn unrecognized_markup_yields_the_empty_diagnostic() {
	let cx = ExtractionContext::new("123456").with_weekday(Weekday::Tuesday);
	let snapshot =
		ExtractionPipeline::default().run("<html><body><p>Chargement...</p></body></html>", &cx);

	assert!(snapshot.is_empty());
	assert_eq!(snapshot.name, UNKNOWN);
	assert_eq!(snapshot.diagnostic, Some(FailureClassification::ExtractionEmpty));
	assert_eq!(snapshot.schedule.len(), WEEKDAY_BUCKETS);
}

#[test]
fn a_faulting_extractor_never_blanks_the_snapshot() {
	struct FaultyExtractor;
	impl Extractor for FaultyExtractor {
		fn label(&self) -> &'static str {
			"faulty"
		}

		fn extract(
			&self,
			_body: &str,
			_cx: &ExtractionContext,
			_snapshot: &mut StudentSnapshot,
		) -> Result<(), Error> {
			Err(Error::ExtractionEmpty { detail: "synthetic fault".into() })
		}
	}

	let pipeline = ExtractionPipeline::from_extractors(vec![
		Box::new(FaultyExtractor),
		Box::new(NameExtractor),
	]);
	let snapshot = pipeline.run(STUDENT_PAGE, &weekday_context());

	assert_eq!(snapshot.name, "Jane DOE");
	assert_eq!(snapshot.diagnostic, None);
}

#[test]
fn pipeline_runs_are_deterministic() {
	let pipeline = ExtractionPipeline::default();
	let cx = weekday_context();

	assert_eq!(pipeline.run(STUDENT_PAGE, &cx), pipeline.run(STUDENT_PAGE, &cx));
}
