use chrono::NaiveDate;
use lead_scout::workflows::intake::LeadIntake;
use lead_scout::workflows::leads::export::{self, ExportFormat};
use lead_scout::workflows::leads::{
    Confidence, CriterionKind, LeadPipeline, LeadScoringConfig, PriorityTier, ScoreSource,
    WorkMode,
};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid as-of date")
}

fn sample_records() -> Vec<lead_scout::workflows::leads::RawRecord> {
    let data = include_bytes!("../fixtures/sample_leads.csv");
    LeadIntake::from_reader(&data[..], lead_scout::workflows::intake::IntakeFormat::Csv)
        .expect("fixture parses")
}

#[test]
fn sample_export_is_ranked_end_to_end() {
    let pipeline = LeadPipeline::new(LeadScoringConfig::default()).expect("default pipeline");
    let run = pipeline.run(&sample_records(), as_of());

    let summary = &run.summary;
    assert_eq!(summary.input, 6);
    assert_eq!(summary.validated, 5);
    assert_eq!(summary.duplicates_merged, 1);
    assert_eq!(summary.ranked, 4);
    assert_eq!((summary.high, summary.medium, summary.low), (1, 2, 1));
    assert_eq!(summary.dropped.len(), 1);
    assert_eq!(summary.dropped[0].index, 3);
    assert_eq!(summary.dropped[0].field, "name");

    let rows = run.rows();
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(
        names,
        ["Dr. Maria Keller", "Robert Fontana", "Priya Natarajan", "Sam Roe"]
    );
    let scores: Vec<u8> = rows.iter().map(|row| row.score).collect();
    assert_eq!(scores, [100, 70, 60, 0]);
    assert!(rows.iter().all(|row| row.score_source == ScoreSource::Rules));

    let keller = &rows[0];
    assert_eq!(keller.rank, 1);
    assert_eq!(keller.priority, PriorityTier::High);
    assert_eq!(keller.email.as_deref(), Some("maria.keller@roche.com"));
    assert_eq!(keller.email_confidence, Some(Confidence::Verified));
    assert_eq!(keller.company_hq.as_deref(), Some("Basel, Switzerland"));
    assert_eq!(keller.contributing_criteria, CriterionKind::ordered().to_vec());

    let fontana = &rows[1];
    assert_eq!(fontana.title.as_deref(), Some("Professor, Medical Director"));
    assert_eq!(fontana.publication_count, 1);
    assert_eq!(fontana.email.as_deref(), Some("robert.fontana@umich.edu"));
    assert_eq!(fontana.email_confidence, Some(Confidence::Inferred));
    assert_eq!(
        fontana.contributing_criteria,
        vec![CriterionKind::RoleRelevance, CriterionKind::RecentPublication]
    );

    let natarajan = &rows[2];
    assert_eq!(natarajan.priority, PriorityTier::Medium);
    assert!(!natarajan
        .contributing_criteria
        .contains(&CriterionKind::RecentPublication));

    let roe = &rows[3];
    assert_eq!(roe.priority, PriorityTier::Low);
    assert_eq!(roe.work_mode, WorkMode::Remote);
    assert_eq!(roe.email.as_deref(), Some("sam.roe@acmewidgets.com"));
    assert!(roe.contributing_criteria.is_empty());
}

#[test]
fn exported_files_read_back_identically() {
    let pipeline = LeadPipeline::new(LeadScoringConfig::default()).expect("default pipeline");
    let rows = pipeline.run(&sample_records(), as_of()).rows();
    let dir = tempfile::tempdir().expect("temp dir");

    for file in ["ranked.csv", "ranked.json"] {
        let path = dir.path().join(file);
        export::write_path(&rows, &path, ExportFormat::for_path(&path)).expect("export");
        let restored = export::read_path(&path).expect("read back");
        assert_eq!(restored, rows, "{file} round trip");
    }

    let csv = std::fs::read_to_string(dir.path().join("ranked.csv")).expect("csv text");
    let header = csv.lines().next().expect("header row");
    assert_eq!(header, export::LEAD_COLUMNS.join(","));
}

#[test]
fn later_reference_date_ages_out_publications() {
    let pipeline = LeadPipeline::new(LeadScoringConfig::default()).expect("default pipeline");
    let later = NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date");
    let rows = pipeline.run(&sample_records(), later).rows();

    let fontana = rows
        .iter()
        .find(|row| row.name == "Robert Fontana")
        .expect("fontana ranked");
    assert_eq!(fontana.score, 30);
    assert_eq!(fontana.priority, PriorityTier::Low);
}
