use crate::infra::{build_pipeline, resolve_scoring, ScoringOverrides};
use chrono::{Local, NaiveDate};
use clap::Args;
use lead_scout::config::AppConfig;
use lead_scout::error::AppError;
use lead_scout::telemetry;
use lead_scout::workflows::intake::LeadIntake;
use lead_scout::workflows::leads::export::{self, ExportFormat, LeadRow};
use lead_scout::workflows::leads::{
    CriterionKind, LeadFilter, LeadScoringConfig, PriorityTier, RunSummary, ScoringPolicy,
    WorkMode,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Raw candidate records (.json, otherwise CSV)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination file; ranked rows go to stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Output format (csv or json); defaults to the output extension
    #[arg(long, value_parser = parse_format)]
    pub(crate) format: Option<ExportFormat>,
    /// Scoring configuration file (overrides LEAD_SCOUT_CONFIG)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Reference date for publication recency (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Keep only the best N leads
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// `name,score` CSV backing the judge policies
    #[arg(long)]
    pub(crate) judge_scores: Option<PathBuf>,
    /// Scoring policy override: rules, judge or highest
    #[arg(long, value_parser = crate::infra::parse_policy)]
    pub(crate) policy: Option<ScoringPolicy>,
}

#[derive(Args, Debug)]
pub(crate) struct FilterArgs {
    /// Previously exported lead rows (.json, otherwise CSV)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Keep these priority tiers (repeatable)
    #[arg(long, value_parser = parse_priority)]
    pub(crate) priority: Vec<PriorityTier>,
    #[arg(long)]
    pub(crate) min_score: Option<u8>,
    #[arg(long)]
    pub(crate) max_score: Option<u8>,
    /// Case-insensitive substring of the name
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) title: Option<String>,
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Matches person location or company HQ
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Keep these work modes (repeatable)
    #[arg(long, value_parser = parse_work_mode)]
    pub(crate) work_mode: Vec<WorkMode>,
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[arg(long, value_parser = parse_format)]
    pub(crate) format: Option<ExportFormat>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ConfigCheckArgs {
    /// Scoring configuration file (overrides LEAD_SCOUT_CONFIG)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let app = AppConfig::load()?;
    telemetry::init(&app.telemetry)?;

    let summary = execute_score(&app, &args, std::io::stdout().lock())?;
    eprintln!("{}", render_summary(&summary));
    Ok(())
}

/// Score `args.input` and write the rows to `--output`, or to `stdout`.
pub(crate) fn execute_score<W: Write>(
    app: &AppConfig,
    args: &ScoreArgs,
    stdout: W,
) -> Result<RunSummary, AppError> {
    let scoring = resolve_scoring(
        app,
        &ScoringOverrides {
            config_path: args.config.as_deref(),
            policy: args.policy,
            top_n: args.top,
        },
    )?;
    let pipeline = build_pipeline(scoring, args.judge_scores.as_deref())?;

    let records = LeadIntake::from_path(&args.input)?;
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let run = pipeline.run(&records, as_of);
    let rows = run.rows();

    match &args.output {
        Some(path) => {
            let format = args.format.unwrap_or_else(|| ExportFormat::for_path(path));
            export::write_path(&rows, path, format)?;
        }
        None => export::write_rows(&rows, args.format.unwrap_or(ExportFormat::Csv), stdout)?,
    }

    Ok(run.summary)
}

pub(crate) fn run_filter(args: FilterArgs) -> Result<(), AppError> {
    let matched = execute_filter(&args, std::io::stdout().lock())?;
    eprintln!("{matched} lead(s) matched");
    Ok(())
}

pub(crate) fn execute_filter<W: Write>(args: &FilterArgs, stdout: W) -> Result<usize, AppError> {
    let rows = export::read_path(&args.input)?;
    let filter = LeadFilter {
        priorities: args.priority.clone(),
        min_score: args.min_score,
        max_score: args.max_score,
        name: args.name.clone(),
        title: args.title.clone(),
        company: args.company.clone(),
        location: args.location.clone(),
        work_modes: args.work_mode.clone(),
    };
    let matched: Vec<LeadRow> = filter.apply(&rows).into_iter().cloned().collect();

    match &args.output {
        Some(path) => {
            let format = args.format.unwrap_or_else(|| ExportFormat::for_path(path));
            export::write_path(&matched, path, format)?;
        }
        None => {
            let format = args
                .format
                .unwrap_or_else(|| ExportFormat::for_path(&args.input));
            export::write_rows(&matched, format, stdout)?;
        }
    }

    Ok(matched.len())
}

pub(crate) fn run_config_check(args: ConfigCheckArgs) -> Result<(), AppError> {
    let app = AppConfig::load()?;
    let source = match (&args.config, &app.scoring_path) {
        (Some(path), _) | (None, Some(path)) => path.display().to_string(),
        (None, None) => "built-in defaults".to_string(),
    };
    let scoring = resolve_scoring(
        &app,
        &ScoringOverrides {
            config_path: args.config.as_deref(),
            ..ScoringOverrides::default()
        },
    )?;

    println!("{}", render_config(&scoring, &source));
    Ok(())
}

pub(crate) fn render_summary(summary: &RunSummary) -> String {
    let mut lines = vec![format!(
        "Scored {} of {} record(s) as of {} (policy: {})",
        summary.ranked,
        summary.input,
        summary.as_of,
        summary.policy.label()
    )];

    if !summary.dropped.is_empty() {
        lines.push(format!("Dropped {} record(s):", summary.dropped.len()));
        for dropped in &summary.dropped {
            lines.push(format!(
                "  #{} {}: {}",
                dropped.index,
                dropped.name.as_deref().unwrap_or("<unnamed>"),
                dropped.reason
            ));
        }
    }

    lines.push(format!(
        "Duplicates merged: {} | Judge fallbacks: {}",
        summary.duplicates_merged, summary.judge_fallbacks
    ));
    lines.push(format!(
        "Priority: {} high, {} medium, {} low",
        summary.high, summary.medium, summary.low
    ));
    lines.join("\n")
}

pub(crate) fn render_config(scoring: &LeadScoringConfig, source: &str) -> String {
    let criteria = &scoring.criteria;
    let weights = [
        (CriterionKind::RoleRelevance, criteria.role_relevance.weight),
        (CriterionKind::CompanyType, criteria.company_type.weight),
        (CriterionKind::TechnologyMatch, criteria.technology_match.weight),
        (CriterionKind::OpennessSignal, criteria.openness_signal.weight),
        (CriterionKind::Location, criteria.location.weight),
        (CriterionKind::RecentPublication, criteria.recent_publication.weight),
    ];

    let mut lines = vec![format!("Scoring configuration OK ({source})")];
    for (criterion, weight) in weights {
        lines.push(format!("  {:<20} {:>3}", criterion.label(), weight));
    }
    lines.push(format!(
        "  Total weight {} (scores clamp at 100)",
        scoring.total_weight()
    ));
    lines.push(format!(
        "Recency window: {} month(s)",
        criteria.recent_publication.recency_months
    ));
    lines.push(format!(
        "Policy: {} | Companies: {} | Top N: {}",
        scoring.scoring.policy.label(),
        scoring.companies.len(),
        scoring
            .ranking
            .top_n
            .map(|limit| limit.to_string())
            .unwrap_or_else(|| "all".to_string())
    ));
    lines.push(format!(
        "Priority thresholds: high >= {}, medium >= {}",
        scoring.priority.high, scoring.priority.medium
    ));
    lines.join("\n")
}

fn parse_format(raw: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(raw).ok_or_else(|| format!("unknown format '{raw}' (csv, json)"))
}

fn parse_priority(raw: &str) -> Result<PriorityTier, String> {
    PriorityTier::parse(raw).ok_or_else(|| format!("unknown priority '{raw}' (high, medium, low)"))
}

fn parse_work_mode(raw: &str) -> Result<WorkMode, String> {
    WorkMode::parse(raw)
        .ok_or_else(|| format!("unknown work mode '{raw}' (remote, onsite, unknown)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_scout::config::{AppEnvironment, ServerConfig, TelemetryConfig};
    use std::fs;

    fn app_config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            scoring_path: None,
        }
    }

    fn score_args(input: PathBuf) -> ScoreArgs {
        ScoreArgs {
            input,
            output: None,
            format: None,
            config: None,
            as_of: NaiveDate::from_ymd_opt(2025, 6, 1),
            top: None,
            judge_scores: None,
            policy: None,
        }
    }

    const INPUT_CSV: &str = "Full Name,Job Title,Organization,Location,Publications\n\
Robert Fontana,\"Professor, Medical Director\",University of Michigan,,2024-03|DILI\n\
,Head of Toxicology,Pfizer,,\n\
Jane Doe,Head of Toxicology,Roche,Remote,\n";

    #[test]
    fn score_writes_ranked_csv_to_stdout() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("leads.csv");
        fs::write(&input, INPUT_CSV).expect("write input");

        let mut stdout = Vec::new();
        let summary =
            execute_score(&app_config(), &score_args(input), &mut stdout).expect("score runs");

        assert_eq!(summary.input, 3);
        assert_eq!(summary.ranked, 2);
        assert_eq!(summary.dropped.len(), 1);

        let rows = export::read_rows(stdout.as_slice(), ExportFormat::Csv).expect("rows");
        assert_eq!(rows[0].name, "Robert Fontana");
        assert_eq!(rows[0].score, 70);
        assert_eq!(rows[1].name, "Jane Doe");
        assert_eq!(rows[1].score, 60);
        assert_eq!(rows[1].work_mode, WorkMode::Remote);
    }

    #[test]
    fn score_then_filter_through_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("leads.csv");
        let output = dir.path().join("ranked.json");
        fs::write(&input, INPUT_CSV).expect("write input");

        let mut args = score_args(input);
        args.output = Some(output.clone());
        execute_score(&app_config(), &args, std::io::sink()).expect("score runs");

        let filter = FilterArgs {
            input: output,
            priority: vec![PriorityTier::Medium],
            min_score: None,
            max_score: None,
            name: None,
            title: None,
            company: Some("roche".to_string()),
            location: None,
            work_mode: Vec::new(),
            output: None,
            format: None,
        };
        let mut stdout = Vec::new();
        let matched = execute_filter(&filter, &mut stdout).expect("filter runs");

        assert_eq!(matched, 1);
        let rows = export::read_rows(stdout.as_slice(), ExportFormat::Json).expect("json rows");
        assert_eq!(rows[0].name, "Jane Doe");
    }

    #[test]
    fn judge_scores_file_feeds_highest_policy() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("leads.csv");
        let judge = dir.path().join("judge.csv");
        fs::write(&input, INPUT_CSV).expect("write input");
        fs::write(&judge, "name,score\nJane Doe,91\n").expect("write judge");

        let mut args = score_args(input);
        args.policy = Some(ScoringPolicy::Highest);
        args.judge_scores = Some(judge);
        let mut stdout = Vec::new();
        let summary = execute_score(&app_config(), &args, &mut stdout).expect("score runs");

        assert_eq!(summary.judge_fallbacks, 1);
        let rows = export::read_rows(stdout.as_slice(), ExportFormat::Csv).expect("rows");
        assert_eq!(rows[0].name, "Jane Doe");
        assert_eq!(rows[0].score, 91);
        assert_eq!(rows[0].priority, PriorityTier::High);
    }

    #[test]
    fn missing_input_is_an_intake_error() {
        let args = score_args(PathBuf::from("./definitely-missing.csv"));
        match execute_score(&app_config(), &args, std::io::sink()) {
            Err(AppError::Intake(_)) => {}
            other => panic!("expected intake error, got {other:?}"),
        }
    }

    #[test]
    fn summary_lists_dropped_records() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("leads.csv");
        fs::write(&input, INPUT_CSV).expect("write input");
        let summary =
            execute_score(&app_config(), &score_args(input), std::io::sink()).expect("runs");

        let rendered = render_summary(&summary);
        assert!(rendered.contains("Scored 2 of 3 record(s) as of 2025-06-01 (policy: rules)"));
        assert!(rendered.contains("#1 <unnamed>"));
        assert!(rendered.contains("1 medium"));
    }

    #[test]
    fn config_summary_reports_weights() {
        let rendered = render_config(&LeadScoringConfig::default(), "built-in defaults");
        assert!(rendered.contains("Total weight 125"));
        assert!(rendered.contains("Policy: rules"));
        assert!(rendered.contains("Top N: all"));
    }
}
