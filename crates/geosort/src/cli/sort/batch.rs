//! Batch sorting: classification with progress, report, moves, summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geosort_core::{
    BatchOutcome, Geosort, ImageResource, OrganizeSummary, PlannedMove, ReportWriter, RunReport,
};

use super::SortArgs;

/// Classify a directory's images and reorganize them (or print the plan).
pub async fn sort_directory(
    geosort: &Geosort,
    args: &SortArgs,
    images: Vec<ImageResource>,
) -> anyhow::Result<()> {
    let progress = create_progress_bar(images.len() as u64);
    let start_time = std::time::Instant::now();

    let mut located: u64 = 0;
    let mut problematic: u64 = 0;
    let outcome = geosort
        .classify_with_progress(images, |classification| {
            if classification.is_located() {
                located += 1;
            } else {
                problematic += 1;
            }
            progress.inc(1);
            progress.set_message(format!("{located} located, {problematic} problematic"));
        })
        .await;
    progress.finish_and_clear();
    let outcome = outcome?;

    if let Some(report_path) = &args.report {
        write_report(report_path, args, &outcome)?;
        tracing::info!("Report written to {:?}", report_path);
    }

    let reorganizer = geosort.reorganizer(&args.input);
    let plan = reorganizer.plan(&outcome);

    let organized = if args.dry_run {
        for line in format_plan(&plan) {
            println!("{line}");
        }
        None
    } else {
        Some(reorganizer.execute(&plan)?)
    };

    print_summary(&outcome, organized.as_ref(), start_time.elapsed());
    Ok(())
}

fn write_report(path: &Path, args: &SortArgs, outcome: &BatchOutcome) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = ReportWriter::new(BufWriter::new(file), args.format.into(), true);
    writer.write_report(&RunReport::new(&args.input, outcome))?;
    writer.flush()?;
    Ok(())
}

/// One line per planned move, for dry runs.
fn format_plan(plan: &[PlannedMove]) -> Vec<String> {
    plan.iter()
        .map(|m| format!("{} -> {}", m.from.display(), m.to.display()))
        .collect()
}

/// Create a progress bar for batch classification.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after sorting.
fn print_summary(
    outcome: &BatchOutcome,
    organized: Option<&OrganizeSummary>,
    elapsed: std::time::Duration,
) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Located:      {:>8}", outcome.located_count());
    eprintln!("    Places:       {:>8}", outcome.located().len());
    eprintln!("    Problematic:  {:>8}", outcome.problematic_count());
    eprintln!("  ------------------------------------");
    for group in outcome.located() {
        eprintln!("    {:<16}{:>6}", truncate(group.locality.as_str(), 15), group.images.len());
    }
    if !outcome.located().is_empty() {
        eprintln!("  ------------------------------------");
    }
    match organized {
        Some(summary) => {
            eprintln!("    Moved:        {:>8}", summary.moved);
            if summary.skipped > 0 {
                eprintln!("    Skipped:      {:>8}", summary.skipped);
            }
        }
        None => eprintln!("    Dry run:    no files moved"),
    }
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(max - 1).collect();
        short.push('…');
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::sort::ReportFormat;
    use geosort_core::{Classification, Coordinates, Locality, ProblemReason};
    use std::path::PathBuf;

    fn sample_outcome() -> BatchOutcome {
        let mut outcome = BatchOutcome::new();
        outcome.record(Classification::Located {
            image: ImageResource::new("a.jpg", "/photos/a.jpg"),
            coordinates: Coordinates::new(48.85667, 2.35222),
            locality: Locality::new("Paris").unwrap(),
        });
        outcome.record(Classification::Problematic {
            image: ImageResource::new("b.heic", "/photos/b.heic"),
            reason: ProblemReason::UnsupportedFormat,
            detail: "no GPS".to_string(),
        });
        outcome
    }

    fn args(report: PathBuf, format: ReportFormat) -> SortArgs {
        SortArgs {
            input: PathBuf::from("/photos"),
            destination: None,
            parallel: None,
            dry_run: true,
            no_os_metadata: false,
            report: Some(report),
            format,
            api_key: None,
        }
    }

    #[test]
    fn test_format_plan() {
        let plan = vec![PlannedMove {
            name: "a.jpg".to_string(),
            from: PathBuf::from("/photos/a.jpg"),
            to: PathBuf::from("/photos/Paris/a.jpg"),
        }];
        assert_eq!(format_plan(&plan), ["/photos/a.jpg -> /photos/Paris/a.jpg"]);
    }

    #[test]
    fn test_write_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&path, &args(path.clone(), ReportFormat::Json), &sample_outcome()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["source"], "/photos");
        assert_eq!(value["total"], 2);
        assert_eq!(value["problematic"][0]["image"]["name"], "b.heic");
    }

    #[test]
    fn test_write_report_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.jsonl");
        write_report(&path, &args(path.clone(), ReportFormat::Jsonl), &sample_outcome()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().all(|l| serde_json::from_str::<serde_json::Value>(l).is_ok()));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Paris", 15), "Paris");
        assert_eq!(truncate("Saint-Rémy-de-Provence", 10), "Saint-Rém…");
    }
}
