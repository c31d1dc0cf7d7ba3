//! Run reports in JSON and JSONL.
//!
//! JSON writes one document describing the whole run. JSONL writes one
//! record per line, suitable for streaming classifications as they land.

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::types::{BatchOutcome, LocalityGroup, ProblematicImage};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Summary document for one run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub source: &'a Path,
    pub total: usize,
    pub located_count: usize,
    pub problematic_count: usize,
    pub located: &'a [LocalityGroup],
    pub problematic: &'a [ProblematicImage],
}

impl<'a> RunReport<'a> {
    pub fn new(source: &'a Path, outcome: &'a BatchOutcome) -> Self {
        Self {
            source,
            total: outcome.total(),
            located_count: outcome.located_count(),
            problematic_count: outcome.problematic_count(),
            located: outcome.located(),
            problematic: outcome.problematic(),
        }
    }
}

/// A writer that serializes records to JSON or JSONL format.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> ReportWriter<W> {
    /// Create a new report writer.
    ///
    /// `pretty` only affects JSON; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write a single record.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json if self.pretty => {
                serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
            }
            OutputFormat::Json | OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
            }
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write the report for a finished run.
    ///
    /// JSON writes the whole [`RunReport`]. JSONL writes one line per
    /// image: located images first by group, then problematic ones.
    pub fn write_report(&mut self, report: &RunReport<'_>) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write(report),
            OutputFormat::JsonLines => {
                for group in report.located {
                    for image in &group.images {
                        self.write(&LocatedLine {
                            status: "located",
                            name: &image.name,
                            path: &image.path,
                            locality: group.locality.as_str(),
                        })?;
                    }
                }
                for problem in report.problematic {
                    self.write(&ProblematicLine {
                        status: "problematic",
                        name: &problem.image.name,
                        path: &problem.image.path,
                        reason: problem.reason.as_str(),
                        detail: &problem.detail,
                    })?;
                }
                Ok(())
            }
        }
    }

    /// Get the number of records written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Serialize)]
struct LocatedLine<'a> {
    status: &'static str,
    name: &'a str,
    path: &'a Path,
    locality: &'a str,
}

#[derive(Serialize)]
struct ProblematicLine<'a> {
    status: &'static str,
    name: &'a str,
    path: &'a Path,
    reason: &'static str,
    detail: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, Coordinates, ImageResource, Locality, ProblemReason};

    fn sample() -> BatchOutcome {
        let mut outcome = BatchOutcome::new();
        outcome.record(Classification::Located {
            image: ImageResource::new("a.jpg", "/photos/a.jpg"),
            coordinates: Coordinates::new(48.85667, 2.35222),
            locality: Locality::new("Paris").unwrap(),
        });
        outcome.record(Classification::Problematic {
            image: ImageResource::new("b.jpg", "/photos/b.jpg"),
            reason: ProblemReason::UnsupportedFormat,
            detail: "no GPS".to_string(),
        });
        outcome
    }

    #[test]
    fn test_write_json_report() {
        let outcome = sample();
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, OutputFormat::Json, false);
        writer
            .write_report(&RunReport::new(Path::new("/photos"), &outcome))
            .unwrap();
        assert_eq!(writer.items_written(), 1);

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["located_count"], 1);
        assert_eq!(value["located"][0]["locality"], "Paris");
        assert_eq!(value["located"][0]["images"][0]["name"], "a.jpg");
        assert_eq!(value["problematic"][0]["reason"], "unsupported-format");
    }

    #[test]
    fn test_write_jsonl_report() {
        let outcome = sample();
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer
            .write_report(&RunReport::new(Path::new("/photos"), &outcome))
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["status"], "located");
        assert_eq!(lines[0]["locality"], "Paris");
        assert_eq!(lines[1]["status"], "problematic");
        assert_eq!(lines[1]["reason"], "unsupported-format");
    }

    #[test]
    fn test_write_classification_line() {
        let mut buffer = Vec::new();
        let mut writer = ReportWriter::new(&mut buffer, OutputFormat::JsonLines, false);
        let classification = Classification::Problematic {
            image: ImageResource::new("c.jpg", "/photos/c.jpg"),
            reason: ProblemReason::LocationUnresolvable,
            detail: "no results".to_string(),
        };
        writer.write(&classification).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.ends_with('\n'));
        assert!(output.contains(r#""status":"problematic""#));
        assert!(output.contains(r#""reason":"location-unresolvable""#));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }
}
