//! Embedded EXIF GPS extraction.

use async_trait::async_trait;
use exif::{In, Reader, Tag, Value};
use image::ImageReader;
use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{dms_to_decimal, Coordinates};

use super::extractor::{CoordinateSource, SourceOutcome};

/// Reads GPS coordinates from an image's embedded EXIF block.
///
/// The file is checked structurally first (format sniffing plus a header
/// read for dimensions, no pixel decode). A file that is not an image stops
/// the fallback chain; an image without EXIF or without GPS data lets the
/// next source try.
#[derive(Debug, Default)]
pub struct ExifSource;

#[async_trait]
impl CoordinateSource for ExifSource {
    fn name(&self) -> &str {
        "exif"
    }

    async fn probe(&self, path: &Path) -> PipelineResult<SourceOutcome> {
        let path_owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::probe_sync(&path_owned))
            .await
            .map_err(|e| PipelineError::Task {
                message: format!("EXIF task join error: {e}"),
            })?
    }
}

impl ExifSource {
    /// Synchronous probe (runs in spawn_blocking).
    pub fn probe_sync(path: &Path) -> PipelineResult<SourceOutcome> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let mut reader = BufReader::new(file);

        let guessed = ImageReader::new(&mut reader)
            .with_guessed_format()
            .map_err(|e| io_error(path, e))?;
        if guessed.format().is_none() {
            return Ok(SourceOutcome::Unsupported(
                "unrecognized image format".to_string(),
            ));
        }
        if let Err(e) = guessed.into_dimensions() {
            return Ok(SourceOutcome::Unsupported(format!(
                "not a readable image: {e}"
            )));
        }

        reader.rewind().map_err(|e| io_error(path, e))?;
        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                return Ok(SourceOutcome::Missing("no EXIF metadata".to_string()));
            }
            Err(e) => {
                tracing::debug!("Unreadable EXIF in {:?}: {e}", path);
                return Ok(SourceOutcome::Missing(format!(
                    "unreadable EXIF metadata: {e}"
                )));
            }
        };

        Ok(Self::gps_coordinates(&exif))
    }

    /// Decode latitude/longitude from the GPS fields, if present.
    fn gps_coordinates(exif: &exif::Exif) -> SourceOutcome {
        let (Some(lat), Some(lon)) = (
            exif.get_field(Tag::GPSLatitude, In::PRIMARY),
            exif.get_field(Tag::GPSLongitude, In::PRIMARY),
        ) else {
            return SourceOutcome::Missing("no GPS block in EXIF metadata".to_string());
        };

        let latitude =
            Self::decimal_degrees(&lat.value, exif.get_field(Tag::GPSLatitudeRef, In::PRIMARY));
        let longitude = Self::decimal_degrees(
            &lon.value,
            exif.get_field(Tag::GPSLongitudeRef, In::PRIMARY),
        );

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                SourceOutcome::Found(Coordinates::new(latitude, longitude))
            }
            _ => SourceOutcome::Missing("incomplete GPS block".to_string()),
        }
    }

    fn decimal_degrees(coord: &Value, reference: Option<&exif::Field>) -> Option<f64> {
        let dms = Self::parse_dms(coord)?;
        let hemisphere = Self::parse_reference(&reference?.value)?;
        Some(dms_to_decimal(dms, hemisphere))
    }

    /// Degrees, minutes, seconds from three EXIF rationals.
    fn parse_dms(value: &Value) -> Option<[f64; 3]> {
        match value {
            Value::Rational(r) if r.len() >= 3 => {
                Some([r[0].to_f64(), r[1].to_f64(), r[2].to_f64()])
            }
            _ => None,
        }
    }

    /// First letter of an ASCII reference field ("N", "S", "E", "W").
    fn parse_reference(value: &Value) -> Option<char> {
        match value {
            Value::Ascii(parts) => parts
                .first()
                .and_then(|p| p.first())
                .map(|&b| char::from(b)),
            _ => None,
        }
    }
}

fn io_error(path: &Path, e: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}
