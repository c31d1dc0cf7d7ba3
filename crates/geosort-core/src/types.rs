//! Core data types for the geosort pipeline.
//!
//! These types describe an image as it moves from listing, through
//! coordinate extraction and reverse geocoding, into its final bucket.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Number of fractional digits kept on every coordinate.
pub const COORDINATE_PRECISION: i32 = 5;

/// One source image found by directory listing.
///
/// The record goes stale once the reorganizer moves the underlying file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResource {
    /// Just the filename portion
    pub name: String,

    /// Full path to the source file
    pub path: PathBuf,
}

impl ImageResource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rounding both components to five decimal places.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round_coordinate(latitude),
            longitude: round_coordinate(longitude),
        }
    }

    /// Whether both components are finite and inside the valid ranges.
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Round a decimal-degree value to [`COORDINATE_PRECISION`] places.
pub fn round_coordinate(value: f64) -> f64 {
    let scale = 10f64.powi(COORDINATE_PRECISION);
    (value * scale).round() / scale
}

/// Convert a degrees/minutes/seconds triple to decimal degrees.
///
/// The whole value is negated for the southern and western hemispheres.
pub fn dms_to_decimal(dms: [f64; 3], reference: char) -> f64 {
    let [degrees, minutes, seconds] = dms;
    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
    let signed = match reference.to_ascii_uppercase() {
        'S' | 'W' => -magnitude,
        _ => magnitude,
    };
    round_coordinate(signed)
}

/// A resolved place name (city). Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locality(String);

impl Locality {
    /// Returns `None` for empty or whitespace-only names.
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name for this locality: spaces and path separators
    /// become underscores, and a name made only of dots is neutralized.
    pub fn dir_name(&self) -> String {
        let name: String = self
            .0
            .chars()
            .map(|c| match c {
                ' ' | '/' | '\\' => '_',
                other => other,
            })
            .collect();
        if name.chars().all(|c| c == '.') {
            name.replace('.', "_")
        } else {
            name
        }
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an image was quarantined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemReason {
    /// No coordinates could be read from the file by any method
    UnsupportedFormat,
    /// Coordinates were found but no place could be resolved for them
    LocationUnresolvable,
}

impl ProblemReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemReason::UnsupportedFormat => "unsupported-format",
            ProblemReason::LocationUnresolvable => "location-unresolvable",
        }
    }
}

impl fmt::Display for ProblemReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one image.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Classification {
    Located {
        image: ImageResource,
        coordinates: Coordinates,
        locality: Locality,
    },
    Problematic {
        image: ImageResource,
        reason: ProblemReason,
        /// Human-readable cause, for diagnostics only
        detail: String,
    },
}

impl Classification {
    pub fn image(&self) -> &ImageResource {
        match self {
            Classification::Located { image, .. } | Classification::Problematic { image, .. } => {
                image
            }
        }
    }

    pub fn is_located(&self) -> bool {
        matches!(self, Classification::Located { .. })
    }
}

/// Images resolved to one locality, in processing order.
#[derive(Debug, Clone, Serialize)]
pub struct LocalityGroup {
    pub locality: Locality,
    pub images: Vec<ImageResource>,
}

/// A quarantined image and the reason it was set aside.
#[derive(Debug, Clone, Serialize)]
pub struct ProblematicImage {
    pub image: ImageResource,
    pub reason: ProblemReason,
    pub detail: String,
}

/// The partitioned result of one run.
///
/// Locality groups appear in the order their first image was recorded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    located: Vec<LocalityGroup>,
    problematic: Vec<ProblematicImage>,
    #[serde(skip)]
    index: HashMap<Locality, usize>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one classification to the appropriate bucket.
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Located {
                image, locality, ..
            } => {
                let slot = match self.index.get(&locality) {
                    Some(&slot) => slot,
                    None => {
                        self.located.push(LocalityGroup {
                            locality: locality.clone(),
                            images: Vec::new(),
                        });
                        self.index.insert(locality, self.located.len() - 1);
                        self.located.len() - 1
                    }
                };
                self.located[slot].images.push(image);
            }
            Classification::Problematic {
                image,
                reason,
                detail,
            } => self.problematic.push(ProblematicImage {
                image,
                reason,
                detail,
            }),
        }
    }

    pub fn located(&self) -> &[LocalityGroup] {
        &self.located
    }

    pub fn problematic(&self) -> &[ProblematicImage] {
        &self.problematic
    }

    /// Images filed under `locality`, if any.
    pub fn images_for(&self, locality: &str) -> Option<&[ImageResource]> {
        let key = Locality::new(locality)?;
        self.index
            .get(&key)
            .map(|&slot| self.located[slot].images.as_slice())
    }

    pub fn located_count(&self) -> usize {
        self.located.iter().map(|g| g.images.len()).sum()
    }

    pub fn problematic_count(&self) -> usize {
        self.problematic.len()
    }

    pub fn total(&self) -> usize {
        self.located_count() + self.problematic_count()
    }
}
