//! Reorganization: moves classified images into per-locality folders.
//!
//! Work is split into a pure planning step and an executing step so a dry
//! run can show exactly what would happen.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::GeosortError;
use crate::types::{BatchOutcome, ImageResource};

/// One file move, planned but not yet performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    /// File name, unchanged by the move
    pub name: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// What an executed plan actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeSummary {
    pub moved: usize,
    /// Moves skipped because the destination already held a file
    pub skipped: usize,
    pub directories_created: usize,
}

/// Plans and performs moves into locality folders under one root.
pub struct Reorganizer {
    root: PathBuf,
    problematic_dir: String,
}

impl Reorganizer {
    pub fn new(root: impl Into<PathBuf>, problematic_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            problematic_dir: problematic_dir.into(),
        }
    }

    /// Reorganizer for images listed from `source`, honoring the
    /// configured destination.
    pub fn from_config(config: &Config, source: &Path) -> Self {
        Self::new(
            config.destination_for(source),
            config.organize.problematic_dir.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder that quarantined images go into.
    pub fn problematic_root(&self) -> PathBuf {
        self.root.join(&self.problematic_dir)
    }

    /// Plan every move for a run: located groups first, in group order,
    /// then the problematic images.
    pub fn plan(&self, outcome: &BatchOutcome) -> Vec<PlannedMove> {
        let mut moves = Vec::with_capacity(outcome.total());

        for group in outcome.located() {
            let dir = self.root.join(group.locality.dir_name());
            moves.extend(group.images.iter().map(|image| planned(image, &dir)));
        }

        let problematic = self.problematic_root();
        moves.extend(
            outcome
                .problematic()
                .iter()
                .map(|p| planned(&p.image, &problematic)),
        );

        moves
    }

    /// Perform a plan.
    ///
    /// The problematic folder is always created, even when empty. A file
    /// already present at a destination is never overwritten; that move is
    /// skipped and counted.
    pub fn execute(&self, plan: &[PlannedMove]) -> Result<OrganizeSummary, GeosortError> {
        let mut summary = OrganizeSummary::default();

        self.ensure_dir(&self.problematic_root(), &mut summary)?;

        for planned in plan {
            if let Some(parent) = planned.to.parent() {
                self.ensure_dir(parent, &mut summary)?;
            }

            if planned.to.exists() {
                tracing::warn!(
                    "Skipping {}: {} already exists",
                    planned.name,
                    planned.to.display()
                );
                summary.skipped += 1;
                continue;
            }

            move_file(&planned.from, &planned.to).map_err(|source| GeosortError::Organize {
                path: planned.from.clone(),
                source,
            })?;
            tracing::debug!("Moved {} -> {}", planned.from.display(), planned.to.display());
            summary.moved += 1;
        }

        tracing::info!(
            "Moved {} files ({} skipped, {} folders created)",
            summary.moved,
            summary.skipped,
            summary.directories_created
        );
        Ok(summary)
    }

    fn ensure_dir(&self, dir: &Path, summary: &mut OrganizeSummary) -> Result<(), GeosortError> {
        if dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|source| GeosortError::Organize {
            path: dir.to_path_buf(),
            source,
        })?;
        summary.directories_created += 1;
        Ok(())
    }
}

fn planned(image: &ImageResource, dir: &Path) -> PlannedMove {
    PlannedMove {
        name: image.name.clone(),
        from: image.path.clone(),
        to: dir.join(&image.name),
    }
}

/// Rename, falling back to copy and delete when the destination is on
/// another filesystem.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if needs_copy(&e) && from.is_file() => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        result => result,
    }
}

/// Only a cross-device rename is worth retrying as copy and delete.
fn needs_copy(rename_err: &io::Error) -> bool {
    rename_err.kind() == io::ErrorKind::CrossesDevices
}
