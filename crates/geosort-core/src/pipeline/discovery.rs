//! Directory listing: finds the candidate images in a source directory.

use std::path::Path;
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::error::GeosortError;
use crate::types::ImageResource;

/// Lists candidate image files in a single directory.
pub struct FileDiscovery {
    config: DiscoveryConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// List the files directly inside `dir`.
    ///
    /// Subdirectories are never listed or descended into, so folders created
    /// by an earlier run are left alone. Entries come back sorted by file
    /// name. An unreadable directory is an error for the whole run; an
    /// unreadable entry inside it (such as a dangling symlink) is skipped.
    pub fn discover(&self, dir: &Path) -> Result<Vec<ImageResource>, GeosortError> {
        let mut images = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // Only the directory itself failing is fatal
                Err(e) if e.depth() == 0 => {
                    return Err(GeosortError::Discovery {
                        path: dir.to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry {:?}: {e}", e.path());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!("Skipping non UTF-8 file name: {:?}", entry.path());
                continue;
            };
            if !self.is_candidate(name) {
                tracing::trace!("Filtered out {name}");
                continue;
            }
            images.push(ImageResource::new(name, entry.path()));
        }

        tracing::debug!("Listed {} candidate file(s) in {:?}", images.len(), dir);
        Ok(images)
    }

    /// Apply the suffix and hidden-file filters to a file name.
    fn is_candidate(&self, name: &str) -> bool {
        if self.config.skip_hidden && name.starts_with('.') {
            return false;
        }
        if self
            .config
            .exclude_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
        {
            return false;
        }
        self.config.include_suffixes.is_empty()
            || self
                .config
                .include_suffixes
                .iter()
                .any(|suffix| name.ends_with(suffix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_is_candidate_default_excludes_video() {
        let discovery = FileDiscovery::new(DiscoveryConfig::default());

        assert!(discovery.is_candidate("photo.jpg"));
        assert!(discovery.is_candidate("photo.HEIC"));
        assert!(!discovery.is_candidate("clip.mp4"));
        assert!(!discovery.is_candidate("clip.MOV"));
        assert!(!discovery.is_candidate(".DS_Store"));
        // Suffix matching is case-sensitive
        assert!(discovery.is_candidate("clip.Mp4"));
    }

    #[test]
    fn test_is_candidate_include_list() {
        let config = DiscoveryConfig {
            include_suffixes: vec![".jpg".to_string()],
            ..DiscoveryConfig::default()
        };
        let discovery = FileDiscovery::new(config);

        assert!(discovery.is_candidate("a.jpg"));
        assert!(!discovery.is_candidate("a.png"));
    }

    #[test]
    fn test_discover_skips_directories_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.jpg");
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "video.mp4");
        std::fs::create_dir(dir.path().join("Paris")).unwrap();
        touch(&dir.path().join("Paris"), "nested.jpg");

        let discovery = FileDiscovery::new(DiscoveryConfig::default());
        let images = discovery.discover(dir.path()).unwrap();

        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
        assert_eq!(images[0].path, dir.path().join("a.jpg"));
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.jpg");
        std::os::unix::fs::symlink("/nonexistent/target.jpg", dir.path().join("b.jpg")).unwrap();
        touch(dir.path(), "c.jpg");

        let discovery = FileDiscovery::new(DiscoveryConfig::default());
        let images = discovery.discover(dir.path()).unwrap();

        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "c.jpg"]);
    }

    #[test]
    fn test_discover_missing_directory_is_error() {
        let discovery = FileDiscovery::new(DiscoveryConfig::default());
        let result = discovery.discover(Path::new("/nonexistent/geosort/inbox"));
        assert!(matches!(result, Err(GeosortError::Discovery { .. })));
    }
}
