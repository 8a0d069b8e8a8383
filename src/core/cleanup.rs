//! Mirror retention policy.
//!
//! Small mirrors are deleted after counting, large ones are kept so the next
//! run only has to fetch. A mirror is deleted when its size, scaled to a
//! human unit with a factor of 1024, is in bytes or kilobytes, or in
//! megabytes with a value of at most 200. `force` deletes regardless.

use crate::core::error::Result;
use std::fmt;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

const SIZE_FACTOR: f64 = 1024.0;
const UNITS: [&str; 8] = ["", "K", "M", "G", "T", "P", "E", "Z"];
const LAST_UNIT: &str = "Y";
const MAX_DELETABLE_MB: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HumanSize {
    pub value: f64,
    pub unit: String,
}

impl fmt::Display for HumanSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

impl HumanSize {
    /// Value as displayed, rounded to two decimals.
    fn displayed_value(&self) -> f64 {
        (self.value * 100.0).round() / 100.0
    }

    pub fn is_deletable(&self) -> bool {
        match self.unit.as_str() {
            "B" | "KB" => true,
            "MB" => self.displayed_value() <= MAX_DELETABLE_MB,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    Deleted,
    Kept,
    Missing,
}

/// Total size of regular files under `path`; symbolic links are skipped.
pub fn mirror_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

pub fn format_size(size_bytes: u64) -> HumanSize {
    let mut value = size_bytes as f64;
    for unit in UNITS {
        if value < SIZE_FACTOR {
            return HumanSize {
                value,
                unit: format!("{unit}B"),
            };
        }
        value /= SIZE_FACTOR;
    }
    HumanSize {
        value,
        unit: format!("{LAST_UNIT}B"),
    }
}

/// Delete the mirror at `path` when the policy allows it or `force` is set.
pub fn clean(path: &Path, force: bool) -> Result<CleanupOutcome> {
    if !path.exists() {
        log::debug!("Git {} repository missing, nothing to clean", path.display());
        return Ok(CleanupOutcome::Missing);
    }

    let size = format_size(mirror_size(path));
    log::debug!("Git {} repository size {size}", path.display());

    if !force && !size.is_deletable() {
        log::debug!("Git {} repository clean skip", path.display());
        return Ok(CleanupOutcome::Kept);
    }

    fs::remove_dir_all(path)?;
    log::debug!("Git {} repository clean", path.display());
    Ok(CleanupOutcome::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0).to_string(), "0.00 B");
        assert_eq!(format_size(1023).to_string(), "1023.00 B");
        assert_eq!(format_size(1024).to_string(), "1.00 KB");
        assert_eq!(format_size(1_253_656).to_string(), "1.20 MB");
        assert_eq!(format_size(1_253_656_678).to_string(), "1.17 GB");
        assert_eq!(format_size(u64::MAX).unit, "EB");
    }

    #[test]
    fn test_deletion_policy() {
        assert!(format_size(10).is_deletable());
        assert!(format_size(500 * 1024).is_deletable());
        assert!(format_size(200 * 1024 * 1024).is_deletable());
        assert!(!format_size(201 * 1024 * 1024).is_deletable());
        assert!(!format_size(2 * 1024 * 1024 * 1024).is_deletable());
    }

    #[test]
    fn test_mb_threshold_uses_displayed_value() {
        let size = HumanSize {
            value: 200.004,
            unit: "MB".to_string(),
        };
        assert!(size.is_deletable());
        let size = HumanSize {
            value: 200.01,
            unit: "MB".to_string(),
        };
        assert!(!size.is_deletable());
    }

    #[test]
    fn test_mirror_size_counts_regular_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), vec![b'a'; 100]).unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested").join("b.txt"), vec![b'b'; 50]).unwrap();

        assert_eq!(mirror_size(temp_dir.path()), 150);
    }

    #[cfg(unix)]
    #[test]
    fn test_mirror_size_skips_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("big.bin"), vec![0u8; 4096]).unwrap();
        fs::write(temp_dir.path().join("small.txt"), vec![b'x'; 10]).unwrap();
        std::os::unix::fs::symlink(outside.path().join("big.bin"), temp_dir.path().join("link"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("dir-link")).unwrap();

        assert_eq!(mirror_size(temp_dir.path()), 10);
    }

    #[test]
    fn test_clean_small_mirror() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = temp_dir.path().join("foo-bar");
        fs::create_dir(&mirror).unwrap();
        fs::write(mirror.join("README.md"), "# bar").unwrap();

        assert_eq!(clean(&mirror, false).unwrap(), CleanupOutcome::Deleted);
        assert!(!mirror.exists());
    }

    #[test]
    fn test_clean_missing_mirror() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            clean(&temp_dir.path().join("absent"), false).unwrap(),
            CleanupOutcome::Missing
        );
    }

    #[test]
    fn test_clean_large_mirror_kept_unless_forced() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = temp_dir.path().join("big");
        fs::create_dir(&mirror).unwrap();
        let file = fs::File::create(mirror.join("blob.bin")).unwrap();
        file.set_len(201 * 1024 * 1024).unwrap();

        assert_eq!(clean(&mirror, false).unwrap(), CleanupOutcome::Kept);
        assert!(mirror.exists());

        assert_eq!(clean(&mirror, true).unwrap(), CleanupOutcome::Deleted);
        assert!(!mirror.exists());
    }
}
