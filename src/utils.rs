/*!
 * Utility functions for promptpack
 */

use std::fs;
use std::io;
use std::path::Path;

use ignore::WalkBuilder;
use walkdir::WalkDir;

use crate::config::Config;

/// Count the entries a crawl would process, for progress tracking.
///
/// Mirrors the crawler's filtering: excluded directories are pruned
/// transitively and file rules are applied to the remainder. With
/// gitignore layering enabled the ignore walker does the pruning, so
/// the count stays aligned with what the crawl will visit.
pub fn count_files(dir: &Path, config: &Config) -> io::Result<u64> {
    let mut count = 0;

    // Walk from the canonical root so entry paths compare against the
    // resolved output path, like the crawler's.
    let root = fs::canonicalize(dir)?;
    let output_abs = config.resolved_output();

    if config.respect_gitignore {
        let rules = config.rules.clone();
        let mut walker = WalkBuilder::new(&root);
        walker
            .hidden(false)
            .ignore(false)
            .git_global(false)
            .git_exclude(false)
            .require_git(false)
            .follow_links(false)
            .filter_entry(move |entry| match entry.file_type() {
                Some(ft) if ft.is_dir() => {
                    entry.depth() == 0 || !rules.excludes_dir(&entry.file_name().to_string_lossy())
                }
                _ => true,
            });

        for entry in walker.build().filter_map(Result::ok) {
            if entry.file_type().map_or(false, |ft| !ft.is_dir())
                && output_abs.as_deref() != Some(entry.path())
                && !config
                    .rules
                    .excludes_file(&entry.file_name().to_string_lossy())
            {
                count += 1;
            }
        }
    } else {
        let walker = WalkDir::new(&root).follow_links(false).into_iter();
        for entry in walker
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && entry.depth() > 0
                    && config
                        .rules
                        .excludes_dir(&entry.file_name().to_string_lossy()))
            })
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_dir()
                && output_abs.as_deref() != Some(entry.path())
                && !config
                    .rules
                    .excludes_file(&entry.file_name().to_string_lossy())
            {
                count += 1;
            }
        }
    }

    Ok(count)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Truncate text to its last `max_chars` characters, with an ellipsis
/// prefix when anything was dropped
pub fn tail_truncate(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let tail: String = text.chars().skip(count - keep).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sizes_use_binary_units() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_tail_truncate_keeps_the_end() {
        assert_eq!(tail_truncate("short.rs", 40), "short.rs");
        let long = "a_very_long_file_name_that_wont_fit_in_the_column.rs";
        let truncated = tail_truncate(long, 20);
        assert_eq!(truncated.chars().count(), 20);
        assert!(truncated.starts_with("..."));
        assert!(truncated.ends_with(".rs"));
    }

    #[test]
    fn test_tail_truncate_is_utf8_safe() {
        let name = "héllö_wörld_with_ümläuts_and_möre_chärs.txt";
        let truncated = tail_truncate(name, 10);
        assert_eq!(truncated.chars().count(), 10);
    }
}
