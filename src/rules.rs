/*!
 * Ignore rules for directory crawling
 *
 * A rule set decides, from an entry's name alone, whether the crawler
 * skips it. Directories are matched against directory name patterns,
 * files against file name patterns and extension lists. Directory
 * exclusion is transitive: nothing beneath an excluded directory is
 * ever visited.
 */

use std::path::Path;

use glob_match::glob_match;
use once_cell::sync::Lazy;

/// Directory names skipped unless overridden
pub static DEFAULT_DIR_PATTERNS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "__pycache__",
        ".git",
        "node_modules",
        "venv",
        ".venv",
        "env",
        ".env",
        "build",
        "dist",
        ".pytest_cache",
        "target",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

/// File name patterns skipped unless overridden
pub static DEFAULT_FILE_PATTERNS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "*.pyc",
        "*.pyo",
        "*.pyd",
        ".DS_Store",
        "Thumbs.db",
        "*.log",
        "*.sqlite",
        "*.db",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

/// Extensions of files skipped unless overridden
pub static DEFAULT_EXCLUDED_EXTENSIONS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".mp3", ".mp4", ".avi", ".mov", ".zip", ".tar",
        ".gz", ".7z", ".exe", ".dll", ".so", ".dylib",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

/// Compiled ignore rules applied during a crawl
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Glob patterns matched against directory names
    dir_patterns: Vec<String>,
    /// Glob patterns matched against file names
    file_patterns: Vec<String>,
    /// Extensions that exclude a file, lowercase without the dot
    denied_extensions: Vec<String>,
    /// When non-empty, only files with these extensions are kept
    allowed_extensions: Vec<String>,
    /// Match name patterns case-insensitively
    case_insensitive: bool,
}

impl RuleSet {
    /// Build a rule set from raw pattern and extension lists.
    ///
    /// Extensions are normalized to lowercase with any leading dot
    /// stripped; extension matching is always case-insensitive.
    pub fn new(
        dir_patterns: Vec<String>,
        file_patterns: Vec<String>,
        denied_extensions: Vec<String>,
        allowed_extensions: Vec<String>,
        case_insensitive: bool,
    ) -> Self {
        Self {
            dir_patterns,
            file_patterns,
            denied_extensions: normalize_extensions(denied_extensions),
            allowed_extensions: normalize_extensions(allowed_extensions),
            case_insensitive,
        }
    }

    /// Rule set with the built-in default patterns and extensions
    pub fn defaults() -> Self {
        Self::new(
            DEFAULT_DIR_PATTERNS.clone(),
            DEFAULT_FILE_PATTERNS.clone(),
            DEFAULT_EXCLUDED_EXTENSIONS.clone(),
            Vec::new(),
            false,
        )
    }

    /// Whether a directory with this name is excluded
    pub fn excludes_dir(&self, name: &str) -> bool {
        self.matches_any(&self.dir_patterns, name)
    }

    /// Whether a file with this name is excluded
    pub fn excludes_file(&self, name: &str) -> bool {
        if self.matches_any(&self.file_patterns, name) {
            return true;
        }

        match extension_of(name) {
            Some(ext) => {
                if self.denied_extensions.iter().any(|e| e == &ext) {
                    return true;
                }
                !self.allowed_extensions.is_empty()
                    && !self.allowed_extensions.iter().any(|e| e == &ext)
            }
            // Extensionless files pass the deny list but fail a
            // non-empty allow list.
            None => !self.allowed_extensions.is_empty(),
        }
    }

    /// Directory name patterns in this rule set
    pub fn dir_patterns(&self) -> &[String] {
        &self.dir_patterns
    }

    /// File name patterns in this rule set
    pub fn file_patterns(&self) -> &[String] {
        &self.file_patterns
    }

    /// Denied extensions, dotted for display and persistence
    pub fn denied_extensions_dotted(&self) -> Vec<String> {
        self.denied_extensions.iter().map(|e| format!(".{}", e)).collect()
    }

    fn matches_any(&self, patterns: &[String], name: &str) -> bool {
        if self.case_insensitive {
            let name = name.to_lowercase();
            patterns
                .iter()
                .any(|p| glob_match(&p.to_lowercase(), &name))
        } else {
            patterns.iter().any(|p| glob_match(p, name))
        }
    }
}

/// Lowercase extension of a file name, without the dot
fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Normalize extension spellings: trim a leading dot, lowercase
fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(
        dirs: &[&str],
        files: &[&str],
        denied: &[&str],
        allowed: &[&str],
        case_insensitive: bool,
    ) -> RuleSet {
        RuleSet::new(
            dirs.iter().map(|s| s.to_string()).collect(),
            files.iter().map(|s| s.to_string()).collect(),
            denied.iter().map(|s| s.to_string()).collect(),
            allowed.iter().map(|s| s.to_string()).collect(),
            case_insensitive,
        )
    }

    #[test]
    fn test_directory_patterns_match_names() {
        let rules = rules(&["__pycache__", ".git", "build*"], &[], &[], &[], false);

        assert!(rules.excludes_dir("__pycache__"));
        assert!(rules.excludes_dir(".git"));
        assert!(rules.excludes_dir("build-debug"));
        assert!(!rules.excludes_dir("src"));
        assert!(!rules.excludes_dir("git"));
    }

    #[test]
    fn test_file_patterns_are_globs() {
        let rules = rules(&[], &["*.pyc", ".DS_Store"], &[], &[], false);

        assert!(rules.excludes_file("module.pyc"));
        assert!(rules.excludes_file(".DS_Store"));
        assert!(!rules.excludes_file("module.py"));
        assert!(!rules.excludes_file("DS_Store"));
    }

    #[test]
    fn test_denied_extensions_are_case_insensitive() {
        let rules = rules(&[], &[], &[".jpg", "PNG"], &[], false);

        assert!(rules.excludes_file("photo.jpg"));
        assert!(rules.excludes_file("photo.JPG"));
        assert!(rules.excludes_file("logo.png"));
        assert!(!rules.excludes_file("notes.txt"));
    }

    #[test]
    fn test_allow_list_restricts_to_listed_extensions() {
        let rules = rules(&[], &[], &[], &["rs", ".toml"], false);

        assert!(!rules.excludes_file("main.rs"));
        assert!(!rules.excludes_file("Cargo.toml"));
        assert!(rules.excludes_file("notes.txt"));
        assert!(rules.excludes_file("Makefile"));
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let rules = rules(&[], &[], &["rs"], &["rs", "toml"], false);

        assert!(rules.excludes_file("main.rs"));
        assert!(!rules.excludes_file("Cargo.toml"));
    }

    #[test]
    fn test_name_matching_is_case_sensitive_by_default() {
        let sensitive = rules(&["Target"], &["README*"], &[], &[], false);
        assert!(!sensitive.excludes_dir("target"));
        assert!(!sensitive.excludes_file("readme.md"));

        let insensitive = rules(&["Target"], &["README*"], &[], &[], true);
        assert!(insensitive.excludes_dir("target"));
        assert!(insensitive.excludes_file("readme.md"));
    }

    #[test]
    fn test_extensionless_names_have_no_extension() {
        let rules = rules(&[], &[], &["env"], &[], false);

        // ".env" is a bare dotfile name, not an "env" extension
        assert!(!rules.excludes_file(".env"));
        assert!(!rules.excludes_file("Makefile"));
        assert!(rules.excludes_file("local.env"));
    }

    #[test]
    fn test_defaults_cover_common_noise() {
        let rules = RuleSet::defaults();

        assert!(rules.excludes_dir("__pycache__"));
        assert!(rules.excludes_dir("node_modules"));
        assert!(rules.excludes_file("app.log"));
        assert!(rules.excludes_file("image.png"));
        assert!(!rules.excludes_file("main.py"));
    }
}
