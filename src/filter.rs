// src/filter.rs

use crate::error::ConfigError;
use glob::Pattern;

/// Decides which tree paths are in scope. A path is included iff it
/// matches every `--only` pattern (vacuously true when none are given)
/// and none of the `--ignore` patterns.
#[derive(Debug, Default)]
pub struct FileFilter {
    only: Vec<Pattern>,
    ignore: Vec<Pattern>,
}

impl FileFilter {
    /// Compile the pattern sets. Bad glob syntax is fatal up front.
    pub fn new(only: &[String], ignore: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            only: compile(only)?,
            ignore: compile(ignore)?,
        })
    }

    pub fn is_included(&self, path: &str) -> bool {
        self.only.iter().all(|p| p.matches(path)) && !self.ignore.iter().any(|p| p.matches(path))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| ConfigError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(only: &[&str], ignore: &[&str]) -> FileFilter {
        let only: Vec<String> = only.iter().map(|s| s.to_string()).collect();
        let ignore: Vec<String> = ignore.iter().map(|s| s.to_string()).collect();
        FileFilter::new(&only, &ignore).unwrap()
    }

    #[test]
    fn empty_patterns_include_everything() {
        let f = filter(&[], &[]);
        assert!(f.is_included("src/main.rs"));
        assert!(f.is_included("README"));
    }

    #[test]
    fn every_only_pattern_must_match() {
        let f = filter(&["*.py", "src*"], &[]);
        assert!(f.is_included("src/a.py"));
        assert!(!f.is_included("src/a.rs"));
        assert!(!f.is_included("lib/a.py"));
    }

    #[test]
    fn any_ignore_pattern_excludes() {
        let f = filter(&[], &["*test*", "*.min.js"]);
        assert!(f.is_included("src/app.js"));
        assert!(!f.is_included("src/app.min.js"));
        assert!(!f.is_included("tests/app.js"));
    }

    #[test]
    fn wildcards_cross_directory_separators() {
        // Shell-glob semantics as in fnmatch: '*' spans '/'.
        let f = filter(&["*.py"], &[]);
        assert!(f.is_included("deep/nested/dir/mod.py"));
    }

    #[test]
    fn bad_pattern_is_a_config_error() {
        assert!(FileFilter::new(&["[".to_string()], &[]).is_err());
    }
}
