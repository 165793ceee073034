//! File entries and path filters.

/// A file produced by an extract-file instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct FileEntry {
    /// Index of the instruction in the entries table.
    pub index: usize,
    /// Normalized output path, `/`-separated and relative to the install root.
    pub path: String,
    /// Offset of the file's data block, relative to the data base.
    pub data_offset: u32,
}

impl FileEntry {
    /// Creates a new entry.
    pub fn new(index: usize, path: impl Into<String>, data_offset: u32) -> Self {
        Self {
            index,
            path: path.into(),
            data_offset,
        }
    }

    /// Returns the final path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Returns the directory part of the path, empty for top-level files.
    pub fn directory(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

/// Filter that selects entries whose path matches a regular expression.
///
/// The pattern is matched against the normalized `/`-separated path.
///
/// # Example
///
/// ```rust
/// use unnsis::read::PathFilter;
///
/// let filter = PathFilter::new(r"\.dll$").unwrap();
/// assert!(filter.matches("bin/core.dll"));
/// assert!(!filter.matches("readme.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct PathFilter {
    pattern: regex::Regex,
}

impl PathFilter {
    /// Creates a filter with the given regex pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegex`] if the pattern is not a valid regular expression.
    ///
    /// [`Error::InvalidRegex`]: crate::Error::InvalidRegex
    pub fn new(pattern: &str) -> crate::Result<Self> {
        let regex = regex::Regex::new(pattern).map_err(|e| crate::Error::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern: regex })
    }

    /// Returns `true` if `path` matches.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Returns the underlying regex.
    pub fn pattern(&self) -> &regex::Regex {
        &self.pattern
    }
}
