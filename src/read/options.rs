//! Options for opening and extracting archives.

use super::entry::PathFilter;
use crate::Result;
use crate::safety::{PathSafety, ResourceLimits};
use crate::scanner::ScanOptions;

/// Options for opening an archive.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Signature scan settings.
    pub scan: ScanOptions,
    /// Limits applied while decoding the header.
    pub limits: ResourceLimits,
}

impl OpenOptions {
    /// Creates open options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signature scan settings.
    pub fn scan(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }

    /// Sets the resource limits.
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Options for extraction operations.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Only files whose path matches are extracted.
    pub filter: Option<PathFilter>,
    /// Path safety validation policy.
    pub path_safety: PathSafety,
    /// Resource limits for extraction.
    pub limits: ResourceLimits,
}

impl ExtractOptions {
    /// Creates extraction options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts extraction to paths matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegex`](crate::Error::InvalidRegex) for an
    /// invalid pattern.
    pub fn filter(mut self, pattern: &str) -> Result<Self> {
        self.filter = Some(PathFilter::new(pattern)?);
        Ok(self)
    }

    /// Sets the path safety policy.
    pub fn path_safety(mut self, policy: PathSafety) -> Self {
        self.path_safety = policy;
        self
    }

    /// Sets the resource limits.
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns `true` if `path` passes the filter.
    pub fn selects(&self, path: &str) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(path))
    }
}
