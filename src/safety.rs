//! Safety and resource limit utilities.
//!
//! Output paths are rebuilt from the installer's own script, so a hostile
//! installer can ask for `../` components or drive-qualified names. This
//! module validates those paths before anything touches the filesystem and
//! holds the size limits applied while decoding.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Policy for validating extraction paths.
///
/// The default is `Strict`, which blocks any potential path traversal.
///
/// # Examples
///
/// ```rust
/// use unnsis::safety::PathSafety;
///
/// let policy = PathSafety::default();
/// assert_eq!(policy, PathSafety::Strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathSafety {
    /// Strict validation: block any potential path traversal.
    ///
    /// This mode:
    /// - Rejects paths containing `..` components
    /// - Rejects absolute paths and drive-qualified components (`C:`)
    /// - Verifies that the resolved path stays within the destination
    ///   directory, following symlinks of existing ancestors
    #[default]
    Strict,
    /// Block `..` components and absolute paths, without resolving symlinks.
    Relaxed,
    /// Disables all path validation (DANGEROUS).
    ///
    /// Paths are joined onto the destination as they are, so a hostile
    /// installer can write anywhere the process can.
    Disabled,
}

/// Validates an extraction path against the given safety policy.
///
/// `archive_path` is a normalized, `/`-separated path produced by the
/// instruction interpreter. Returns the full path to write to.
pub fn validate_extract_path(
    archive_path: &str,
    dest_root: &Path,
    policy: PathSafety,
) -> Result<PathBuf> {
    let traversal = || Error::PathTraversal {
        path: archive_path.to_string(),
    };

    if policy == PathSafety::Disabled {
        return Ok(dest_root.join(archive_path));
    }

    if archive_path.starts_with('/') || archive_path.split('/').any(|c| c == "..") {
        return Err(traversal());
    }

    let full_path = dest_root.join(archive_path);
    if policy == PathSafety::Relaxed {
        return Ok(full_path);
    }

    if archive_path.split('/').any(|c| c.contains(':')) {
        return Err(traversal());
    }
    let relative = Path::new(archive_path);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(traversal());
    }

    // Resolve the deepest existing ancestor so symlinks cannot escape
    let canonical_dest = dest_root.canonicalize()?;
    let mut ancestor = full_path.as_path();
    let mut pending = Vec::new();
    while !ancestor.exists() {
        match (ancestor.file_name(), ancestor.parent()) {
            (Some(name), Some(parent)) => {
                pending.push(name.to_os_string());
                ancestor = parent;
            }
            _ => return Err(traversal()),
        }
    }

    let mut resolved = ancestor.canonicalize()?;
    resolved.extend(pending.into_iter().rev());
    if !resolved.starts_with(&canonical_dest) {
        return Err(traversal());
    }

    Ok(full_path)
}

/// Limits applied while decoding an archive.
///
/// These guard against corrupt or hostile installers that declare enormous
/// headers or payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum decompressed header size.
    pub max_header_size: u64,
    /// Maximum size of a single extracted file.
    pub max_file_size: u64,
}

impl Default for ResourceLimits {
    /// | Limit | Default Value |
    /// |-------|---------------|
    /// | `max_header_size` | 64 MiB |
    /// | `max_file_size` | 4 GiB |
    fn default() -> Self {
        Self {
            max_header_size: 64 << 20,
            max_file_size: 4 << 30,
        }
    }
}

impl ResourceLimits {
    /// Creates resource limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates limits that never trigger.
    pub fn unlimited() -> Self {
        Self {
            max_header_size: u64::MAX,
            max_file_size: u64::MAX,
        }
    }

    /// Sets the maximum decompressed header size.
    pub fn max_header_size(mut self, size: u64) -> Self {
        self.max_header_size = size;
        self
    }

    /// Sets the maximum size of a single file.
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Fails if a header of `size` bytes exceeds the limit.
    pub fn check_header(&self, size: u64) -> Result<()> {
        if size > self.max_header_size {
            return Err(Error::ResourceLimitExceeded(format!(
                "Header size {} exceeds limit {}",
                size, self.max_header_size
            )));
        }
        Ok(())
    }

    /// Fails if a file of `size` bytes exceeds the limit.
    pub fn check_file(&self, path: &str, size: u64) -> Result<()> {
        if size > self.max_file_size {
            return Err(Error::ResourceLimitExceeded(format!(
                "File '{}' size {} exceeds limit {}",
                path, size, self.max_file_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_strict_normal_path() {
        let dest = tempfile::tempdir().unwrap();
        let result = validate_extract_path("foo/bar.txt", dest.path(), PathSafety::Strict);
        assert_eq!(result.unwrap(), dest.path().join("foo").join("bar.txt"));
    }

    #[test]
    fn test_validate_strict_rejects_traversal() {
        let dest = tempfile::tempdir().unwrap();
        for path in ["../evil", "a/../../evil", "a/.."] {
            let err = validate_extract_path(path, dest.path(), PathSafety::Strict).unwrap_err();
            assert!(err.is_security_error(), "{}", path);
        }
    }

    #[test]
    fn test_validate_strict_rejects_absolute_and_drive() {
        let dest = tempfile::tempdir().unwrap();
        assert!(validate_extract_path("/etc/passwd", dest.path(), PathSafety::Strict).is_err());
        assert!(validate_extract_path("C:/Windows/x.dll", dest.path(), PathSafety::Strict).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_strict_rejects_symlink_escape() {
        let dest = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dest.path().join("link")).unwrap();

        let err =
            validate_extract_path("link/file.txt", dest.path(), PathSafety::Strict).unwrap_err();
        assert!(err.is_security_error());
    }

    #[test]
    fn test_validate_relaxed() {
        let dest = Path::new("out");
        assert!(validate_extract_path("C:/x", dest, PathSafety::Relaxed).is_ok());
        assert!(validate_extract_path("../x", dest, PathSafety::Relaxed).is_err());
    }

    #[test]
    fn test_validate_disabled_allows_anything() {
        let dest = Path::new("out");
        let result = validate_extract_path("../any/path.txt", dest, PathSafety::Disabled);
        assert_eq!(result.unwrap(), dest.join("../any/path.txt"));
    }

    #[test]
    fn test_limits() {
        let limits = ResourceLimits::new().max_header_size(100).max_file_size(10);
        assert!(limits.check_header(100).is_ok());
        assert!(matches!(
            limits.check_header(101),
            Err(Error::ResourceLimitExceeded(_))
        ));
        assert!(limits.check_file("a", 10).is_ok());
        let err = limits.check_file("big.bin", 11).unwrap_err();
        assert!(err.to_string().contains("big.bin"));

        let unlimited = ResourceLimits::unlimited();
        assert!(unlimited.check_file("a", u64::MAX).is_ok());
    }
}
