use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::model::is_name_segment;

/// Failure while writing a generated artifact.
///
/// Emission never overwrites and never cleans up: after any of these the
/// output trees need a clean rebuild.
#[derive(Debug)]
pub enum EmitError {
    /// The fully-qualified name cannot be turned into a relative path
    InvalidName {
        /// The rejected name
        name: String,
    },
    /// The canonical path lies outside the mapping's source root
    Unmapped {
        /// Canonical path that could not be mapped
        path: PathBuf,
        /// Root the mapping expects the path to live under
        root: PathBuf,
    },
    /// Creating a parent directory failed
    CreateDir { path: PathBuf, source: io::Error },
    /// The destination already exists, typically from an earlier round of the same build
    Collision { path: PathBuf },
    /// Creating the destination file failed
    Create { path: PathBuf, source: io::Error },
    /// Writing the rendered text failed; the file may be partially written
    Write { path: PathBuf, source: io::Error },
}

impl EmitError {
    /// Path the failure relates to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            EmitError::InvalidName { .. } => None,
            EmitError::Unmapped { path, .. }
            | EmitError::CreateDir { path, .. }
            | EmitError::Collision { path }
            | EmitError::Create { path, .. }
            | EmitError::Write { path, .. } => Some(path),
        }
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::InvalidName { name } => {
                write!(f, "Invalid artifact name '{name}': expected dot-delimited identifiers")
            }
            EmitError::Unmapped { path, root } => write!(
                f,
                "Cannot mirror {}: path is not under {}",
                path.display(),
                root.display()
            ),
            EmitError::CreateDir { path, source } => {
                write!(f, "Failed to create directory {}: {source}", path.display())
            }
            EmitError::Collision { path } => write!(
                f,
                "Refusing to overwrite {}: it was already generated. \
                Clean the output directories before generating again.",
                path.display()
            ),
            EmitError::Create { path, source } => {
                write!(f, "Failed to create {}: {source}", path.display())
            }
            EmitError::Write { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmitError::CreateDir { source, .. }
            | EmitError::Create { source, .. }
            | EmitError::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Maps a fully-qualified artifact name to the host's canonical source path.
pub trait Filer {
    fn source_path(&self, fully_qualified_name: &str) -> Result<PathBuf, EmitError>;
}

/// Maps a canonical source path to its stable mirror location.
pub trait PathMapping {
    fn mirror(&self, canonical: &Path) -> Result<PathBuf, EmitError>;
}

/// Lays out artifacts as `root/<package dirs>/<Name>.<extension>`.
#[derive(Debug, Clone)]
pub struct SourceRootFiler {
    root: PathBuf,
    extension: String,
}

impl SourceRootFiler {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Filer for SourceRootFiler {
    fn source_path(&self, fully_qualified_name: &str) -> Result<PathBuf, EmitError> {
        let invalid = || EmitError::InvalidName {
            name: fully_qualified_name.to_string(),
        };
        let segments: Vec<&str> = fully_qualified_name.split('.').collect();
        if !segments.iter().all(|segment| is_name_segment(segment)) {
            return Err(invalid());
        }
        let (simple, packages) = segments.split_last().ok_or_else(invalid)?;
        let mut path = self.root.clone();
        for package in packages {
            path.push(package);
        }
        if self.extension.is_empty() {
            path.push(simple);
        } else {
            path.push(format!("{simple}.{}", self.extension));
        }
        Ok(path)
    }
}

/// Replaces the `from` root of a canonical path with `to`.
#[derive(Debug, Clone)]
pub struct PrefixMapping {
    from: PathBuf,
    to: PathBuf,
}

impl PrefixMapping {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl PathMapping for PrefixMapping {
    fn mirror(&self, canonical: &Path) -> Result<PathBuf, EmitError> {
        let relative = canonical
            .strip_prefix(&self.from)
            .map_err(|_| EmitError::Unmapped {
                path: canonical.to_path_buf(),
                root: self.from.clone(),
            })?;
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(EmitError::Unmapped {
                path: canonical.to_path_buf(),
                root: self.from.clone(),
            });
        }
        Ok(self.to.join(relative))
    }
}

/// Files written for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedArtifact {
    pub fully_qualified_name: String,
    pub canonical: PathBuf,
    pub mirror: PathBuf,
}

/// Writes each artifact to its canonical path and to its mirror.
pub struct Emitter {
    filer: Box<dyn Filer>,
    mapping: Box<dyn PathMapping>,
}

impl Emitter {
    pub fn new(filer: Box<dyn Filer>, mapping: Box<dyn PathMapping>) -> Self {
        Self { filer, mapping }
    }

    /// Canonical files under `generated_root`, mirrored under `mirror_root`.
    pub fn with_roots(
        generated_root: impl Into<PathBuf>,
        mirror_root: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        let generated_root = generated_root.into();
        Self::new(
            Box::new(SourceRootFiler::new(generated_root.clone(), extension)),
            Box::new(PrefixMapping::new(generated_root, mirror_root)),
        )
    }

    /// Both destinations for `fully_qualified_name`, without touching the disk.
    pub fn targets(&self, fully_qualified_name: &str) -> Result<(PathBuf, PathBuf), EmitError> {
        let canonical = self.filer.source_path(fully_qualified_name)?;
        let mirror = self.mapping.mirror(&canonical)?;
        Ok((canonical, mirror))
    }

    /// Write `contents` to both destinations of `fully_qualified_name`.
    ///
    /// # Errors
    ///
    /// Fails on the first target that cannot be written. A destination that
    /// already exists is reported as [`EmitError::Collision`] and left untouched.
    pub fn emit(
        &self,
        fully_qualified_name: &str,
        contents: &str,
    ) -> Result<EmittedArtifact, EmitError> {
        let result = self.targets(fully_qualified_name).and_then(|(canonical, mirror)| {
            write_new_file(&canonical, contents)?;
            write_new_file(&mirror, contents)?;
            Ok(EmittedArtifact {
                fully_qualified_name: fully_qualified_name.to_string(),
                canonical,
                mirror,
            })
        });
        if let Err(err) = &result {
            tracing::error!(
                artifact = fully_qualified_name,
                path = ?err.path(),
                error = ?err,
                "failed to emit generated source: {err}"
            );
        }
        result
    }
}

fn write_new_file(path: &Path, contents: &str) -> Result<(), EmitError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                EmitError::Collision {
                    path: path.to_path_buf(),
                }
            } else {
                EmitError::Create {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| EmitError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote generated source");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_source_root_filer_layout() {
        let filer = SourceRootFiler::new("/gen", "rs");
        assert_eq!(
            filer.source_path("com.acme.OrderControllerStub").unwrap(),
            PathBuf::from("/gen/com/acme/OrderControllerStub.rs")
        );
        assert_eq!(
            filer.source_path("StubBase").unwrap(),
            PathBuf::from("/gen/StubBase.rs")
        );
    }

    #[test]
    fn test_source_root_filer_rejects_bad_names() {
        let filer = SourceRootFiler::new("/gen", "rs");
        for name in ["", ".StubBase", "com..Stub", "com.acme.", "../etc.passwd", "a/b.Stub"] {
            assert!(
                matches!(filer.source_path(name), Err(EmitError::InvalidName { .. })),
                "accepted {name:?}"
            );
        }
    }

    #[test]
    fn test_prefix_mapping() {
        let mapping = PrefixMapping::new("/build/generated", "/build/generated-stub-sources");
        assert_eq!(
            mapping
                .mirror(Path::new("/build/generated/com/acme/StubBase.rs"))
                .unwrap(),
            PathBuf::from("/build/generated-stub-sources/com/acme/StubBase.rs")
        );
        assert!(matches!(
            mapping.mirror(Path::new("/elsewhere/StubBase.rs")),
            Err(EmitError::Unmapped { .. })
        ));
    }

    #[test]
    fn test_parent_is_a_file_fails_with_create_dir() {
        let dir = tempfile::tempdir().unwrap();
        let generated = dir.path().join("gen");
        fs::create_dir_all(&generated).unwrap();
        fs::write(generated.join("com"), "not a directory").unwrap();
        let emitter = Emitter::with_roots(&generated, dir.path().join("mirror"), "rs");

        let err = emitter.emit("com.acme.StubBase", "base").unwrap_err();
        match &err {
            EmitError::CreateDir { path, .. } => assert!(path.ends_with("com/acme")),
            other => panic!("expected CreateDir, got {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
        assert!(!dir.path().join("mirror").exists());
    }

    #[test]
    fn test_mirror_failure_keeps_canonical_file() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        fs::write(&mirror, "not a directory").unwrap();
        let emitter = Emitter::with_roots(dir.path().join("gen"), &mirror, "rs");

        let err = emitter.emit("com.acme.StubBase", "base").unwrap_err();
        assert!(matches!(err, EmitError::CreateDir { .. }));
        assert_eq!(
            fs::read_to_string(dir.path().join("gen/com/acme/StubBase.rs")).unwrap(),
            "base"
        );
    }

    #[test]
    fn test_unopenable_destination_fails_with_create() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = Emitter::with_roots(dir.path().join("gen"), dir.path().join("mirror"), "rs");
        // Longer than any file name the filesystem accepts.
        let name = format!("com.{}", "S".repeat(300));

        let err = emitter.emit(&name, "stub").unwrap_err();
        assert!(matches!(err, EmitError::Create { .. }), "got {err:?}");
        assert!(std::error::Error::source(&err).is_some());
        assert!(!dir.path().join("mirror").exists());
    }

    #[test]
    fn test_collision_error_message_names_path() {
        let err = EmitError::Collision {
            path: PathBuf::from("/gen/StubBase.rs"),
        };
        assert!(err.to_string().contains("/gen/StubBase.rs"));
        assert_eq!(err.path(), Some(Path::new("/gen/StubBase.rs")));
        assert!(std::error::Error::source(&err).is_none());
    }
}
