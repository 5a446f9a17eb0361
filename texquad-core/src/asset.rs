//! Path-addressed byte sources for shader and image assets.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufReader, Cursor, Read},
    path::{Component, Path, PathBuf},
};

use crate::error::AssetError;

const QUAD_VERTEX_GLSL: &str = include_str!("shaders/quad.vert");
const QUAD_FRAGMENT_GLSL: &str = include_str!("shaders/quad.frag");

/// Resolves asset paths to byte streams.
///
/// Paths are `/`-separated and relative to the source's root.
pub trait AssetSource {
    /// Opens the asset at `path`.
    ///
    /// # Errors
    /// [`AssetError::NotFound`] if nothing exists at `path`; other variants
    /// for unusable paths or I/O failures.
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>, AssetError>;

    /// Reads the whole asset at `path` into memory.
    ///
    /// # Errors
    /// As [`AssetSource::open`], plus [`AssetError::Io`] if reading fails.
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let mut reader = self.open(path)?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| AssetError::Io { path: path.to_string(), source })?;
        Ok(bytes)
    }
}

/// Assets stored as files beneath a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Creates a source rooted at `root`. The directory is not checked until
    /// the first `open`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory assets are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(path);
        let escapes_root = relative.components().any(|component| {
            matches!(component, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });

        if path.is_empty() || escapes_root {
            return Err(AssetError::InvalidPath(path.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

impl AssetSource for DirectorySource {
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>, AssetError> {
        let full_path = self.resolve(path)?;

        match File::open(&full_path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(path.to_string()))
            },
            Err(source) => Err(AssetError::Io { path: path.to_string(), source }),
        }
    }
}

/// Assets held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default quad shader pair at `shaders/quad.vert` and `shaders/quad.frag`.
    pub fn builtin_shaders() -> Self {
        Self::new()
            .with("shaders/quad.vert", QUAD_VERTEX_GLSL)
            .with("shaders/quad.frag", QUAD_FRAGMENT_GLSL)
    }

    /// Adds (or replaces) the asset at `path`.
    #[must_use]
    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Adds (or replaces) the asset at `path`.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), bytes.into());
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no assets are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetSource for MemorySource {
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>, AssetError> {
        self.entries
            .get(path)
            .map(|bytes| Box::new(Cursor::new(bytes.as_slice())) as Box<dyn Read + '_>)
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

/// Looks up `primary` first and falls back to `fallback` for missing assets.
///
/// Only [`AssetError::NotFound`] triggers the fallback; invalid paths and
/// I/O errors from `primary` are returned as-is.
#[derive(Debug, Clone)]
pub struct FallbackSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P: AssetSource, F: AssetSource> FallbackSource<P, F> {
    /// Layers `primary` over `fallback`.
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: AssetSource, F: AssetSource> AssetSource for FallbackSource<P, F> {
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>, AssetError> {
        match self.primary.open(path) {
            Err(AssetError::NotFound(_)) => {
                tracing::debug!(path, "asset not found in primary source; using fallback");
                self.fallback.open(path)
            },
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let dir = env::temp_dir().join(format!("texquad-{name}-{}", process::id()));
            fs::create_dir_all(dir.join("shaders")).unwrap();
            Self(dir)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn directory_source_reads_relative_paths() {
        let dir = TempDir::new("read");
        fs::write(dir.0.join("shaders/a.vert"), "void main() {}").unwrap();

        let source = DirectorySource::new(&dir.0);

        assert_eq!(source.read("shaders/a.vert").unwrap(), b"void main() {}");
        assert_eq!(source.read("./shaders/a.vert").unwrap(), b"void main() {}");
    }

    #[test]
    fn directory_source_maps_missing_files_to_not_found() {
        let dir = TempDir::new("missing");
        let source = DirectorySource::new(&dir.0);

        let err = source.read("shaders/nope.frag").unwrap_err();
        assert!(matches!(err, AssetError::NotFound(ref p) if p == "shaders/nope.frag"));
    }

    #[test]
    fn directory_source_rejects_escaping_paths() {
        let source = DirectorySource::new("assets");

        for path in ["../secret.png", "shaders/../../x", "/etc/passwd", ""] {
            let err = source.read(path).unwrap_err();
            assert!(matches!(err, AssetError::InvalidPath(_)), "accepted {path:?}");
        }
    }

    #[test]
    fn memory_source_serves_inserted_bytes() {
        let mut source = MemorySource::new().with("a", "alpha");
        source.insert("b", vec![1, 2, 3]);

        assert_eq!(source.len(), 2);
        assert_eq!(source.read("a").unwrap(), b"alpha");
        assert_eq!(source.read("b").unwrap(), vec![1, 2, 3]);
        assert!(matches!(source.read("c"), Err(AssetError::NotFound(_))));
    }

    #[test]
    fn builtin_shaders_have_no_version_directive() {
        let source = MemorySource::builtin_shaders();

        for path in ["shaders/quad.vert", "shaders/quad.frag"] {
            let text = String::from_utf8(source.read(path).unwrap()).unwrap();
            assert!(!text.contains("#version"), "{path} pins a GLSL version");
        }
    }

    #[test]
    fn fallback_only_on_not_found() {
        let primary = MemorySource::new().with("shaders/quad.frag", "override");
        let source = FallbackSource::new(primary, MemorySource::builtin_shaders());

        assert_eq!(source.read("shaders/quad.frag").unwrap(), b"override");
        assert_eq!(
            source.read("shaders/quad.vert").unwrap(),
            QUAD_VERTEX_GLSL.as_bytes()
        );

        let strict = FallbackSource::new(DirectorySource::new("assets"), MemorySource::builtin_shaders());
        assert!(matches!(
            strict.read("../shaders/quad.vert"),
            Err(AssetError::InvalidPath(_))
        ));
    }
}
