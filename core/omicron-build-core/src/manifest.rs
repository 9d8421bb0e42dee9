//! Library manifest (`work.json`) loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};

/// Default manifest file name, looked up in the orchestrator's base directory.
pub const MANIFEST_FILE: &str = "work.json";

/// One manifest entry: a third-party library and how to build it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    /// Display name, only used for progress output.
    pub name: String,
    /// Library source directory, relative to the base directory.
    pub path: PathBuf,
    /// Shell commands run in order inside `path`.
    pub instructions: Vec<String>,
    /// Expected outputs relative to `path`, copied flat into the runtime directory.
    pub binaries: Vec<PathBuf>,
}

/// Ordered list of library descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub libraries: Vec<LibraryDescriptor>,
}

impl Manifest {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => BuildError::ManifestNotFound(path.to_path_buf()),
            _ => BuildError::io(format!("reading manifest {}", path.display()), err),
        })?;

        Self::parse(&text, path)
    }

    /// Parse manifest JSON; `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| BuildError::ManifestParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "name": "GLFW",
            "path": "glfw",
            "instructions": ["cmake -B build .", "cmake --build build"],
            "binaries": ["build/src/libglfw.so.3"]
        },
        {
            "name": "Lua",
            "path": "lua",
            "instructions": ["make"],
            "binaries": ["liblua.so"],
            "notes": "extra fields are ignored"
        }
    ]"#;

    #[test]
    fn parses_descriptors_in_order() {
        let manifest = Manifest::parse(SAMPLE, Path::new("work.json")).expect("parse");

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.libraries[0].name, "GLFW");
        assert_eq!(manifest.libraries[0].instructions.len(), 2);
        assert_eq!(
            manifest.libraries[0].binaries,
            vec![PathBuf::from("build/src/libglfw.so.3")]
        );
        assert_eq!(manifest.libraries[1].path, PathBuf::from("lua"));
    }

    #[test]
    fn empty_array_is_valid() {
        let manifest = Manifest::parse("[]", Path::new("work.json")).expect("parse");
        assert!(manifest.is_empty());
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let text = r#"[{"name": "x", "path": "x", "instructions": []}]"#;
        let err = Manifest::parse(text, Path::new("work.json")).unwrap_err();

        assert!(matches!(err, BuildError::ManifestParse { .. }));
        assert!(err.to_string().contains("binaries"));
    }

    #[test]
    fn object_root_is_rejected() {
        let err = Manifest::parse(r#"{"name": "x"}"#, Path::new("work.json")).unwrap_err();
        assert!(matches!(err, BuildError::ManifestParse { .. }));
    }
}
