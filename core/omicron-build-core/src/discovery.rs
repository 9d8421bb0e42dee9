//! Shader source discovery on the filesystem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use walkdir::{DirEntry, WalkDir};

/// Extensions treated as shader sources during a scan.
pub const SHADER_EXTENSIONS: &[&str] = &[
    "glsl", "vert", "frag", "tesc", "tese", "comp", "vs", "fs", "hlsl",
];

/// Path to a candidate shader source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSourceRef {
    pub path: PathBuf,
}

/// Trait for enumerating shader sources from some backing store.
pub trait ShaderDiscovery {
    fn discover(&self) -> Result<Vec<ShaderSourceRef>>;
}

/// Recursive filesystem walker that collects shader sources.
///
/// Hidden directories are not entered. A file reachable from more than one root, or through a
/// followed symlink, is reported once under the first path it was found at.
#[derive(Debug, Clone)]
pub struct PathDiscovery {
    roots: Vec<PathBuf>,
    follow_symlinks: bool,
}

impl PathDiscovery {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let roots = roots.into_iter().map(Into::into).collect();
        Self {
            roots,
            follow_symlinks: false,
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

impl ShaderDiscovery for PathDiscovery {
    fn discover(&self) -> Result<Vec<ShaderSourceRef>> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for root in &self.roots {
            if !root.exists() {
                return Err(anyhow!("root path does not exist: {}", root.display()));
            }

            let walker = WalkDir::new(root)
                .follow_links(self.follow_symlinks)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e));
            for entry in walker {
                let entry = entry?;
                if !entry.file_type().is_file() || !is_shader_source(entry.path()) {
                    continue;
                }
                let key = entry
                    .path()
                    .canonicalize()
                    .unwrap_or_else(|_| entry.path().to_path_buf());
                if seen.insert(key) {
                    found.push(ShaderSourceRef {
                        path: entry.path().to_path_buf(),
                    });
                }
            }
        }

        Ok(found)
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_shader_source(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return false,
    };

    SHADER_EXTENSIONS.contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::is_shader_source;
    use super::PathDiscovery;
    use super::ShaderDiscovery;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn recognises_shader_extensions() {
        assert!(is_shader_source("/src/shaders/pbr.frag".as_ref()));
        assert!(is_shader_source("/src/shaders/common.GLSL".as_ref()));
        assert!(!is_shader_source("/src/shaders/pbr.frag.spv".as_ref()));
        assert!(!is_shader_source("/src/shaders/README".as_ref()));
    }

    #[test]
    fn discovers_nested_shaders() {
        let tmp = tempdir().expect("tempdir");
        let nested = tmp.path().join("pipeline/pbr");
        fs::create_dir_all(&nested).expect("mkdir");
        let shader = nested.join("lighting.comp");
        fs::write(&shader, b"// OMICRON_COMP\n").expect("write shader");

        let discovery = PathDiscovery::new([tmp.path()]);
        let shaders = discovery.discover().expect("discover");

        assert!(shaders.iter().any(|s| s.path == shader));
    }

    #[test]
    fn overlapping_roots_report_each_shader_once() {
        let tmp = tempdir().expect("tempdir");
        let imgui = tmp.path().join("imgui");
        fs::create_dir_all(&imgui).expect("mkdir");
        fs::write(imgui.join("imgui.vert"), b"// OMICRON_VERTEX\n").expect("write shader");
        fs::write(tmp.path().join("line.frag"), b"// OMICRON_FRAGMENT\n").expect("write shader");

        let discovery = PathDiscovery::new([tmp.path(), imgui.as_path(), tmp.path()]);
        let shaders = discovery.discover().expect("discover");

        assert_eq!(shaders.len(), 2);
        let vert: Vec<_> = shaders
            .iter()
            .filter(|s| s.path.ends_with("imgui.vert"))
            .collect();
        assert_eq!(vert.len(), 1);
    }

    #[test]
    fn skips_hidden_directories_and_compiled_spirv() {
        let tmp = tempdir().expect("tempdir");
        let cache = tmp.path().join(".cache");
        fs::create_dir_all(&cache).expect("mkdir");
        fs::write(cache.join("stale.frag"), b"// OMICRON_FRAGMENT\n").expect("write shader");
        fs::write(tmp.path().join("pbr.frag"), b"// OMICRON_FRAGMENT\n").expect("write shader");
        fs::write(tmp.path().join("pbr.frag.spv"), b"\x03\x02\x23\x07").expect("write spirv");

        let shaders = PathDiscovery::new([tmp.path()]).discover().expect("discover");

        let names: Vec<_> = shaders
            .iter()
            .filter_map(|s| s.path.file_name())
            .collect();
        assert_eq!(names, vec!["pbr.frag"]);
    }

    #[test]
    fn hidden_root_is_still_walked() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join(".shaders");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("sky.vert"), b"// OMICRON_VERTEX\n").expect("write shader");

        let shaders = PathDiscovery::new([&root]).discover().expect("discover");

        assert_eq!(shaders.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_does_not_duplicate_shaders() {
        use std::os::unix::fs::symlink;

        let tmp = tempdir().expect("tempdir");
        let real_dir = tmp.path().join("real");
        fs::create_dir_all(&real_dir).expect("mkdir real");
        fs::write(real_dir.join("line.vert"), b"// OMICRON_VERTEX\n").expect("write shader");
        symlink(&real_dir, tmp.path().join("alias")).expect("symlink");

        let shaders = PathDiscovery::new([tmp.path()])
            .follow_symlinks(true)
            .discover()
            .expect("discover");

        assert_eq!(shaders.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinks_when_enabled() {
        use std::os::unix::fs::symlink;

        let tmp = tempdir().expect("tempdir");
        let real_dir = tmp.path().join("real");
        let link_dir = tmp.path().join("link");
        fs::create_dir_all(&real_dir).expect("mkdir real");
        fs::write(real_dir.join("line.vert"), b"// OMICRON_VERTEX\n").expect("write shader");
        symlink(&real_dir, &link_dir).expect("symlink");

        let discovery = PathDiscovery::new([&link_dir]).follow_symlinks(true);
        let shaders = discovery.discover().expect("discover");

        assert!(shaders.iter().any(|s| s.path.ends_with("line.vert")));
    }
}
