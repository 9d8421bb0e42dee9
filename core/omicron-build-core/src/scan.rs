//! Parallel stage classification over shader source trees.

use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::discovery::{PathDiscovery, ShaderDiscovery};
use crate::query::StageFilter;
use crate::stage::{classify_file, ShaderStage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderEntry {
    pub path: PathBuf,
    pub stage: Option<ShaderStage>,
    /// SPIR-V file name the engine loads for this shader, e.g. `line.vert.spv`.
    pub spirv: Option<String>,
}

impl ShaderEntry {
    pub fn new(path: PathBuf, stage: Option<ShaderStage>) -> Self {
        let spirv = stage.map(|s| spirv_name(&path, s));
        Self { path, stage, spirv }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
    pub follow_symlinks: bool,
    pub jobs: Option<usize>,
}

/// Classify every shader source below `paths` and keep the entries accepted by `filter`.
pub fn scan(
    paths: &[PathBuf],
    filter: &StageFilter,
    opts: &ScanOptions,
) -> Result<Vec<ShaderEntry>> {
    let discovery = PathDiscovery::new(paths.iter().cloned()).follow_symlinks(opts.follow_symlinks);
    let candidates = discovery.discover()?;

    let run_scan = || -> Result<Vec<ShaderEntry>> {
        let classified: Result<Vec<ShaderEntry>> = candidates
            .par_iter()
            .map(|src| -> Result<ShaderEntry> {
                let stage = classify_file(&src.path)?;
                Ok(ShaderEntry::new(src.path.clone(), stage))
            })
            .collect();

        let mut entries: Vec<ShaderEntry> = classified?
            .into_iter()
            .filter(|entry| filter.matches(entry.stage))
            .collect();

        sort_entries(&mut entries);
        Ok(entries)
    };

    if let Some(jobs) = opts.jobs {
        let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
        pool.install(run_scan)
    } else {
        run_scan()
    }
}

/// `<stem>.<tag>.spv`, the naming used for compiled shaders.
pub fn spirv_name(path: &Path, stage: ShaderStage) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    format!("{stem}.{}.spv", stage.tag())
}

fn sort_entries(entries: &mut [ShaderEntry]) {
    entries.sort_by(|a, b| a.path.cmp(&b.path));
}
