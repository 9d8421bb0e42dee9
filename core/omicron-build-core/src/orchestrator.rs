//! Sequential library builds driven by a [`Manifest`].
//!
//! Every path is resolved against [`BuildOptions::base_dir`]; instructions get their working
//! directory through the runner, so the process working directory is never touched. A failed
//! run therefore leaves nothing to restore.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};
use crate::manifest::{LibraryDescriptor, Manifest, MANIFEST_FILE};
use crate::runner::{InstructionOutcome, InstructionPolicy, InstructionRunner};

/// Runtime directory used by the engine, relative to the base directory.
pub const DEFAULT_RUNTIME_DIR: &str = "../rt";
/// Completion marker written after every successful run.
pub const SENTINEL_FILE: &str = "libsbuilt";
/// Content of the completion marker.
pub const SENTINEL_CONTENT: &str = "1";

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub base_dir: PathBuf,
    pub runtime_dir: PathBuf,
    pub sentinel_name: String,
    pub policy: InstructionPolicy,
    pub dry_run: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            runtime_dir: PathBuf::from(DEFAULT_RUNTIME_DIR),
            sentinel_name: SENTINEL_FILE.to_string(),
            policy: InstructionPolicy::default(),
            dry_run: false,
        }
    }
}

impl BuildOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = dir.into();
        self
    }

    pub fn with_sentinel_name(mut self, name: impl Into<String>) -> Self {
        self.sentinel_name = name.into();
        self
    }

    pub fn with_policy(mut self, policy: InstructionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn dry_run(mut self, yes: bool) -> Self {
        self.dry_run = yes;
        self
    }

    /// Default manifest location inside the base directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.base_dir.join(MANIFEST_FILE)
    }

    /// Runtime directory; relative values are anchored at the base directory.
    pub fn resolved_runtime_dir(&self) -> PathBuf {
        self.base_dir.join(&self.runtime_dir)
    }

    pub fn sentinel_path(&self) -> PathBuf {
        self.base_dir.join(&self.sentinel_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryReport {
    pub name: String,
    pub dir: PathBuf,
    pub instructions: Vec<InstructionOutcome>,
    /// Destination paths inside the runtime directory.
    pub copied: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub runtime_dir: PathBuf,
    /// `None` for dry runs.
    pub sentinel: Option<PathBuf>,
    pub libraries: Vec<LibraryReport>,
}

/// Build every library of `manifest` in order, then write the sentinel.
///
/// Progress lines go to `progress`. The first missing binary stops the run with
/// [`BuildError::MissingBinary`]; copies made for earlier libraries are kept.
pub fn build_libraries<R, W>(
    manifest: &Manifest,
    opts: &BuildOptions,
    runner: &mut R,
    mut progress: W,
) -> Result<BuildReport>
where
    R: InstructionRunner + ?Sized,
    W: Write,
{
    let runtime_dir = opts.resolved_runtime_dir();
    if !opts.dry_run {
        ensure_dir(&runtime_dir)?;
    }

    let mut libraries = Vec::with_capacity(manifest.len());
    for lib in &manifest.libraries {
        writeln!(progress, "Building {}...", lib.name)
            .map_err(|err| BuildError::io("writing progress", err))?;

        let report = if opts.dry_run {
            plan_library(lib, opts, &mut progress)?
        } else {
            build_library(lib, opts, &runtime_dir, runner)?
        };
        libraries.push(report);
    }

    let sentinel = if opts.dry_run {
        None
    } else {
        let path = opts.sentinel_path();
        fs::write(&path, SENTINEL_CONTENT)
            .map_err(|err| BuildError::io(format!("writing {}", path.display()), err))?;
        log::info!("wrote {}", path.display());
        Some(path)
    };

    Ok(BuildReport {
        runtime_dir,
        sentinel,
        libraries,
    })
}

/// Load the manifest from `manifest_path` and run [`build_libraries`].
pub fn build_from_manifest<R, W>(
    manifest_path: &Path,
    opts: &BuildOptions,
    runner: &mut R,
    progress: W,
) -> Result<BuildReport>
where
    R: InstructionRunner + ?Sized,
    W: Write,
{
    let manifest = Manifest::load(manifest_path)?;
    log::debug!("manifest {}: {:?}", manifest_path.display(), manifest);
    build_libraries(&manifest, opts, runner, progress)
}

fn build_library<R>(
    lib: &LibraryDescriptor,
    opts: &BuildOptions,
    runtime_dir: &Path,
    runner: &mut R,
) -> Result<LibraryReport>
where
    R: InstructionRunner + ?Sized,
{
    let dir = opts.base_dir.join(&lib.path);
    if !dir.is_dir() {
        return Err(BuildError::io(
            format!("library directory for {}", lib.name),
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            ),
        ));
    }

    let mut instructions = Vec::with_capacity(lib.instructions.len());
    for command in &lib.instructions {
        log::debug!("[{}] $ {}", lib.name, command);
        let outcome = runner.run(command, &dir).map_err(|err| {
            BuildError::io(format!("running `{command}` in {}", dir.display()), err)
        })?;
        check_outcome(lib, &outcome, opts.policy)?;
        instructions.push(outcome);
    }

    let sources: Vec<PathBuf> = lib.binaries.iter().map(|b| dir.join(b)).collect();
    if let Some(missing) = sources.iter().find(|p| !p.is_file()) {
        return Err(BuildError::MissingBinary {
            library: lib.name.clone(),
            path: missing.clone(),
        });
    }

    let mut plan = Vec::with_capacity(sources.len());
    for src in &sources {
        let dest = runtime_dir.join(flat_name(src)?);
        if same_file(src, &dest) {
            return Err(BuildError::io(
                format!("copying binary for {}", lib.name),
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} and {} are the same file", src.display(), dest.display()),
                ),
            ));
        }
        plan.push((src, dest));
    }

    let mut copied = Vec::with_capacity(plan.len());
    for (src, dest) in plan {
        fs::copy(src, &dest).map_err(|err| {
            BuildError::io(
                format!("copying {} to {}", src.display(), dest.display()),
                err,
            )
        })?;
        log::info!("copied {} -> {}", src.display(), dest.display());
        copied.push(dest);
    }

    Ok(LibraryReport {
        name: lib.name.clone(),
        dir,
        instructions,
        copied,
    })
}

fn plan_library<W: Write>(
    lib: &LibraryDescriptor,
    opts: &BuildOptions,
    mut progress: W,
) -> Result<LibraryReport> {
    let dir = opts.base_dir.join(&lib.path);
    let runtime_dir = opts.resolved_runtime_dir();
    let io_err = |err| BuildError::io("writing progress", err);

    for command in &lib.instructions {
        writeln!(progress, "  [{}] $ {}", dir.display(), command).map_err(io_err)?;
    }

    let mut copied = Vec::with_capacity(lib.binaries.len());
    for binary in &lib.binaries {
        let src = dir.join(binary);
        let dest = runtime_dir.join(flat_name(&src)?);
        writeln!(progress, "  copy {} -> {}", src.display(), dest.display()).map_err(io_err)?;
        copied.push(dest);
    }

    Ok(LibraryReport {
        name: lib.name.clone(),
        dir,
        instructions: Vec::new(),
        copied,
    })
}

fn check_outcome(
    lib: &LibraryDescriptor,
    outcome: &InstructionOutcome,
    policy: InstructionPolicy,
) -> Result<()> {
    if outcome.success {
        return Ok(());
    }

    match policy {
        InstructionPolicy::Ignore => Ok(()),
        InstructionPolicy::Warn => {
            log::warn!(
                "[{}] `{}` exited with {:?}; continuing",
                lib.name,
                outcome.command,
                outcome.status_code
            );
            Ok(())
        }
        InstructionPolicy::Strict => Err(BuildError::InstructionFailed {
            library: lib.name.clone(),
            command: outcome.command.clone(),
            code: outcome.status_code,
        }),
    }
}

fn flat_name(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name().ok_or_else(|| {
        BuildError::io(
            "resolving binary name",
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            ),
        )
    })
}

/// `fs::copy` onto itself truncates the file, so that case must be caught first.
fn same_file(src: &Path, dest: &Path) -> bool {
    match (src.canonicalize(), dest.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
        .map_err(|err| BuildError::io(format!("creating {}", dir.display()), err))?;
    log::info!("created runtime directory {}", dir.display());
    Ok(())
}
