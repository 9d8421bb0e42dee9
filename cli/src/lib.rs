//! buildlibs / shaderstage command-line front ends for omicron-build-core.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};

use omicron_build_core::orchestrator::{build_from_manifest, BuildOptions, DEFAULT_RUNTIME_DIR};
use omicron_build_core::output::{write_json_pretty, write_ndjson, write_plain};
use omicron_build_core::query::{parse_stage_list, StageFilter};
use omicron_build_core::runner::{InstructionPolicy, ShellRunner};
use omicron_build_core::scan::{scan, ScanOptions};
use omicron_build_core::stage::classify_file;

/// Environment override for the runtime output directory.
pub const RUNTIME_DIR_ENV: &str = "OMICRON_RT_DIR";

/// Build third-party libraries listed in work.json and stage their binaries.
#[derive(Debug, Parser)]
#[command(name = "buildlibs", version)]
pub struct BuildLibsCli {
    /// Base directory; library paths and the default manifest are relative to it
    #[arg(short = 'C', long = "dir", default_value = ".", value_hint = ValueHint::DirPath)]
    dir: PathBuf,

    /// Manifest file (default: <DIR>/work.json)
    #[arg(short = 'm', long = "manifest", value_hint = ValueHint::FilePath)]
    manifest: Option<PathBuf>,

    /// Runtime output directory, relative to <DIR> unless absolute [default: ../rt]
    #[arg(long = "runtime-dir", value_hint = ValueHint::DirPath)]
    runtime_dir: Option<PathBuf>,

    /// Sentinel file written after a successful run, relative to <DIR>
    #[arg(long = "sentinel", default_value = "libsbuilt")]
    sentinel: String,

    /// Abort on the first instruction that exits unsuccessfully
    #[arg(long = "strict", action = ArgAction::SetTrue)]
    strict: bool,

    /// Do not warn about instructions that exit unsuccessfully
    #[arg(long = "quiet-instructions", action = ArgAction::SetTrue, conflicts_with = "strict")]
    quiet_instructions: bool,

    /// Print what would run and be copied without doing it
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,

    /// Emit the build report as JSON on stdout (progress goes to stderr)
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

/// Print the pipeline stage tag (frag|vert|tesc|tese|comp) named on a shader's first line.
#[derive(Debug, Parser)]
#[command(name = "shaderstage", version)]
pub struct ShaderStageCli {
    /// Shader source file to classify
    #[arg(
        value_hint = ValueHint::FilePath,
        required_unless_present = "scan",
        conflicts_with = "scan"
    )]
    file: Option<PathBuf>,

    /// Classify every shader source below these directories instead
    #[arg(long = "scan", num_args = 1.., value_hint = ValueHint::DirPath)]
    scan: Vec<PathBuf>,

    /// Only list these stages (e.g. vert,frag)
    #[arg(long = "stage", requires = "scan", value_hint = ValueHint::Other)]
    stage: Option<String>,

    /// Only list files without a stage marker
    #[arg(long = "unmarked", action = ArgAction::SetTrue, requires = "scan", conflicts_with = "stage")]
    unmarked: bool,

    /// Follow symlinks while walking scan roots
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue, requires = "scan")]
    follow_symlinks: bool,

    /// Number of classification threads
    #[arg(short = 'j', long = "jobs", requires = "scan")]
    jobs: Option<usize>,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, requires = "scan", conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue, requires = "scan")]
    ndjson: bool,
}

/// Install the env_logger backend; `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Parse buildlibs args and run the library builds.
pub fn run_buildlibs() -> Result<()> {
    let cli = BuildLibsCli::parse();
    let env_runtime = env::var_os(RUNTIME_DIR_ENV).map(PathBuf::from);
    let opts = build_options(&cli, env_runtime);
    let manifest = cli
        .manifest
        .clone()
        .unwrap_or_else(|| opts.manifest_path());
    log::debug!("manifest {}, options {:?}", manifest.display(), opts);

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut runner = ShellRunner::new();

    if cli.json {
        let report = build_from_manifest(&manifest, &opts, &mut runner, stderr.lock())?;
        write_json_pretty(&report, stdout.lock())?;
    } else {
        build_from_manifest(&manifest, &opts, &mut runner, stdout.lock())?;
    }

    Ok(())
}

fn build_options(cli: &BuildLibsCli, env_runtime: Option<PathBuf>) -> BuildOptions {
    let runtime_dir = cli
        .runtime_dir
        .clone()
        .or(env_runtime)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNTIME_DIR));

    let policy = if cli.strict {
        InstructionPolicy::Strict
    } else if cli.quiet_instructions {
        InstructionPolicy::Ignore
    } else {
        InstructionPolicy::Warn
    };

    BuildOptions::new(&cli.dir)
        .with_runtime_dir(runtime_dir)
        .with_sentinel_name(&cli.sentinel)
        .with_policy(policy)
        .dry_run(cli.dry_run)
}

/// Parse shaderstage args and classify one file or scan trees.
pub fn run_shaderstage() -> Result<()> {
    let cli = ShaderStageCli::parse();
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match &cli.file {
        Some(file) => classify_single(file, &mut handle),
        None => run_scan(&cli, &mut handle),
    }
}

fn classify_single(file: &Path, mut w: impl Write) -> Result<()> {
    if let Some(stage) = classify_file(file)? {
        w.write_all(stage.tag().as_bytes())?;
    }
    w.flush().context("flushing stdout")?;
    Ok(())
}

fn run_scan(cli: &ShaderStageCli, mut w: impl Write) -> Result<()> {
    let filter = build_filter(cli)?;
    let opts = ScanOptions {
        follow_symlinks: cli.follow_symlinks,
        jobs: cli.jobs,
    };

    let entries = scan(&cli.scan, &filter, &opts)?;
    log::debug!("classified {} shader(s)", entries.len());

    if cli.ndjson {
        write_ndjson(&entries, &mut w)?;
    } else if cli.json {
        write_json_pretty(&entries, &mut w)?;
    } else {
        write_plain(&entries, &mut w)?;
    }

    Ok(())
}

fn build_filter(cli: &ShaderStageCli) -> Result<StageFilter> {
    let stages = match &cli.stage {
        Some(raw) => parse_stage_list(raw)?,
        None => Vec::new(),
    };

    Ok(StageFilter::new()
        .with_stages(stages)
        .require_unmarked(cli.unmarked))
}
