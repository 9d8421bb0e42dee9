//! omicron-build-core: build helpers for the Omicron engine.
//!
//! Two unrelated tools share this crate:
//!
//! - **Library builds** ([`orchestrator`]): read the `work.json` [`manifest`], run each
//!   library's shell instructions inside its directory, and copy the declared binaries flat
//!   into the engine's runtime directory. A `libsbuilt` sentinel marks a complete run.
//! - **Shader stages** ([`stage`]): the first line of a shader carries an `OMICRON_*` marker
//!   naming its pipeline stage; [`stage::classify_file`] maps it to the `frag`/`vert`/`tesc`/
//!   `tese`/`comp` tag the shader build passes to glslc. [`scan`] does the same for whole trees.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use omicron_build_core::orchestrator::{build_from_manifest, BuildOptions};
//! use omicron_build_core::runner::ShellRunner;
//!
//! let opts = BuildOptions::new("libs");
//! let mut runner = ShellRunner::new();
//! let report = build_from_manifest(&opts.manifest_path(), &opts, &mut runner, std::io::stdout())?;
//! println!("built {} libraries", report.libraries.len());
//!
//! let _stage = omicron_build_core::stage::classify_file(Path::new("shaders/line.glsl"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod discovery;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod query;
pub mod runner;
pub mod scan;
pub mod stage;
