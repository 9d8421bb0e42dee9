//! Binary entrypoint for buildlibs.

fn main() {
    omicron_build_cli::init_logging();
    if let Err(err) = omicron_build_cli::run_buildlibs() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
