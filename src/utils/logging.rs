use log::LevelFilter;
use std::io::Write;

/// Installs the `env_logger` backend on stderr.
///
/// `--verbose` selects debug output, otherwise warnings only; `RUST_LOG`
/// overrides both. A second call is a no-op.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}

pub fn print_verbose(verbose: bool, msg: &str) {
    if verbose {
        println!("Verbose: {}", msg);
    }
}
