use log::LevelFilter;
use std::io::Write;

/// Initializes env_logger on stderr.
///
/// `RUST_LOG` is honoured, but an explicit `level` takes precedence so that
/// `--log-level` always wins.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{} {}] {}",
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.target(env_logger::Target::Stderr);
    // a second initialisation only happens in tests
    let _ = builder.try_init();
}
