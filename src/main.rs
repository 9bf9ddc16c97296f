use certlister::config::{Config, DEFAULT_CONFIG_FILE};
use certlister::output::write_records;
use certlister::{input, CertLister, OpenSslFetcher};
use clap::Parser;
use log::LevelFilter;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

mod logging;

/// Exit status for usage and configuration problems.
const USAGE_EXIT_CODE: i32 = 2;

#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// File with one host entry (host or host:port) per line
    input: Option<PathBuf>,

    /// Host to check, may be repeated
    #[arg(short = 'H', long = "host")]
    hosts: Vec<String>,

    /// Output format: json, csv or text
    #[arg(short, long)]
    output: Option<String>,

    /// Write the output to this file instead of stdout
    #[arg(short = 'f', long)]
    output_file: Option<String>,

    /// Connect and handshake timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Number of hosts to check at the same time
    #[arg(short, long)]
    workers: Option<usize>,

    /// Exit code used when at least one host could not be checked
    #[arg(long)]
    exit_code: Option<i32>,

    /// Configuration file (defaults to ./certlister.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print an example configuration file and exit
    #[arg(long)]
    generate_config: bool,

    /// Log level (off, error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long)]
    log_level: Option<LevelFilter>,
}

impl Args {
    fn to_config(&self) -> Config {
        Config {
            hosts: if self.hosts.is_empty() {
                None
            } else {
                Some(self.hosts.clone())
            },
            input: self
                .input
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            output: self.output.clone(),
            output_file: self.output_file.clone(),
            timeout_secs: self.timeout,
            workers: self.workers,
            exit_code: self.exit_code,
        }
    }
}

fn load_config(args: &Args) -> Result<Config, String> {
    let file_config = match &args.config {
        Some(path) => Config::from_file(path)
            .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::from_file(DEFAULT_CONFIG_FILE)
            .map_err(|e| format!("Failed to load config {}: {}", DEFAULT_CONFIG_FILE, e))?,
        None => Config::default(),
    };

    let config = Config::defaults()
        .merge_with(file_config)
        .merge_with(args.to_config());
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn collect_hosts(config: &Config) -> Result<Vec<String>, String> {
    let mut hosts = match &config.input {
        Some(path) => input::read_hosts(path)
            .map_err(|e| format!("Failed to read host list {}: {}", path, e))?,
        None => Vec::new(),
    };
    if let Some(extra) = &config.hosts {
        hosts.extend(extra.iter().cloned());
    }
    if hosts.is_empty() {
        return Err("No hosts to check: pass a host list file or --host".to_string());
    }
    Ok(hosts)
}

fn run(args: &Args) -> Result<i32, String> {
    let config = load_config(args)?;
    let hosts = collect_hosts(&config)?;
    log::info!(
        "checking {} host(s) with {} worker(s), timeout {:?}",
        hosts.len(),
        config.workers(),
        config.timeout()
    );

    let lister = CertLister::new(OpenSslFetcher::new(config.timeout()));
    let report = lister.check_all_parallel(&hosts, config.workers());

    let mut out: Box<dyn Write> = match &config.output_file {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).map_err(|e| format!("Failed to create {}: {}", path, e))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    write_records(&mut out, &report.records(), config.output_format())
        .map_err(|e| format!("Failed to write output: {}", e))?;
    out.flush()
        .map_err(|e| format!("Failed to write output: {}", e))?;

    let failed = report.failures().len();
    if failed > 0 {
        log::warn!("{} of {} host(s) could not be checked", failed, report.len());
        Ok(config.failure_exit_code())
    } else {
        Ok(0)
    }
}

fn main() {
    let args = Args::parse();
    logging::init_logger(args.log_level);

    if args.generate_config {
        println!("{}", Config::example_toml());
        exit(0);
    }

    match run(&args) {
        Ok(code) => exit(code),
        Err(message) => {
            eprintln!("{}", message);
            exit(USAGE_EXIT_CODE);
        }
    }
}
