use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use disk_space_metrics::util::output::{json_report, write_graphite};
use disk_space_metrics::{
    CollectError, CollectionReport, Config, DiskUsageCollector, ErrorKind, FileSource, PassStatus,
    UsageSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Off   => "off",
            LogLevel::Error => "error",
            LogLevel::Warn  => "warn",
            LogLevel::Info  => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "metrics-disk-space",
    about = "Emit graphite disk-space metrics for /dev/ filesystems reported by df",
    version,
    after_help = "Exit codes: 0 OK, 1 usage/config error or stdout not writable, 2 df failed, 3 some df lines were malformed"
)]
struct Cli {
    /// Metric naming scheme, text to prepend to metric [default: <hostname>.disk]
    #[arg(short, long)]
    scheme: Option<String>,

    /// Config file (TOML) [default: <config dir>/disk-space-metrics/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kill df after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Only report filesystems of this type (repeatable)
    #[arg(long = "fs-type", value_name = "TYPE")]
    fs_types: Vec<String>,

    /// Skip filesystems of this type (repeatable)
    #[arg(long = "exclude-fs-type", value_name = "TYPE")]
    exclude_fs_types: Vec<String>,

    /// Parse saved `df -PT` output instead of running df ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Print a JSON document instead of graphite lines
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Log level for stderr diagnostics (RUST_LOG overrides)
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.log_level);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let kind = classify(&e);
            error!(?kind, "{:#}", e);
            eprintln!("DiskSpace {}: {:#}", if kind == ErrorKind::Config { "ERROR" } else { "CRITICAL" }, e);
            ExitCode::from(kind.exit_code())
        }
    }
}

fn setup_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<u8> {
    let cfg = resolve_config(cli)?;

    if cli.print_config {
        let text = cfg.to_toml().context("serializing configuration")?;
        let header = config_source_line(cli.config.clone().or_else(Config::config_path));
        write_config(&mut io::stdout().lock(), &header, &text)
            .context("writing configuration to stdout")?;
        return Ok(0);
    }

    let scheme = cfg.scheme();
    let source: Box<dyn UsageSource> = match &cli.input {
        Some(path) => Box::new(FileSource(path.clone())),
        None       => Box::new(cfg.df_command()),
    };
    debug!(%scheme, input = ?cli.input, "starting collection pass");

    let collector = DiskUsageCollector::new(source).with_filter(cfg.type_filter());
    let report = collector.collect(&scheme)?;
    let timestamp = chrono::Utc::now().timestamp();

    emit(&mut io::stdout().lock(), cli.json, &scheme, timestamp, &report)
        .context("writing metrics to stdout")?;

    report_failures(&report);
    Ok(exit_code(&report))
}

fn emit<W: Write>(out: &mut W, json: bool, scheme: &str, timestamp: i64, report: &CollectionReport) -> io::Result<()> {
    if json {
        let doc = json_report(scheme, timestamp, report);
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
        out.flush()
    } else {
        write_graphite(out, &report.tuples, timestamp)
    }
}

fn write_config<W: Write>(out: &mut W, header: &str, text: &str) -> io::Result<()> {
    writeln!(out, "{}", header)?;
    out.write_all(text.as_bytes())?;
    out.flush()
}

fn config_source_line(path: Option<PathBuf>) -> String {
    match path {
        Some(p) if p.is_file() => format!("# config file: {}", p.display()),
        Some(p)                => format!("# config file: (defaults, {} not found)", p.display()),
        None                   => "# config file: (defaults)".to_string(),
    }
}

/// CLI flags win over the config file, which wins over defaults.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut cfg = Config::load(cli.config.as_deref()).context("loading configuration")?;

    if let Some(scheme) = &cli.scheme { cfg.general.scheme = Some(scheme.clone()); }
    if let Some(ms) = cli.timeout_ms  { cfg.general.timeout_ms = ms; }
    if !cli.fs_types.is_empty()         { cfg.filter.include_types = cli.fs_types.clone(); }
    if !cli.exclude_fs_types.is_empty() { cfg.filter.exclude_types = cli.exclude_fs_types.clone(); }

    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

fn report_failures(report: &CollectionReport) {
    if report.failures.is_empty() { return; }
    eprintln!(
        "DiskSpace {}: {} malformed line(s) from df",
        report.status().label(),
        report.failures.len()
    );
    for f in &report.failures {
        eprintln!("  {}", f);
    }
}

fn exit_code(report: &CollectionReport) -> u8 {
    match report.status() {
        PassStatus::Complete => 0,
        PassStatus::Partial  => ErrorKind::ParseFailure.exit_code(),
    }
}

fn classify(e: &anyhow::Error) -> ErrorKind {
    e.downcast_ref::<CollectError>()
        .map(CollectError::kind)
        .unwrap_or(ErrorKind::Config)
}
