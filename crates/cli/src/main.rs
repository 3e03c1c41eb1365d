// ice-compare: check registry immunization decisions against the ICE forecaster

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use icecompare_cli::exit_codes::{
    EXIT_CONFIG, EXIT_FINDINGS, EXIT_OUTPUT, EXIT_REGISTRY, EXIT_SUCCESS,
};
use icecompare_cli::{load_reference_tables, run_comparison, CompareError};
use icecompare_config::CompareConfig;
use icecompare_forecaster::IceClient;
use icecompare_registry::SqliteRegistry;

#[derive(Parser)]
#[command(name = "ice-compare")]
#[command(about = "Compare stored immunization evaluations and recommendations against ICE")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
Examples:
  ice-compare
  ice-compare --config /etc/ice-compare.toml --debug
  ice-compare --fail-on-findings > findings.txt")]
struct Cli {
    /// Config file (default: ./ice-compare.toml, then the user config dir)
    #[arg(long, env = "ICE_COMPARE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging, including raw forecaster responses
    #[arg(long)]
    debug: bool,

    /// Exit 1 when any finding was written
    #[arg(long)]
    fail_on_findings: bool,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
    )
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn config(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_CONFIG,
            message: msg.into(),
            hint: Some(format!(
                "pass --config <path> or create {}",
                icecompare_config::DEFAULT_CONFIG_FILE
            )),
        }
    }

    fn registry(msg: impl Into<String>) -> Self {
        Self { code: EXIT_REGISTRY, message: msg.into(), hint: None }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<CompareError> for CliError {
    fn from(e: CompareError) -> Self {
        match e {
            CompareError::Registry(_) => CliError::registry(e.to_string()),
            CompareError::Output(_) => CliError {
                code: EXIT_OUTPUT,
                message: e.to_string(),
                hint: None,
            },
        }
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<u8, CliError> {
    let (config, source) = CompareConfig::load(cli.config.as_deref())
        .map_err(|e| CliError::config(e.to_string()))?;
    log::info!("using config {}", source.display());
    log::debug!("{:?}", config.database);

    let store = SqliteRegistry::open_read_only(Path::new(&config.database.sid)).map_err(|e| {
        CliError::registry(e.to_string()).with_hint("database.sid must name an existing registry file")
    })?;
    let tables = load_reference_tables(&store).map_err(|e| CliError::registry(e.to_string()))?;

    let forecaster = IceClient::new(config.ice.service_endpoint.as_str())
        .map_err(|e| CliError::config(e.to_string()))?;
    log::info!("forecaster endpoint {}", forecaster.endpoint());

    let today = chrono::Local::now().date_naive();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_comparison(
        &store,
        &forecaster,
        &tables,
        config.compare.number_of_children,
        today,
        &mut out,
    )?;

    eprintln!("{summary}");

    if cli.fail_on_findings && summary.total_findings() > 0 {
        Ok(EXIT_FINDINGS)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = &e.hint {
                eprintln!("  hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}
