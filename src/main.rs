mod analysis;
mod config;
mod error;
mod indicator;
mod model;
mod provider;
mod report;
mod sector;
mod verdict;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use analysis::{analyze_sector, analyze_stock};
use config::AppConfig;
use error::TimeframeError;
use model::{Period, Timeframe};
use provider::MarketData;
use provider::yahoo::YahooProvider;
use report::Reporter;
use report::terminal::TerminalReporter;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("invalid timeframe")]
    Timeframe,
    #[display("analysis failed")]
    Analysis,
}

#[derive(Parser)]
#[command(name = "sector-scan", about = "Bollinger Band and RSI analysis for stocks and sectors")]
#[command(group(ArgGroup::new("target").required(true).multiple(true).args(["sector", "ticker"])))]
struct Cli {
    /// Path to the TOML sector roster file
    #[arg(short, long, default_value = "sectors.toml")]
    config: String,

    /// Sector name from the roster to analyze
    #[arg(long)]
    sector: Option<String>,

    /// Individual ticker symbol to analyze (e.g. AAPL, TSLA)
    #[arg(long)]
    ticker: Option<String>,

    /// Named lookback period: 1d, 5d, 1mo, 3mo, 6mo, ytd, 1y, 2y, 5y
    #[arg(long, default_value = "1y", conflicts_with_all = ["start", "end"])]
    period: String,

    /// Explicit range start (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Explicit range end (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    // Timeframe is validated before any fetch happens
    let timeframe = parse_timeframe(&cli).change_context(AppError::Timeframe)?;
    let fetch_timeout = Duration::from_secs(config.general.fetch_timeout_secs);

    let provider: Arc<dyn MarketData> = Arc::new(YahooProvider::with_base_url(
        &config.provider.base_url,
        config.provider.requests_per_second,
    ));
    let reporter = TerminalReporter;

    // A failed sector analysis still lets the individual stock run; the
    // failure is surfaced at the end.
    let mut sector_outcome: Result<(), Report<AppError>> = Ok(());
    if let Some(name) = &cli.sector {
        let Some(roster) = config.sector(name) else {
            return Err(Report::new(AppError::Config)
                .attach(format!("sector \"{name}\" not found in roster")));
        };
        match analyze_sector(
            Arc::clone(&provider),
            name,
            &roster.tickers,
            timeframe,
            fetch_timeout,
        )
        .await
        {
            Ok(analysis) => reporter.report_sector(&analysis),
            Err(e) => {
                tracing::error!(sector = %name, error = ?e, "sector analysis failed");
                sector_outcome = Err(e.change_context(AppError::Analysis));
            }
        }
    }

    if let Some(symbol) = &cli.ticker {
        let analysis = analyze_stock(provider.as_ref(), symbol, timeframe, fetch_timeout)
            .await
            .change_context(AppError::Analysis)?;
        match analysis.verdict() {
            Ok(verdict) => reporter.report_stock(&analysis, Some(&verdict)),
            Err(e) => {
                warn!(symbol = %symbol, error = ?e, "no verdict for stock");
                reporter.report_stock(&analysis, None);
            }
        }
    }

    sector_outcome
}

fn parse_timeframe(cli: &Cli) -> Result<Timeframe, Report<TimeframeError>> {
    match (&cli.start, &cli.end) {
        (Some(start), Some(end)) => {
            Timeframe::range(parse_date(start)?, parse_date(end)?)
        }
        _ => {
            let period = Period::from_str(&cli.period).ok_or_else(|| {
                Report::new(TimeframeError::UnknownPeriod {
                    token: cli.period.clone(),
                })
            })?;
            Ok(Timeframe::Period(period))
        }
    }
}

fn parse_date(input: &str) -> Result<NaiveDate, Report<TimeframeError>> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        Report::new(TimeframeError::InvalidDate {
            input: input.to_owned(),
        })
    })
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
