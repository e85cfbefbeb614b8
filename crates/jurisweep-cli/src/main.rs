mod output;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use jurisweep_core::ConfigError;
use jurisweep_fetch::{BackscrapeWindow, Backscraper, HttpFetcher, RetryPolicy, scrape_latest};
use jurisweep_sites::Adapter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jurisweep", version, about = "Scrape court opinion listings into normalized records")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Retries per request when a court site is unreachable.
    #[arg(long, global = true, env = "JURISWEEP_RETRIES", default_value_t = 3)]
    retries: u32,
}

#[derive(Subcommand)]
enum Command {
    /// List registered courts.
    List,

    /// Scrape the most recent opinions of one court.
    Scrape {
        /// Court id, e.g. `minn` or `pasuperct`.
        court: String,

        /// Write JSON Lines here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Backfill a date range, one request per interval-sized chunk.
    Backscrape {
        court: String,

        /// First date (MM/DD/YYYY or YYYY-MM-DD). Defaults to the court's
        /// earliest available opinion.
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Last date, inclusive. Defaults to today.
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Chunks fetched at once.
        #[arg(long, env = "JURISWEEP_CONCURRENCY", default_value_t = 1)]
        concurrency: usize,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    ["%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
        .ok_or_else(|| format!("invalid date {s:?}, expected MM/DD/YYYY or YYYY-MM-DD"))
}

fn http_fetcher(retries: u32) -> anyhow::Result<HttpFetcher> {
    let fetcher = HttpFetcher::new().context("building HTTP client")?;
    Ok(fetcher.with_retry(RetryPolicy::with_retries(retries)))
}

fn adapter_for(court: &str) -> anyhow::Result<Box<dyn Adapter>> {
    jurisweep_sites::lookup(court).ok_or_else(|| ConfigError::UnknownCourt(court.to_string()).into())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("jurisweep v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let today = Local::now().date_naive();

    match cli.command {
        Command::List => {
            for id in jurisweep_sites::court_ids() {
                if let Some(adapter) = jurisweep_sites::lookup(id) {
                    let cfg = adapter.config();
                    println!(
                        "{id:<12} {:<42} since {}  every {} days",
                        cfg.court_name, cfg.first_opinion_date, cfg.interval_days
                    );
                }
            }
        }
        Command::Scrape { court, out } => {
            let adapter = adapter_for(&court)?;
            let fetcher = http_fetcher(cli.retries)?;
            let records = scrape_latest(adapter.as_ref(), &fetcher, today)
                .await
                .with_context(|| format!("scraping {court}"))?;

            let mut sink = output::open_output(out.as_deref())?;
            output::write_jsonl(&mut sink, &records)?;
            eprintln!(
                "  {court}: {} records ({})",
                records.len(),
                output::status_tally(&records)
            );
        }
        Command::Backscrape {
            court,
            start,
            end,
            concurrency,
            out,
        } => {
            let adapter = adapter_for(&court)?;
            let window = BackscrapeWindow::resolve(start, end, adapter.config(), today)?;
            let fetcher = http_fetcher(cli.retries)?;
            eprintln!(
                "  Backscraping {court} from {} to {} ({} day chunks)",
                window.start,
                window.end,
                adapter.config().interval_days
            );

            let report = Backscraper::new(adapter.as_ref(), &fetcher)
                .run(window, concurrency)
                .await?;

            let mut sink = output::open_output(out.as_deref())?;
            output::write_jsonl(&mut sink, &report.records)?;
            output::print_backscrape_summary(&court, &report);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_both_date_styles() {
        let expected = NaiveDate::from_ymd_opt(2024, 8, 9).unwrap();
        assert_eq!(parse_date("08/09/2024"), Ok(expected));
        assert_eq!(parse_date("8/9/2024"), Ok(expected));
        assert_eq!(parse_date("2024-08-09"), Ok(expected));
        assert!(parse_date("9 Aug 2024").is_err());
    }

    #[test]
    fn backscrape_args() {
        let cli = Cli::try_parse_from([
            "jurisweep",
            "backscrape",
            "minn",
            "--start",
            "01/01/2024",
            "--end",
            "2024-02-01",
            "--concurrency",
            "4",
        ])
        .unwrap();
        match cli.command {
            Command::Backscrape {
                court,
                start,
                end,
                concurrency,
                out,
            } => {
                assert_eq!(court, "minn");
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 1));
                assert_eq!(concurrency, 4);
                assert!(out.is_none());
            }
            _ => panic!("expected backscrape"),
        }
        assert_eq!(cli.retries, 3);
    }

    #[test]
    fn retries_flag_is_global() {
        let cli = Cli::try_parse_from(["jurisweep", "scrape", "minn", "--retries", "0"]).unwrap();
        assert_eq!(cli.retries, 0);
    }

    #[test]
    fn rejects_bad_date_arg() {
        let res = Cli::try_parse_from(["jurisweep", "backscrape", "minn", "--start", "soon"]);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_court_is_an_error() {
        let err = adapter_for("nowhere").err().unwrap();
        assert_eq!(err.to_string(), "unknown court id: nowhere");
    }
}
