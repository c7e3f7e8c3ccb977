//! Prints the dashboard metric cards for a date range as JSON.
//!
//! Usage: `dashboard_snapshot [START END] [SEED]` with dates as YYYY-MM-DD.
//! Without dates the configured default window ending today is used.

use chrono::{NaiveDate, Utc};
use rust_crm_api::config::Config;
use rust_crm_api::demo_data;
use rust_crm_api::core::metrics::{dashboard_metric_configs, derive_metrics};
use rust_crm_api::core::models::{DateRange, MetricsResponse};
use rust_crm_api::core::pipeline::{compute_conversion, leads_in_range};

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date '{}': {}", raw, e))
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let range = match args.as_slice() {
        [start, end, ..] => DateRange::new(parse_date(start)?, parse_date(end)?)?,
        [] => DateRange::last_days(Utc::now().date_naive(), config.default_range_days)?,
        _ => anyhow::bail!("usage: dashboard_snapshot [START END] [SEED]"),
    };
    if range.days() > i64::from(config.max_range_days) {
        anyhow::bail!(
            "range spans {} days, the maximum is {} (MAX_RANGE_DAYS)",
            range.days(),
            config.max_range_days
        );
    }
    let seed = match args.get(2) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("SEED must be an unsigned integer"))?,
        None => config.metrics_seed,
    };

    let leads = demo_data::leads();
    let metrics = derive_metrics(
        &leads,
        range.start,
        range.end,
        &dashboard_metric_configs(),
        seed,
    )?;

    let in_range = leads_in_range(&leads, &range);
    let conversion = compute_conversion(&in_range);
    eprintln!(
        "{} of {} leads created in range, {} won, {} lost, conversion {:.1}%",
        in_range.len(),
        leads.len(),
        conversion.won,
        conversion.lost,
        conversion.rate
    );

    let snapshot = MetricsResponse {
        range,
        seed,
        metrics,
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
