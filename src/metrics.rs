//! Dashboard metric cards: seeded sparkline series, trend and derivation.
//!
//! A metric is recomputed from scratch for every `(leads, range, seed)`
//! request. Nothing is cached between calls.

use chrono::NaiveDate;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::errors::{AppError, ResultExt};
use crate::models::{DateRange, Lead, Metric, MetricBasis, MetricConfig, SeriesPoint};
use crate::pipeline::{compute_conversion, leads_in_range, round_to};

/// Maximum step of the random walk, as a share of the base value.
/// Each step moves by `(u - 0.5) * SWING * base` with `u` in `[0, 1)`,
/// i.e. at most 30% of the base value either way.
const SWING: f64 = 0.6;

/// Generates one point per calendar day of `[start, end]`.
///
/// Values start from `base_value` and follow a bounded random walk floored at
/// zero. The walk is driven by a PRNG seeded with `seed`, so the output is a
/// pure function of the four arguments.
///
/// A single-day range still yields two points so a line can be drawn; the
/// second repeats the first under a `"<label> (end)"` label.
///
/// # Errors
///
/// [`AppError::InvalidDateRange`] when `end < start`.
pub fn generate_series(
    start: NaiveDate,
    end: NaiveDate,
    base_value: u64,
    seed: u64,
) -> Result<Vec<SeriesPoint>, AppError> {
    let range = DateRange::new(start, end)?;
    Ok(series_for_range(&range, base_value, seed))
}

/// [`generate_series`] over an already validated range.
pub fn series_for_range(range: &DateRange, base_value: u64, seed: u64) -> Vec<SeriesPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = base_value as f64;
    let mut current = base;

    let mut series: Vec<SeriesPoint> = range
        .start
        .iter_days()
        .take(range.days() as usize)
        .map(|day| {
            let u: f64 = rng.random();
            let fluctuation = (u - 0.5) * (base * SWING);
            current = (current + fluctuation).round().max(0.0);
            SeriesPoint {
                label: day.format("%b %-d").to_string(),
                value: current as u64,
            }
        })
        .collect();

    if series.len() == 1 {
        let only = series[0].clone();
        series.push(SeriesPoint {
            label: format!("{} (end)", only.label),
            value: only.value,
        });
    }

    series
}

/// Percent change from the first to the last point, rounded to one decimal.
///
/// Starting from zero, any rise counts as `100` and a flat zero line as `0`.
///
/// # Errors
///
/// [`AppError::InsufficientData`] for series shorter than two points.
pub fn compute_trend(series: &[SeriesPoint]) -> Result<f64, AppError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => (first.value as f64, last.value as f64),
        _ => return Err(AppError::InsufficientData(series.len())),
    };

    if first > 0.0 {
        Ok(round_to((last - first) / first * 100.0, 1))
    } else if last > 0.0 {
        Ok(100.0)
    } else {
        Ok(0.0)
    }
}

/// Computes every configured metric card for `[start, end]`.
///
/// Each card gets its own PRNG stream, seeded from `seed` and the card name,
/// so two cards with the same base value still draw different lines while
/// the whole result stays reproducible.
pub fn derive_metrics(
    leads: &[Lead],
    start: NaiveDate,
    end: NaiveDate,
    configs: &[MetricConfig],
    seed: u64,
) -> Result<Vec<Metric>, AppError> {
    let range = DateRange::new(start, end)?;
    let in_range = leads_in_range(leads, &range);

    tracing::debug!(
        "Deriving {} metrics for {}..={} ({} of {} leads in range, seed {})",
        configs.len(),
        range.start,
        range.end,
        in_range.len(),
        leads.len(),
        seed
    );

    configs
        .iter()
        .map(|config| {
            let base_value = resolve_base_value(config, &in_range);
            let series = series_for_range(&range, base_value, metric_seed(seed, &config.name));
            let trend = compute_trend(&series)
                .with_context(|| format!("trend of metric '{}'", config.name))?;
            let current_value = series.last().map(|p| p.value).unwrap_or(base_value);

            Ok(Metric {
                name: config.name.clone(),
                icon: config.icon.clone(),
                current_value,
                trend,
                series,
                link_to: config.link_to.clone(),
            })
        })
        .collect()
}

/// Per-card seed: first eight bytes of `SHA-256(seed || name)`.
pub fn metric_seed(seed: u64, name: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn resolve_base_value(config: &MetricConfig, in_range: &[Lead]) -> u64 {
    match config.basis {
        MetricBasis::Fixed => config.base_value,
        MetricBasis::LeadCount => in_range.len() as u64,
        MetricBasis::Won => compute_conversion(in_range).won as u64,
        MetricBasis::Lost => compute_conversion(in_range).lost as u64,
        MetricBasis::ConversionRate => compute_conversion(in_range).rate.round() as u64,
    }
}

/// The six cards of the sales dashboard.
pub fn dashboard_metric_configs() -> Vec<MetricConfig> {
    let card = |name: &str, base_value: u64, icon: &str, link_to: Option<&str>| MetricConfig {
        name: name.to_string(),
        base_value,
        icon: icon.to_string(),
        link_to: link_to.map(str::to_string),
        basis: MetricBasis::Fixed,
    };

    vec![
        card("Total Leads", 2500, "users", Some("leads")),
        card("Calls Analyzed", 1100, "phone", Some("calls")),
        card("Conversion Rate", 28, "target", Some("conversion")),
        card("Revenue", 800_000, "dollar", None),
        card("Wins", 120, "check", Some("opportunities")),
        card("Losses", 35, "x", Some("opportunities")),
    ]
}
