//! Status and conversion roll-ups over a lead collection.
//!
//! Everything here is a pure function of its inputs. Callers pass a snapshot
//! of the leads they care about (all leads, or the ones scoped to a date range
//! via [`leads_in_range`]) and get aggregates back.

use std::collections::BTreeMap;

use crate::errors::AppError;
use crate::models::{
    ConversionSummary, DateRange, Lead, LeadStatus, SourceEffectiveness, StatusGroup,
};

/// Partitions `leads` into one group per entry of `statuses`.
///
/// Groups come back in the order of `statuses`, and leads keep their relative
/// input order inside each group. Every lead must land in exactly one group:
/// a lead whose status is not listed, or a status listed twice, is rejected
/// with [`AppError::InvalidStatus`].
///
/// # Example
///
/// ```rust
/// use rust_crm_api::models::LeadStatus;
/// use rust_crm_api::pipeline::group_by_status;
///
/// let groups = group_by_status(&[], &LeadStatus::PIPELINE).unwrap();
/// assert_eq!(groups.len(), 7);
/// assert!(groups.iter().all(|g| g.leads.is_empty()));
/// ```
pub fn group_by_status<'a>(
    leads: &'a [Lead],
    statuses: &[LeadStatus],
) -> Result<Vec<StatusGroup<'a>>, AppError> {
    let mut column_of: BTreeMap<LeadStatus, usize> = BTreeMap::new();
    for (index, status) in statuses.iter().enumerate() {
        if column_of.insert(*status, index).is_some() {
            return Err(AppError::InvalidStatus(format!(
                "status '{}' listed more than once",
                status
            )));
        }
    }

    let mut groups: Vec<StatusGroup<'a>> = statuses
        .iter()
        .map(|status| StatusGroup {
            status: *status,
            leads: Vec::new(),
        })
        .collect();

    for lead in leads {
        let column = column_of.get(&lead.status).ok_or_else(|| {
            AppError::InvalidStatus(format!(
                "lead {} has status '{}' which is not among the requested columns",
                lead.id, lead.status
            ))
        })?;
        groups[*column].leads.push(lead);
    }

    tracing::debug!(
        "Grouped {} leads into {} status columns",
        leads.len(),
        groups.len()
    );

    Ok(groups)
}

/// Counts closed-won and closed-lost leads and the won share of all leads.
///
/// Only the exact `ClosedWon` / `ClosedLost` statuses count. The rate is
/// `won * 100 / total`, rounded to two decimals, and `0` for an empty slice.
pub fn compute_conversion(leads: &[Lead]) -> ConversionSummary {
    let won = leads
        .iter()
        .filter(|lead| lead.status == LeadStatus::ClosedWon)
        .count();
    let lost = leads
        .iter()
        .filter(|lead| lead.status == LeadStatus::ClosedLost)
        .count();

    ConversionSummary {
        won,
        lost,
        rate: percentage(won, leads.len()),
    }
}

/// Won rate per lead source, best first.
///
/// Sources are compared verbatim (`"Website"` and `"website"` are two
/// sources). Ties on rate are broken by source name ascending.
pub fn source_effectiveness(leads: &[Lead]) -> Vec<SourceEffectiveness> {
    // source -> (won, total)
    let mut tally: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for lead in leads {
        let entry = tally.entry(lead.source.as_str()).or_insert((0, 0));
        if lead.status == LeadStatus::ClosedWon {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    let mut ranked: Vec<SourceEffectiveness> = tally
        .into_iter()
        .map(|(source, (won, total))| SourceEffectiveness {
            source: source.to_string(),
            won,
            total,
            rate: percentage(won, total),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.rate
            .total_cmp(&a.rate)
            .then_with(|| a.source.cmp(&b.source))
    });

    ranked
}

/// Leads created within `range` (inclusive), in input order.
pub fn leads_in_range(leads: &[Lead], range: &DateRange) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| range.contains(lead.created_at.date_naive()))
        .cloned()
        .collect()
}

/// `part * 100 / whole` rounded to two decimals; `0` when `whole` is zero.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 * 100.0 / whole as f64, 2)
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn lead(id: &str, status: LeadStatus, source: &str) -> Lead {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Lead {
            id: id.to_string(),
            name: format!("Lead {}", id),
            email: format!("lead{}@example.com", id),
            phone: String::new(),
            company: String::new(),
            score: 50,
            status,
            last_contact: created,
            source: source.to_string(),
            notes: None,
            custom_fields: Default::default(),
            created_at: created,
        }
    }

    #[test]
    fn test_group_preserves_input_order() {
        let leads = vec![
            lead("1", LeadStatus::New, "Website"),
            lead("2", LeadStatus::Qualified, "Website"),
            lead("3", LeadStatus::New, "Website"),
        ];

        let groups = group_by_status(&leads, &LeadStatus::PIPELINE).unwrap();
        let new_ids: Vec<&str> = groups[0].leads.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(new_ids, vec!["1", "3"]);
        assert_eq!(groups[2].status, LeadStatus::Qualified);
        assert_eq!(groups[2].leads.len(), 1);
    }

    #[test]
    fn test_group_follows_requested_order() {
        let leads = vec![lead("1", LeadStatus::ClosedWon, "Website")];
        let groups =
            group_by_status(&leads, &[LeadStatus::ClosedWon, LeadStatus::New]).unwrap();
        assert_eq!(groups[0].status, LeadStatus::ClosedWon);
        assert_eq!(groups[0].leads.len(), 1);
    }

    #[test]
    fn test_group_rejects_unlisted_status() {
        let leads = vec![lead("1", LeadStatus::Negotiation, "Website")];
        let result = group_by_status(&leads, &[LeadStatus::New, LeadStatus::Contacted]);
        assert!(matches!(result, Err(AppError::InvalidStatus(_))));
    }

    #[test]
    fn test_group_rejects_duplicate_columns() {
        let result = group_by_status(&[], &[LeadStatus::New, LeadStatus::New]);
        assert!(matches!(result, Err(AppError::InvalidStatus(_))));
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(3, 10), 30.0);
        assert_eq!(percentage(0, 0), 0.0);
    }
}
