/// Lead directory logic shared by the leads table and lead creation
///
/// This module provides:
/// 1. Record validation (score bounds, timestamps, email format)
/// 2. Phone normalization to E.164
/// 3. Table filtering, sorting and free-text search
use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::errors::AppError;
use crate::models::{Lead, LeadsFilter, LeadsTableSort, SortDirection, SortField};

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        // RFC 5322 simplified: local@domain.tld
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
        )
        .expect("email regex is valid")
    })
}

/// Validate email address
///
/// Requires a local part, an `@`, and a dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 {
        return false;
    }

    if !email_regex().is_match(email) {
        tracing::warn!("Invalid email format: {}", email);
        return false;
    }

    true
}

/// Validate and normalize a phone number
///
/// Uses the phonenumber library (port of Google's libphonenumber). Numbers
/// without a `+` prefix are read as national numbers of `region`.
///
/// Returns `Some(e164)` for valid numbers, `None` otherwise.
pub fn normalize_phone(raw: &str, region: CountryId) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    match phonenumber::parse(Some(region), raw) {
        Ok(number) if phonenumber::is_valid(&number) => {
            let formatted = number.format().mode(Mode::E164).to_string();
            tracing::debug!("Valid phone: {} -> {}", raw, formatted);
            Some(formatted)
        }
        Ok(_) => {
            tracing::warn!("Phone number not valid: {}", raw);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to parse phone '{}': {:?}", raw, e);
            None
        }
    }
}

/// Checks the record-level invariants of a lead.
pub fn validate_lead(lead: &Lead) -> Result<(), AppError> {
    if lead.name.trim().is_empty() {
        return Err(AppError::BadRequest("lead name cannot be empty".to_string()));
    }
    if lead.score > 100 {
        return Err(AppError::BadRequest(format!(
            "score must be between 0 and 100, got {}",
            lead.score
        )));
    }
    if lead.last_contact < lead.created_at {
        return Err(AppError::BadRequest(format!(
            "lastContact {} is before createdAt {}",
            lead.last_contact, lead.created_at
        )));
    }
    if !is_valid_email(&lead.email) {
        return Err(AppError::BadRequest(format!(
            "invalid email address '{}'",
            lead.email
        )));
    }
    Ok(())
}

/// Leads matching every criterion present in `filter`, in input order.
pub fn filter_leads(leads: &[Lead], filter: &LeadsFilter) -> Vec<Lead> {
    leads
        .iter()
        .filter(|lead| {
            filter
                .status
                .as_ref()
                .map_or(true, |statuses| statuses.contains(&lead.status))
        })
        .filter(|lead| {
            filter
                .score_range
                .map_or(true, |(min, max)| lead.score >= min && lead.score <= max)
        })
        .filter(|lead| {
            filter
                .source
                .as_ref()
                .map_or(true, |sources| sources.iter().any(|s| s == &lead.source))
        })
        .filter(|lead| {
            filter
                .date_range
                .map_or(true, |range| range.contains(lead.created_at.date_naive()))
        })
        .cloned()
        .collect()
}

/// Case-insensitive substring search over name, email and company.
pub fn search_leads(leads: Vec<Lead>, query: &str) -> Vec<Lead> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return leads;
    }

    leads
        .into_iter()
        .filter(|lead| {
            lead.name.to_lowercase().contains(&needle)
                || lead.email.to_lowercase().contains(&needle)
                || lead.company.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort by one column. Status sorts in pipeline order; text columns
/// compare case-insensitively.
pub fn sort_leads(leads: &mut [Lead], sort: LeadsTableSort) {
    leads.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort.field);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &Lead, b: &Lead, field: SortField) -> Ordering {
    let text = |x: &str, y: &str| x.to_lowercase().cmp(&y.to_lowercase());
    match field {
        SortField::Name => text(&a.name, &b.name),
        SortField::Email => text(&a.email, &b.email),
        SortField::Company => text(&a.company, &b.company),
        SortField::Source => text(&a.source, &b.source),
        SortField::Score => a.score.cmp(&b.score),
        SortField::Status => a.status.cmp(&b.status),
        SortField::LastContact => a.last_contact.cmp(&b.last_contact),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}
