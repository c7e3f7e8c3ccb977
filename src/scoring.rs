//! Rule-based lead scoring.
//!
//! A lead's score is the sum of the points of every active rule whose
//! criteria all match, clamped to `[0, 100]`.

use crate::models::{
    CriterionValue, Lead, ScoringCriterion, ScoringField, ScoringOperator, ScoringRule,
};

/// Scores `lead` against `rules`.
pub fn score_lead(lead: &Lead, rules: &[ScoringRule]) -> u8 {
    let total: i64 = rules
        .iter()
        .filter(|rule| rule.is_active && rule_matches(lead, rule))
        .map(|rule| i64::from(rule.points))
        .sum();

    total.clamp(0, 100) as u8
}

/// A rule with no criteria matches every lead.
pub fn rule_matches(lead: &Lead, rule: &ScoringRule) -> bool {
    rule.criteria
        .iter()
        .all(|criterion| criterion_matches(lead, criterion))
}

enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

fn field_value(lead: &Lead, field: ScoringField) -> FieldValue<'_> {
    match field {
        ScoringField::Name => FieldValue::Text(&lead.name),
        ScoringField::Email => FieldValue::Text(&lead.email),
        ScoringField::Phone => FieldValue::Text(&lead.phone),
        ScoringField::Company => FieldValue::Text(&lead.company),
        ScoringField::Source => FieldValue::Text(&lead.source),
        ScoringField::Status => FieldValue::Text(lead.status.as_str()),
        ScoringField::Score => FieldValue::Number(f64::from(lead.score)),
    }
}

fn criterion_matches(lead: &Lead, criterion: &ScoringCriterion) -> bool {
    match (field_value(lead, criterion.field), &criterion.value) {
        (FieldValue::Text(actual), CriterionValue::Text(expected)) => {
            let actual = actual.to_lowercase();
            let expected = expected.to_lowercase();
            match criterion.operator {
                ScoringOperator::Equals => actual == expected,
                ScoringOperator::Contains => actual.contains(&expected),
                // ordering operators are numeric only
                ScoringOperator::GreaterThan | ScoringOperator::LessThan => false,
            }
        }
        (FieldValue::Number(actual), CriterionValue::Number(expected)) => {
            match criterion.operator {
                ScoringOperator::Equals => actual == *expected,
                ScoringOperator::GreaterThan => actual > *expected,
                ScoringOperator::LessThan => actual < *expected,
                ScoringOperator::Contains => false,
            }
        }
        _ => false,
    }
}
