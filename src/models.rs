use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

// ============ Pipeline Models ============

/// Stage of a lead in the sales pipeline.
///
/// Variants are declared in pipeline order, so the derived `Ord` sorts
/// `New` first and the two closed stages last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadStatus {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "contacted")]
    Contacted,
    #[serde(rename = "qualified")]
    Qualified,
    #[serde(rename = "proposal sent")]
    ProposalSent,
    #[serde(rename = "negotiation")]
    Negotiation,
    #[serde(rename = "closed won")]
    ClosedWon,
    #[serde(rename = "closed lost")]
    ClosedLost,
}

impl LeadStatus {
    /// Every status, in the order the Kanban board shows its columns.
    pub const PIPELINE: [LeadStatus; 7] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::ProposalSent,
        LeadStatus::Negotiation,
        LeadStatus::ClosedWon,
        LeadStatus::ClosedLost,
    ];

    /// Wire literal of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::ProposalSent => "proposal sent",
            LeadStatus::Negotiation => "negotiation",
            LeadStatus::ClosedWon => "closed won",
            LeadStatus::ClosedLost => "closed lost",
        }
    }

    /// Parses an exact wire literal. No trimming or case folding is applied,
    /// so `"Closed Won"` and `"won"` are both rejected.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        LeadStatus::PIPELINE
            .iter()
            .copied()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| AppError::InvalidStatus(format!("unknown status '{}'", raw)))
    }

    /// Title-cased label for column headers ("Proposal Sent").
    pub fn display_name(&self) -> String {
        self.as_str()
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStatus::ClosedWon | LeadStatus::ClosedLost)
    }

    /// Forward-only transition rule.
    ///
    /// A lead may move to any later stage (skipping stages is allowed) and may
    /// close from any open stage. Nothing leaves a closed stage, and a lead
    /// never moves backwards or onto its current stage.
    pub fn can_transition_to(&self, next: LeadStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next > *self
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::parse(s)
    }
}

/// A sales prospect record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Stable identifier for the record's lifetime.
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    /// Likelihood-to-convert estimate in [0, 100].
    pub score: u8,
    pub status: LeadStatus,
    /// Last time the lead was contacted. Never earlier than `created_at`.
    pub last_contact: DateTime<Utc>,
    /// Acquisition channel ("Website", "Referral", ...).
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending on `today` (inclusive).
    ///
    /// Fails with [`AppError::BadRequest`] when the window would start before
    /// the earliest representable date.
    pub fn last_days(today: NaiveDate, days: u32) -> Result<Self, AppError> {
        let span = i64::from(days.max(1)) - 1;
        let start = today
            .checked_sub_signed(Duration::days(span))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "a {}-day range ending on {} starts before the earliest supported date",
                    days, today
                ))
            })?;
        Ok(Self { start, end: today })
    }

    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

// ============ Lead Table Models ============

/// Filter criteria for the leads table. Absent criteria match every lead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadsFilter {
    pub status: Option<Vec<LeadStatus>>,
    /// Inclusive score bounds.
    pub score_range: Option<(u8, u8)>,
    pub source: Option<Vec<String>>,
    /// Matched against the lead's creation date.
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Email,
    Company,
    Score,
    Status,
    Source,
    LastContact,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadsTableSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for LeadsTableSort {
    /// Most recently contacted first, as the leads table opens.
    fn default() -> Self {
        Self {
            field: SortField::LastContact,
            direction: SortDirection::Desc,
        }
    }
}

// ============ Scoring Models ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoringField {
    Name,
    Email,
    Phone,
    Company,
    Source,
    Status,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoringOperator {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
}

/// Right-hand side of a scoring criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringCriterion {
    pub field: ScoringField,
    pub operator: ScoringOperator,
    pub value: CriterionValue,
}

/// A rule awarding `points` to every lead that meets all of its criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub criteria: Vec<ScoringCriterion>,
    /// May be negative to penalise.
    pub points: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// ============ Interaction Models ============

/// One line of a call or meeting transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Offset into the recording ("05:30").
    pub timestamp: String,
    pub speaker: String,
    pub text: String,
}

/// Analysis attached to a call or meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallInsights {
    pub summary: String,
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
    pub todo_list: Vec<String>,
    pub overall_score: u8,
    pub script_adherence_score: u8,
    pub deal_closure_probability: u8,
    pub transcription: Vec<TranscriptLine>,
}

/// A logged phone call with a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: String,
    pub lead_id: String,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    /// "mm:ss"
    pub duration: String,
    /// `None` means no analysis is available for this call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<CallInsights>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingPlatform {
    #[serde(rename = "Google Meet")]
    GoogleMeet,
    Zoom,
    Phone,
}

/// A held meeting with a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub lead_id: String,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    pub duration: String,
    pub platform: MeetingPlatform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<CallInsights>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingKind {
    Videoconference,
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    #[serde(rename = "to be confirmed")]
    ToBeConfirmed,
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "confirmation requested")]
    ConfirmationRequested,
}

/// A scheduled meeting that has not happened yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingMeeting {
    pub id: String,
    pub lead_id: String,
    pub agent_name: String,
    pub date: DateTime<Utc>,
    pub kind: MeetingKind,
    pub status: ConfirmationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Entry of a lead's activity timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimelineEntry {
    Call(Call),
    Meeting(Meeting),
}

impl TimelineEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimelineEntry::Call(call) => call.timestamp,
            TimelineEntry::Meeting(meeting) => meeting.timestamp,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            TimelineEntry::Call(call) => &call.id,
            TimelineEntry::Meeting(meeting) => &meeting.id,
        }
    }
}

// ============ Derived Models ============

/// Leads sharing one status, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusGroup<'a> {
    pub status: LeadStatus,
    pub leads: Vec<&'a Lead>,
}

/// Won/lost counts and the won share of all leads in scope, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub won: usize,
    pub lost: usize,
    pub rate: f64,
}

/// Won share of the leads acquired through one source, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEffectiveness {
    pub source: String,
    pub won: usize,
    pub total: usize,
    pub rate: f64,
}

/// One day of a metric sparkline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: u64,
}

/// Where a metric card takes its base value from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricBasis {
    /// Use the configured `base_value` as is.
    #[default]
    Fixed,
    /// Number of leads created in the range.
    LeadCount,
    /// Leads created in the range that closed won.
    Won,
    /// Leads created in the range that closed lost.
    Lost,
    /// Conversion rate of the leads created in the range, rounded.
    ConversionRate,
}

/// Static description of a dashboard metric card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricConfig {
    pub name: String,
    pub base_value: u64,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_to: Option<String>,
    #[serde(default)]
    pub basis: MetricBasis,
}

/// A metric card computed for one date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub name: String,
    pub icon: String,
    pub current_value: u64,
    pub trend: f64,
    pub series: Vec<SeriesPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_to: Option<String>,
}

// ============ API Request/Response Models ============

/// Request payload for creating a lead.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    pub source: String,
    /// When absent the lead is scored with the configured scoring rules.
    pub score: Option<u8>,
    pub notes: Option<String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

/// Request payload for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Raw literal, parsed exactly.
    pub status: String,
}

/// Query parameters of the leads table endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadsQueryParams {
    /// Comma-separated status literals.
    pub status: Option<String>,
    pub min_score: Option<u8>,
    pub max_score: Option<u8>,
    /// Comma-separated sources.
    pub source: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Free-text search over name, email and company.
    pub q: Option<String>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
}

/// Optional date range in query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQueryParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Query parameters of the dashboard metrics endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct MetricsQueryParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub seed: Option<u64>,
}

/// Request payload for deriving metrics from caller-supplied configs.
#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub seed: Option<u64>,
    pub configs: Vec<MetricConfig>,
}

/// Response payload of the metrics endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub range: DateRange,
    pub seed: u64,
    pub metrics: Vec<Metric>,
}

/// Query parameters of the call search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CallsQueryParams {
    pub q: Option<String>,
}

/// Request payload for evaluating scoring rules against every lead.
#[derive(Debug, Deserialize)]
pub struct ScoringRequest {
    pub rules: Vec<ScoringRule>,
}

/// Score a lead would get under the evaluated rules.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadScore {
    pub lead_id: String,
    pub current_score: u8,
    pub computed_score: u8,
}
