use chrono::{DateTime, Utc};
use phonenumber::country::Id as CountryId;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::demo_data;
use crate::errors::AppError;
use crate::interactions::{interactions_for_lead, request_confirmation};
use crate::leads::{normalize_phone, validate_lead};
use crate::models::{
    Call, CreateLeadRequest, Lead, LeadStatus, Meeting, ScoringRule, TimelineEntry,
    UpcomingMeeting,
};
use crate::scoring::score_lead;

/// In-memory storage for leads and their interactions.
///
/// Reads hand out owned snapshots so callers never hold a lock while they
/// compute.
pub struct CrmStore {
    leads: RwLock<Vec<Lead>>,
    calls: Vec<Call>,
    meetings: Vec<Meeting>,
    upcoming: RwLock<Vec<UpcomingMeeting>>,
    scoring_rules: Vec<ScoringRule>,
    enforce_forward_transitions: bool,
}

impl CrmStore {
    pub fn new(
        leads: Vec<Lead>,
        calls: Vec<Call>,
        meetings: Vec<Meeting>,
        upcoming: Vec<UpcomingMeeting>,
        scoring_rules: Vec<ScoringRule>,
    ) -> Self {
        Self {
            leads: RwLock::new(leads),
            calls,
            meetings,
            upcoming: RwLock::new(upcoming),
            scoring_rules,
            enforce_forward_transitions: false,
        }
    }

    /// Store seeded with the demo data set.
    pub fn with_demo_data() -> Self {
        Self::new(
            demo_data::leads(),
            demo_data::calls(),
            demo_data::meetings(),
            demo_data::upcoming_meetings(),
            demo_data::scoring_rules(),
        )
    }

    /// Turns the forward-only status guard on or off.
    pub fn enforce_forward_transitions(mut self, enforce: bool) -> Self {
        self.enforce_forward_transitions = enforce;
        self
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.leads.read().await.clone()
    }

    pub async fn get_lead(&self, id: &str) -> Result<Lead, AppError> {
        self.leads
            .read()
            .await
            .iter()
            .find(|lead| lead.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))
    }

    /// Adds a lead in the `new` stage.
    ///
    /// The phone number is stored in E.164 when it parses, and verbatim
    /// otherwise. Leads created without a score are scored with the store's
    /// scoring rules.
    pub async fn create_lead(
        &self,
        request: CreateLeadRequest,
        phone_region: CountryId,
        now: DateTime<Utc>,
    ) -> Result<Lead, AppError> {
        let phone = if request.phone.trim().is_empty() {
            String::new()
        } else {
            normalize_phone(&request.phone, phone_region).unwrap_or_else(|| {
                tracing::warn!("Keeping unnormalized phone for new lead: {}", request.phone);
                request.phone.clone()
            })
        };

        let mut lead = Lead {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone,
            company: request.company,
            score: request.score.unwrap_or(0),
            status: LeadStatus::New,
            last_contact: now,
            source: request.source,
            notes: request.notes,
            custom_fields: request.custom_fields,
            created_at: now,
        };
        if request.score.is_none() {
            lead.score = score_lead(&lead, &self.scoring_rules);
        }

        validate_lead(&lead)?;

        tracing::info!(
            "Created lead {} ({}, source {}, score {})",
            lead.id,
            lead.name,
            lead.source,
            lead.score
        );
        self.leads.write().await.push(lead.clone());
        Ok(lead)
    }

    /// Moves a lead to `status`.
    ///
    /// Without the forward-only guard any status may be set at any time.
    pub async fn update_status(&self, id: &str, status: LeadStatus) -> Result<Lead, AppError> {
        let mut leads = self.leads.write().await;
        let lead = leads
            .iter_mut()
            .find(|lead| lead.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;

        if self.enforce_forward_transitions && !lead.status.can_transition_to(status) {
            return Err(AppError::InvalidTransition {
                from: lead.status.to_string(),
                to: status.to_string(),
            });
        }

        tracing::info!("Lead {} status: {} -> {}", lead.id, lead.status, status);
        lead.status = status;
        Ok(lead.clone())
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn scoring_rules(&self) -> &[ScoringRule] {
        &self.scoring_rules
    }

    pub fn find_call(&self, id: &str) -> Result<&Call, AppError> {
        self.calls
            .iter()
            .find(|call| call.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Call with id {} not found", id)))
    }

    /// Calls and meetings of an existing lead, newest first.
    pub async fn timeline(&self, lead_id: &str) -> Result<Vec<TimelineEntry>, AppError> {
        self.get_lead(lead_id).await?;
        Ok(interactions_for_lead(lead_id, &self.calls, &self.meetings))
    }

    pub async fn upcoming_meetings(&self) -> Vec<UpcomingMeeting> {
        let mut meetings = self.upcoming.read().await.clone();
        meetings.sort_by_key(|meeting| meeting.date);
        meetings
    }

    pub async fn request_meeting_confirmation(
        &self,
        id: &str,
    ) -> Result<UpcomingMeeting, AppError> {
        let mut upcoming = self.upcoming.write().await;
        let meeting = upcoming
            .iter_mut()
            .find(|meeting| meeting.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Meeting with id {} not found", id)))?;

        request_confirmation(meeting);
        Ok(meeting.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfirmationStatus;
    use std::collections::BTreeMap;

    fn request(source: &str, score: Option<u8>) -> CreateLeadRequest {
        CreateLeadRequest {
            name: " Ana Costa ".to_string(),
            email: "ana@example.com".to_string(),
            phone: "(201) 555-0123".to_string(),
            company: "Costa Labs".to_string(),
            source: source.to_string(),
            score,
            notes: None,
            custom_fields: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_create_lead_starts_new_and_scores() {
        let store = CrmStore::with_demo_data();
        let now = Utc::now();

        let lead = store
            .create_lead(request("Referral", None), CountryId::US, now)
            .await
            .unwrap();

        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.name, "Ana Costa");
        assert_eq!(lead.phone, "+12015550123");
        // referral (40) + baseline (20)
        assert_eq!(lead.score, 60);
        assert_eq!(lead.created_at, lead.last_contact);
        assert_eq!(store.leads().await.len(), 11);
    }

    #[tokio::test]
    async fn test_create_lead_rejects_bad_input() {
        let store = CrmStore::with_demo_data();

        let mut bad_email = request("Website", Some(50));
        bad_email.email = "not-an-email".to_string();
        let result = store.create_lead(bad_email, CountryId::US, Utc::now()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = store
            .create_lead(request("Website", Some(150)), CountryId::US, Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        assert_eq!(store.leads().await.len(), 10);
    }

    #[tokio::test]
    async fn test_status_changes_are_free_by_default() {
        let store = CrmStore::with_demo_data();
        // lead 3 is closed won in the demo set
        let lead = store.update_status("3", LeadStatus::New).await.unwrap();
        assert_eq!(lead.status, LeadStatus::New);
    }

    #[tokio::test]
    async fn test_forward_guard() {
        let store = CrmStore::with_demo_data().enforce_forward_transitions(true);

        let result = store.update_status("3", LeadStatus::New).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));

        // lead 1 is qualified
        let lead = store.update_status("1", LeadStatus::Negotiation).await.unwrap();
        assert_eq!(lead.status, LeadStatus::Negotiation);
        let result = store.update_status("1", LeadStatus::Contacted).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let store = CrmStore::with_demo_data();
        assert!(matches!(
            store.update_status("nope", LeadStatus::New).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(store.timeline("nope").await, Err(AppError::NotFound(_))));
        assert!(matches!(store.find_call("nope"), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_meeting_confirmation() {
        let store = CrmStore::with_demo_data();
        let meeting = store.request_meeting_confirmation("nm1").await.unwrap();
        assert_eq!(meeting.status, ConfirmationStatus::ConfirmationRequested);

        let meeting = store.request_meeting_confirmation("nm2").await.unwrap();
        assert_eq!(meeting.status, ConfirmationStatus::Confirmed);
    }
}
