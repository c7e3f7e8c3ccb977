//! Calls, meetings and upcoming meetings, linked to leads by id.

use std::collections::HashMap;

use crate::models::{
    Call, CallInsights, ConfirmationStatus, Lead, Meeting, TimelineEntry, UpcomingMeeting,
};

/// Every call and meeting of one lead, newest first.
pub fn interactions_for_lead(lead_id: &str, calls: &[Call], meetings: &[Meeting]) -> Vec<TimelineEntry> {
    let mut timeline: Vec<TimelineEntry> = calls
        .iter()
        .filter(|call| call.lead_id == lead_id)
        .cloned()
        .map(TimelineEntry::Call)
        .chain(
            meetings
                .iter()
                .filter(|meeting| meeting.lead_id == lead_id)
                .cloned()
                .map(TimelineEntry::Meeting),
        )
        .collect();

    timeline.sort_by(|a, b| {
        b.timestamp()
            .cmp(&a.timestamp())
            .then_with(|| a.id().cmp(b.id()))
    });
    timeline
}

/// Calls whose lead name or agent name contains `query`, case-insensitively.
///
/// Lead names are resolved through `lead_id`. A call whose lead is unknown
/// can still match on its agent name.
pub fn search_calls(calls: &[Call], leads: &[Lead], query: &str) -> Vec<Call> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return calls.to_vec();
    }

    let names: HashMap<&str, String> = leads
        .iter()
        .map(|lead| (lead.id.as_str(), lead.name.to_lowercase()))
        .collect();

    calls
        .iter()
        .filter(|call| {
            let lead_match = names
                .get(call.lead_id.as_str())
                .is_some_and(|name| name.contains(&needle));
            lead_match || call.agent_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Analysis of a call, if one was produced.
pub fn insights_for(call: &Call) -> Option<&CallInsights> {
    call.insights.as_ref()
}

/// Asks the lead to confirm a meeting.
///
/// Only meetings still waiting for confirmation change state. Returns whether
/// the status changed.
pub fn request_confirmation(meeting: &mut UpcomingMeeting) -> bool {
    match meeting.status {
        ConfirmationStatus::ToBeConfirmed => {
            meeting.status = ConfirmationStatus::ConfirmationRequested;
            tracing::info!("Confirmation requested for meeting {}", meeting.id);
            true
        }
        ConfirmationStatus::Confirmed | ConfirmationStatus::ConfirmationRequested => {
            tracing::debug!(
                "Meeting {} already {:?}, confirmation not requested",
                meeting.id,
                meeting.status
            );
            false
        }
    }
}
