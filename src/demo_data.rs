//! Demo data set the service starts with.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{
    CallInsights, Call, ConfirmationStatus, CriterionValue, Lead, LeadStatus, Meeting,
    MeetingKind, MeetingPlatform, ScoringCriterion, ScoringField, ScoringOperator, ScoringRule,
    TranscriptLine, UpcomingMeeting,
};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn lead(
    id: &str,
    name: &str,
    company: &str,
    score: u8,
    status: LeadStatus,
    source: &str,
    created: (u32, u32),
    last_contact: (u32, u32),
) -> Lead {
    let first = name.split(' ').next().unwrap_or(name).to_lowercase();
    Lead {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", first),
        phone: format!("+1 555-01{:02}", 22 + id.parse::<u32>().unwrap_or(0)),
        company: company.to_string(),
        score,
        status,
        last_contact: at(2024, last_contact.0, last_contact.1, 0, 0),
        source: source.to_string(),
        notes: None,
        custom_fields: Default::default(),
        created_at: at(2024, created.0, created.1, 0, 0),
    }
}

pub fn leads() -> Vec<Lead> {
    use LeadStatus::*;
    vec![
        lead("1", "John Smith", "Tech Corp", 85, Qualified, "Website", (2, 15), (3, 10)),
        lead("2", "Sarah Johnson", "Design Co", 65, Contacted, "LinkedIn", (3, 1), (3, 12)),
        lead("3", "Mike Davis", "Innovate Ltd", 95, ClosedWon, "Referral", (1, 20), (3, 5)),
        lead("4", "Emily White", "Solutions Inc", 70, ClosedLost, "Website", (2, 28), (3, 15)),
        lead("5", "David Lee", "Global LLC", 50, New, "Cold Call", (3, 18), (3, 18)),
        lead("6", "Laura Chen", "Startup X", 75, ProposalSent, "Referral", (3, 2), (3, 16)),
        lead("7", "Robert Green", "Enterprise Solutions", 88, ClosedWon, "LinkedIn", (2, 10), (3, 14)),
        lead("8", "Linda Blue", "Creative Agency", 60, ClosedLost, "Website", (3, 5), (3, 11)),
        lead("9", "Kevin Black", "Tech Corp", 92, ClosedWon, "Referral", (3, 1), (3, 19)),
        lead("10", "Jessica Grey", "Innovate Ltd", 45, ClosedLost, "Cold Call", (3, 15), (3, 20)),
    ]
}

fn line(timestamp: &str, speaker: &str, text: &str) -> TranscriptLine {
    TranscriptLine {
        timestamp: timestamp.to_string(),
        speaker: speaker.to_string(),
        text: text.to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn calls() -> Vec<Call> {
    vec![
        Call {
            id: "call-1".to_string(),
            lead_id: "1".to_string(),
            agent_name: "Alice Brown".to_string(),
            timestamp: at(2024, 3, 20, 14, 0),
            duration: "15:20".to_string(),
            insights: Some(CallInsights {
                summary: "Discussed pricing options and next steps. John is interested but needs approval.".to_string(),
                key_points: strings(&["Pricing tiers explained", "Feature comparison", "Budget constraints mentioned"]),
                action_items: strings(&["Send follow-up email with proposal", "Schedule demo for technical team"]),
                todo_list: strings(&["Update CRM with call notes", "Add reminder for follow-up"]),
                overall_score: 75,
                script_adherence_score: 8,
                deal_closure_probability: 60,
                transcription: vec![
                    line("00:10", "Agent", "Hello John, thanks for taking the time."),
                    line("00:15", "Lead", "Hi Alice, thanks for calling."),
                    line("05:30", "Lead", "The pricing seems a bit high..."),
                    line("14:50", "Agent", "Okay, I'll send that proposal over."),
                ],
            }),
        },
        Call {
            id: "call-2".to_string(),
            lead_id: "2".to_string(),
            agent_name: "Bob White".to_string(),
            timestamp: at(2024, 3, 20, 12, 0),
            duration: "22:05".to_string(),
            insights: None,
        },
        Call {
            id: "call-3".to_string(),
            lead_id: "3".to_string(),
            agent_name: "Alice Brown".to_string(),
            timestamp: at(2024, 3, 20, 10, 0),
            duration: "08:55".to_string(),
            insights: Some(CallInsights {
                summary: "Quick check-in call. Mike confirmed receipt of the proposal and will review it next week.".to_string(),
                key_points: strings(&["Proposal received", "Review scheduled internally", "No major objections raised"]),
                action_items: strings(&["Follow up next Wednesday"]),
                todo_list: strings(&["Set reminder for follow-up call"]),
                overall_score: 85,
                script_adherence_score: 9,
                deal_closure_probability: 70,
                transcription: vec![
                    line("00:05", "Agent", "Hi Mike, just checking in."),
                    line("01:20", "Lead", "Yes, got the proposal. Looks good so far."),
                    line("08:30", "Agent", "Great, talk to you next week then."),
                ],
            }),
        },
        Call {
            id: "call-4".to_string(),
            lead_id: "2".to_string(),
            agent_name: "Alice Brown".to_string(),
            timestamp: at(2024, 3, 19, 14, 0),
            duration: "12:15".to_string(),
            insights: Some(CallInsights {
                summary: "Follow-up call regarding feature X. Sarah needs clarification on integration.".to_string(),
                key_points: strings(&["Integration process", "API documentation", "Security concerns addressed"]),
                action_items: strings(&["Send API docs", "Schedule technical follow-up"]),
                todo_list: strings(&["Update lead notes", "Coordinate with tech team"]),
                overall_score: 70,
                script_adherence_score: 7,
                deal_closure_probability: 55,
                transcription: vec![
                    line("00:10", "Agent", "Hi Sarah, following up on our last chat."),
                    line("03:45", "Lead", "How does the integration work exactly?"),
                ],
            }),
        },
    ]
}

pub fn meetings() -> Vec<Meeting> {
    vec![
        Meeting {
            id: "meet-1".to_string(),
            lead_id: "1".to_string(),
            agent_name: "Alice Brown".to_string(),
            timestamp: at(2024, 3, 18, 15, 0),
            duration: "45:00".to_string(),
            platform: MeetingPlatform::GoogleMeet,
            insights: Some(CallInsights {
                summary: "Demo of the AI Automation Suite. John was impressed with feature Y.".to_string(),
                key_points: strings(&["Feature Y demo", "Integration with existing tools discussed", "Pricing clarification"]),
                action_items: strings(&["Send technical documentation", "Provide sandbox access"]),
                todo_list: strings(&["Follow up on sandbox access", "Update opportunity stage"]),
                overall_score: 88,
                script_adherence_score: 9,
                deal_closure_probability: 75,
                transcription: vec![
                    line("00:00", "Agent", "Welcome John, let's start the demo."),
                    line("15:30", "Lead", "How does feature Y handle large datasets?"),
                    line("44:00", "Agent", "I'll send over the technical docs right after this."),
                ],
            }),
        },
        Meeting {
            id: "meet-2".to_string(),
            lead_id: "3".to_string(),
            agent_name: "Alice Brown".to_string(),
            timestamp: at(2024, 3, 16, 11, 0),
            duration: "30:00".to_string(),
            platform: MeetingPlatform::Zoom,
            insights: None,
        },
    ]
}

pub fn upcoming_meetings() -> Vec<UpcomingMeeting> {
    vec![
        UpcomingMeeting {
            id: "nm1".to_string(),
            lead_id: "6".to_string(),
            agent_name: "Current User".to_string(),
            date: at(2024, 3, 22, 15, 0),
            kind: MeetingKind::Videoconference,
            status: ConfirmationStatus::ToBeConfirmed,
            url: Some("https://meet.google.com/xyz-abc-def".to_string()),
        },
        UpcomingMeeting {
            id: "nm2".to_string(),
            lead_id: "2".to_string(),
            agent_name: "Current User".to_string(),
            date: at(2024, 3, 25, 10, 30),
            kind: MeetingKind::Call,
            status: ConfirmationStatus::Confirmed,
            url: None,
        },
    ]
}

/// Rules used to score leads created without an explicit score.
pub fn scoring_rules() -> Vec<ScoringRule> {
    let criterion = |field, operator, value: &str| ScoringCriterion {
        field,
        operator,
        value: CriterionValue::Text(value.to_string()),
    };

    vec![
        ScoringRule {
            id: "referral".to_string(),
            name: "Referred lead".to_string(),
            description: "Referrals convert best".to_string(),
            criteria: vec![criterion(ScoringField::Source, ScoringOperator::Equals, "Referral")],
            points: 40,
            is_active: true,
        },
        ScoringRule {
            id: "website".to_string(),
            name: "Inbound from website".to_string(),
            description: String::new(),
            criteria: vec![criterion(ScoringField::Source, ScoringOperator::Equals, "Website")],
            points: 25,
            is_active: true,
        },
        ScoringRule {
            id: "baseline".to_string(),
            name: "Baseline".to_string(),
            description: "Every new lead starts here".to_string(),
            criteria: vec![],
            points: 20,
            is_active: true,
        },
    ]
}
