//! Meeting schedule fixtures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub participants: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub location: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields a meeting update may change; `None` leaves the current value.
#[derive(Default)]
pub struct MeetingUpdate {
    pub title: Option<String>,
    pub participants: Option<Vec<String>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

pub struct MeetingStore {
    meetings: Mutex<Vec<Meeting>>,
    next_id: AtomicU64,
}

impl MeetingStore {
    pub fn new() -> Self {
        let seeded = vec![
            seed_meeting(
                "1",
                "Client Call - Project Review",
                vec!["Sarah Johnson"],
                "2024-10-26T10:00:00Z",
                "2024-10-26T11:00:00Z",
                "Zoom Meeting",
                "Review project progress and discuss next steps",
            ),
            seed_meeting(
                "2",
                "Team Standup",
                vec!["Development Team"],
                "2024-10-26T14:00:00Z",
                "2024-10-26T14:30:00Z",
                "Conference Room A",
                "Daily team standup meeting",
            ),
            seed_meeting(
                "3",
                "Strategy Planning",
                vec!["Management Team"],
                "2024-10-26T16:30:00Z",
                "2024-10-26T17:30:00Z",
                "Board Room",
                "Quarterly strategy planning session",
            ),
        ];
        Self {
            meetings: Mutex::new(seeded),
            next_id: AtomicU64::new(4),
        }
    }

    /// List meetings, optionally restricted to those starting within
    /// `[start, end]`.
    pub fn list(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Vec<Meeting> {
        let meetings = self.meetings.lock().unwrap();
        match (start, end) {
            (Some(start), Some(end)) => meetings
                .iter()
                .filter(|m| m.start_time >= start && m.start_time <= end)
                .cloned()
                .collect(),
            _ => meetings.clone(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        title: &str,
        participants: Vec<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        location: Option<String>,
        description: Option<String>,
    ) -> Meeting {
        let meeting = Meeting {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            title: title.to_string(),
            participants,
            start_time,
            end_time,
            status: "pending".to_string(),
            location: location.unwrap_or_else(|| "TBD".to_string()),
            description: description.unwrap_or_default(),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.meetings.lock().unwrap().push(meeting.clone());
        meeting
    }

    pub fn update(&self, id: &str, update: MeetingUpdate) -> Option<Meeting> {
        let mut meetings = self.meetings.lock().unwrap();
        let meeting = meetings.iter_mut().find(|m| m.id == id)?;

        if let Some(title) = update.title {
            meeting.title = title;
        }
        if let Some(participants) = update.participants {
            meeting.participants = participants;
        }
        if let Some(start_time) = update.start_time {
            meeting.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            meeting.end_time = end_time;
        }
        if let Some(location) = update.location {
            meeting.location = location;
        }
        if let Some(description) = update.description {
            meeting.description = description;
        }
        if let Some(status) = update.status {
            meeting.status = status;
        }
        meeting.updated_at = Some(Utc::now());

        Some(meeting.clone())
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut meetings = self.meetings.lock().unwrap();
        let before = meetings.len();
        meetings.retain(|m| m.id != id);
        meetings.len() != before
    }
}

impl Default for MeetingStore {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_meeting(
    id: &str,
    title: &str,
    participants: Vec<&str>,
    start: &str,
    end: &str,
    location: &str,
    description: &str,
) -> Meeting {
    Meeting {
        id: id.to_string(),
        title: title.to_string(),
        participants: participants.into_iter().map(String::from).collect(),
        start_time: start.parse().unwrap_or_else(|_| Utc::now()),
        end_time: end.parse().unwrap_or_else(|_| Utc::now()),
        status: "confirmed".to_string(),
        location: location.to_string(),
        description: description.to_string(),
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_meetings() {
        let store = MeetingStore::new();
        assert_eq!(store.list(None, None).len(), 3);
    }

    #[test]
    fn test_date_range_filter() {
        let store = MeetingStore::new();
        let start = "2024-10-26T00:00:00Z".parse().unwrap();
        let end = "2024-10-26T12:00:00Z".parse().unwrap();

        let morning = store.list(Some(start), Some(end));
        assert_eq!(morning.len(), 1);
        assert_eq!(morning[0].id, "1");
    }

    #[test]
    fn test_create_defaults() {
        let store = MeetingStore::new();
        let meeting = store.create(
            "Demo",
            vec!["Alice".to_string()],
            Utc::now(),
            Utc::now(),
            None,
            None,
        );
        assert_eq!(meeting.status, "pending");
        assert_eq!(meeting.location, "TBD");
        assert_eq!(meeting.id, "4");
    }

    #[test]
    fn test_update_status() {
        let store = MeetingStore::new();
        let updated = store
            .update(
                "2",
                MeetingUpdate {
                    status: Some("cancelled".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, "cancelled");
        assert_eq!(updated.title, "Team Standup");
    }

    #[test]
    fn test_delete_missing() {
        let store = MeetingStore::new();
        assert!(!store.delete("99"));
        assert!(store.delete("3"));
    }
}
