//! Scheduling endpoints: meeting CRUD, availability, preferences, analytics.

use crate::store::{MeetingStore, MeetingUpdate};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Shared application state for the schedule API.
#[derive(Clone)]
pub struct ScheduleAppState {
    pub meetings: Arc<MeetingStore>,
}

#[derive(Deserialize)]
pub struct MeetingRangeQuery {
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateMeetingRequest {
    title: String,
    #[serde(default)]
    participants: Vec<String>,
    #[serde(rename = "startTime")]
    start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    end_time: DateTime<Utc>,
    location: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMeetingRequest {
    title: Option<String>,
    participants: Option<Vec<String>>,
    #[serde(rename = "startTime")]
    start_time: Option<DateTime<Utc>>,
    #[serde(rename = "endTime")]
    end_time: Option<DateTime<Utc>>,
    location: Option<String>,
    description: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    date: Option<String>,
    duration: Option<u32>,
}

#[derive(Serialize)]
struct NotFoundResponse {
    success: bool,
    message: String,
}

/// Create the schedule API router.
pub fn create_schedule_router(state: ScheduleAppState) -> Router {
    Router::new()
        .route("/api/schedule/meetings", get(list_meetings))
        .route("/api/schedule/meetings", post(create_meeting))
        .route("/api/schedule/meetings/:id", put(update_meeting))
        .route("/api/schedule/meetings/:id", delete(delete_meeting))
        .route("/api/schedule/availability", get(availability))
        .route("/api/schedule/preferences", get(get_preferences))
        .route("/api/schedule/preferences", put(update_preferences))
        .route("/api/schedule/analytics", get(schedule_analytics))
        .with_state(Arc::new(state))
}

/// GET /api/schedule/meetings?startDate&endDate
///
/// Dates are RFC 3339; an unparsable or missing bound disables filtering.
async fn list_meetings(
    State(state): State<Arc<ScheduleAppState>>,
    Query(range): Query<MeetingRangeQuery>,
) -> Json<serde_json::Value> {
    let start = range.start_date.as_deref().and_then(parse_timestamp);
    let end = range.end_date.as_deref().and_then(parse_timestamp);

    Json(json!({ "success": true, "meetings": state.meetings.list(start, end) }))
}

/// POST /api/schedule/meetings
async fn create_meeting(
    State(state): State<Arc<ScheduleAppState>>,
    Json(body): Json<CreateMeetingRequest>,
) -> Json<serde_json::Value> {
    let meeting = state.meetings.create(
        &body.title,
        body.participants,
        body.start_time,
        body.end_time,
        body.location,
        body.description,
    );
    debug!(meeting = %meeting.id, "Meeting created");
    Json(json!({ "success": true, "meeting": meeting }))
}

/// PUT /api/schedule/meetings/:id
async fn update_meeting(
    State(state): State<Arc<ScheduleAppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateMeetingRequest>,
) -> Response {
    let update = MeetingUpdate {
        title: body.title,
        participants: body.participants,
        start_time: body.start_time,
        end_time: body.end_time,
        location: body.location,
        description: body.description,
        status: body.status,
    };

    match state.meetings.update(&id, update) {
        Some(meeting) => Json(json!({ "success": true, "meeting": meeting })).into_response(),
        None => meeting_not_found(),
    }
}

/// DELETE /api/schedule/meetings/:id
async fn delete_meeting(
    State(state): State<Arc<ScheduleAppState>>,
    Path(id): Path<String>,
) -> Response {
    if state.meetings.delete(&id) {
        Json(json!({ "success": true, "message": "Meeting deleted successfully" })).into_response()
    } else {
        meeting_not_found()
    }
}

/// GET /api/schedule/availability?date&duration — mock open slots.
async fn availability(Query(query): Query<AvailabilityQuery>) -> Json<serde_json::Value> {
    let date = query
        .date
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());

    Json(json!({
        "success": true,
        "date": date,
        "duration": query.duration.unwrap_or(30),
        "slots": [
            { "time": "09:00", "available": true },
            { "time": "09:30", "available": true },
            { "time": "10:00", "available": false },
            { "time": "10:30", "available": true },
            { "time": "11:00", "available": true },
            { "time": "11:30", "available": true },
            { "time": "12:00", "available": false },
            { "time": "12:30", "available": false },
            { "time": "13:00", "available": true },
            { "time": "13:30", "available": true },
            { "time": "14:00", "available": false },
            { "time": "14:30", "available": false },
            { "time": "15:00", "available": true },
            { "time": "15:30", "available": true },
            { "time": "16:00", "available": true },
            { "time": "16:30", "available": false },
            { "time": "17:00", "available": true }
        ]
    }))
}

/// GET /api/schedule/preferences — mock scheduling preferences.
async fn get_preferences() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "preferences": {
            "workingHours": { "start": "09:00", "end": "17:00", "timezone": "America/New_York" },
            "meetingDuration": 30,
            "bufferTime": 15,
            "advanceNotice": 24,
            "maxMeetingsPerDay": 8,
            "autoConfirm": true,
            "sendReminders": true,
            "reminderTime": 60
        }
    }))
}

/// PUT /api/schedule/preferences — echoes the submitted preferences back.
async fn update_preferences(Json(preferences): Json<serde_json::Value>) -> Json<serde_json::Value> {
    debug!("Scheduling preferences updated");
    Json(json!({
        "success": true,
        "message": "Preferences updated successfully",
        "preferences": preferences
    }))
}

/// GET /api/schedule/analytics — mock meeting metrics.
async fn schedule_analytics() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "analytics": {
            "totalMeetings": 156,
            "meetingsThisWeek": 23,
            "averageMeetingDuration": 45,
            "mostPopularTime": "10:00 AM",
            "meetingTypes": [
                { "type": "Client Calls", "count": 45, "percentage": 29 },
                { "type": "Team Meetings", "count": 38, "percentage": 24 },
                { "type": "1-on-1s", "count": 32, "percentage": 21 },
                { "type": "Strategy Sessions", "count": 28, "percentage": 18 },
                { "type": "Other", "count": 13, "percentage": 8 }
            ],
            "weeklyStats": [
                { "day": "Monday", "meetings": 8, "hours": 6 },
                { "day": "Tuesday", "meetings": 12, "hours": 9 },
                { "day": "Wednesday", "meetings": 10, "hours": 7.5 },
                { "day": "Thursday", "meetings": 15, "hours": 11 },
                { "day": "Friday", "meetings": 6, "hours": 4.5 }
            ]
        }
    }))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    value.parse::<DateTime<Utc>>().ok()
}

fn meeting_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            success: false,
            message: "Meeting not found".to_string(),
        }),
    )
        .into_response()
}
