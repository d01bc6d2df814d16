//! Dashboard analytics endpoints. All mock data, refreshed nowhere.

use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct PerformanceQuery {
    period: Option<String>,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    format: Option<String>,
    period: Option<String>,
}

/// Create the analytics API router. Stateless: fixtures only.
pub fn create_analytics_router() -> Router {
    Router::new()
        .route("/api/analytics/dashboard", get(dashboard))
        .route("/api/analytics/activity", get(activity))
        .route("/api/analytics/email", get(email))
        .route("/api/analytics/scheduling", get(scheduling))
        .route("/api/analytics/productivity", get(productivity))
        .route("/api/analytics/insights", get(insights))
        .route("/api/analytics/performance", get(performance))
        .route("/api/analytics/export", get(export))
}

/// GET /api/analytics/dashboard — headline numbers for the overview page.
async fn dashboard() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "analytics": {
            "overview": {
                "emailsAutomated": 873,
                "meetingsScheduled": 156,
                "timeSavedHours": 47,
                "activeRules": 12
            },
            "timeSaved": {
                "thisWeek": 12.5,
                "thisMonth": 47,
                "total": 312
            },
            "emailAutomation": {
                "rulesActive": 12,
                "responsesSent": 873,
                "successRate": 94.2
            },
            "scheduling": {
                "meetingsBooked": 156,
                "conflictsAvoided": 23,
                "remindersSent": 312
            },
            "productivity": {
                "score": 87,
                "trend": "up",
                "weekOverWeek": 5.2
            }
        }
    }))
}

/// GET /api/analytics/activity — recent activity feed.
async fn activity() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "activity": [
            {
                "id": "1",
                "type": "email_automated",
                "description": "Auto-responded to customer inquiry about pricing",
                "timestamp": "2024-10-26T14:32:00Z"
            },
            {
                "id": "2",
                "type": "meeting_scheduled",
                "description": "Scheduled client call with Sarah Johnson",
                "timestamp": "2024-10-26T13:15:00Z"
            },
            {
                "id": "3",
                "type": "rule_created",
                "description": "Created new email rule: Invoice Follow-up",
                "timestamp": "2024-10-26T11:48:00Z"
            },
            {
                "id": "4",
                "type": "email_automated",
                "description": "Sent meeting confirmation to Development Team",
                "timestamp": "2024-10-26T10:05:00Z"
            },
            {
                "id": "5",
                "type": "integration_connected",
                "description": "Connected Slack workspace",
                "timestamp": "2024-10-25T16:22:00Z"
            }
        ]
    }))
}

/// GET /api/analytics/email — email trends for the reporting page.
async fn email() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "analytics": {
            "summary": {
                "totalEmails": 1247,
                "automatedEmails": 873,
                "manualEmails": 374,
                "responseRate": 94.2,
                "averageResponseTime": "2.3 minutes"
            },
            "trends": {
                "daily": [
                    { "date": "2024-10-20", "emails": 45, "automated": 32, "manual": 13 },
                    { "date": "2024-10-21", "emails": 52, "automated": 38, "manual": 14 },
                    { "date": "2024-10-22", "emails": 38, "automated": 28, "manual": 10 },
                    { "date": "2024-10-23", "emails": 61, "automated": 45, "manual": 16 },
                    { "date": "2024-10-24", "emails": 47, "automated": 35, "manual": 12 },
                    { "date": "2024-10-25", "emails": 43, "automated": 31, "manual": 12 },
                    { "date": "2024-10-26", "emails": 39, "automated": 29, "manual": 10 }
                ],
                "weekly": [
                    { "week": "Week 1", "emails": 312, "automated": 218, "manual": 94 },
                    { "week": "Week 2", "emails": 298, "automated": 209, "manual": 89 },
                    { "week": "Week 3", "emails": 334, "automated": 234, "manual": 100 },
                    { "week": "Week 4", "emails": 303, "automated": 212, "manual": 91 }
                ]
            },
            "topKeywords": [
                { "keyword": "pricing", "count": 45, "percentage": 12.3 },
                { "keyword": "support", "count": 38, "percentage": 10.4 },
                { "keyword": "meeting", "count": 32, "percentage": 8.7 },
                { "keyword": "demo", "count": 28, "percentage": 7.6 },
                { "keyword": "invoice", "count": 24, "percentage": 6.6 }
            ],
            "responseTime": {
                "average": "2.3 minutes",
                "fastest": "30 seconds",
                "slowest": "8 minutes"
            }
        }
    }))
}

/// GET /api/analytics/scheduling — meeting trends for the reporting page.
async fn scheduling() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "analytics": {
            "summary": {
                "totalMeetings": 156,
                "meetingsThisWeek": 23,
                "averageMeetingDuration": 45,
                "mostPopularTime": "10:00 AM"
            },
            "trends": {
                "daily": [
                    { "day": "Monday", "meetings": 8, "hours": 6 },
                    { "day": "Tuesday", "meetings": 12, "hours": 9 },
                    { "day": "Wednesday", "meetings": 10, "hours": 7.5 },
                    { "day": "Thursday", "meetings": 15, "hours": 11 },
                    { "day": "Friday", "meetings": 6, "hours": 4.5 }
                ],
                "weekly": [
                    { "week": "Week 1", "meetings": 38, "hours": 28.5 },
                    { "week": "Week 2", "meetings": 42, "hours": 31.5 },
                    { "week": "Week 3", "meetings": 35, "hours": 26.25 },
                    { "week": "Week 4", "meetings": 41, "hours": 30.75 }
                ]
            },
            "meetingTypes": [
                { "type": "Client Calls", "count": 45, "percentage": 29, "avgDuration": 60 },
                { "type": "Team Meetings", "count": 38, "percentage": 24, "avgDuration": 30 },
                { "type": "1-on-1s", "count": 32, "percentage": 21, "avgDuration": 45 },
                { "type": "Strategy Sessions", "count": 28, "percentage": 18, "avgDuration": 90 },
                { "type": "Other", "count": 13, "percentage": 8, "avgDuration": 30 }
            ],
            "popularTimes": [
                { "time": "09:00", "meetings": 12, "percentage": 7.7 },
                { "time": "10:00", "meetings": 24, "percentage": 15.4 },
                { "time": "11:00", "meetings": 18, "percentage": 11.5 },
                { "time": "14:00", "meetings": 21, "percentage": 13.5 },
                { "time": "15:00", "meetings": 16, "percentage": 10.3 }
            ]
        }
    }))
}

/// GET /api/analytics/productivity — task automation and focus-time metrics.
async fn productivity() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "analytics": {
            "summary": {
                "tasksCompleted": 89,
                "tasksAutomated": 67,
                "efficiencyGain": 23.5,
                "timeToFocus": 4.2,
                "productivityScore": 87
            },
            "timeBreakdown": {
                "automated": 67,
                "manual": 22,
                "saved": 45
            },
            "focusTime": {
                "thisWeek": 4.2,
                "lastWeek": 3.8,
                "thisMonth": 16.8,
                "lastMonth": 14.2,
                "trend": "up"
            },
            "efficiency": {
                "beforeAutomation": 6.5,
                "afterAutomation": 4.2,
                "improvement": 35.4
            },
            "weeklyTrends": [
                { "week": "Week 1", "tasks": 78, "automated": 58, "efficiency": 82 },
                { "week": "Week 2", "tasks": 85, "automated": 64, "efficiency": 85 },
                { "week": "Week 3", "tasks": 92, "automated": 71, "efficiency": 88 },
                { "week": "Week 4", "tasks": 89, "automated": 67, "efficiency": 87 }
            ]
        }
    }))
}

/// GET /api/analytics/insights — narrative business insights feed.
async fn insights() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "insights": [
            {
                "id": "1",
                "type": "success",
                "title": "Email Response Time Improved",
                "description": "Your average email response time has improved by 98% with automation.",
                "metric": "2.3 minutes",
                "change": "+98%",
                "trend": "up"
            },
            {
                "id": "2",
                "type": "warning",
                "title": "Meeting Overload Alert",
                "description": "You have 15 meetings scheduled this week. Consider blocking focus time.",
                "metric": "15 meetings",
                "change": "+25%",
                "trend": "up"
            },
            {
                "id": "3",
                "type": "info",
                "title": "Productivity Peak",
                "description": "Your most productive hours are between 10 AM and 2 PM.",
                "metric": "4 hours",
                "change": "Peak time",
                "trend": "stable"
            },
            {
                "id": "4",
                "type": "success",
                "title": "Automation Success",
                "description": "94% of your emails are now handled automatically.",
                "metric": "94%",
                "change": "+12%",
                "trend": "up"
            }
        ]
    }))
}

/// GET /api/analytics/performance?period — metrics with industry benchmarks.
async fn performance(Query(query): Query<PerformanceQuery>) -> Json<serde_json::Value> {
    let period = query.period.unwrap_or_else(|| "month".to_string());

    Json(json!({
        "success": true,
        "performance": {
            "period": period,
            "metrics": {
                "timeSaved": { "value": 32.1, "unit": "hours", "change": "+12.5%", "trend": "up" },
                "emailsProcessed": { "value": 1247, "unit": "emails", "change": "+8.3%", "trend": "up" },
                "meetingsScheduled": { "value": 156, "unit": "meetings", "change": "+15.2%", "trend": "up" },
                "automationRate": { "value": 94.2, "unit": "%", "change": "+3.1%", "trend": "up" },
                "productivityScore": { "value": 87, "unit": "score", "change": "+5.2%", "trend": "up" }
            },
            "benchmarks": {
                "industryAverage": {
                    "timeSaved": 15.2,
                    "automationRate": 67.8,
                    "productivityScore": 72
                },
                "topPerformers": {
                    "timeSaved": 45.6,
                    "automationRate": 96.4,
                    "productivityScore": 94
                }
            }
        }
    }))
}

/// GET /api/analytics/export?format&period
///
/// `format=csv` streams a CSV attachment; anything else returns the JSON
/// export envelope.
async fn export(Query(query): Query<ExportQuery>) -> Response {
    let period = query.period.unwrap_or_else(|| "month".to_string());

    if query.format.as_deref() == Some("csv") {
        return (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"analytics.csv\"",
                ),
            ],
            "Date,Emails,Meetings,TimeSaved,AutomationRate\n2024-10-26,39,3,1.2,94.2\n",
        )
            .into_response();
    }

    Json(json!({
        "success": true,
        "data": {
            "period": period,
            "generatedAt": chrono::Utc::now().to_rfc3339(),
            "data": {
                "emails": 1247,
                "meetings": 156,
                "timeSaved": 32.1,
                "automationRate": 94.2
            }
        }
    }))
    .into_response()
}
