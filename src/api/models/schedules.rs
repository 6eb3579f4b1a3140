use super::common::{IdReference, ReferenceType, timestamp_now};
use crate::api::traits::ResponseItem;
use crate::impl_rest_identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const FREQUENCIES: &[&str] = &["Hourly", "Daily", "Weekly", "Monthly"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalType {
    #[serde(rename = "@hours", default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(rename = "@minutes", default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<String>,
    #[serde(rename = "@weekDay", default, skip_serializing_if = "Option::is_none")]
    pub week_day: Option<String>,
    #[serde(rename = "@monthDay", default, skip_serializing_if = "Option::is_none")]
    pub month_day: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalsType {
    #[serde(rename = "interval", default)]
    pub intervals: Vec<IntervalType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyDetailsType {
    #[serde(rename = "@start", default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(rename = "@end", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervals: Option<IntervalsType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@priority")]
    pub priority: u32,
    #[serde(rename = "@type")]
    pub schedule_type: String,
    #[serde(rename = "@frequency")]
    pub frequency: String,
    #[serde(rename = "@executionOrder")]
    pub execution_order: String,
    #[serde(rename = "@createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "@updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "frequencyDetails", default, skip_serializing_if = "Option::is_none")]
    pub frequency_details: Option<FrequencyDetailsType>,
}

impl ScheduleType {
    pub fn new(name: impl Into<String>, schedule_type: &str, frequency: &str) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            state: "Active".to_string(),
            priority: 50,
            schedule_type: schedule_type.to_string(),
            frequency: frequency.to_string(),
            execution_order: "Parallel".to_string(),
            created_at: Some(now),
            updated_at: Some(now),
            frequency_details: None,
        }
    }

    pub fn with_details(mut self, details: FrequencyDetailsType) -> Self {
        self.frequency_details = Some(details);
        self
    }
}

impl ResponseItem for ScheduleType {
    const ELEMENT: &'static str = "schedule";
    const COLLECTION: &'static str = "schedules";
}

impl_rest_identity!(ScheduleType);

/// Schedule reference carried by a task; server-side schedules are embedded
/// in full, site-local ones only by frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskScheduleType {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@frequency", default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(rename = "@nextRunAt", default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,
    #[serde(rename = "frequencyDetails", default, skip_serializing_if = "Option::is_none")]
    pub frequency_details: Option<FrequencyDetailsType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRefreshType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@priority")]
    pub priority: u32,
    #[serde(rename = "@consecutiveFailedCount")]
    pub consecutive_failed_count: u32,
    #[serde(rename = "@type")]
    pub refresh_type: String,
    #[serde(default)]
    pub schedule: TaskScheduleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<ReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<ReferenceType>,
}

impl ExtractRefreshType {
    pub fn target_id(&self) -> Option<Uuid> {
        self.workbook
            .as_ref()
            .or(self.datasource.as_ref())
            .map(|target| target.id)
    }
}

/// `<task><extractRefresh .../></task>` wrapper; tasks list under `<tasks>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    #[serde(rename = "extractRefresh")]
    pub extract_refresh: ExtractRefreshType,
}

impl ResponseItem for TaskType {
    const ELEMENT: &'static str = "task";
    const COLLECTION: &'static str = "tasks";
}

impl crate::api::traits::RestIdentifiable for TaskType {
    fn id(&self) -> Uuid {
        self.extract_refresh.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRefreshRequestType {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub refresh_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<IdReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<IdReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequestType {
    #[serde(rename = "@frequency", default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(rename = "frequencyDetails", default, skip_serializing_if = "Option::is_none")]
    pub frequency_details: Option<FrequencyDetailsType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct CreateExtractRefreshTaskRequest {
    #[serde(rename = "extractRefresh", default)]
    pub extract_refresh: ExtractRefreshRequestType,
    #[serde(default)]
    pub schedule: ScheduleRequestType,
}
