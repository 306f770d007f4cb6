//! DTOs for REST API requests/responses.

use serde::{Deserialize, Serialize};

use crate::domain::{ScheduleConfig, ShiftKind, DEFAULT_MAX_CONSECUTIVE_WORK_DAYS};
use crate::error::ConfigError;
use crate::result::{ScheduleResult, ScheduleStatus, ShiftAssignment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRequestDto {
    pub employee: usize,
    pub day: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDto {
    pub day: usize,
    pub shift: ShiftKind,
    pub count: u32,
}

/// Unvalidated schedule instance as received over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub num_employees: usize,
    pub num_days: usize,
    #[serde(default = "default_max_consecutive")]
    pub max_consecutive_work_days: usize,
    #[serde(default)]
    pub holiday_requests: Vec<HolidayRequestDto>,
    #[serde(default)]
    pub required_personnel: Vec<RequirementDto>,
}

fn default_max_consecutive() -> usize {
    DEFAULT_MAX_CONSECUTIVE_WORK_DAYS
}

impl Default for ScheduleRequest {
    fn default() -> Self {
        Self {
            num_employees: 0,
            num_days: 0,
            max_consecutive_work_days: DEFAULT_MAX_CONSECUTIVE_WORK_DAYS,
            holiday_requests: Vec::new(),
            required_personnel: Vec::new(),
        }
    }
}

impl ScheduleRequest {
    /// Validates the request. Later requirement entries for the same
    /// (day, shift) replace earlier ones.
    pub fn to_config(&self) -> Result<ScheduleConfig, ConfigError> {
        let builder = ScheduleConfig::builder(self.num_employees, self.num_days)
            .max_consecutive_work_days(self.max_consecutive_work_days)
            .holidays(self.holiday_requests.iter().map(|h| (h.employee, h.day)));

        self.required_personnel
            .iter()
            .fold(builder, |builder, r| builder.require(r.day, r.shift, r.count))
            .build()
    }
}

impl From<&ScheduleConfig> for ScheduleRequest {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            num_employees: config.num_employees(),
            num_days: config.num_days(),
            max_consecutive_work_days: config.max_consecutive_work_days(),
            holiday_requests: config
                .holiday_requests()
                .iter()
                .map(|&(employee, day)| HolidayRequestDto { employee, day })
                .collect(),
            required_personnel: config
                .required_personnel()
                .iter()
                .map(|(&(day, shift), &count)| RequirementDto { day, shift, count })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResultDto {
    pub status: ScheduleStatus,
    pub message: String,
    pub assignments: Vec<ShiftAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<i64>,
    pub elapsed_ms: u64,
    /// Rendered roster; empty when the instance is unknown.
    #[serde(default)]
    pub roster: Vec<String>,
}

impl ScheduleResultDto {
    pub fn from_result(result: &ScheduleResult, config: Option<&ScheduleConfig>) -> Self {
        Self {
            status: result.status,
            message: result.message.clone(),
            assignments: result.assignments.clone(),
            objective: result.objective,
            elapsed_ms: result.elapsed.as_millis() as u64,
            roster: config.map(|c| result.roster(c)).unwrap_or_default(),
        }
    }
}

/// Envelope returned by `POST /schedule/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub success: bool,
    pub message: String,
    pub details: ScheduleResultDto,
}

impl ScheduleResponse {
    pub fn from_result(result: &ScheduleResult, config: Option<&ScheduleConfig>) -> Self {
        let success = result.status.is_success();
        let message = if success {
            "Schedule generation process completed."
        } else {
            "Schedule generation process resulted in issues."
        };
        Self {
            success,
            message: message.to_string(),
            details: ScheduleResultDto::from_result(result, config),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub solver_engine: &'static str,
}
