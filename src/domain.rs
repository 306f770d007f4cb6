//! Domain model for the shift scheduling problem.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// What an employee does on a given day.
///
/// Numeric ids are stable: `0 = Off`, `1 = Day`, `2 = Night`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    Off,
    Day,
    Night,
}

impl ShiftKind {
    /// All kinds, ordered by id.
    pub const ALL: [ShiftKind; 3] = [ShiftKind::Off, ShiftKind::Day, ShiftKind::Night];

    /// Kinds that count as working and can carry a staffing requirement.
    pub const WORK: [ShiftKind; 2] = [ShiftKind::Day, ShiftKind::Night];

    pub fn id(self) -> usize {
        match self {
            ShiftKind::Off => 0,
            ShiftKind::Day => 1,
            ShiftKind::Night => 2,
        }
    }

    pub fn is_work(self) -> bool {
        !matches!(self, ShiftKind::Off)
    }

    /// Returns the kind as a SCREAMING_SNAKE_CASE string for API responses.
    ///
    /// ```
    /// use shift_scheduling::domain::ShiftKind;
    ///
    /// assert_eq!(ShiftKind::Night.as_str(), "NIGHT");
    /// ```
    pub fn as_str(self) -> &'static str {
        match self {
            ShiftKind::Off => "OFF",
            ShiftKind::Day => "DAY",
            ShiftKind::Night => "NIGHT",
        }
    }

    /// Human-readable label used in rendered rosters.
    pub fn display_name(self) -> &'static str {
        match self {
            ShiftKind::Off => "Day Off",
            ShiftKind::Day => "Day Shift",
            ShiftKind::Night => "Night Shift",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OFF" => Ok(ShiftKind::Off),
            "DAY" => Ok(ShiftKind::Day),
            "NIGHT" => Ok(ShiftKind::Night),
            _ => Err(()),
        }
    }
}

/// A validated, immutable scheduling instance.
///
/// Only obtainable through [`ScheduleConfigBuilder::build`], so every value in
/// circulation satisfies the range invariants.
///
/// ```
/// use shift_scheduling::domain::{ScheduleConfig, ShiftKind};
///
/// let config = ScheduleConfig::builder(2, 1)
///     .require(0, ShiftKind::Day, 1)
///     .require(0, ShiftKind::Night, 1)
///     .build()
///     .unwrap();
/// assert_eq!(config.required(0, ShiftKind::Day), 1);
/// assert_eq!(config.required(0, ShiftKind::Off), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    num_employees: usize,
    num_days: usize,
    max_consecutive_work_days: usize,
    holiday_requests: BTreeSet<(usize, usize)>,
    required_personnel: BTreeMap<(usize, ShiftKind), u32>,
}

impl ScheduleConfig {
    /// Starts a builder for `num_employees` over `num_days`.
    pub fn builder(num_employees: usize, num_days: usize) -> ScheduleConfigBuilder {
        ScheduleConfigBuilder::new(num_employees, num_days)
    }

    pub fn num_employees(&self) -> usize {
        self.num_employees
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn max_consecutive_work_days(&self) -> usize {
        self.max_consecutive_work_days
    }

    /// `(employee, day)` pairs that must be Off.
    pub fn holiday_requests(&self) -> &BTreeSet<(usize, usize)> {
        &self.holiday_requests
    }

    pub fn is_holiday(&self, employee: usize, day: usize) -> bool {
        self.holiday_requests.contains(&(employee, day))
    }

    /// Explicit staffing floors keyed by `(day, kind)`.
    pub fn required_personnel(&self) -> &BTreeMap<(usize, ShiftKind), u32> {
        &self.required_personnel
    }

    /// Staffing floor for `(day, kind)`; absent entries mean no requirement.
    pub fn required(&self, day: usize, kind: ShiftKind) -> u32 {
        self.required_personnel
            .get(&(day, kind))
            .copied()
            .unwrap_or(0)
    }
}

/// Accumulates instance data; validation happens once in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ScheduleConfigBuilder {
    num_employees: usize,
    num_days: usize,
    max_consecutive_work_days: usize,
    holiday_requests: BTreeSet<(usize, usize)>,
    required_personnel: BTreeMap<(usize, ShiftKind), u32>,
}

/// Consecutive-work cap used when the caller does not set one.
pub const DEFAULT_MAX_CONSECUTIVE_WORK_DAYS: usize = 3;

/// Largest accepted `num_employees * num_days`. Each employee-day becomes
/// three solver variables.
pub const MAX_EMPLOYEE_DAYS: usize = 1_000_000;

impl ScheduleConfigBuilder {
    pub fn new(num_employees: usize, num_days: usize) -> Self {
        Self {
            num_employees,
            num_days,
            max_consecutive_work_days: DEFAULT_MAX_CONSECUTIVE_WORK_DAYS,
            holiday_requests: BTreeSet::new(),
            required_personnel: BTreeMap::new(),
        }
    }

    pub fn max_consecutive_work_days(mut self, days: usize) -> Self {
        self.max_consecutive_work_days = days;
        self
    }

    /// Requests `day` off for `employee`.
    pub fn holiday(mut self, employee: usize, day: usize) -> Self {
        self.holiday_requests.insert((employee, day));
        self
    }

    pub fn holidays(mut self, requests: impl IntoIterator<Item = (usize, usize)>) -> Self {
        self.holiday_requests.extend(requests);
        self
    }

    /// Sets the staffing floor for `(day, kind)`. A later call for the same
    /// key replaces the earlier value.
    pub fn require(mut self, day: usize, kind: ShiftKind, count: u32) -> Self {
        self.required_personnel.insert((day, kind), count);
        self
    }

    /// Sets the same floor for `kind` on every day of the horizon.
    pub fn require_daily(mut self, kind: ShiftKind, count: u32) -> Self {
        for day in 0..self.num_days {
            self.required_personnel.insert((day, kind), count);
        }
        self
    }

    /// Validates and freezes the instance.
    pub fn build(self) -> Result<ScheduleConfig, ConfigError> {
        if self.num_employees < 1 {
            return Err(ConfigError::NoEmployees);
        }
        if self.num_days < 1 {
            return Err(ConfigError::NoDays);
        }
        if self.max_consecutive_work_days < 1 {
            return Err(ConfigError::ZeroConsecutiveWorkDays);
        }
        match self.num_employees.checked_mul(self.num_days) {
            Some(slots) if slots <= MAX_EMPLOYEE_DAYS => {}
            _ => {
                return Err(ConfigError::TooLarge {
                    num_employees: self.num_employees,
                    num_days: self.num_days,
                    max: MAX_EMPLOYEE_DAYS,
                })
            }
        }

        if let Some(&(employee, day)) = self
            .holiday_requests
            .iter()
            .find(|(e, d)| *e >= self.num_employees || *d >= self.num_days)
        {
            return Err(ConfigError::HolidayOutOfRange {
                employee,
                day,
                num_employees: self.num_employees,
                num_days: self.num_days,
            });
        }

        for &(day, kind) in self.required_personnel.keys() {
            if day >= self.num_days {
                return Err(ConfigError::RequirementOutOfRange {
                    day,
                    num_days: self.num_days,
                });
            }
            if !kind.is_work() {
                return Err(ConfigError::RequirementOnOff { day });
            }
        }

        Ok(ScheduleConfig {
            num_employees: self.num_employees,
            num_days: self.num_days,
            max_consecutive_work_days: self.max_consecutive_work_days,
            holiday_requests: self.holiday_requests,
            required_personnel: self.required_personnel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_kind_ids_and_names() {
        assert_eq!(ShiftKind::Off.id(), 0);
        assert_eq!(ShiftKind::Day.id(), 1);
        assert_eq!(ShiftKind::Night.id(), 2);
        assert!(!ShiftKind::Off.is_work());
        assert!(ShiftKind::WORK.iter().all(|k| k.is_work()));
        assert_eq!(ShiftKind::Day.display_name(), "Day Shift");
    }

    #[test]
    fn test_shift_kind_from_str() {
        assert_eq!("night".parse::<ShiftKind>(), Ok(ShiftKind::Night));
        assert_eq!("OFF".parse::<ShiftKind>(), Ok(ShiftKind::Off));
        assert!("evening".parse::<ShiftKind>().is_err());
    }

    #[test]
    fn test_shift_kind_serde() {
        let json = serde_json::to_string(&ShiftKind::Night).unwrap();
        assert_eq!(json, "\"NIGHT\"");
        let kind: ShiftKind = serde_json::from_str("\"DAY\"").unwrap();
        assert_eq!(kind, ShiftKind::Day);
    }

    #[test]
    fn test_rejects_empty_dimensions() {
        assert_eq!(
            ScheduleConfig::builder(0, 5).build(),
            Err(ConfigError::NoEmployees)
        );
        assert_eq!(ScheduleConfig::builder(3, 0).build(), Err(ConfigError::NoDays));
        assert_eq!(
            ScheduleConfig::builder(3, 5)
                .max_consecutive_work_days(0)
                .build(),
            Err(ConfigError::ZeroConsecutiveWorkDays)
        );
    }

    #[test]
    fn test_rejects_oversized_instances() {
        let err = ScheduleConfig::builder(usize::MAX / 2, 3).build().unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { max: MAX_EMPLOYEE_DAYS, .. }));

        let err = ScheduleConfig::builder(MAX_EMPLOYEE_DAYS + 1, 1).build().unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { .. }));

        assert!(ScheduleConfig::builder(MAX_EMPLOYEE_DAYS, 1).build().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_holiday() {
        let err = ScheduleConfig::builder(3, 5).holiday(3, 0).build().unwrap_err();
        assert!(matches!(err, ConfigError::HolidayOutOfRange { employee: 3, .. }));

        let err = ScheduleConfig::builder(3, 5).holiday(0, 5).build().unwrap_err();
        assert!(matches!(err, ConfigError::HolidayOutOfRange { day: 5, .. }));
    }

    #[test]
    fn test_rejects_bad_requirements() {
        let err = ScheduleConfig::builder(3, 5)
            .require(5, ShiftKind::Day, 1)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::RequirementOutOfRange { day: 5, num_days: 5 });

        let err = ScheduleConfig::builder(3, 5)
            .require(1, ShiftKind::Off, 1)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::RequirementOnOff { day: 1 });
    }

    #[test]
    fn test_require_daily_covers_horizon() {
        let config = ScheduleConfig::builder(4, 7)
            .require_daily(ShiftKind::Night, 2)
            .require(3, ShiftKind::Night, 1)
            .build()
            .unwrap();

        assert_eq!(config.required_personnel().len(), 7);
        assert_eq!(config.required(0, ShiftKind::Night), 2);
        assert_eq!(config.required(3, ShiftKind::Night), 1);
        assert_eq!(config.required(3, ShiftKind::Day), 0);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let make = || {
            ScheduleConfig::builder(3, 5)
                .holidays([(0, 0), (1, 2)])
                .require_daily(ShiftKind::Day, 1)
                .build()
        };
        assert_eq!(make(), make());

        let bad = || ScheduleConfig::builder(3, 5).holiday(9, 9).build();
        assert_eq!(bad(), bad());
    }

    #[test]
    fn test_duplicate_holidays_collapse() {
        let config = ScheduleConfig::builder(2, 2)
            .holiday(1, 1)
            .holiday(1, 1)
            .build()
            .unwrap();
        assert_eq!(config.holiday_requests().len(), 1);
        assert!(config.is_holiday(1, 1));
        assert!(!config.is_holiday(0, 1));
    }
}
