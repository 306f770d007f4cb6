//! Demo instances for shift scheduling.
//!
//! Day 0 of every generated horizon is a Monday; days 5 and 6 of each week
//! are the weekend and get their own staffing floor.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::{ScheduleConfig, ShiftKind, DEFAULT_MAX_CONSECUTIVE_WORK_DAYS};
use crate::error::ConfigError;

/// The built-in instance: 25 employees over 30 days, one Day and one Night
/// shift staffed daily, and two holiday requests.
pub fn default_instance() -> Result<ScheduleConfig, ConfigError> {
    ScheduleConfig::builder(25, 30)
        .max_consecutive_work_days(DEFAULT_MAX_CONSECUTIVE_WORK_DAYS)
        .holiday(0, 0)
        .holiday(1, 2)
        .require_daily(ShiftKind::Day, 1)
        .require_daily(ShiftKind::Night, 1)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    Small,
    Large,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoData::Small),
            "LARGE" => Ok(DemoData::Large),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Small => "SMALL",
            DemoData::Large => "LARGE",
        }
    }

    fn parameters(&self) -> DemoDataParameters {
        match self {
            DemoData::Small => DemoDataParameters {
                employee_count: 10,
                days_in_schedule: 14,
                max_consecutive_work_days: 4,
                weekday_staffing: Staffing { day: 2, night: 1 },
                weekend_staffing: Staffing { day: 1, night: 1 },
                holiday_count_distribution: vec![(0, 3.0), (1, 3.0), (2, 2.0), (3, 1.0)],
            },
            DemoData::Large => DemoDataParameters {
                employee_count: 40,
                days_in_schedule: 28,
                max_consecutive_work_days: 5,
                weekday_staffing: Staffing { day: 6, night: 3 },
                weekend_staffing: Staffing { day: 3, night: 2 },
                holiday_count_distribution: vec![(0, 2.0), (2, 3.0), (4, 2.0), (6, 1.0)],
            },
        }
    }
}

struct Staffing {
    day: u32,
    night: u32,
}

struct DemoDataParameters {
    employee_count: usize,
    days_in_schedule: usize,
    max_consecutive_work_days: usize,
    weekday_staffing: Staffing,
    weekend_staffing: Staffing,
    holiday_count_distribution: Vec<(usize, f64)>,
}

/// List of available demo data sets.
pub fn list_demo_data() -> Vec<&'static str> {
    vec!["SMALL", "LARGE"]
}

/// Generates a demo instance for the given size.
pub fn generate(demo: DemoData) -> Result<ScheduleConfig, ConfigError> {
    let params = demo.parameters();
    let mut rng = StdRng::seed_from_u64(0);

    let mut builder = ScheduleConfig::builder(params.employee_count, params.days_in_schedule)
        .max_consecutive_work_days(params.max_consecutive_work_days);

    for day in 0..params.days_in_schedule {
        let staffing = if is_weekend(day) {
            &params.weekend_staffing
        } else {
            &params.weekday_staffing
        };
        builder = builder
            .require(day, ShiftKind::Day, staffing.day)
            .require(day, ShiftKind::Night, staffing.night);
    }

    let days: Vec<usize> = (0..params.days_in_schedule).collect();
    for employee in 0..params.employee_count {
        let holiday_count = pick_count(&mut rng, &params.holiday_count_distribution);
        let picked = days.choose_multiple(&mut rng, holiday_count);
        builder = builder.holidays(picked.map(|&day| (employee, day)));
    }

    builder.build()
}

fn is_weekend(day: usize) -> bool {
    day % 7 >= 5
}

/// Pick a count based on weighted distribution.
fn pick_count(rng: &mut StdRng, distribution: &[(usize, f64)]) -> usize {
    let total_weight: f64 = distribution.iter().map(|(_, w)| w).sum();
    let mut choice = rng.gen::<f64>() * total_weight;

    for (count, weight) in distribution {
        if choice < *weight {
            return *count;
        }
        choice -= weight;
    }
    distribution.last().map(|(c, _)| *c).unwrap_or(0)
}
