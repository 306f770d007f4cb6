//! Error taxonomy for schedule generation.
//!
//! Timeouts and infeasibility are not errors: they are ordinary verdicts
//! carried by [`crate::result::ScheduleStatus`].

use thiserror::Error;

use crate::domain::ShiftKind;

/// Malformed or out-of-range input. Never retried; the caller must fix it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("num_employees must be at least 1")]
    NoEmployees,
    #[error("num_days must be at least 1")]
    NoDays,
    #[error("max_consecutive_work_days must be at least 1")]
    ZeroConsecutiveWorkDays,
    #[error(
        "{num_employees} employees x {num_days} days exceeds the limit of \
         {max} employee-days"
    )]
    TooLarge {
        num_employees: usize,
        num_days: usize,
        max: usize,
    },
    #[error(
        "holiday request (employee {employee}, day {day}) is outside \
         {num_employees} employees x {num_days} days"
    )]
    HolidayOutOfRange {
        employee: usize,
        day: usize,
        num_employees: usize,
        num_days: usize,
    },
    #[error("personnel requirement for day {day} is outside the {num_days}-day horizon")]
    RequirementOutOfRange { day: usize, num_days: usize },
    #[error("personnel requirement on day {day} targets OFF; only DAY and NIGHT can be staffed")]
    RequirementOnOff { day: usize },
}

/// Internal builder invariant violation. Treated as a defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("no decision variable for employee {employee}, day {day}, shift {shift}")]
    IndexOutOfRange {
        employee: usize,
        day: usize,
        shift: ShiftKind,
    },
    #[error("{num_employees} employees x {num_days} days needs more variables than the model can index")]
    TooLarge { num_employees: usize, num_days: usize },
    #[error("personnel requirement on day {day} for {shift} cannot be modelled")]
    InvalidRequirement { day: usize, shift: ShiftKind },
    #[error("solution assigns {count} shifts to employee {employee} on day {day}")]
    AmbiguousAssignment {
        employee: usize,
        day: usize,
        count: usize,
    },
}

/// The external solving capability failed. Safe for the caller to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("solver failed internally: {0}")]
    Internal(String),
    #[error("value {value} cannot be represented by the solver backend")]
    Unsupported { value: i64 },
    #[error("constraint references unknown variable {0}")]
    UnknownVariable(usize),
    #[error("solver returned {actual} values for {expected} variables")]
    IncompleteSolution { expected: usize, actual: usize },
}

/// Everything that can stop a request before a verdict is reached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("model construction failed: {0}")]
    Model(#[from] ModelError),
    #[error(transparent)]
    Solver(#[from] SolverError),
}
