//! Day/night shift scheduling as a constraint satisfaction problem.
//!
//! A [`ScheduleConfig`] is turned into a linear model over 0/1 indicators,
//! solved under a time budget, and reported as a [`ScheduleResult`] whose
//! [`ScheduleStatus`] tells whether the assignments can be used.

pub mod api;
pub mod demo_data;
pub mod domain;
pub mod dto;
pub mod error;
pub mod model;
pub mod result;
pub mod service;
pub mod solver;

pub use domain::{ScheduleConfig, ShiftKind};
pub use result::{ScheduleResult, ScheduleStatus};
pub use service::{generate_schedule, health, ScheduleService};
