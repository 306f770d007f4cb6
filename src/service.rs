//! Schedule generation entry points.
//!
//! [`ScheduleService`] chains model building, solving, and formatting. It
//! fails closed: every call returns a [`ScheduleResult`], with configuration,
//! model, and solver errors downgraded to
//! [`ScheduleStatus::Error`](crate::result::ScheduleStatus::Error).

use std::sync::OnceLock;
use std::time::Instant;
use tracing::{info, warn};

use crate::demo_data;
use crate::domain::ScheduleConfig;
use crate::dto::ScheduleRequest;
use crate::error::{ConfigError, ScheduleError};
use crate::model::ModelBuilder;
use crate::result::{ResultFormatter, ScheduleResult};
use crate::solver::{ConstraintSolver, PumpkinSolver, SolverConfig, SolverInvoker};

/// Stateless orchestrator; one instance can serve concurrent requests.
///
/// ```
/// use shift_scheduling::domain::{ScheduleConfig, ShiftKind};
/// use shift_scheduling::service::ScheduleService;
/// use shift_scheduling::solver::SolverConfig;
///
/// let config = ScheduleConfig::builder(2, 1)
///     .require(0, ShiftKind::Day, 1)
///     .require(0, ShiftKind::Night, 1)
///     .build()
///     .unwrap();
///
/// let result = ScheduleService::new(SolverConfig::default()).generate(&config);
/// assert!(result.status.is_success());
/// assert_eq!(result.assignments.len(), 2);
/// ```
pub struct ScheduleService<S = PumpkinSolver> {
    invoker: SolverInvoker<S>,
    config: SolverConfig,
}

impl ScheduleService<PumpkinSolver> {
    pub fn new(config: SolverConfig) -> Self {
        Self::with_solver(PumpkinSolver, config)
    }
}

impl Default for ScheduleService<PumpkinSolver> {
    fn default() -> Self {
        Self::new(SolverConfig::default_config())
    }
}

impl<S: ConstraintSolver> ScheduleService<S> {
    pub fn with_solver(solver: S, config: SolverConfig) -> Self {
        Self {
            invoker: SolverInvoker::new(solver),
            config,
        }
    }

    pub fn solver_config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solver_name(&self) -> &'static str {
        self.invoker.backend().name()
    }

    /// Generates a schedule for a validated configuration.
    pub fn generate(&self, config: &ScheduleConfig) -> ScheduleResult {
        let start = Instant::now();
        info!(
            employees = config.num_employees(),
            days = config.num_days(),
            holidays = config.holiday_requests().len(),
            max_consecutive = config.max_consecutive_work_days(),
            "Generating schedule"
        );

        match self.try_generate(config) {
            Ok(result) => {
                info!(
                    status = result.status.as_str(),
                    assignments = result.assignments.len(),
                    duration_ms = result.elapsed.as_millis() as u64,
                    "Schedule generation complete"
                );
                result
            }
            Err(e) => {
                warn!(error = %e, "Schedule generation failed");
                ScheduleResult::error(e.to_string(), start.elapsed())
            }
        }
    }

    /// Validates raw input, then generates. Invalid input yields an Error
    /// result instead of a [`ConfigError`].
    pub fn generate_from_request(&self, request: &ScheduleRequest) -> ScheduleResult {
        match request.to_config() {
            Ok(config) => self.generate(&config),
            Err(e) => rejected(e),
        }
    }

    fn try_generate(&self, config: &ScheduleConfig) -> Result<ScheduleResult, ScheduleError> {
        let model = ModelBuilder::new(config)
            .with_objective(self.config.objective)
            .build()?;
        let grid = model.grid();
        let objective = model.objective();

        let outcome = self.invoker.solve(model, self.config.time_limit)?;

        let formatter = ResultFormatter::new(config, grid, objective, self.config.time_limit);
        Ok(formatter.format(outcome)?)
    }
}

/// Error result for input that failed validation.
pub fn rejected(error: ConfigError) -> ScheduleResult {
    let error = ScheduleError::from(error);
    warn!(error = %error, "Rejected schedule request");
    ScheduleResult::error(error.to_string(), Default::default())
}

fn default_service() -> &'static ScheduleService {
    static SERVICE: OnceLock<ScheduleService> = OnceLock::new();
    SERVICE.get_or_init(ScheduleService::default)
}

/// Generates a schedule with the default solver configuration.
pub fn generate_schedule(config: &ScheduleConfig) -> ScheduleResult {
    default_service().generate(config)
}

/// The instance used when a caller supplies none, built once per process.
pub fn default_config() -> Result<&'static ScheduleConfig, &'static ConfigError> {
    static DEFAULT: OnceLock<Result<ScheduleConfig, ConfigError>> = OnceLock::new();
    DEFAULT.get_or_init(demo_data::default_instance).as_ref()
}

/// True once the default configuration is loaded and valid.
pub fn health() -> bool {
    default_config().is_ok()
}
