//! Solver invocation for shift scheduling.
//!
//! A [`ConstraintModel`] is handed to a [`ConstraintSolver`] backend under a
//! time budget; [`SolverInvoker`] normalises whatever the backend reports into
//! a [`Verdict`] plus an optional variable assignment.
//!
//! Determinism is inherited from the backend. Pumpkin with its default options
//! explores the same search tree for the same model, so repeated solves of one
//! configuration return the same schedule; nothing here adds or removes that.

use pumpkin_solver::constraints as cp;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution, SolutionReference};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::variables::TransformableVariable;
use pumpkin_solver::Solver;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::SolverError;
use crate::model::{Comparison, ConstraintModel, Objective, VarId};

/// Default solving time: 30 seconds.
const DEFAULT_TIME_LIMIT_SECS: u64 = 30;

/// Longest budget a single solve is granted; larger limits are clamped.
pub const MAX_TIME_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);

const TIME_LIMIT_ENV: &str = "SHIFT_SCHEDULING_TIME_LIMIT_SECS";
const OBJECTIVE_ENV: &str = "SHIFT_SCHEDULING_MINIMISE_OVERSTAFFING";

/// Solver configuration shared by every request a service handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Budget for translating and searching one model.
    pub time_limit: Duration,
    pub objective: Objective,
}

impl SolverConfig {
    /// Creates a config with a 30-second limit and no objective.
    pub fn default_config() -> Self {
        Self {
            time_limit: Duration::from_secs(DEFAULT_TIME_LIMIT_SECS),
            objective: Objective::Feasibility,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Reads `SHIFT_SCHEDULING_TIME_LIMIT_SECS` and
    /// `SHIFT_SCHEDULING_MINIMISE_OVERSTAFFING`, falling back to
    /// [`default_config`](Self::default_config) for anything unset or invalid.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default_config();

        if let Some(raw) = lookup(TIME_LIMIT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.time_limit = Duration::from_secs(secs),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", TIME_LIMIT_ENV),
            }
        }

        if let Some(raw) = lookup(OBJECTIVE_ENV) {
            match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => config.objective = Objective::MinimiseOverstaffing,
                "0" | "false" | "no" | "" => config.objective = Objective::Feasibility,
                _ => warn!(value = %raw, "Ignoring invalid {}", OBJECTIVE_ENV),
            }
        }

        config
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Normalised outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Solution found and proven optimal (or the model had no objective).
    Optimal,
    /// Solution found with budget left but without an optimality proof.
    Feasible,
    /// Proven that no assignment satisfies the constraints.
    Infeasible,
    /// Budget ran out; a solution may still accompany this verdict.
    Timeout,
}

/// Values for every variable of a solved model, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    values: Vec<i64>,
}

impl Solution {
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    pub fn value(&self, var: VarId) -> Option<i64> {
        self.values.get(var.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What a backend reports, before normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReport {
    Optimal(Solution),
    /// A solution, but search was interrupted before proving optimality.
    Satisfiable(Solution),
    Unsatisfiable,
    /// Interrupted before any solution was found.
    Unknown,
}

/// The external solving capability.
///
/// Implementations must stop searching at `deadline` and return
/// [`BackendReport::Satisfiable`] or [`BackendReport::Unknown`] rather than
/// block past it. They must be `Send + Sync` and keep no state between calls.
pub trait ConstraintSolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &ConstraintModel, deadline: Instant) -> Result<BackendReport, SolverError>;
}

/// [`ConstraintSolver`] backed by the Pumpkin lazy-clause-generation solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct PumpkinSolver;

impl ConstraintSolver for PumpkinSolver {
    fn name(&self) -> &'static str {
        "Pumpkin"
    }

    fn solve(&self, model: &ConstraintModel, deadline: Instant) -> Result<BackendReport, SolverError> {
        let mut solver = Solver::default();

        let vars = model
            .domains()
            .iter()
            .map(|domain| {
                Ok(solver.new_bounded_integer(to_i32(domain.lower)?, to_i32(domain.upper)?))
            })
            .collect::<Result<Vec<_>, SolverError>>()?;

        let tag = solver.new_constraint_tag();
        for constraint in model.constraints() {
            let terms = constraint
                .terms
                .iter()
                .map(|&(coefficient, var)| {
                    let domain = vars
                        .get(var.index())
                        .copied()
                        .ok_or(SolverError::UnknownVariable(var.index()))?;
                    Ok(domain.scaled(to_i32(coefficient)?))
                })
                .collect::<Result<Vec<_>, SolverError>>()?;
            let rhs = to_i32(constraint.rhs)?;

            let posted = match constraint.comparison {
                Comparison::Equal => solver.add_constraint(cp::equals(terms, rhs, tag)).post(),
                Comparison::LessOrEqual => solver
                    .add_constraint(cp::less_than_or_equals(terms, rhs, tag))
                    .post(),
                Comparison::GreaterOrEqual => solver
                    .add_constraint(cp::greater_than_or_equals(terms, rhs, tag))
                    .post(),
            };

            // Posting fails only when root propagation hits a conflict.
            if posted.is_err() {
                debug!(kind = ?constraint.kind, "Root-level conflict while posting constraint");
                return Ok(BackendReport::Unsatisfiable);
            }
        }

        let objective = match model.objective() {
            Some(var) => vars
                .get(var.index())
                .copied()
                .ok_or(SolverError::UnknownVariable(var.index()))?,
            // A fixed objective turns optimisation into plain satisfaction.
            None => solver.new_bounded_integer(0, 0),
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(BackendReport::Unknown);
        }

        let mut brancher = solver.default_brancher();
        let mut termination = TimeBudget::starting_now(remaining);

        fn ignore_solution<B>(_: &Solver, _: SolutionReference, _: &B) {}
        let result = solver.optimise(
            &mut brancher,
            &mut termination,
            LinearSatUnsat::new(OptimisationDirection::Minimise, objective, ignore_solution),
        );

        Ok(match result {
            OptimisationResult::Optimal(solution) => BackendReport::Optimal(Solution::new(
                vars.iter()
                    .map(|&var| i64::from(solution.get_integer_value(var)))
                    .collect(),
            )),
            OptimisationResult::Satisfiable(solution) => BackendReport::Satisfiable(Solution::new(
                vars.iter()
                    .map(|&var| i64::from(solution.get_integer_value(var)))
                    .collect(),
            )),
            OptimisationResult::Unsatisfiable => BackendReport::Unsatisfiable,
            OptimisationResult::Unknown => BackendReport::Unknown,
        })
    }
}

fn to_i32(value: i64) -> Result<i32, SolverError> {
    i32::try_from(value).map_err(|_| SolverError::Unsupported { value })
}

/// Normalised result of one [`SolverInvoker::solve`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    pub verdict: Verdict,
    pub solution: Option<Solution>,
    pub elapsed: Duration,
}

/// Runs a backend under a time budget and normalises its report.
///
/// ```
/// use std::time::Duration;
/// use shift_scheduling::domain::{ScheduleConfig, ShiftKind};
/// use shift_scheduling::model;
/// use shift_scheduling::solver::{PumpkinSolver, SolverInvoker, Verdict};
///
/// let config = ScheduleConfig::builder(1, 1)
///     .require(0, ShiftKind::Day, 1)
///     .require(0, ShiftKind::Night, 1)
///     .build()
///     .unwrap();
/// let model = model::build(&config).unwrap();
///
/// let outcome = SolverInvoker::new(PumpkinSolver)
///     .solve(model, Duration::from_secs(5))
///     .unwrap();
/// assert_eq!(outcome.verdict, Verdict::Infeasible);
/// assert!(outcome.solution.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SolverInvoker<S = PumpkinSolver> {
    backend: S,
}

impl Default for SolverInvoker<PumpkinSolver> {
    fn default() -> Self {
        Self::new(PumpkinSolver)
    }
}

impl<S: ConstraintSolver> SolverInvoker<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Solves `model`, returning control once `time_budget` has elapsed.
    ///
    /// The budget covers translation into the backend as well as search. A
    /// backend panic is reported as [`SolverError::Internal`].
    pub fn solve(&self, model: ConstraintModel, time_budget: Duration) -> Result<SolveOutcome, SolverError> {
        let start = Instant::now();
        if time_budget > MAX_TIME_LIMIT {
            warn!(
                requested_secs = time_budget.as_secs(),
                max_secs = MAX_TIME_LIMIT.as_secs(),
                "Clamping solve budget"
            );
        }
        let time_budget = time_budget.min(MAX_TIME_LIMIT);
        // An unrepresentable deadline leaves no time to search.
        let deadline = start.checked_add(time_budget).unwrap_or(start);

        info!(
            backend = self.backend.name(),
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            budget_ms = time_budget.as_millis() as u64,
            "Starting solve"
        );

        let report = if time_budget.is_zero() {
            BackendReport::Unknown
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| self.backend.solve(&model, deadline)))
                .map_err(|payload| SolverError::Internal(panic_message(payload.as_ref())))??
        };

        let elapsed = start.elapsed();
        let budget_spent = Instant::now() >= deadline;

        let (verdict, solution) = match report {
            BackendReport::Optimal(solution) => (Verdict::Optimal, Some(solution)),
            BackendReport::Satisfiable(solution) if budget_spent => (Verdict::Timeout, Some(solution)),
            BackendReport::Satisfiable(solution) => (Verdict::Feasible, Some(solution)),
            BackendReport::Unsatisfiable => (Verdict::Infeasible, None),
            BackendReport::Unknown => (Verdict::Timeout, None),
        };

        if let Some(solution) = &solution {
            if solution.len() != model.variable_count() {
                return Err(SolverError::IncompleteSolution {
                    expected: model.variable_count(),
                    actual: solution.len(),
                });
            }
        }

        info!(
            verdict = ?verdict,
            has_solution = solution.is_some(),
            duration_ms = elapsed.as_millis() as u64,
            "Solve finished"
        );

        Ok(SolveOutcome {
            verdict,
            solution,
            elapsed,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "backend panicked".to_string()
    }
}
