//! Schedule results and their rendering.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{ScheduleConfig, ShiftKind};
use crate::error::ModelError;
use crate::model::{ShiftGrid, VarId};
use crate::solver::{SolveOutcome, Verdict};

/// Status of a schedule request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Optimal,
    Feasible,
    Infeasible,
    Timeout,
    Error,
}

impl ScheduleStatus {
    /// Returns the status as a SCREAMING_SNAKE_CASE string for API responses.
    ///
    /// ```
    /// use shift_scheduling::result::ScheduleStatus;
    ///
    /// assert_eq!(ScheduleStatus::Optimal.as_str(), "OPTIMAL");
    /// assert_eq!(ScheduleStatus::Timeout.as_str(), "TIMEOUT");
    /// ```
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::Optimal => "OPTIMAL",
            ScheduleStatus::Feasible => "FEASIBLE",
            ScheduleStatus::Infeasible => "INFEASIBLE",
            ScheduleStatus::Timeout => "TIMEOUT",
            ScheduleStatus::Error => "ERROR",
        }
    }

    /// Optimal and Feasible are the statuses a caller can accept unreservedly.
    pub fn is_success(self) -> bool {
        matches!(self, ScheduleStatus::Optimal | ScheduleStatus::Feasible)
    }
}

impl From<Verdict> for ScheduleStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Optimal => ScheduleStatus::Optimal,
            Verdict::Feasible => ScheduleStatus::Feasible,
            Verdict::Infeasible => ScheduleStatus::Infeasible,
            Verdict::Timeout => ScheduleStatus::Timeout,
        }
    }
}

/// One employee's shift on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub day: usize,
    pub employee: usize,
    pub shift: ShiftKind,
}

/// Outcome of a schedule request.
///
/// `assignments` is sorted by day, then employee, and is non-empty only when a
/// solution exists: Optimal, Feasible, or a Timeout that still found one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleResult {
    pub status: ScheduleStatus,
    pub assignments: Vec<ShiftAssignment>,
    pub message: String,
    /// Total overstaffing when that objective was requested.
    pub objective: Option<i64>,
    pub elapsed: Duration,
}

const INFEASIBLE_MESSAGE: &str =
    "no feasible schedule satisfies all hard constraints for the given horizon and staffing floor";

impl ScheduleResult {
    /// A failed request with no assignments.
    pub fn error(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status: ScheduleStatus::Error,
            assignments: Vec::new(),
            message: message.into(),
            objective: None,
            elapsed,
        }
    }

    pub fn has_solution(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// True when assignments are present and came from a verdict rather than
    /// a failure.
    pub fn is_usable(&self) -> bool {
        self.status != ScheduleStatus::Error && self.has_solution()
    }

    /// Shift of `employee` on `day`, if the result carries a solution.
    pub fn shift_of(&self, employee: usize, day: usize) -> Option<ShiftKind> {
        self.assignments
            .binary_search_by(|a| (a.day, a.employee).cmp(&(day, employee)))
            .ok()
            .map(|i| self.assignments[i].shift)
    }

    /// Employees assigned `kind` on `day`, in index order.
    pub fn staff_on(&self, day: usize, kind: ShiftKind) -> Vec<usize> {
        self.assignments
            .iter()
            .filter(|a| a.day == day && a.shift == kind)
            .map(|a| a.employee)
            .collect()
    }

    /// Renders the per-day roster with coverage against the staffing floors.
    ///
    /// Returns a single explanatory line when there is no solution.
    pub fn roster(&self, config: &ScheduleConfig) -> Vec<String> {
        if !self.has_solution() {
            return vec![self.message.clone()];
        }

        let mut lines = vec!["Solution found:".to_string()];
        for day in 0..config.num_days() {
            lines.push(format!("Day {}:", day));
            for employee in 0..config.num_employees() {
                if let Some(kind) = self.shift_of(employee, day) {
                    lines.push(format!(
                        "  Employee {}: {} (Shift ID: {})",
                        employee,
                        kind.display_name(),
                        kind.id()
                    ));
                }
            }
            for kind in ShiftKind::WORK {
                let staff: Vec<String> = self
                    .staff_on(day, kind)
                    .iter()
                    .map(|e| e.to_string())
                    .collect();
                lines.push(format!(
                    "    -> {} assigned: {} (Required: {})",
                    kind.display_name(),
                    staff.join(", "),
                    config.required(day, kind)
                ));
            }
        }
        lines.push("-".repeat(20));
        lines
    }
}

/// Turns a solver outcome into a [`ScheduleResult`].
pub struct ResultFormatter<'a> {
    config: &'a ScheduleConfig,
    grid: ShiftGrid,
    objective: Option<VarId>,
    time_limit: Duration,
}

impl<'a> ResultFormatter<'a> {
    /// `grid` and `objective` come from the model the outcome was solved from.
    pub fn new(
        config: &'a ScheduleConfig,
        grid: ShiftGrid,
        objective: Option<VarId>,
        time_limit: Duration,
    ) -> Self {
        Self {
            config,
            grid,
            objective,
            time_limit,
        }
    }

    pub fn format(&self, outcome: SolveOutcome) -> Result<ScheduleResult, ModelError> {
        let status = ScheduleStatus::from(outcome.verdict);

        let (assignments, objective) = match &outcome.solution {
            Some(solution) => {
                let mut assignments =
                    Vec::with_capacity(self.grid.num_days() * self.grid.num_employees());
                for day in 0..self.grid.num_days() {
                    for employee in 0..self.grid.num_employees() {
                        let active: Vec<ShiftKind> = ShiftKind::ALL
                            .into_iter()
                            .filter(|&kind| {
                                self.grid
                                    .var(employee, day, kind)
                                    .and_then(|var| solution.value(var))
                                    == Some(1)
                            })
                            .collect();
                        match active.as_slice() {
                            [shift] => assignments.push(ShiftAssignment {
                                day,
                                employee,
                                shift: *shift,
                            }),
                            _ => {
                                return Err(ModelError::AmbiguousAssignment {
                                    employee,
                                    day,
                                    count: active.len(),
                                })
                            }
                        }
                    }
                }
                let objective = self.objective.and_then(|var| solution.value(var));
                (assignments, objective)
            }
            None => (Vec::new(), None),
        };

        let message = self.message(status, !assignments.is_empty());

        Ok(ScheduleResult {
            status,
            assignments,
            message,
            objective,
            elapsed: outcome.elapsed,
        })
    }

    fn message(&self, status: ScheduleStatus, has_solution: bool) -> String {
        let employees = self.config.num_employees();
        let days = self.config.num_days();
        match status {
            ScheduleStatus::Optimal => format!(
                "optimal schedule found for {} employees over {} days",
                employees, days
            ),
            ScheduleStatus::Feasible => format!(
                "feasible schedule found for {} employees over {} days; optimality not proven",
                employees, days
            ),
            ScheduleStatus::Infeasible => INFEASIBLE_MESSAGE.to_string(),
            ScheduleStatus::Timeout if has_solution => format!(
                "time budget of {:?} elapsed; returning the best schedule found, optimality not proven",
                self.time_limit
            ),
            ScheduleStatus::Timeout => format!(
                "time budget of {:?} elapsed before any schedule was found",
                self.time_limit
            ),
            ScheduleStatus::Error => "schedule generation failed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Solution;

    fn config() -> ScheduleConfig {
        ScheduleConfig::builder(2, 2)
            .require_daily(ShiftKind::Day, 1)
            .require(0, ShiftKind::Night, 1)
            .build()
            .unwrap()
    }

    /// Day 0: e0 Night, e1 Day. Day 1: e0 Off, e1 Day.
    fn solution(grid: ShiftGrid) -> Solution {
        let mut values = vec![0; grid.len()];
        for (e, d, k) in [
            (0, 0, ShiftKind::Night),
            (1, 0, ShiftKind::Day),
            (0, 1, ShiftKind::Off),
            (1, 1, ShiftKind::Day),
        ] {
            values[grid.var(e, d, k).unwrap().index()] = 1;
        }
        Solution::new(values)
    }

    fn outcome(verdict: Verdict, solution: Option<Solution>) -> SolveOutcome {
        SolveOutcome {
            verdict,
            solution,
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_assignments_sorted_by_day_then_employee() {
        let config = config();
        let grid = ShiftGrid::new(2, 2);
        let formatter = ResultFormatter::new(&config, grid, None, Duration::from_secs(1));

        let result = formatter
            .format(outcome(Verdict::Optimal, Some(solution(grid))))
            .unwrap();

        assert_eq!(result.status, ScheduleStatus::Optimal);
        let keys: Vec<_> = result.assignments.iter().map(|a| (a.day, a.employee)).collect();
        assert_eq!(keys, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(result.shift_of(0, 0), Some(ShiftKind::Night));
        assert_eq!(result.shift_of(0, 1), Some(ShiftKind::Off));
        assert_eq!(result.shift_of(2, 0), None);
        assert_eq!(result.staff_on(1, ShiftKind::Day), vec![1]);
    }

    #[test]
    fn test_infeasible_has_explanation_and_no_assignments() {
        let config = config();
        let formatter =
            ResultFormatter::new(&config, ShiftGrid::new(2, 2), None, Duration::from_secs(1));

        let result = formatter.format(outcome(Verdict::Infeasible, None)).unwrap();
        assert_eq!(result.status, ScheduleStatus::Infeasible);
        assert!(result.assignments.is_empty());
        assert!(result.message.contains("no feasible schedule"));
        assert_eq!(result.roster(&config), vec![result.message.clone()]);
    }

    #[test]
    fn test_timeout_keeps_solution_when_present() {
        let config = config();
        let grid = ShiftGrid::new(2, 2);
        let formatter = ResultFormatter::new(&config, grid, None, Duration::from_millis(50));

        let with = formatter
            .format(outcome(Verdict::Timeout, Some(solution(grid))))
            .unwrap();
        assert_eq!(with.status, ScheduleStatus::Timeout);
        assert_eq!(with.assignments.len(), 4);
        assert!(with.message.contains("best schedule found"));

        let without = formatter.format(outcome(Verdict::Timeout, None)).unwrap();
        assert!(without.assignments.is_empty());
        assert!(without.message.contains("before any schedule"));
    }

    #[test]
    fn test_ambiguous_solution_is_a_model_error() {
        let config = config();
        let grid = ShiftGrid::new(2, 2);
        let mut values = vec![0; grid.len()];
        values[grid.var(0, 0, ShiftKind::Day).unwrap().index()] = 1;
        values[grid.var(0, 0, ShiftKind::Night).unwrap().index()] = 1;

        let formatter = ResultFormatter::new(&config, grid, None, Duration::from_secs(1));
        let err = formatter
            .format(outcome(Verdict::Feasible, Some(Solution::new(values))))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::AmbiguousAssignment {
                employee: 0,
                day: 0,
                count: 2
            }
        );
    }

    #[test]
    fn test_roster_format() {
        let config = config();
        let grid = ShiftGrid::new(2, 2);
        let formatter = ResultFormatter::new(&config, grid, None, Duration::from_secs(1));
        let result = formatter
            .format(outcome(Verdict::Optimal, Some(solution(grid))))
            .unwrap();

        let roster = result.roster(&config);
        assert_eq!(
            roster,
            vec![
                "Solution found:",
                "Day 0:",
                "  Employee 0: Night Shift (Shift ID: 2)",
                "  Employee 1: Day Shift (Shift ID: 1)",
                "    -> Day Shift assigned: 1 (Required: 1)",
                "    -> Night Shift assigned: 0 (Required: 1)",
                "Day 1:",
                "  Employee 0: Day Off (Shift ID: 0)",
                "  Employee 1: Day Shift (Shift ID: 1)",
                "    -> Day Shift assigned: 1 (Required: 1)",
                "    -> Night Shift assigned:  (Required: 0)",
                "--------------------",
            ]
        );
    }

    #[test]
    fn test_status_from_verdict() {
        assert_eq!(ScheduleStatus::from(Verdict::Feasible), ScheduleStatus::Feasible);
        assert!(ScheduleStatus::Optimal.is_success());
        assert!(!ScheduleStatus::Timeout.is_success());
        assert_eq!(
            serde_json::to_string(&ScheduleStatus::Infeasible).unwrap(),
            "\"INFEASIBLE\""
        );
    }
}
