//! Translation of a [`ScheduleConfig`] into a solver-agnostic constraint model.
//!
//! Every (employee, day, kind) triple gets a 0/1 indicator variable. All
//! scheduling rules are expressed as linear (in)equalities over those
//! indicators, which is the capability surface every backend must offer:
//!
//! 1. **Exactly one shift**: `off + day + night = 1`
//! 2. **Personnel floor**: `Σ_e x[e,d,k] ≥ required(d,k)`
//! 3. **Holiday lock**: `off[e,d] = 1`
//! 4. **Night rest**: `night[e,d] − off[e,d+1] ≤ 0`
//! 5. **Consecutive-work cap**: `Σ off[e,w..w+cap+1] ≥ 1` for every window
//!
//! With exactly-one in place, rule 5 is the same as capping the number of
//! worked days in each window at `max_consecutive_work_days`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ScheduleConfig, ShiftKind};
use crate::error::ModelError;

/// Handle to a decision variable inside a [`ConstraintModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Inclusive integer bounds of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub lower: i64,
    pub upper: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

/// Which scheduling rule a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    ExactlyOneShift,
    PersonnelFloor,
    HolidayLock,
    NightRest,
    ConsecutiveWorkCap,
    /// Links a surplus variable to the headcount of one (day, kind).
    Surplus,
    /// Defines the overstaffing objective as the sum of surpluses.
    ObjectiveTotal,
}

/// `Σ coefficient · variable  <comparison>  rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub terms: Vec<(i64, VarId)>,
    pub comparison: Comparison,
    pub rhs: i64,
}

/// What the solver should optimise, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Objective {
    /// Any schedule satisfying the hard rules.
    #[default]
    Feasibility,
    /// Minimise headcount above the staffing floors, summed over all
    /// (day, work kind) pairs.
    MinimiseOverstaffing,
}

/// Index arithmetic for the shift indicators.
///
/// Indicators are the first `3 · employees · days` variables of a model, laid
/// out employee-major, then day, then [`ShiftKind::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftGrid {
    num_employees: usize,
    num_days: usize,
}

impl ShiftGrid {
    pub fn new(num_employees: usize, num_days: usize) -> Self {
        Self {
            num_employees,
            num_days,
        }
    }

    pub fn num_employees(&self) -> usize {
        self.num_employees
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    /// Indicator count, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    /// Indicator count, or `None` when it overflows `usize`.
    pub fn checked_len(&self) -> Option<usize> {
        self.num_employees
            .checked_mul(self.num_days)?
            .checked_mul(ShiftKind::ALL.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indicator for `employee` working `kind` on `day`.
    pub fn var(&self, employee: usize, day: usize, kind: ShiftKind) -> Option<VarId> {
        if employee >= self.num_employees || day >= self.num_days {
            return None;
        }
        let slot = employee.checked_mul(self.num_days)?.checked_add(day)?;
        let index = slot.checked_mul(ShiftKind::ALL.len())?.checked_add(kind.id())?;
        Some(VarId(index))
    }
}

/// Decision variables and constraints for one request.
///
/// Built fresh per request by [`ModelBuilder`] and handed by value to the
/// solver; never shared.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    grid: ShiftGrid,
    domains: Vec<Domain>,
    constraints: Vec<LinearConstraint>,
    objective: Option<VarId>,
}

impl ConstraintModel {
    fn new(grid: ShiftGrid) -> Self {
        Self {
            grid,
            domains: vec![Domain { lower: 0, upper: 1 }; grid.len()],
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn grid(&self) -> ShiftGrid {
        self.grid
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Variable to minimise; `None` for a pure feasibility model.
    pub fn objective(&self) -> Option<VarId> {
        self.objective
    }

    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints encoding `kind`.
    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    fn new_variable(&mut self, lower: i64, upper: i64) -> VarId {
        self.domains.push(Domain { lower, upper });
        VarId(self.domains.len() - 1)
    }

    fn add(
        &mut self,
        kind: ConstraintKind,
        terms: Vec<(i64, VarId)>,
        comparison: Comparison,
        rhs: i64,
    ) {
        self.constraints.push(LinearConstraint {
            kind,
            terms,
            comparison,
            rhs,
        });
    }
}

/// Builds a [`ConstraintModel`] from a validated configuration.
///
/// # Example
/// ```
/// use shift_scheduling::domain::{ScheduleConfig, ShiftKind};
/// use shift_scheduling::model::{ConstraintKind, ModelBuilder};
///
/// let config = ScheduleConfig::builder(2, 3)
///     .require_daily(ShiftKind::Day, 1)
///     .build()
///     .unwrap();
/// let model = ModelBuilder::new(&config).build().unwrap();
///
/// assert_eq!(model.variable_count(), 2 * 3 * 3);
/// assert_eq!(model.count_of(ConstraintKind::ExactlyOneShift), 6);
/// assert_eq!(model.count_of(ConstraintKind::PersonnelFloor), 3);
/// ```
pub struct ModelBuilder<'a> {
    config: &'a ScheduleConfig,
    objective: Objective,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(config: &'a ScheduleConfig) -> Self {
        Self {
            config,
            objective: Objective::Feasibility,
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn build(&self) -> Result<ConstraintModel, ModelError> {
        let config = self.config;
        let grid = ShiftGrid::new(config.num_employees(), config.num_days());
        // Solver variables are indexed by i32.
        match grid.checked_len() {
            Some(len) if len <= i32::MAX as usize => {}
            _ => {
                return Err(ModelError::TooLarge {
                    num_employees: config.num_employees(),
                    num_days: config.num_days(),
                })
            }
        }
        let mut model = ConstraintModel::new(grid);

        self.add_exactly_one_shift(&mut model)?;
        self.add_personnel_floors(&mut model)?;
        self.add_holiday_locks(&mut model)?;
        self.add_night_rest(&mut model)?;
        self.add_consecutive_work_cap(&mut model)?;

        if self.objective == Objective::MinimiseOverstaffing {
            self.add_overstaffing_objective(&mut model)?;
        }

        debug!(
            employees = config.num_employees(),
            days = config.num_days(),
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            objective = ?self.objective,
            "Built shift model"
        );

        Ok(model)
    }

    fn add_exactly_one_shift(&self, model: &mut ConstraintModel) -> Result<(), ModelError> {
        let grid = model.grid();
        for employee in 0..grid.num_employees() {
            for day in 0..grid.num_days() {
                let terms = ShiftKind::ALL
                    .iter()
                    .map(|&kind| indicator(&grid, employee, day, kind).map(|v| (1, v)))
                    .collect::<Result<Vec<_>, _>>()?;
                model.add(ConstraintKind::ExactlyOneShift, terms, Comparison::Equal, 1);
            }
        }
        Ok(())
    }

    fn add_personnel_floors(&self, model: &mut ConstraintModel) -> Result<(), ModelError> {
        let grid = model.grid();
        for (&(day, kind), &count) in self.config.required_personnel() {
            if !kind.is_work() || day >= grid.num_days() {
                return Err(ModelError::InvalidRequirement { day, shift: kind });
            }
            // Zero floors are vacuous.
            if count == 0 {
                continue;
            }
            let terms = (0..grid.num_employees())
                .map(|employee| indicator(&grid, employee, day, kind).map(|v| (1, v)))
                .collect::<Result<Vec<_>, _>>()?;
            model.add(
                ConstraintKind::PersonnelFloor,
                terms,
                Comparison::GreaterOrEqual,
                i64::from(count),
            );
        }
        Ok(())
    }

    fn add_holiday_locks(&self, model: &mut ConstraintModel) -> Result<(), ModelError> {
        let grid = model.grid();
        for &(employee, day) in self.config.holiday_requests() {
            let off = indicator(&grid, employee, day, ShiftKind::Off)?;
            model.add(ConstraintKind::HolidayLock, vec![(1, off)], Comparison::Equal, 1);
        }
        Ok(())
    }

    fn add_night_rest(&self, model: &mut ConstraintModel) -> Result<(), ModelError> {
        let grid = model.grid();
        for employee in 0..grid.num_employees() {
            for day in 0..grid.num_days().saturating_sub(1) {
                let night = indicator(&grid, employee, day, ShiftKind::Night)?;
                let next_off = indicator(&grid, employee, day + 1, ShiftKind::Off)?;
                model.add(
                    ConstraintKind::NightRest,
                    vec![(1, night), (-1, next_off)],
                    Comparison::LessOrEqual,
                    0,
                );
            }
        }
        Ok(())
    }

    fn add_consecutive_work_cap(&self, model: &mut ConstraintModel) -> Result<(), ModelError> {
        let grid = model.grid();
        let window = self.config.max_consecutive_work_days() + 1;
        if window > grid.num_days() {
            return Ok(());
        }
        for employee in 0..grid.num_employees() {
            for start in 0..=(grid.num_days() - window) {
                let terms = (start..start + window)
                    .map(|day| indicator(&grid, employee, day, ShiftKind::Off).map(|v| (1, v)))
                    .collect::<Result<Vec<_>, _>>()?;
                model.add(
                    ConstraintKind::ConsecutiveWorkCap,
                    terms,
                    Comparison::GreaterOrEqual,
                    1,
                );
            }
        }
        Ok(())
    }

    /// Adds `count[d,k] − surplus[d,k] = required(d,k)` for every (day, work
    /// kind) and an objective variable equal to the total surplus. Leaves the
    /// hard rules untouched.
    fn add_overstaffing_objective(&self, model: &mut ConstraintModel) -> Result<(), ModelError> {
        let grid = model.grid();
        let employees = grid.num_employees() as i64;
        let mut surpluses = Vec::with_capacity(grid.num_days() * ShiftKind::WORK.len());
        let mut total_upper = 0i64;

        for day in 0..grid.num_days() {
            for kind in ShiftKind::WORK {
                let required = i64::from(self.config.required(day, kind));
                let upper = (employees - required).max(0);
                let surplus = model.new_variable(0, upper);

                let mut terms = (0..grid.num_employees())
                    .map(|employee| indicator(&grid, employee, day, kind).map(|v| (1, v)))
                    .collect::<Result<Vec<_>, _>>()?;
                terms.push((-1, surplus));
                model.add(ConstraintKind::Surplus, terms, Comparison::Equal, required);

                surpluses.push(surplus);
                total_upper += upper;
            }
        }

        let total = model.new_variable(0, total_upper);
        let mut terms = vec![(1, total)];
        terms.extend(surpluses.into_iter().map(|s| (-1, s)));
        model.add(ConstraintKind::ObjectiveTotal, terms, Comparison::Equal, 0);
        model.objective = Some(total);
        Ok(())
    }
}

/// Builds the feasibility model for `config`.
pub fn build(config: &ScheduleConfig) -> Result<ConstraintModel, ModelError> {
    ModelBuilder::new(config).build()
}

fn indicator(
    grid: &ShiftGrid,
    employee: usize,
    day: usize,
    kind: ShiftKind,
) -> Result<VarId, ModelError> {
    grid.var(employee, day, kind)
        .ok_or(ModelError::IndexOutOfRange {
            employee,
            day,
            shift: kind,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(employees: usize, days: usize, cap: usize) -> ScheduleConfig {
        ScheduleConfig::builder(employees, days)
            .max_consecutive_work_days(cap)
            .require_daily(ShiftKind::Day, 1)
            .require_daily(ShiftKind::Night, 1)
            .holidays([(0, 0), (1, 2)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_grid_layout_is_dense_and_unique() {
        let grid = ShiftGrid::new(3, 4);
        let mut seen = std::collections::HashSet::new();
        for e in 0..3 {
            for d in 0..4 {
                for kind in ShiftKind::ALL {
                    let var = grid.var(e, d, kind).unwrap();
                    assert!(var.index() < grid.len());
                    assert!(seen.insert(var));
                }
            }
        }
        assert_eq!(seen.len(), grid.len());
        assert_eq!(grid.var(3, 0, ShiftKind::Day), None);
        assert_eq!(grid.var(0, 4, ShiftKind::Day), None);
    }

    #[test]
    fn test_grid_arithmetic_does_not_overflow() {
        let grid = ShiftGrid::new(usize::MAX / 2, 3);
        assert_eq!(grid.checked_len(), None);
        assert_eq!(grid.len(), usize::MAX);
        assert_eq!(grid.var(usize::MAX / 2 - 1, 2, ShiftKind::Night), None);

        assert_eq!(ShiftGrid::new(3, 4).checked_len(), Some(36));
    }

    #[test]
    fn test_constraint_counts() {
        let model = build(&config(3, 5, 3)).unwrap();

        assert_eq!(model.variable_count(), 45);
        assert_eq!(model.objective(), None);
        assert_eq!(model.count_of(ConstraintKind::ExactlyOneShift), 15);
        assert_eq!(model.count_of(ConstraintKind::PersonnelFloor), 10);
        assert_eq!(model.count_of(ConstraintKind::HolidayLock), 2);
        // 3 employees × (5 − 1) day transitions
        assert_eq!(model.count_of(ConstraintKind::NightRest), 12);
        // windows of 4 days: starts 0 and 1
        assert_eq!(model.count_of(ConstraintKind::ConsecutiveWorkCap), 6);
        assert_eq!(model.count_of(ConstraintKind::Surplus), 0);
    }

    #[test]
    fn test_no_windows_when_cap_covers_horizon() {
        let model = build(&config(2, 3, 3)).unwrap();
        assert_eq!(model.count_of(ConstraintKind::ConsecutiveWorkCap), 0);

        let model = build(&config(2, 3, 2)).unwrap();
        assert_eq!(model.count_of(ConstraintKind::ConsecutiveWorkCap), 2);
    }

    #[test]
    fn test_single_day_has_no_night_rest() {
        let config = ScheduleConfig::builder(2, 1).build().unwrap();
        let model = build(&config).unwrap();
        assert_eq!(model.count_of(ConstraintKind::NightRest), 0);
    }

    #[test]
    fn test_zero_floor_adds_nothing() {
        let config = ScheduleConfig::builder(2, 2)
            .require(0, ShiftKind::Day, 0)
            .require(1, ShiftKind::Night, 2)
            .build()
            .unwrap();
        let model = build(&config).unwrap();
        let floors: Vec<_> = model
            .constraints()
            .iter()
            .filter(|c| c.kind == ConstraintKind::PersonnelFloor)
            .collect();
        assert_eq!(floors.len(), 1);
        assert_eq!(floors[0].rhs, 2);
        assert_eq!(floors[0].comparison, Comparison::GreaterOrEqual);
        assert_eq!(floors[0].terms.len(), 2);
    }

    #[test]
    fn test_holiday_lock_targets_off_indicator() {
        let config = config(3, 5, 3);
        let model = build(&config).unwrap();
        let grid = model.grid();
        let locked: Vec<VarId> = model
            .constraints()
            .iter()
            .filter(|c| c.kind == ConstraintKind::HolidayLock)
            .map(|c| c.terms[0].1)
            .collect();
        assert!(locked.contains(&grid.var(0, 0, ShiftKind::Off).unwrap()));
        assert!(locked.contains(&grid.var(1, 2, ShiftKind::Off).unwrap()));
    }

    #[test]
    fn test_night_rest_links_consecutive_days() {
        let config = ScheduleConfig::builder(1, 2).build().unwrap();
        let model = build(&config).unwrap();
        let grid = model.grid();
        let rest = model
            .constraints()
            .iter()
            .find(|c| c.kind == ConstraintKind::NightRest)
            .unwrap();
        assert_eq!(
            rest.terms,
            vec![
                (1, grid.var(0, 0, ShiftKind::Night).unwrap()),
                (-1, grid.var(0, 1, ShiftKind::Off).unwrap()),
            ]
        );
        assert_eq!(rest.comparison, Comparison::LessOrEqual);
    }

    #[test]
    fn test_overstaffing_objective_is_additive() {
        let config = config(3, 5, 3);
        let plain = build(&config).unwrap();
        let with_objective = ModelBuilder::new(&config)
            .with_objective(Objective::MinimiseOverstaffing)
            .build()
            .unwrap();

        // Hard rules are identical.
        assert_eq!(
            &with_objective.constraints()[..plain.constraint_count()],
            plain.constraints()
        );
        assert_eq!(with_objective.count_of(ConstraintKind::Surplus), 10);
        assert_eq!(with_objective.count_of(ConstraintKind::ObjectiveTotal), 1);
        // 10 surplus variables plus the total
        assert_eq!(with_objective.variable_count(), plain.variable_count() + 11);

        let total = with_objective.objective().unwrap();
        let domain = with_objective.domains()[total.index()];
        assert_eq!(domain, Domain { lower: 0, upper: 20 });
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = config(4, 6, 2);
        let a = build(&config).unwrap();
        let b = build(&config).unwrap();
        assert_eq!(a.constraints(), b.constraints());
        assert_eq!(a.domains(), b.domains());
    }
}
