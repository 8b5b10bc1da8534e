use serde::{Deserialize, Serialize};

use super::params::{EpiInputs, PopulationSnapshot, RateConstants};
use crate::error::EpiError;
use crate::math::ode::{euler_step, rkf45_integrate};

// Compartment indices within a state row.
// Susceptible is never stored; it is derived as max(N - sum(row), 0).
pub const EXPOSED: usize = 0;
pub const INFECTED_MILD: usize = 1;
pub const INFECTED_HOSPITALIZED: usize = 2;
pub const INFECTED_CRITICAL: usize = 3;
pub const RECOVERED: usize = 4;
pub const DECEASED: usize = 5;
pub const ASYMPTOMATIC: usize = 6;

/// State-vector layout. `Six` is the classic layout without an
/// asymptomatic slot; `Seven` reserves one (its derivative is pinned
/// to zero in the present model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompartmentLayout {
    Six,
    Seven,
}

impl CompartmentLayout {
    pub fn len(&self) -> usize {
        match self {
            CompartmentLayout::Six => 6,
            CompartmentLayout::Seven => 7,
        }
    }
}

/// How the trajectory is advanced from one day to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStrategy {
    /// Explicit one-day update: `state[t+1] = state[t] + deriv(state[t])`.
    /// First-order but deterministic and faithful to the daily inputs.
    FixedDaily,
    /// Adaptive RKF45 over continuous time, sampled at day boundaries.
    /// Needed when rates are large relative to one day.
    Adaptive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeirConfig {
    /// Number of daily rows produced, including day 0.
    pub horizon_days: usize,
    pub layout: CompartmentLayout,
    pub strategy: StepStrategy,
    /// Adaptive-controller knobs; unused under `FixedDaily`.
    pub rtol: f64,
    pub atol: f64,
    pub min_step: f64,
}

impl Default for SeirConfig {
    fn default() -> Self {
        Self {
            horizon_days: 365,
            layout: CompartmentLayout::Seven,
            strategy: StepStrategy::FixedDaily,
            rtol: 1e-6,
            atol: 1e-6,
            min_step: 1e-6,
        }
    }
}

/// Daily compartment counts for one simulated region, row 0 being the
/// initial condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub layout: CompartmentLayout,
    pub states: Vec<Vec<f64>>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn day(&self, d: usize) -> &[f64] {
        &self.states[d]
    }

    /// Susceptible count on day `d`, floored at zero.
    pub fn susceptible(&self, n: f64, d: usize) -> f64 {
        (n - self.states[d].iter().sum::<f64>()).max(0.0)
    }
}

/// The compartment model for one region: rate constants plus the flow
/// function and integrator that produce a daily trajectory.
#[derive(Debug)]
pub struct SeirModel {
    pub cfg: SeirConfig,
    pub inputs: EpiInputs,
    pub rates: RateConstants,
    pub n: f64,
}

impl SeirModel {
    /// Build a model, deriving the rate-constant bundle from `inputs`.
    pub fn new(cfg: SeirConfig, inputs: EpiInputs, n: f64) -> Result<Self, EpiError> {
        if cfg.horizon_days == 0 {
            return Err(EpiError::InvalidParameter {
                name: "horizon_days",
                value: 0.0,
            });
        }
        let rates = RateConstants::derive(&inputs, n)?;
        Ok(Self {
            cfg,
            inputs,
            rates,
            n,
        })
    }

    /// Swap in a pre-built (e.g. calibrated) rate-constant bundle.
    pub fn with_rates(mut self, rates: RateConstants) -> Self {
        self.rates = rates;
        self
    }

    /// Instantaneous derivatives of every compartment.
    ///
    /// Pure and re-entrant: the adaptive integrator evaluates this at
    /// sub-step points. Non-negativity is enforced here rather than
    /// assumed of the state: compartment reads are floored at zero,
    /// new exposures are capped at the susceptible pool, and the
    /// recovery flow is capped at the currently infected total.
    pub fn deriv(&self, _t: f64, y: &[f64], dy: &mut [f64]) {
        let r = &self.rates;
        let s = (self.n - y.iter().sum::<f64>()).max(0.0);

        let e = y[EXPOSED].max(0.0);
        let i1 = y[INFECTED_MILD].max(0.0);
        let i2 = y[INFECTED_HOSPITALIZED].max(0.0);
        let i3 = y[INFECTED_CRITICAL].max(0.0);
        let i_sum = i1 + i2 + i3;

        let exposures = (r.beta.dot(i1, i2, i3) * s).min(s);

        dy[EXPOSED] = exposures - r.alpha * e;
        dy[INFECTED_MILD] = r.alpha * e - (r.gamma.mild + r.rho.mild) * i1;
        dy[INFECTED_HOSPITALIZED] =
            r.rho.mild * i1 - (r.gamma.hospitalized + r.rho.hospitalized) * i2;
        dy[INFECTED_CRITICAL] = r.rho.hospitalized * i2 - (r.gamma.critical + r.mu) * i3;
        dy[RECOVERED] = r.gamma.dot(i1, i2, i3).min(i_sum);
        // Terminal compartment: inflow only.
        dy[DECEASED] = r.mu * i3;
        if self.cfg.layout == CompartmentLayout::Seven {
            // Reserved extension point, no dynamics yet.
            dy[ASYMPTOMATIC] = 0.0;
        }
    }

    /// Build the day-0 state row from a population snapshot.
    ///
    /// When the snapshot does not carry a severity split, the split is
    /// reconstructed from the aggregate infected count with the
    /// sparse-data heuristic of the source model: a quarter of reported
    /// infections are in hospital, mild and critical follow from the
    /// hospitalization and critical-care rates. Counts are truncated to
    /// whole individuals, as upstream reporting is integral.
    pub fn initial_state(&self, pop: &PopulationSnapshot) -> Vec<f64> {
        let (mild, hospitalized, critical) = if pop.infected_hospitalized.is_some() {
            (
                pop.infected_mild.unwrap_or(pop.infected),
                pop.infected_hospitalized.unwrap_or(0.0),
                pop.infected_critical.unwrap_or(0.0),
            )
        } else {
            let hospitalized = pop.infected / 4.0;
            let mild = hospitalized / self.inputs.hospitalization_rate;
            let critical = hospitalized * self.inputs.hospitalized_cases_requiring_icu_care;
            (mild, hospitalized, critical)
        };

        let exposed = pop
            .exposed
            .unwrap_or(self.inputs.exposed_infected_ratio * mild);

        let mut y = vec![0.0; self.cfg.layout.len()];
        y[EXPOSED] = exposed.trunc();
        y[INFECTED_MILD] = mild.trunc();
        y[INFECTED_HOSPITALIZED] = hospitalized.trunc();
        y[INFECTED_CRITICAL] = critical.trunc();
        y[RECOVERED] = pop.recovered.trunc();
        y[DECEASED] = pop.deaths.trunc();
        if self.cfg.layout == CompartmentLayout::Seven {
            y[ASYMPTOMATIC] = pop.asymptomatic.unwrap_or(0.0).trunc();
        }
        y
    }

    /// Integrate the model over the configured horizon, returning one
    /// state row per day. Integration failure under the adaptive
    /// strategy is fatal and surfaced as-is.
    pub fn simulate(&self, pop: &PopulationSnapshot) -> Result<Trajectory, EpiError> {
        let mut y = self.initial_state(pop);
        let mut states = Vec::with_capacity(self.cfg.horizon_days);
        states.push(y.clone());

        for day in 1..self.cfg.horizon_days {
            let t0 = (day - 1) as f64;
            match self.cfg.strategy {
                StepStrategy::FixedDaily => {
                    euler_step(&mut y, t0, 1.0, |t, y, dy| self.deriv(t, y, dy));
                }
                StepStrategy::Adaptive => {
                    rkf45_integrate(
                        &mut y,
                        t0,
                        day as f64,
                        self.cfg.rtol,
                        self.cfg.atol,
                        self.cfg.min_step,
                        |t, y, dy| self.deriv(t, y, dy),
                    )?;
                }
            }
            states.push(y.clone());
        }

        Ok(Trajectory {
            layout: self.cfg.layout,
            states,
        })
    }
}
