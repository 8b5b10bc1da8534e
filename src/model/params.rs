use serde::{Deserialize, Serialize};

use crate::error::EpiError;

/// Raw epidemiological measurements for one scenario.
///
/// All rates are per day; durations are in days. Supplied by the caller
/// (typically an upstream data layer) and never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpiInputs {
    /// Fraction of symptomatic cases that are hospitalized.
    pub hospitalization_rate: f64,
    /// Fraction of hospitalized cases that need critical care.
    pub hospitalized_cases_requiring_icu_care: f64,
    pub case_fatality_rate: f64,
    /// Mean length of a mild infection, days.
    pub duration_mild_infections: f64,
    /// Mean days from hospitalization to recovery.
    pub hospital_time_recovery: f64,
    /// Mean days from critical care to death.
    pub icu_time_death: f64,
    /// Mean days between exposure and symptom onset.
    pub presymptomatic_period: f64,
    /// Base transmission rate (mild, community).
    pub beta: f64,
    /// Transmission rate while hospitalized. Zero in the base model;
    /// the slot stays configurable for scenario variation.
    pub beta_hospitalized: f64,
    /// Transmission rate while in critical care.
    pub beta_icu: f64,
    /// Ratio of exposed to mildly-infected at simulation start.
    pub exposed_infected_ratio: f64,
    /// Fraction of infected individuals who show symptoms.
    pub frac_infected_symptomatic: f64,
}

impl EpiInputs {
    /// Reject inputs that would produce division faults downstream.
    pub fn check(&self) -> Result<(), EpiError> {
        let durations = [
            ("duration_mild_infections", self.duration_mild_infections),
            ("hospital_time_recovery", self.hospital_time_recovery),
            ("icu_time_death", self.icu_time_death),
            ("presymptomatic_period", self.presymptomatic_period),
        ];
        for (name, value) in durations {
            if value <= 0.0 {
                return Err(EpiError::InvalidParameter { name, value });
            }
        }
        if self.hospitalization_rate <= 0.0 {
            return Err(EpiError::InvalidParameter {
                name: "hospitalization_rate",
                value: self.hospitalization_rate,
            });
        }
        if self.hospitalized_cases_requiring_icu_care <= 0.0 {
            return Err(EpiError::InvalidParameter {
                name: "hospitalized_cases_requiring_icu_care",
                value: self.hospitalized_cases_requiring_icu_care,
            });
        }
        Ok(())
    }
}

/// Initial population counts for one region.
///
/// Mirrors the upstream per-region dictionary: only `total` and
/// `infected` are always known; the severity split and the exposed
/// count are present only once a region starts reporting them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub total: f64,
    #[serde(default)]
    pub exposed: Option<f64>,
    pub infected: f64,
    #[serde(default)]
    pub infected_mild: Option<f64>,
    #[serde(default)]
    pub infected_hospitalized: Option<f64>,
    #[serde(default)]
    pub infected_critical: Option<f64>,
    #[serde(default)]
    pub recovered: f64,
    #[serde(default)]
    pub deaths: f64,
    #[serde(default)]
    pub asymptomatic: Option<f64>,
}

impl PopulationSnapshot {
    /// The fixed validation scenario from the Harvard reference model:
    /// 1000 individuals, a single exposed case, nothing else seeded.
    pub fn harvard_reference() -> Self {
        Self {
            total: 1000.0,
            exposed: Some(1.0),
            infected: 0.0,
            infected_mild: Some(0.0),
            infected_hospitalized: Some(0.0),
            infected_critical: Some(0.0),
            recovered: 0.0,
            deaths: 0.0,
            asymptomatic: Some(0.0),
        }
    }
}

/// One rate per infection severity stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageRates {
    pub mild: f64,
    pub hospitalized: f64,
    pub critical: f64,
}

impl StageRates {
    /// Dot product against the three infected compartments.
    pub fn dot(&self, i1: f64, i2: f64, i3: f64) -> f64 {
        self.mild * i1 + self.hospitalized * i2 + self.critical * i3
    }
}

/// Progression into the next more severe stage. There is no slot for
/// critical: exits from critical care are recovery or death.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRates {
    pub mild: f64,
    pub hospitalized: f64,
}

/// The derived rate-constant bundle the ODE runs on.
///
/// Named fields replace the index-aligned vectors of the source model
/// (which padded index 0 so rates lined up with compartment numbers);
/// the quantities are identical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConstants {
    /// Progression rate out of exposed.
    pub alpha: f64,
    /// Transmission rates, already normalized by total population.
    pub beta: StageRates,
    /// Recovery rates per stage.
    pub gamma: StageRates,
    /// Progression rates to the next stage.
    pub rho: ProgressionRates,
    /// Mortality rate out of critical care.
    pub mu: f64,
    /// Fraction of infected who are symptomatic, carried unchanged.
    pub symptomatic_fraction: f64,
}

impl RateConstants {
    /// Derive the bundle from raw inputs and total population `n`.
    ///
    /// The steps are ordered: later constants depend on earlier ones.
    pub fn derive(inputs: &EpiInputs, n: f64) -> Result<Self, EpiError> {
        inputs.check()?;
        if n <= 0.0 {
            return Err(EpiError::InvalidParameter {
                name: "population",
                value: n,
            });
        }

        let fraction_critical =
            inputs.hospitalization_rate * inputs.hospitalized_cases_requiring_icu_care;
        let fraction_severe = inputs.hospitalization_rate - fraction_critical;

        let alpha = 1.0 / inputs.presymptomatic_period;

        // Transmission normalized by population so that
        // contact-rate x susceptible-fraction semantics hold.
        let beta = StageRates {
            mild: inputs.beta / n,
            hospitalized: inputs.beta_hospitalized / n,
            critical: inputs.beta_icu / n,
        };

        let gamma_mild =
            (1.0 / inputs.duration_mild_infections) * (1.0 - inputs.hospitalization_rate);
        let rho_mild = (1.0 / inputs.duration_mild_infections) - gamma_mild;

        let rho_hospitalized =
            (1.0 / inputs.hospital_time_recovery) * (fraction_severe + fraction_critical);
        let gamma_hospitalized = (1.0 / inputs.hospital_time_recovery) - rho_hospitalized;

        // fraction_critical > 0 was established by check() above
        let mu = (1.0 / inputs.icu_time_death) * (inputs.case_fatality_rate / fraction_critical);
        let gamma_critical = (1.0 / inputs.icu_time_death) - mu;

        Ok(Self {
            alpha,
            beta,
            gamma: StageRates {
                mild: gamma_mild,
                hospitalized: gamma_hospitalized,
                critical: gamma_critical,
            },
            rho: ProgressionRates {
                mild: rho_mild,
                hospitalized: rho_hospitalized,
            },
            mu,
            symptomatic_fraction: inputs.frac_infected_symptomatic,
        })
    }

    /// The two intermediate fractions of the derivation, occasionally
    /// useful for reporting.
    pub fn severity_fractions(inputs: &EpiInputs) -> (f64, f64) {
        let critical =
            inputs.hospitalization_rate * inputs.hospitalized_cases_requiring_icu_care;
        (inputs.hospitalization_rate - critical, critical)
    }
}
