//! Basic reproduction number and the transmission-rate calibration
//! search that matches it to an external target.

use crate::error::EpiError;
use crate::model::params::RateConstants;

/// Initial perturbation applied to the mild-stage transmission rate.
pub const CALIBRATION_STEP: f64 = 0.00005;

/// Hard bound on search iterations. The step-halving rule is not
/// guaranteed to terminate for pathological rate configurations, so
/// running out of budget is surfaced as a distinct failure.
pub const MAX_CALIBRATION_ITERATIONS: usize = 100_000;

/// Analytic R0: expected secondary infections from one mildly-infected
/// individual, tracing transmission through progressively more severe
/// stages weighted by the probability of reaching each stage.
pub fn basic_reproduction_number(rates: &RateConstants, n: f64) -> Result<f64, EpiError> {
    let exit_mild = rates.rho.mild + rates.gamma.mild;
    let exit_hospitalized = rates.rho.hospitalized + rates.gamma.hospitalized;
    let exit_critical = rates.mu + rates.gamma.critical;

    if exit_mild == 0.0 {
        return Err(EpiError::InvalidParameter {
            name: "rho.mild + gamma.mild",
            value: 0.0,
        });
    }
    if exit_hospitalized == 0.0 {
        return Err(EpiError::InvalidParameter {
            name: "rho.hospitalized + gamma.hospitalized",
            value: 0.0,
        });
    }
    if exit_critical == 0.0 {
        return Err(EpiError::InvalidParameter {
            name: "mu + gamma.critical",
            value: 0.0,
        });
    }

    Ok(n * (rates.beta.mild / exit_mild
        + (rates.rho.mild / exit_mild)
            * (rates.beta.hospitalized / exit_hospitalized
                + (rates.rho.hospitalized / exit_hospitalized)
                    * (rates.beta.critical / exit_critical))))
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Adjust `beta.mild` until the computed R0 matches `target_r0` to four
/// decimal places.
///
/// Bracketing search: walk in fixed increments toward the target and,
/// on overshoot (sign flip of the remaining gap relative to the step),
/// halve and reverse the step. An already-converged bundle is returned
/// unchanged without iterating.
pub fn calibrate_to_r0(
    rates: &RateConstants,
    target_r0: f64,
    current_r0: f64,
    n: f64,
) -> Result<RateConstants, EpiError> {
    let mut out = *rates;
    let mut computed = current_r0;

    if round4(computed) == round4(target_r0) {
        return Ok(out);
    }

    let mut step = if target_r0 > current_r0 {
        CALIBRATION_STEP
    } else {
        -CALIBRATION_STEP
    };

    for _ in 0..MAX_CALIBRATION_ITERATIONS {
        out.beta.mild += step;
        computed = basic_reproduction_number(&out, n)?;

        if round4(computed) == round4(target_r0) {
            return Ok(out);
        }

        // Sign flip of the remaining gap means we overshot: turn
        // around with half the step.
        if (target_r0 - computed) * step < 0.0 {
            step = -step / 2.0;
        }
    }

    Err(EpiError::CalibrationDidNotConverge {
        iterations: MAX_CALIBRATION_ITERATIONS,
        target: target_r0,
        achieved: computed,
    })
}
