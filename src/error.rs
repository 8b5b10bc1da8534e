use thiserror::Error;

/// Failures surfaced by the projection core.
///
/// Every variant carries the offending name/value so a bad run can be
/// diagnosed from the error alone, without re-running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EpiError {
    /// A zero or negative duration/rate that would produce a division
    /// fault in rate derivation or the R0 calculation.
    #[error("invalid parameter `{name}` = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The adaptive integrator could not reach the next day boundary:
    /// the step controller shrank below its floor. Fatal, no retry.
    #[error("integration diverged at t = {t} days (step fell below {min_step})")]
    IntegrationDiverged { t: f64, min_step: f64 },

    /// The beta search ran out of iterations before the computed R0
    /// matched the target to four decimal places.
    #[error(
        "calibration did not converge after {iterations} iterations \
         (target R0 = {target}, last computed = {achieved})"
    )]
    CalibrationDidNotConverge {
        iterations: usize,
        target: f64,
        achieved: f64,
    },
}
