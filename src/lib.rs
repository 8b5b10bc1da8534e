pub mod calibration;
pub mod error;
pub mod math;
pub mod model;

pub use calibration::{basic_reproduction_number, calibrate_to_r0};
pub use error::EpiError;
pub use model::params::{
    EpiInputs, PopulationSnapshot, ProgressionRates, RateConstants, StageRates,
};
pub use model::seir::{CompartmentLayout, SeirConfig, SeirModel, StepStrategy, Trajectory};
