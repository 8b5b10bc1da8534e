use anyhow::Context;
use serde_json::json;

use talus_seir::model::seir::{
    DECEASED, EXPOSED, INFECTED_CRITICAL, INFECTED_HOSPITALIZED, INFECTED_MILD, RECOVERED,
};
use talus_seir::{
    basic_reproduction_number, calibrate_to_r0, EpiInputs, PopulationSnapshot, SeirConfig,
    SeirModel, StepStrategy,
};

fn main() -> anyhow::Result<()> {
    // Single-region demo scenario; replace with caller-supplied data in
    // real runs.
    let inputs = EpiInputs {
        hospitalization_rate: 0.2,
        hospitalized_cases_requiring_icu_care: 0.3,
        case_fatality_rate: 0.02,
        duration_mild_infections: 7.0,
        hospital_time_recovery: 10.0,
        icu_time_death: 8.0,
        presymptomatic_period: 3.0,
        beta: 0.35,
        beta_hospitalized: 0.0,
        beta_icu: 0.0,
        exposed_infected_ratio: 1.0,
        frac_infected_symptomatic: 0.7,
    };

    let pop = PopulationSnapshot {
        total: 1_000_000.0,
        infected: 100.0,
        ..Default::default()
    };

    let cfg = SeirConfig {
        strategy: StepStrategy::FixedDaily,
        ..Default::default()
    };

    let model = SeirModel::new(cfg, inputs, pop.total).context("model setup failed")?;

    let r0 = basic_reproduction_number(&model.rates, model.n)?;
    eprintln!("derived R0 = {:.4}", r0);

    // Pin the scenario to a target R0 before projecting.
    let target_r0 = 2.4;
    let calibrated = calibrate_to_r0(&model.rates, target_r0, r0, model.n)
        .context("calibration failed")?;
    let model = model.with_rates(calibrated);
    eprintln!(
        "calibrated R0 = {:.4}",
        basic_reproduction_number(&model.rates, model.n)?
    );

    let traj = model.simulate(&pop).context("simulation failed")?;

    // One JSON line per week of the projection.
    for (day, row) in traj.states.iter().enumerate() {
        if day % 7 != 0 {
            continue;
        }
        println!(
            "{}",
            json!({
                "day": day,
                "susceptible": traj.susceptible(model.n, day).round(),
                "exposed": row[EXPOSED].round(),
                "infected_mild": row[INFECTED_MILD].round(),
                "hospitalized": row[INFECTED_HOSPITALIZED].round(),
                "critical": row[INFECTED_CRITICAL].round(),
                "recovered": row[RECOVERED].round(),
                "deceased": row[DECEASED].round(),
            })
        );
    }

    Ok(())
}
