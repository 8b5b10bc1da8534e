use talus_seir::model::seir::{
    ASYMPTOMATIC, DECEASED, EXPOSED, INFECTED_CRITICAL, INFECTED_HOSPITALIZED, INFECTED_MILD,
    RECOVERED,
};
use talus_seir::{
    CompartmentLayout, EpiError, EpiInputs, PopulationSnapshot, RateConstants, SeirConfig,
    SeirModel, StepStrategy,
};

fn inputs() -> EpiInputs {
    EpiInputs {
        hospitalization_rate: 0.2,
        hospitalized_cases_requiring_icu_care: 0.3,
        case_fatality_rate: 0.02,
        duration_mild_infections: 7.0,
        hospital_time_recovery: 10.0,
        icu_time_death: 8.0,
        presymptomatic_period: 3.0,
        beta: 0.5,
        beta_hospitalized: 0.0,
        beta_icu: 0.0,
        exposed_infected_ratio: 1.0,
        frac_infected_symptomatic: 0.7,
    }
}

fn town() -> PopulationSnapshot {
    PopulationSnapshot {
        total: 1000.0,
        infected: 10.0,
        ..Default::default()
    }
}

fn model(strategy: StepStrategy) -> SeirModel {
    let cfg = SeirConfig {
        strategy,
        ..Default::default()
    };
    SeirModel::new(cfg, inputs(), 1000.0).unwrap()
}

#[test]
fn derivation_matches_hand_computation() {
    let (severe, critical) = RateConstants::severity_fractions(&inputs());
    assert!((critical - 0.06).abs() < 1e-12);
    assert!((severe - 0.14).abs() < 1e-12);

    let r = RateConstants::derive(&inputs(), 1000.0).unwrap();
    assert!((r.alpha - 1.0 / 3.0).abs() < 1e-4);
    assert!((r.gamma.mild - 0.11428571428571428).abs() < 1e-12);
    assert!((r.rho.mild - 0.028571428571428567).abs() < 1e-12);
    assert!((r.rho.hospitalized - 0.02).abs() < 1e-12);
    assert!((r.gamma.hospitalized - 0.08).abs() < 1e-12);
    assert!((r.mu - 0.04166666666666667).abs() < 1e-12);
    assert!((r.gamma.critical - 0.08333333333333333).abs() < 1e-12);
    assert!((r.beta.mild - 0.0005).abs() < 1e-15);
    assert_eq!(r.symptomatic_fraction, 0.7);
}

#[test]
fn derivation_is_deterministic() {
    let a = RateConstants::derive(&inputs(), 1000.0).unwrap();
    let b = RateConstants::derive(&inputs(), 1000.0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn trajectory_has_horizon_rows_and_day0_matches_seeding() {
    let traj = model(StepStrategy::FixedDaily).simulate(&town()).unwrap();
    assert_eq!(traj.len(), 365);

    // infected=10 => hospitalized 10/4 = 2.5, mild 2.5/0.2 = 12.5,
    // critical 2.5*0.3 = 0.75, exposed 1.0*12.5 = 12.5, all truncated.
    let day0 = traj.day(0);
    assert_eq!(day0[EXPOSED], 12.0);
    assert_eq!(day0[INFECTED_MILD], 12.0);
    assert_eq!(day0[INFECTED_HOSPITALIZED], 2.0);
    assert_eq!(day0[INFECTED_CRITICAL], 0.0);
    assert_eq!(day0[RECOVERED], 0.0);
    assert_eq!(day0[DECEASED], 0.0);
    assert_eq!(day0[ASYMPTOMATIC], 0.0);
}

#[test]
fn compartments_and_susceptible_stay_non_negative() {
    for strategy in [StepStrategy::FixedDaily, StepStrategy::Adaptive] {
        let m = model(strategy);
        let traj = m.simulate(&town()).unwrap();
        for (day, row) in traj.states.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                assert!(*v >= 0.0, "day {day} compartment {c} went negative: {v}");
            }
            let s = m.n - row.iter().sum::<f64>();
            assert!(s >= -1e-9, "day {day} susceptible went negative: {s}");
        }
    }
}

#[test]
fn deceased_is_monotone_non_decreasing() {
    for strategy in [StepStrategy::FixedDaily, StepStrategy::Adaptive] {
        let traj = model(strategy).simulate(&town()).unwrap();
        for w in traj.states.windows(2) {
            assert!(w[1][DECEASED] >= w[0][DECEASED] - 1e-9);
        }
    }
}

#[test]
fn adaptive_matches_fixed_step_epidemic_size() {
    let fixed = model(StepStrategy::FixedDaily).simulate(&town()).unwrap();
    let adaptive = model(StepStrategy::Adaptive).simulate(&town()).unwrap();

    assert_eq!(fixed.day(0), adaptive.day(0));

    // First-order vs fifth-order integration: same epidemic, small
    // discretization gap.
    let d_fixed = fixed.day(364)[DECEASED];
    let d_adaptive = adaptive.day(364)[DECEASED];
    assert!(d_fixed > 0.0 && d_adaptive > 0.0);
    assert!(
        (d_fixed - d_adaptive).abs() / d_fixed < 0.05,
        "fixed {d_fixed} vs adaptive {d_adaptive}"
    );
}

#[test]
fn harvard_reference_scenario_burns_through() {
    let m = model(StepStrategy::FixedDaily);
    let traj = m.simulate(&PopulationSnapshot::harvard_reference()).unwrap();

    assert_eq!(traj.len(), 365);
    let day0 = traj.day(0);
    assert_eq!(day0[EXPOSED], 1.0);
    assert_eq!(day0.iter().sum::<f64>(), 1.0);

    // A single exposed case in 1000 people with R0 = 3.5 runs its
    // course within a year.
    let last = traj.day(364);
    assert!(last[DECEASED] > 12.0 && last[DECEASED] < 14.0);
    assert!(last[RECOVERED] > 900.0);
}

#[test]
fn six_compartment_layout_matches_seven() {
    let cfg6 = SeirConfig {
        layout: CompartmentLayout::Six,
        ..Default::default()
    };
    let m6 = SeirModel::new(cfg6, inputs(), 1000.0).unwrap();
    let m7 = model(StepStrategy::FixedDaily);

    let t6 = m6.simulate(&town()).unwrap();
    let t7 = m7.simulate(&town()).unwrap();

    assert_eq!(t6.day(0).len(), 6);
    assert_eq!(t7.day(0).len(), 7);
    // With a zero asymptomatic seed the layouts are numerically
    // identical in the shared compartments.
    for day in 0..365 {
        assert_eq!(t6.day(day), &t7.day(day)[..6]);
    }
}

#[test]
fn zero_horizon_is_rejected() {
    let cfg = SeirConfig {
        horizon_days: 0,
        ..Default::default()
    };
    let err = SeirModel::new(cfg, inputs(), 1000.0).unwrap_err();
    assert!(matches!(
        err,
        EpiError::InvalidParameter {
            name: "horizon_days",
            ..
        }
    ));
}

#[test]
fn daily_summary_snapshot() {
    let cfg = SeirConfig {
        horizon_days: 12,
        ..Default::default()
    };
    let m = SeirModel::new(cfg, inputs(), 1000.0).unwrap();
    let traj = m.simulate(&town()).unwrap();

    let mut summary =
        String::from("day,exposed,mild,hospitalized,critical,recovered,deceased,susceptible\n");
    for (day, row) in traj.states.iter().enumerate() {
        summary.push_str(&format!(
            "{},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}\n",
            day,
            row[EXPOSED],
            row[INFECTED_MILD],
            row[INFECTED_HOSPITALIZED],
            row[INFECTED_CRITICAL],
            row[RECOVERED],
            row[DECEASED],
            traj.susceptible(m.n, day),
        ));
    }
    insta::assert_snapshot!(summary);
}
