use crate::error::EpiError;

/// Single explicit Euler step: `y += dt * f(t, y)`.
/// First-order, but matches the daily-resolution update the
/// compartment model was specified with.
pub fn euler_step<F>(y: &mut [f64], t: f64, dt: f64, mut f: F)
where
    F: FnMut(f64, &[f64], &mut [f64]),
{
    let n = y.len();
    let mut dy = vec![0.0; n];
    f(t, y, &mut dy);
    for i in 0..n {
        y[i] += dt * dy[i];
    }
}

/// Adaptive Runge-Kutta-Fehlberg 4(5) driver.
///
/// Integrates `y` in place from `t0` to `t1`, choosing its own internal
/// steps from the embedded error estimate. Returns an error when the
/// step controller shrinks below `min_step` before reaching `t1`.
pub fn rkf45_integrate<F>(
    y: &mut [f64],
    t0: f64,
    t1: f64,
    rtol: f64,
    atol: f64,
    min_step: f64,
    mut f: F,
) -> Result<(), EpiError>
where
    F: FnMut(f64, &[f64], &mut [f64]),
{
    let n = y.len();
    let mut k1 = vec![0.0; n];
    let mut k2 = vec![0.0; n];
    let mut k3 = vec![0.0; n];
    let mut k4 = vec![0.0; n];
    let mut k5 = vec![0.0; n];
    let mut k6 = vec![0.0; n];
    let mut ytmp = vec![0.0; n];
    let mut y5 = vec![0.0; n];

    let mut t = t0;
    let mut h = t1 - t0;

    while t < t1 - 1e-12 {
        if t + h > t1 {
            h = t1 - t;
        }

        f(t, y, &mut k1);

        for i in 0..n {
            ytmp[i] = y[i] + h * (1.0 / 4.0) * k1[i];
        }
        f(t + h / 4.0, &ytmp, &mut k2);

        for i in 0..n {
            ytmp[i] = y[i] + h * (3.0 / 32.0 * k1[i] + 9.0 / 32.0 * k2[i]);
        }
        f(t + 3.0 * h / 8.0, &ytmp, &mut k3);

        for i in 0..n {
            ytmp[i] = y[i]
                + h * (1932.0 / 2197.0 * k1[i] - 7200.0 / 2197.0 * k2[i]
                    + 7296.0 / 2197.0 * k3[i]);
        }
        f(t + 12.0 * h / 13.0, &ytmp, &mut k4);

        for i in 0..n {
            ytmp[i] = y[i]
                + h * (439.0 / 216.0 * k1[i] - 8.0 * k2[i] + 3680.0 / 513.0 * k3[i]
                    - 845.0 / 4104.0 * k4[i]);
        }
        f(t + h, &ytmp, &mut k5);

        for i in 0..n {
            ytmp[i] = y[i]
                + h * (-8.0 / 27.0 * k1[i] + 2.0 * k2[i] - 3544.0 / 2565.0 * k3[i]
                    + 1859.0 / 4104.0 * k4[i]
                    - 11.0 / 40.0 * k5[i]);
        }
        f(t + h / 2.0, &ytmp, &mut k6);

        // 5th-order solution plus the embedded 4th/5th error estimate
        let mut err = 0.0f64;
        for i in 0..n {
            y5[i] = y[i]
                + h * (16.0 / 135.0 * k1[i] + 6656.0 / 12825.0 * k3[i]
                    + 28561.0 / 56430.0 * k4[i]
                    - 9.0 / 50.0 * k5[i]
                    + 2.0 / 55.0 * k6[i]);
            let y4 = y[i]
                + h * (25.0 / 216.0 * k1[i] + 1408.0 / 2565.0 * k3[i]
                    + 2197.0 / 4104.0 * k4[i]
                    - k5[i] / 5.0);
            let scale = atol + rtol * y[i].abs().max(y5[i].abs());
            let local = (y5[i] - y4).abs() / scale;
            // Overflowed stages produce NaN differences; treat them as
            // infinite error so the step is rejected, not accepted.
            if local.is_finite() {
                err = err.max(local);
            } else {
                err = f64::INFINITY;
            }
        }

        if err <= 1.0 {
            t += h;
            y.copy_from_slice(&y5);
        }

        let factor = if err > 0.0 {
            (0.9 * err.powf(-0.2)).clamp(0.2, 5.0)
        } else {
            5.0
        };
        h *= factor;

        if h < min_step && t < t1 - 1e-12 {
            return Err(EpiError::IntegrationDiverged { t, min_step });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // dy/dt = -y, y(0) = 1 => y(t) = exp(-t)
    fn decay(_t: f64, y: &[f64], dy: &mut [f64]) {
        dy[0] = -y[0];
    }

    #[test]
    fn euler_single_decay_step() {
        let mut y = vec![1.0];
        euler_step(&mut y, 0.0, 0.1, decay);
        assert!((y[0] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn rkf45_matches_exponential() {
        let mut y = vec![1.0];
        rkf45_integrate(&mut y, 0.0, 1.0, 1e-8, 1e-10, 1e-10, decay).unwrap();
        assert!((y[0] - (-1.0f64).exp()).abs() < 1e-6);
    }

    #[test]
    fn rkf45_reports_divergence_below_step_floor() {
        // Blow-up ODE with an absurd tolerance forces the controller
        // past the step floor.
        let mut y = vec![1.0];
        let res = rkf45_integrate(&mut y, 0.0, 10.0, 1e-14, 1e-16, 1e-3, |_t, y, dy| {
            dy[0] = y[0] * y[0] * 1e6;
        });
        assert!(matches!(res, Err(EpiError::IntegrationDiverged { .. })));
    }
}
