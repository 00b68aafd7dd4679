use proptest::prelude::*;
use worldline_math::*;

// Golden test: the textbook hyperbolic worldline at α = 1, τ = 1.
#[test]
fn golden_unit_acceleration() {
    let a = Vector3::new(1.0, 0.0, 0.0);
    let s = acceleration_at_proper_time(a, 1.0);
    assert!((s.r.t - 1.0_f64.sinh()).abs() < 1e-12);
    assert!((s.r.x - (1.0_f64.cosh() - 1.0)).abs() < 1e-12);
    assert!((s.v.x - 1.0_f64.tanh()).abs() < 1e-12);
    assert_eq!(s.tau, 1.0);
}

#[test]
fn zero_acceleration_is_rest() {
    let s = acceleration_at_proper_time(Vector3::ZERO, 2.5);
    assert_eq!(s.r, Vector4::new(2.5, 0.0, 0.0, 0.0));
    assert_eq!(s.v, Vector3::ZERO);
}

#[test]
fn coordinate_time_recovers_proper_time() {
    let a = Vector3::new(0.3, 0.0, 0.0);
    let by_tau = acceleration_at_proper_time(a, 2.0);
    let by_t = acceleration_at_coordinate_time(a, by_tau.r.t);
    assert!((by_t.tau - 2.0).abs() < 1e-10);
    assert!((by_t.r.x - by_tau.r.x).abs() < 1e-10);
}

// Boosted solver, parallel boost: push a worldline forward by proper time τ,
// convert its endpoint to outer-frame elapsed time, and solve back for τ.
#[test]
fn golden_boosted_solver_round_trip() {
    let a = Vector3::new(1.0, 0.0, 0.0);
    let v = Vector3::new(0.6, 0.0, 0.0);
    let tau = 1.0;
    let local = acceleration_at_proper_time(a, tau);
    let g = gamma(v.norm()).unwrap();
    let outer_t = g * (local.r.t + v.dot(local.r.spatial()));
    let solved = acceleration_at_coordinate_time_boosted(a, outer_t, v).unwrap();
    assert!((solved.tau - tau).abs() < 1e-10);
}

#[test]
fn boosted_solver_special_cases() {
    let a = Vector3::new(0.5, 0.0, 0.0);
    // v = 0 reduces to the simple coordinate-time form.
    let simple = acceleration_at_coordinate_time(a, 3.0);
    let via_boosted = acceleration_at_coordinate_time_boosted(a, 3.0, Vector3::ZERO).unwrap();
    assert_eq!(simple, via_boosted);
    // a = 0 reduces to pure time dilation.
    let v = Vector3::new(0.8, 0.0, 0.0);
    let inertial = acceleration_at_coordinate_time_boosted(Vector3::ZERO, 5.0, v).unwrap();
    assert!((inertial.tau - 5.0 * 0.6).abs() < 1e-12);
    assert_eq!(inertial.v, Vector3::ZERO);
}

proptest! {
    // Proper-time and coordinate-time parameterisations are mutual inverses.
    #[test]
    fn prop_parameterisations_invert(
        alpha in 0.05_f64..2.0,
        tau in 0.01_f64..5.0,
    ) {
        let a = Vector3::new(alpha, 0.0, 0.0);
        let by_tau = acceleration_at_proper_time(a, tau);
        let by_t = acceleration_at_coordinate_time(a, by_tau.r.t);
        prop_assert!((by_t.tau - tau).abs() < 1e-8);
    }

    // The boosted solver inverts the forward map for any boost with a
    // component along (or against) the acceleration axis.
    #[test]
    fn prop_boosted_solver_inverts(
        alpha in 0.05_f64..2.0,
        tau in 0.01_f64..3.0,
        w in -0.9_f64..0.9,
    ) {
        let a = Vector3::new(alpha, 0.0, 0.0);
        let v = Vector3::new(w, 0.0, 0.0);
        let local = acceleration_at_proper_time(a, tau);
        let g = gamma(v.norm()).unwrap();
        let outer_t = g * (local.r.t + v.dot(local.r.spatial()));
        let solved = acceleration_at_coordinate_time_boosted(a, outer_t, v).unwrap();
        prop_assert!((solved.tau - tau).abs() < 1e-6);
    }

    // The worldline never reaches light speed.
    #[test]
    fn prop_speed_stays_subluminal(alpha in 0.05_f64..2.0, tau in 0.0_f64..20.0) {
        let a = Vector3::new(0.0, alpha, 0.0);
        let s = acceleration_at_proper_time(a, tau);
        prop_assert!(s.v.norm() < 1.0);
    }
}
