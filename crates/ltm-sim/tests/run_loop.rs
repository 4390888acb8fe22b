//! Integration tests: full simulation runs.
//!
//! Network: source(const 180) --[R]-- aluminium --[R]-- copper --[R]-- sink(const 20)
//!
//! The chain must relax to the linear conduction profile with both bath
//! temperatures untouched.

use ltm_core::{BodyId, Tolerances, nearly_equal};
use ltm_network::{Body, Exchange, HeatSource, ThermalNetwork};
use ltm_sim::{SimOptions, StepControl, Stepping, run_sim, run_sim_with_observer};

fn heat_chain() -> (ThermalNetwork, [BodyId; 4]) {
    let mut net = ThermalNetwork::new("chain");
    let src = net
        .register_body(Body::constant("source", 180.0).unwrap())
        .unwrap();
    let al = net
        .register_body(Body::dynamic("aluminium", 0.05, 897.0, 23.0).unwrap())
        .unwrap();
    let cu = net
        .register_body(Body::dynamic("copper", 0.05, 385.0, 23.0).unwrap())
        .unwrap();
    let snk = net
        .register_body(Body::constant("sink", 20.0).unwrap())
        .unwrap();
    for (label, a, b) in [("src-al", src, al), ("al-cu", al, cu), ("cu-snk", cu, snk)] {
        net.register_exchange(Exchange::conduction(label, a, b, 0.5).unwrap())
            .unwrap();
    }
    (net, [src, al, cu, snk])
}

#[test]
fn fixed_step_chain_reaches_linear_profile() {
    let (mut net, [src, al, cu, snk]) = heat_chain();
    let opts = SimOptions {
        t_end: 400.0,
        max_steps: 1_000_000,
        record_every: 1000,
        stepping: Stepping::Fixed { dt: 0.01 },
        ..SimOptions::default()
    };
    let rec = run_sim(&mut net, &opts).unwrap();
    assert!(!rec.stopped);
    assert!(rec.t.last().unwrap() >= &400.0);

    let tol = Tolerances { abs: 1e-3, rel: 0.0 };
    assert_eq!(net.temperature(src), Some(180.0));
    assert_eq!(net.temperature(snk), Some(20.0));
    assert!(nearly_equal(net.temperature(al).unwrap(), 180.0 - 160.0 / 3.0, tol));
    assert!(nearly_equal(net.temperature(cu).unwrap(), 20.0 + 160.0 / 3.0, tol));
}

#[test]
fn adaptive_chain_matches_fixed_step_result() {
    let (mut net, [_, al, cu, _]) = heat_chain();
    let opts = SimOptions {
        t_end: 400.0,
        stepping: Stepping::Adaptive {
            max_delta_t: 0.5,
            initial_dt: 0.001,
            min_dt: 1e-4,
            max_dt: 1.0,
        },
        ..SimOptions::default()
    };
    let rec = run_sim(&mut net, &opts).unwrap();
    // far fewer steps than the 40 000 a 10 ms fixed step needs
    assert!(rec.steps < 2_000);

    let tol = Tolerances { abs: 1e-2, rel: 0.0 };
    assert!(nearly_equal(net.temperature(al).unwrap(), 126.6667, tol));
    assert!(nearly_equal(net.temperature(cu).unwrap(), 73.3333, tol));
}

#[test]
fn records_initial_decimated_and_final_states() {
    let (mut net, _) = heat_chain();
    let opts = SimOptions {
        t_end: 0.0105,
        record_every: 4,
        stepping: Stepping::Fixed { dt: 0.001 },
        ..SimOptions::default()
    };
    let rec = run_sim(&mut net, &opts).unwrap();
    assert_eq!(rec.steps, 11);
    // initial + steps 4, 8 + final step 11
    assert_eq!(rec.t.len(), 4);
    assert_eq!(rec.temperatures.len(), 4);
    assert_eq!(rec.temperatures[0][1], 23.0);
    let (t_last, temps) = rec.last().unwrap();
    assert!(nearly_equal(t_last, 0.011, Tolerances::default()));
    assert_eq!(temps, net.temperatures());
}

#[test]
fn observer_can_stop_the_run() {
    let (mut net, _) = heat_chain();
    let mut seen = Vec::new();
    let opts = SimOptions {
        t_end: 10.0,
        stepping: Stepping::Fixed { dt: 0.1 },
        ..SimOptions::default()
    };
    let rec = run_sim_with_observer(&mut net, &opts, |progress, network| {
        seen.push(progress.step);
        assert_eq!(network.body_count(), 4);
        if progress.step == 3 {
            StepControl::Stop
        } else {
            StepControl::Continue
        }
    })
    .unwrap();
    assert!(rec.stopped);
    assert_eq!(rec.steps, 3);
    assert_eq!(seen, vec![1, 2, 3]);
    assert!(!net.is_in_step());
}

#[test]
fn heated_body_with_refresh_warms_up() {
    let mut net = ThermalNetwork::new("heater");
    let cp = ltm_network::PropertyFn::polynomial(vec![100.0, 0.1]).unwrap();
    let w = net
        .register_body(Body::dynamic("wire", 0.01, cp, 20.0).unwrap())
        .unwrap();
    net.register_source(HeatSource::new("power", w, 5.0).unwrap())
        .unwrap();
    let opts = SimOptions {
        t_end: 1.0,
        refresh_every: 1,
        stepping: Stepping::Fixed { dt: 0.01 },
        ..SimOptions::default()
    };
    run_sim(&mut net, &opts).unwrap();
    let t = net.temperature(w).unwrap();
    // 5 J into ~1 J/K of capacity that grows with temperature
    assert!(t > 24.0 && t < 25.5);
    assert!(net.inverse_capacity(w).unwrap() < 1.0 / (0.01 * 102.0));
}
