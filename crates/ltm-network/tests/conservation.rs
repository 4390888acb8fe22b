//! Integration tests for heat accumulation in a thermal network.
//!
//! Covers:
//! - exact antisymmetry of every exchange contribution
//! - zero net heat over closed networks (no constant bodies, no sources)
//! - steady state when all temperatures agree

use ltm_core::{BodyId, Tolerances, nearly_equal};
use ltm_network::{Body, Exchange, PropertyFn, ThermalNetwork, radiation_exchange_factor};
use proptest::prelude::*;

/// Chain of dynamic bodies linked by alternating conduction and radiation.
fn chain(temps: &[f64], resistances: &[f64]) -> (ThermalNetwork, Vec<BodyId>) {
    let mut net = ThermalNetwork::new("chain");
    let ids: Vec<BodyId> = temps
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            net.register_body(Body::dynamic(format!("b{i}"), 0.1 + i as f64, 400.0, t).unwrap())
                .unwrap()
        })
        .collect();
    for (i, pair) in ids.windows(2).enumerate() {
        let r = resistances[i % resistances.len()];
        let exchange = if i % 2 == 0 {
            Exchange::conduction(format!("c{i}"), pair[0], pair[1], r).unwrap()
        } else {
            Exchange::radiation(format!("r{i}"), pair[0], pair[1], 1e-8 / r).unwrap()
        };
        net.register_exchange(exchange).unwrap();
    }
    (net, ids)
}

#[test]
fn equal_temperatures_are_a_steady_state() {
    let (mut net, ids) = chain(&[300.0; 5], &[0.5, 2.0]);
    for id in 0..net.exchanges().len() {
        let flow = net.exchange_flow(ltm_core::Id::from_index(id as u32)).unwrap();
        assert_eq!(flow, 0.0);
    }
    for _ in 0..10 {
        net.accumulate_heat().unwrap();
        net.integrate(0.01).unwrap();
    }
    for id in ids {
        assert_eq!(net.temperature(id), Some(300.0));
    }
}

#[test]
fn radiation_between_real_surfaces_cools_the_hot_side() {
    let mut net = ThermalNetwork::new("filament");
    let fil = net
        .register_body(
            Body::dynamic("filament", 2e-3, PropertyFn::constant(134.4), 2273.0).unwrap(),
        )
        .unwrap();
    let alu = net
        .register_body(Body::dynamic("alumina", 1.6e-2, 134.4, 1273.0).unwrap())
        .unwrap();
    let factor = radiation_exchange_factor(0.5, 592.36e-6, 0.5, 961.3e-6).unwrap();
    net.register_exchange(Exchange::radiation("fil-alu", fil, alu, factor).unwrap())
        .unwrap();

    net.accumulate_heat().unwrap();
    let h_fil = net.heat(fil).unwrap();
    assert!(h_fil < 0.0);
    assert_eq!(h_fil, -net.heat(alu).unwrap());
    net.integrate(0.001).unwrap();
    assert!(net.temperature(fil).unwrap() < 2273.0);
    assert!(net.temperature(alu).unwrap() > 1273.0);
}

proptest! {
    #[test]
    fn single_exchange_is_exactly_antisymmetric(
        t1 in -200.0_f64..3000.0,
        t2 in -200.0_f64..3000.0,
        r in 1e-3_f64..1e3,
    ) {
        let mut net = ThermalNetwork::new("pair");
        let a = net.register_body(Body::fixed_capacity("a", 1.0, t1).unwrap()).unwrap();
        let b = net.register_body(Body::fixed_capacity("b", 1.0, t2).unwrap()).unwrap();
        net.register_exchange(Exchange::conduction("ab", a, b, r).unwrap()).unwrap();
        net.accumulate_heat().unwrap();
        prop_assert_eq!(net.heat(a).unwrap(), -net.heat(b).unwrap());
        // hotter body never gains heat
        if t1 > t2 {
            prop_assert!(net.heat(a).unwrap() <= 0.0);
        }
    }

    #[test]
    fn closed_network_heats_sum_to_zero(
        temps in prop::collection::vec(200.0_f64..1500.0, 2..12),
        resistances in prop::collection::vec(0.01_f64..10.0, 1..4),
    ) {
        let (mut net, _) = chain(&temps, &resistances);
        net.accumulate_heat().unwrap();
        let sum: f64 = net.heats().iter().sum();
        let scale: f64 = net.heats().iter().map(|h| h.abs()).sum::<f64>().max(1.0);
        let tol = Tolerances { abs: 1e-9 * scale, rel: 0.0 };
        prop_assert!(nearly_equal(sum, 0.0, tol));
    }
}
