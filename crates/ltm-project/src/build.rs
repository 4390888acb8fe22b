//! Turn a validated project into a live network and run options.

use std::collections::HashMap;

use ltm_core::BodyId;
use ltm_network::{
    Body, Exchange, HeatSource, PropertyFn, Radiation, ThermalNetwork, radiation_exchange_factor,
};
use ltm_sim::{SimOptions, Stepping};

use crate::schema::{BodyDef, ExchangeDef, Project, PropertyDef, RunDef, SteppingDef};
use crate::validate::{ValidationError, validate_project};
use crate::ProjectResult;

/// Build a network with bodies, exchanges and sources registered in file order.
pub fn build_network(project: &Project) -> ProjectResult<ThermalNetwork> {
    validate_project(project)?;
    let mut network = ThermalNetwork::new(project.name.clone());

    let mut ids: HashMap<&str, BodyId> = HashMap::new();
    for def in &project.bodies {
        let id = network.register_body(body(def)?)?;
        ids.insert(def.label(), id);
    }

    for def in &project.exchanges {
        let (first, second) = def.bodies();
        let first = lookup(&ids, first, def.label())?;
        let second = lookup(&ids, second, def.label())?;
        network.register_exchange(exchange(def, first, second)?)?;
    }

    for def in &project.sources {
        let body = lookup(&ids, &def.body, &def.label)?;
        network.register_source(HeatSource::new(def.label.clone(), body, def.power)?)?;
    }

    Ok(network)
}

/// Simulation options described by the project's run section.
pub fn sim_options(run: &RunDef) -> SimOptions {
    let stepping = match run.stepping {
        SteppingDef::Fixed { dt } => Stepping::Fixed { dt },
        SteppingDef::Adaptive {
            max_delta_t,
            initial_dt,
            min_dt,
            max_dt,
        } => Stepping::Adaptive {
            max_delta_t,
            initial_dt,
            min_dt,
            max_dt,
        },
    };
    SimOptions {
        t_end: run.t_end,
        max_steps: run.max_steps,
        record_every: run.record_every,
        refresh_every: run.refresh_every,
        stepping,
    }
}

fn lookup(ids: &HashMap<&str, BodyId>, label: &str, owner: &str) -> ProjectResult<BodyId> {
    ids.get(label).copied().ok_or_else(|| {
        ValidationError::MissingReference {
            label: label.to_string(),
            context: format!("'{owner}'"),
        }
        .into()
    })
}

fn property(def: &PropertyDef) -> ProjectResult<PropertyFn> {
    Ok(match def {
        PropertyDef::Constant(value) => PropertyFn::constant(*value),
        PropertyDef::Polynomial { polynomial } => PropertyFn::polynomial(polynomial.clone())?,
        PropertyDef::Table { table } => {
            PropertyFn::table(table.iter().map(|[t, v]| (*t, *v)).collect())?
        }
    })
}

fn body(def: &BodyDef) -> ProjectResult<Body> {
    let body = match def {
        BodyDef::Dynamic {
            label,
            temperature,
            mass,
            specific_heat,
            ..
        } => Body::dynamic(label.clone(), *mass, property(specific_heat)?, *temperature)?,
        BodyDef::FixedCapacity {
            label,
            temperature,
            capacity,
            ..
        } => Body::fixed_capacity(label.clone(), *capacity, *temperature)?,
        BodyDef::Constant {
            label, temperature, ..
        } => Body::constant(label.clone(), *temperature)?,
    };
    Ok(match def.conductivity() {
        Some(k) => body.with_conductivity(property(k)?),
        None => body,
    })
}

fn exchange(def: &ExchangeDef, first: BodyId, second: BodyId) -> ProjectResult<Exchange> {
    let label = def.label().to_string();
    let exchange = match def {
        ExchangeDef::Conduction { resistance, .. } => {
            Exchange::conduction(label, first, second, *resistance)?
        }
        ExchangeDef::Radiation {
            factor,
            correction_factor,
            view_factor,
            emissivity,
            area,
            ..
        } => {
            let law = match (factor, view_factor, emissivity, area) {
                (Some(factor), None, None, None) => Radiation::new(*factor)?,
                (None, Some(view), None, None) => {
                    Radiation::from_view_factor(correction_factor.unwrap_or(1.0), *view)?
                }
                (None, None, Some([e_a, e_b]), Some([a_a, a_b])) => {
                    Radiation::new(radiation_exchange_factor(*e_a, *a_a, *e_b, *a_b)?)?
                }
                _ => {
                    return Err(ValidationError::InvalidValue {
                        field: format!("exchange '{label}' radiation coefficient"),
                        value: "ambiguous".to_string(),
                        reason: "give exactly one of factor, view_factor or emissivity + area"
                            .to_string(),
                    }
                    .into());
                }
            };
            Exchange::new(label, first, second, law)
        }
        ExchangeDef::ContactConduction {
            shape_first,
            shape_second,
            ..
        } => Exchange::contact_conduction(label, first, second, *shape_first, *shape_second)?,
    };
    Ok(exchange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LATEST_VERSION, SourceDef};

    fn project() -> Project {
        Project {
            version: LATEST_VERSION,
            name: "unit".to_string(),
            bodies: vec![
                BodyDef::FixedCapacity {
                    label: "hot".to_string(),
                    temperature: 400.0,
                    capacity: 10.0,
                    conductivity: Some(PropertyDef::Constant(200.0)),
                },
                BodyDef::Constant {
                    label: "wall".to_string(),
                    temperature: 300.0,
                    conductivity: Some(PropertyDef::Table {
                        table: vec![[200.0, 10.0], [400.0, 20.0]],
                    }),
                },
            ],
            exchanges: vec![
                ExchangeDef::Radiation {
                    label: "rad".to_string(),
                    first: "hot".to_string(),
                    second: "wall".to_string(),
                    factor: None,
                    correction_factor: Some(0.5),
                    view_factor: Some(0.2),
                    emissivity: None,
                    area: None,
                },
                ExchangeDef::ContactConduction {
                    label: "contact".to_string(),
                    first: "hot".to_string(),
                    second: "wall".to_string(),
                    shape_first: 0.01,
                    shape_second: 0.02,
                },
            ],
            sources: vec![SourceDef {
                label: "heater".to_string(),
                body: "hot".to_string(),
                power: 5.0,
            }],
            run: RunDef::default(),
        }
    }

    #[test]
    fn builds_in_file_order() {
        let net = build_network(&project()).unwrap();
        assert_eq!(net.body_count(), 2);
        assert_eq!(net.find_body_by_label("wall").map(|id| id.index()), Some(1));
        assert_eq!(net.exchanges().len(), 2);
        assert_eq!(net.sources().len(), 1);
        assert_eq!(net.label(), "unit");
    }

    #[test]
    fn view_factor_radiation_includes_sigma() {
        let net = build_network(&project()).unwrap();
        let rad = net.find_exchange_by_label("rad").unwrap();
        let flow = net.exchange_flow(rad).unwrap();
        let expected = 0.5 * 0.2 * ltm_core::constants::STEFAN_BOLTZMANN
            * (300.0_f64.powi(4) - 400.0_f64.powi(4));
        assert!((flow - expected).abs() < 1e-9 * expected.abs());
    }

    #[test]
    fn ambiguous_radiation_is_rejected() {
        let mut p = project();
        if let ExchangeDef::Radiation { factor, .. } = &mut p.exchanges[0] {
            *factor = Some(1e-8);
        }
        assert!(build_network(&p).is_err());
    }

    #[test]
    fn run_section_maps_to_options() {
        let run = RunDef {
            t_end: 5.0,
            max_steps: 10,
            record_every: 2,
            refresh_every: 3,
            stepping: SteppingDef::Adaptive {
                max_delta_t: 0.1,
                initial_dt: 0.01,
                min_dt: 0.001,
                max_dt: 0.5,
            },
        };
        let opts = sim_options(&run);
        assert_eq!(opts.t_end, 5.0);
        assert_eq!(opts.max_steps, 10);
        assert_eq!(opts.record_every, 2);
        assert_eq!(opts.refresh_every, 3);
        assert_eq!(
            opts.stepping,
            Stepping::Adaptive {
                max_delta_t: 0.1,
                initial_dt: 0.01,
                min_dt: 0.001,
                max_dt: 0.5,
            }
        );
    }
}
