//! Project validation logic.

use crate::schema::{BodyDef, ExchangeDef, LATEST_VERSION, Project, PropertyDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate label: {label} in {context}")]
    DuplicateLabel { label: String, context: String },

    #[error("Missing reference: {label} in {context}")]
    MissingReference { label: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut body_labels = HashSet::new();
    for body in &project.bodies {
        if !body_labels.insert(body.label()) {
            return Err(ValidationError::DuplicateLabel {
                label: body.label().to_string(),
                context: "bodies".to_string(),
            });
        }
        validate_body(body)?;
    }

    let mut exchange_labels = HashSet::new();
    for exchange in &project.exchanges {
        if !exchange_labels.insert(exchange.label()) {
            return Err(ValidationError::DuplicateLabel {
                label: exchange.label().to_string(),
                context: "exchanges".to_string(),
            });
        }
        let (first, second) = exchange.bodies();
        for body in [first, second] {
            if !body_labels.contains(body) {
                return Err(ValidationError::MissingReference {
                    label: body.to_string(),
                    context: format!("exchange '{}'", exchange.label()),
                });
            }
        }
        validate_exchange(exchange, project)?;
    }

    let mut source_labels = HashSet::new();
    for source in &project.sources {
        if !source_labels.insert(source.label.as_str()) {
            return Err(ValidationError::DuplicateLabel {
                label: source.label.clone(),
                context: "sources".to_string(),
            });
        }
        if !body_labels.contains(source.body.as_str()) {
            return Err(ValidationError::MissingReference {
                label: source.body.clone(),
                context: format!("source '{}'", source.label),
            });
        }
        finite(&format!("source '{}' power", source.label), source.power)?;
    }

    Ok(())
}

fn validate_body(body: &BodyDef) -> Result<(), ValidationError> {
    let name = body.label();
    match body {
        BodyDef::Dynamic {
            temperature,
            mass,
            specific_heat,
            ..
        } => {
            finite(&format!("body '{name}' temperature"), *temperature)?;
            positive(&format!("body '{name}' mass"), *mass)?;
            validate_property(&format!("body '{name}' specific_heat"), specific_heat)?;
        }
        BodyDef::FixedCapacity {
            temperature,
            capacity,
            ..
        } => {
            finite(&format!("body '{name}' temperature"), *temperature)?;
            positive(&format!("body '{name}' capacity"), *capacity)?;
        }
        BodyDef::Constant { temperature, .. } => {
            finite(&format!("body '{name}' temperature"), *temperature)?;
        }
    }
    if let Some(conductivity) = body.conductivity() {
        validate_property(&format!("body '{name}' conductivity"), conductivity)?;
    }
    Ok(())
}

fn validate_property(field: &str, property: &PropertyDef) -> Result<(), ValidationError> {
    match property {
        PropertyDef::Constant(value) => finite(field, *value),
        PropertyDef::Polynomial { polynomial } => {
            if polynomial.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    value: "[]".to_string(),
                    reason: "polynomial needs at least one coefficient".to_string(),
                });
            }
            polynomial.iter().try_for_each(|c| finite(field, *c))
        }
        PropertyDef::Table { table } => {
            if table.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    value: "[]".to_string(),
                    reason: "table needs at least one point".to_string(),
                });
            }
            for pair in table.windows(2) {
                if pair[1][0] <= pair[0][0] {
                    return Err(ValidationError::InvalidValue {
                        field: field.to_string(),
                        value: pair[1][0].to_string(),
                        reason: "table temperatures must be strictly increasing".to_string(),
                    });
                }
            }
            Ok(())
        }
    }
}

fn validate_exchange(exchange: &ExchangeDef, project: &Project) -> Result<(), ValidationError> {
    let name = exchange.label();
    match exchange {
        ExchangeDef::Conduction { resistance, .. } => {
            positive(&format!("exchange '{name}' resistance"), *resistance)
        }
        ExchangeDef::Radiation {
            factor,
            correction_factor,
            view_factor,
            emissivity,
            area,
            ..
        } => {
            let forms = [
                factor.is_some(),
                view_factor.is_some(),
                emissivity.is_some() || area.is_some(),
            ];
            let given = forms.iter().filter(|f| **f).count();
            if given != 1 || (correction_factor.is_some() && view_factor.is_none()) {
                return Err(ValidationError::InvalidValue {
                    field: format!("exchange '{name}' radiation coefficient"),
                    value: format!("{given} forms"),
                    reason: "give exactly one of factor, view_factor or emissivity + area"
                        .to_string(),
                });
            }
            if emissivity.is_some() != area.is_some() {
                return Err(ValidationError::InvalidValue {
                    field: format!("exchange '{name}' radiation coefficient"),
                    value: "emissivity/area".to_string(),
                    reason: "emissivity and area must be given together".to_string(),
                });
            }
            Ok(())
        }
        ExchangeDef::ContactConduction {
            first,
            second,
            shape_first,
            shape_second,
            ..
        } => {
            positive(&format!("exchange '{name}' shape_first"), *shape_first)?;
            positive(&format!("exchange '{name}' shape_second"), *shape_second)?;
            for label in [first, second] {
                let has_conductivity = project
                    .bodies
                    .iter()
                    .find(|b| b.label() == label)
                    .is_some_and(|b| b.conductivity().is_some());
                if !has_conductivity {
                    return Err(ValidationError::InvalidValue {
                        field: format!("exchange '{name}' body '{label}'"),
                        value: "none".to_string(),
                        reason: "contact conduction needs a body conductivity".to_string(),
                    });
                }
            }
            Ok(())
        }
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        })
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        })
    }
}
