//! Transient nested rate model: `pet_type → scheme → factor → value`, the
//! bridge between the sheet parser and the flat persisted rate table.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::SchemeLimits;
use crate::domain::{normalize_scheme, Factor, PetType, RateEntry, RateKey};

use super::{FactorValue, ParsedRateRow};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemeRates {
    pub factors: BTreeMap<Factor, FactorValue>,
    pub limit: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedRateTable {
    pet_types: BTreeMap<String, BTreeMap<String, SchemeRates>>,
}

impl NestedRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the parser's flat rows for one factor into a nested table.
    pub fn from_rows(rows: Vec<ParsedRateRow>, factor: Factor) -> Self {
        let mut table = Self::new();
        for row in rows {
            let pet_type = row.pet_type.to_lowercase();
            let scheme = normalize_scheme(&row.scheme);
            let entry = table
                .pet_types
                .entry(pet_type)
                .or_default()
                .entry(scheme)
                .or_default();
            entry.factors.insert(factor, row.value);
            entry.limit = Some(row.limit);
        }
        table
    }

    /// Merge `other` into `self`. Non-destructive at the (pet type, scheme)
    /// level: incoming factor entries are added next to existing ones, and a
    /// collision on the same factor name overwrites (callers merge one
    /// factor at a time). A limit conflict is a data-quality signal, not an
    /// error.
    pub fn merge(&mut self, other: NestedRateTable) {
        for (pet_type, schemes) in other.pet_types {
            let base_schemes = self.pet_types.entry(pet_type.clone()).or_default();
            for (scheme, incoming) in schemes {
                let existing = base_schemes.entry(scheme.clone()).or_default();
                existing.factors.extend(incoming.factors);
                if let Some(limit) = incoming.limit {
                    if let Some(previous) = existing.limit {
                        if previous != limit {
                            warn!(
                                %pet_type,
                                %scheme,
                                previous,
                                incoming = limit,
                                "cover limit conflict across factor sources"
                            );
                        }
                    }
                    existing.limit = Some(limit);
                }
            }
        }
    }

    /// Flatten to the persisted records. Scalar leaves become one entry with
    /// no option (a missing rate is coerced to 0.0); option maps become one
    /// entry per option. Limits come from the configured scheme table, not
    /// from whatever the sheets carried.
    pub fn flatten(&self, limits: &SchemeLimits) -> Vec<RateEntry> {
        let mut entries = Vec::new();
        for (pet_type_label, schemes) in &self.pet_types {
            let pet_type = match PetType::from_str(pet_type_label) {
                Ok(pet_type) => pet_type,
                Err(_) => {
                    warn!(pet_type = %pet_type_label, "skipping unknown pet type in rate card");
                    continue;
                }
            };
            for (scheme, rates) in schemes {
                let limit = limits.get(scheme);
                for (&factor, value) in &rates.factors {
                    match value {
                        FactorValue::Scalar(rate) => entries.push(RateEntry {
                            key: RateKey {
                                pet_type,
                                scheme: scheme.clone(),
                                factor,
                                option: None,
                            },
                            rate: rate.unwrap_or(0.0),
                            limit,
                        }),
                        FactorValue::Options(options) => {
                            for (option, &rate) in options {
                                if !rate.is_finite() {
                                    continue;
                                }
                                entries.push(RateEntry {
                                    key: RateKey {
                                        pet_type,
                                        scheme: scheme.clone(),
                                        factor,
                                        option: Some(option.clone()),
                                    },
                                    rate,
                                    limit,
                                });
                            }
                        }
                    }
                }
            }
        }
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.pet_types.is_empty()
    }

    pub fn pet_types(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, SchemeRates>)> {
        self.pet_types.iter().map(|(pet_type, schemes)| (pet_type.as_str(), schemes))
    }
}
