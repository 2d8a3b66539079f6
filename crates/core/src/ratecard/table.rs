//! Immutable per-pass lookup index over the persisted rate table. Built once
//! from the store at the start of a re-rating pass and then only read, so a
//! pass can never observe a half-refreshed card.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::{Factor, PetType, RateEntry, RateKey};

#[derive(Clone, Debug, Default)]
pub struct RateTable {
    rates: HashMap<RateKey, f64>,
    limits: HashMap<(PetType, String), f64>,
}

impl RateTable {
    /// Index a flat entry list. Duplicate keys should not exist under the
    /// full-replace invariant; if one slips through, the first entry wins
    /// and the duplicate is reported rather than silently shadowing it.
    pub fn from_entries(entries: Vec<RateEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table
                .limits
                .entry((entry.key.pet_type, entry.key.scheme.clone()))
                .or_insert(entry.limit);
            match table.rates.entry(entry.key) {
                std::collections::hash_map::Entry::Vacant(slot) => {
                    slot.insert(entry.rate);
                }
                std::collections::hash_map::Entry::Occupied(slot) => {
                    warn!(
                        pet_type = %slot.key().pet_type,
                        scheme = %slot.key().scheme,
                        factor = %slot.key().factor,
                        option = slot.key().option.as_deref().unwrap_or("-"),
                        "duplicate rate entry ignored"
                    );
                }
            }
        }
        table
    }

    pub fn rate(
        &self,
        pet_type: PetType,
        scheme: &str,
        factor: Factor,
        option: Option<&str>,
    ) -> Option<f64> {
        let key = RateKey {
            pet_type,
            scheme: scheme.to_string(),
            factor,
            option: option.map(str::to_string),
        };
        self.rates.get(&key).copied()
    }

    pub fn limit(&self, pet_type: PetType, scheme: &str) -> Option<f64> {
        self.limits.get(&(pet_type, scheme.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
