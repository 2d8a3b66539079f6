//! The re-rating engine proper: one O(1) rate lookup per dimension against
//! the prebuilt table, a strict multiplicative chain, and the policy-level
//! and monthly aggregates.
//!
//! An unresolved factor poisons the whole row — the premium comes out null
//! rather than quietly multiplying by 1 over a hole in the rate card.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::fact::{
    FactorResolution, MonthlySummary, PolicyFact, PolicyPremium, RatedFact,
};
use crate::domain::{Factor, DECLINE_RATE, GENERIC_DIMENSIONS};
use crate::ratecard::RateTable;

pub fn rate_fact(table: &RateTable, fact: &PolicyFact) -> RatedFact {
    let mut resolutions = Vec::with_capacity(GENERIC_DIMENSIONS.len() + 2);

    resolutions.push(FactorResolution {
        factor: Factor::BaseRate,
        option: None,
        rate: table.rate(fact.pet_type, &fact.scheme, Factor::BaseRate, None),
    });

    let breed_factor = fact.pet_type.breed_factor();
    resolutions.push(FactorResolution {
        factor: breed_factor,
        option: Some(fact.breed.clone()),
        rate: table.rate(fact.pet_type, &fact.scheme, breed_factor, Some(&fact.breed)),
    });

    for factor in GENERIC_DIMENSIONS {
        let option = fact.dimension_label(factor);
        resolutions.push(FactorResolution {
            factor,
            option: option.map(str::to_string),
            rate: option
                .and_then(|label| table.rate(fact.pet_type, &fact.scheme, factor, Some(label))),
        });
    }

    let re_rated_premium = resolutions
        .iter()
        .try_fold(1.0_f64, |product, resolution| resolution.rate.map(|rate| product * rate));
    let decline =
        resolutions.iter().any(|resolution| resolution.rate.is_some_and(|rate| rate >= DECLINE_RATE));

    RatedFact { fact: fact.clone(), resolutions, re_rated_premium, decline }
}

pub fn rate_all(table: &RateTable, facts: &[PolicyFact]) -> Vec<RatedFact> {
    let rated: Vec<RatedFact> = facts.iter().map(|fact| rate_fact(table, fact)).collect();
    let unrated = rated.iter().filter(|row| !row.is_fully_rated()).count();
    let declined = rated.iter().filter(|row| row.decline).count();
    info!(rows = rated.len(), unrated, declined, "re-rating pass complete");
    rated
}

/// Keep rated rows matching the operator's filters. `copay` takes `yes`,
/// `no` or `*`; declines are excluded unless asked for.
pub fn filter_rated(
    rated: Vec<RatedFact>,
    copay: Option<&str>,
    month: Option<&str>,
    include_declines: bool,
) -> Vec<RatedFact> {
    rated
        .into_iter()
        .filter(|row| match copay {
            Some("*") | None => true,
            Some(wanted) => row.fact.copay.as_deref() == Some(wanted),
        })
        .filter(|row| match month {
            Some(wanted) => row.fact.inception_month == wanted,
            None => true,
        })
        .filter(|row| include_declines || !row.decline)
        .collect()
}

/// Aggregate per (policy_number, adjustment_number). The actual premium is
/// the transaction's written premium; the re-rated side propagates null if
/// any pet in the group failed to rate.
pub fn policy_premiums(rated: &[RatedFact]) -> Vec<PolicyPremium> {
    let mut groups: BTreeMap<(String, i32), PolicyPremium> = BTreeMap::new();
    for row in rated {
        let entry = groups.entry(row.fact.group_key()).or_insert_with(|| PolicyPremium {
            policy_number: row.fact.policy_number.clone(),
            adjustment_number: row.fact.adjustment_number,
            actual_gwp: row.fact.transaction_gwp,
            re_rated_premium: Some(0.0),
        });
        entry.re_rated_premium = match (entry.re_rated_premium, row.re_rated_premium) {
            (Some(total), Some(premium)) => Some(total + premium),
            _ => None,
        };
    }
    groups.into_values().collect()
}

/// Actual vs re-rated totals per inception month. Only fully-rated rows
/// enter the comparison so both sides cover the same population.
pub fn monthly_summary(rated: &[RatedFact]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for row in rated {
        let Some(re_rated) = row.re_rated_premium else {
            continue;
        };
        let totals = months.entry(row.fact.inception_month.clone()).or_insert((0.0, 0.0));
        totals.0 += row.fact.gwp_per_pet;
        totals.1 += re_rated;
    }

    months
        .into_iter()
        .map(|(inception_month, (actual_total, re_rated_total))| MonthlySummary {
            inception_month,
            actual_total,
            re_rated_total,
            // zero-denominator comparisons collapse to zero, never a fault
            rate_change: if actual_total == 0.0 {
                0.0
            } else {
                re_rated_total / actual_total - 1.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::fact::PolicyFact;
    use crate::domain::{Factor, PetType, RateEntry, RateKey, DECLINE_RATE, GENERIC_DIMENSIONS};
    use crate::ratecard::RateTable;

    use super::{filter_rated, monthly_summary, policy_premiums, rate_all, rate_fact};

    fn fact() -> PolicyFact {
        PolicyFact {
            policy_number: "SAP0001".to_string(),
            adjustment_number: 1,
            pet_name: "Rex".to_string(),
            pet_type: PetType::Dog,
            scheme: "bronze".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
            inception_month: "2024-06".to_string(),
            transaction_gwp: 300.0,
            gwp_per_pet: 300.0,
            breed: "border collie".to_string(),
            pet_age: Some("49–54".to_string()),
            pet_age_gender: Some("male: 1–50".to_string()),
            pet_price: Some("£301–£600".to_string()),
            neutered_gender: "male: yes".to_string(),
            chipped: "yes".to_string(),
            vaccinations: "no".to_string(),
            pre_existing: "no".to_string(),
            aggressive: "no".to_string(),
            is_pet_yours: "yes".to_string(),
            postcode: Some("sw".to_string()),
            uk_resident: "yes".to_string(),
            kept_at_address: "yes".to_string(),
            trade_business: "no".to_string(),
            ph_age: Some("40 - 49.999".to_string()),
            copay: Some("no".to_string()),
            multipet: "yes".to_string(),
        }
    }

    fn entry(factor: Factor, option: Option<&str>, rate: f64) -> RateEntry {
        RateEntry {
            key: RateKey {
                pet_type: PetType::Dog,
                scheme: "bronze".to_string(),
                factor,
                option: option.map(str::to_string),
            },
            rate,
            limit: 2250.0,
        }
    }

    /// Table resolving every dimension of `fact()` to 1.0 except the base.
    fn unit_table(base_rate: f64) -> RateTable {
        let fact = fact();
        let mut entries = vec![
            entry(Factor::BaseRate, None, base_rate),
            entry(Factor::DogBreed, Some("border collie"), 1.0),
        ];
        for factor in GENERIC_DIMENSIONS {
            let option = fact.dimension_label(factor).expect("fixture labels resolve");
            entries.push(entry(factor, Some(option), 1.0));
        }
        RateTable::from_entries(entries)
    }

    #[test]
    fn base_rate_flows_through_a_unit_chain() {
        let rated = rate_fact(&unit_table(1.25), &fact());
        assert_eq!(rated.re_rated_premium, Some(1.25));
        assert!(!rated.decline);
        assert_eq!(rated.resolutions.len(), 18);
    }

    #[test]
    fn any_missing_factor_nulls_the_premium() {
        let fact = fact();
        let mut entries = vec![
            entry(Factor::BaseRate, None, 1.25),
            entry(Factor::DogBreed, Some("border collie"), 1.0),
        ];
        for factor in GENERIC_DIMENSIONS {
            if factor == Factor::Postcode {
                continue; // no postcode entry for this area
            }
            let option = fact.dimension_label(factor).expect("fixture labels resolve");
            entries.push(entry(factor, Some(option), 1.0));
        }
        let rated = rate_fact(&RateTable::from_entries(entries), &fact);

        assert_eq!(rated.re_rated_premium, None);
        let postcode = rated
            .resolutions
            .iter()
            .find(|resolution| resolution.factor == Factor::Postcode)
            .expect("postcode resolution");
        assert_eq!(postcode.rate, None);
    }

    #[test]
    fn underivable_dimension_label_nulls_the_premium() {
        let mut poisoned = fact();
        poisoned.postcode = None;
        let rated = rate_fact(&unit_table(1.25), &poisoned);
        assert_eq!(rated.re_rated_premium, None);
    }

    #[test]
    fn decline_sentinel_flags_the_row() {
        let fact = fact();
        let mut entries = vec![entry(Factor::BaseRate, None, 1.25)];
        entries.push(entry(Factor::DogBreed, Some("border collie"), DECLINE_RATE));
        for factor in GENERIC_DIMENSIONS {
            let option = fact.dimension_label(factor).expect("fixture labels resolve");
            entries.push(entry(factor, Some(option), 1.0));
        }
        let rated = rate_fact(&RateTable::from_entries(entries), &fact);

        assert!(rated.decline);
        assert_eq!(rated.decline_flag(), "Y");
        assert_eq!(rated.re_rated_premium, Some(1.25 * DECLINE_RATE));
    }

    #[test]
    fn policy_aggregation_sums_pets_and_propagates_null() {
        let table = unit_table(2.0);
        let mut second = fact();
        second.pet_name = "Bella".to_string();
        let rated = rate_all(&table, &[fact(), second]);

        let premiums = policy_premiums(&rated);
        assert_eq!(premiums.len(), 1);
        assert_eq!(premiums[0].actual_gwp, 300.0);
        assert_eq!(premiums[0].re_rated_premium, Some(4.0));

        let mut unrated = fact();
        unrated.postcode = None;
        let rated = rate_all(&table, &[fact(), unrated]);
        let premiums = policy_premiums(&rated);
        assert_eq!(premiums[0].re_rated_premium, None);
    }

    #[test]
    fn monthly_summary_compares_totals_and_handles_zero_actual() {
        let table = unit_table(2.0);
        let mut other_month = fact();
        other_month.inception_month = "2024-07".to_string();
        other_month.gwp_per_pet = 0.0;

        let rated = rate_all(&table, &[fact(), other_month]);
        let summary = monthly_summary(&rated);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].inception_month, "2024-06");
        assert!((summary[0].actual_total - 300.0).abs() < 1e-9);
        assert!((summary[0].re_rated_total - 2.0).abs() < 1e-9);
        assert!((summary[0].rate_change - (2.0 / 300.0 - 1.0)).abs() < 1e-12);

        // zero actual premium: rate change reports zero, not an error
        assert_eq!(summary[1].actual_total, 0.0);
        assert_eq!(summary[1].rate_change, 0.0);
    }

    #[test]
    fn decline_rows_are_dropped_unless_requested() {
        let fact = fact();
        let mut entries = vec![entry(Factor::BaseRate, None, 1.25)];
        entries.push(entry(Factor::DogBreed, Some("border collie"), DECLINE_RATE));
        for factor in GENERIC_DIMENSIONS {
            let option = fact.dimension_label(factor).expect("fixture labels resolve");
            entries.push(entry(factor, Some(option), 1.0));
        }
        let rated = rate_all(&RateTable::from_entries(entries), &[fact]);

        assert!(filter_rated(rated.clone(), None, None, false).is_empty());
        assert_eq!(filter_rated(rated, None, None, true).len(), 1);
    }

    #[test]
    fn filters_narrow_by_copay_and_month() {
        let table = unit_table(1.0);
        let mut copay_yes = fact();
        copay_yes.copay = Some("yes".to_string());
        copay_yes.inception_month = "2024-07".to_string();
        copay_yes.pet_name = "Bella".to_string();
        let rated = rate_all(&table, &[fact(), copay_yes]);

        let filtered = filter_rated(rated.clone(), Some("no"), None, true);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].fact.pet_name, "Rex");

        let filtered = filter_rated(rated.clone(), Some("*"), Some("2024-06"), true);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].fact.pet_name, "Rex");

        let filtered = filter_rated(rated, None, Some("1999-01"), true);
        assert!(filtered.is_empty());
    }
}
