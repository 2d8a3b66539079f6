//! Joins the upstream policy book into one denormalized fact row per
//! (policy, transaction, insured pet). Inner-join semantics throughout:
//! a pet or transaction with missing linkage is excluded, never defaulted.

use std::collections::HashMap;

use chrono::Datelike;
use tracing::{debug, info};

use crate::domain::fact::PolicyFact;
use crate::domain::source::{PetRow, PolicyBook};
use crate::domain::normalize_scheme;

use super::bands;

/// Marker phrase splitting the pet name from the premium share in a
/// transaction comment.
const PREMIUM_MARKER: &str = "Belongs to proposer";

/// Transaction types that participate in re-rating.
const RATED_TRANSACTION_TYPES: [&str; 2] = ["New Business", "Renewal"];

pub fn assemble_facts(book: &PolicyBook, year_floor: i32) -> Vec<PolicyFact> {
    let policies: HashMap<i64, &_> =
        book.policies.iter().map(|row| (row.policy_master_id, row)).collect();
    let transaction_types: HashMap<i64, &str> = book
        .transaction_types
        .iter()
        .map(|row| (row.transaction_type_id, row.name.as_str()))
        .collect();
    let risks: HashMap<i64, &_> = book.risks.iter().map(|row| (row.risk_id, row)).collect();
    let proposers: HashMap<i64, &_> =
        book.proposers.iter().map(|row| (row.proposer_id, row)).collect();
    let addresses: HashMap<i64, &_> =
        book.addresses.iter().map(|row| (row.address_id, row)).collect();
    let coded: HashMap<i64, &str> =
        book.coded_values.iter().map(|row| (row.code, row.label.as_str())).collect();

    let mut pets_by_risk: HashMap<i64, Vec<&PetRow>> = HashMap::new();
    for pet in &book.pets {
        pets_by_risk.entry(pet.risk_id).or_default().push(pet);
    }

    let mut comments_by_transaction: HashMap<i64, Vec<&str>> = HashMap::new();
    for comment in &book.premium_comments {
        comments_by_transaction
            .entry(comment.policy_history_id)
            .or_default()
            .push(comment.comment.as_str());
    }

    let mut facts = Vec::new();
    let mut dropped_pets = 0usize;

    for transaction in &book.transactions {
        let Some(&type_name) = transaction_types.get(&transaction.transaction_type_id) else {
            debug!(
                policy_history_id = transaction.policy_history_id,
                "dropping transaction with unknown type"
            );
            continue;
        };
        if !RATED_TRANSACTION_TYPES.contains(&type_name) {
            continue;
        }
        if transaction.effective_date.year() < year_floor {
            continue;
        }

        let Some(policy) = policies.get(&transaction.policy_master_id) else {
            debug!(
                policy_history_id = transaction.policy_history_id,
                "dropping transaction with no policy master"
            );
            continue;
        };
        let Some(risk) = risks.get(&transaction.risk_id) else {
            debug!(
                policy_history_id = transaction.policy_history_id,
                "dropping transaction with no risk"
            );
            continue;
        };
        let Some(proposer) = proposers.get(&risk.proposer_id) else {
            debug!(risk_id = risk.risk_id, "dropping transaction with no proposer");
            continue;
        };
        let Some(address) = addresses.get(&proposer.address_id) else {
            debug!(proposer_id = proposer.proposer_id, "dropping transaction with no address");
            continue;
        };
        let Some(&scheme_label) = coded.get(&risk.cover_level_code) else {
            debug!(risk_id = risk.risk_id, "dropping transaction with unresolved cover level");
            continue;
        };
        let scheme = normalize_scheme(scheme_label);

        let Some(pets) = pets_by_risk.get(&transaction.risk_id) else {
            continue;
        };

        // Per-pet premium shares, keyed by the pet name quoted in the
        // free-text comment. An exact (trimmed) name match is required;
        // anything else drops the pet row.
        let mut shares: HashMap<&str, f64> = HashMap::new();
        if let Some(comments) = comments_by_transaction.get(&transaction.policy_history_id) {
            for comment in comments {
                if let Some((name, share)) = parse_premium_comment(comment) {
                    shares.insert(name, share);
                }
            }
        }

        // The multipet flag looks at every pet observed on the risk, so the
        // rank-1 pet of a two-pet policy still rates as multipet.
        let max_rank = pets.iter().map(|pet| pet.pet_number).max().unwrap_or(0);
        let multipet = bands::yes_no(max_rank > 1);

        let mut joined = Vec::with_capacity(pets.len());
        for pet in pets {
            let labels = (
                coded.get(&pet.sub_type_code),
                coded.get(&pet.breed_code),
                coded.get(&pet.size_code),
                coded.get(&pet.gender_code),
            );
            let (Some(&sub_type), Some(&breed), Some(&size), Some(&gender)) = labels else {
                debug!(pet = %pet.name, "dropping pet with unresolved coded attributes");
                dropped_pets += 1;
                continue;
            };
            let Some(&share) = shares.get(pet.name.trim()) else {
                debug!(pet = %pet.name, "dropping pet with no premium comment match");
                dropped_pets += 1;
                continue;
            };
            joined.push((pet, sub_type, breed, size, gender, share));
        }

        let share_total: f64 = joined.iter().map(|(.., share)| share).sum();

        for (pet, sub_type, breed, size, gender, share) in joined {
            let gwp_per_pet = if share_total == 0.0 {
                0.0
            } else {
                share / share_total * transaction.gwp
            };

            let months = bands::pet_age_months(transaction.effective_date, pet.date_of_birth);
            let ph_age_years =
                bands::ph_age_years(transaction.effective_date, proposer.date_of_birth);

            facts.push(PolicyFact {
                policy_number: policy.policy_number.clone(),
                adjustment_number: transaction.adjustment_number,
                pet_name: pet.name.trim().to_string(),
                pet_type: bands::pet_type_for_subtype(sub_type),
                scheme: scheme.clone(),
                effective_date: transaction.effective_date,
                inception_month: format!(
                    "{:04}-{:02}",
                    transaction.effective_date.year(),
                    transaction.effective_date.month()
                ),
                transaction_gwp: transaction.gwp,
                gwp_per_pet,
                breed: bands::breed_label(sub_type, breed, size),
                pet_age: bands::pet_age_band(months).map(str::to_string),
                pet_age_gender: bands::pet_age_gender_label(gender, months),
                pet_price: bands::pet_price_band(pet.cost_of_pet).map(str::to_string),
                neutered_gender: bands::neutered_gender_label(gender, pet.neutered),
                chipped: bands::yes_no(pet.chipped).to_string(),
                vaccinations: bands::yes_no(pet.vaccinations).to_string(),
                pre_existing: bands::yes_no(pet.pre_existing).to_string(),
                aggressive: bands::yes_no(pet.aggressive).to_string(),
                is_pet_yours: bands::yes_no(pet.is_pet_yours).to_string(),
                postcode: bands::postcode_area(&address.postcode),
                uk_resident: bands::yes_no(proposer.uk_resident).to_string(),
                kept_at_address: bands::yes_no(proposer.kept_at_address).to_string(),
                trade_business: bands::yes_no(proposer.trade_business).to_string(),
                ph_age: bands::ph_age_band(ph_age_years).map(str::to_string),
                copay: bands::copay_label(risk.copay_code).map(str::to_string),
                multipet: multipet.to_string(),
            });
        }
    }

    info!(facts = facts.len(), dropped_pets, "assembled policy facts");
    facts
}

/// Split a premium comment into the pet name (the trimmed text before the
/// marker phrase) and the premium share (the last numeric token after it,
/// `£` and thousands separators stripped).
fn parse_premium_comment(comment: &str) -> Option<(&str, f64)> {
    let marker = comment.find(PREMIUM_MARKER)?;
    let name = comment[..marker].trim();
    let share = comment[marker + PREMIUM_MARKER.len()..]
        .split_whitespace()
        .filter_map(|token| {
            token
                .trim_matches(|ch: char| !ch.is_ascii_digit() && ch != '.' && ch != '-')
                .replace(',', "")
                .parse::<f64>()
                .ok()
        })
        .last()?;
    Some((name, share))
}
