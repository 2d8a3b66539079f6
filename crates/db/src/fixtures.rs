//! Deterministic demo dataset: a two-pet dog policy and a single-cat policy
//! plus a rate card that covers every dimension both rate against. Used by
//! the `seed` command and the end-to-end tests.

use serde::Serialize;

use petrate_core::domain::{Factor, PetType, RateKey};
use petrate_core::RateEntry;

use crate::repositories::{RateStore, RepositoryError, SqlRateStore};
use crate::DbPool;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SeedSummary {
    pub policies: usize,
    pub pets: usize,
    pub rate_entries: usize,
}

pub struct DemoDataset;

impl DemoDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedSummary, RepositoryError> {
        seed_policy_book(pool).await?;

        let entries = demo_rate_entries();
        SqlRateStore::new(pool.clone()).replace_all(&entries).await?;

        Ok(SeedSummary { policies: 2, pets: 3, rate_entries: entries.len() })
    }
}

async fn seed_policy_book(pool: &DbPool) -> Result<(), RepositoryError> {
    let coded_values: &[(i64, &str)] = &[
        (100, "Silver"),
        (101, "Gold"),
        (200, "Pedigree"),
        (201, "Moggie"),
        (300, "Border Collie"),
        (301, "Moggie"),
        (400, "Medium"),
        (500, "Female"),
        (501, "Male"),
    ];
    for (code, label) in coded_values.iter().copied() {
        sqlx::query("INSERT OR REPLACE INTO coded_value (code, label) VALUES (?, ?)")
            .bind(code)
            .bind(label)
            .execute(pool)
            .await?;
    }

    for (id, number) in [(1i64, "SAP0001"), (2, "SAP0002")] {
        sqlx::query(
            "INSERT OR REPLACE INTO policy_master (policy_master_id, policy_number) VALUES (?, ?)",
        )
        .bind(id)
        .bind(number)
        .execute(pool)
        .await?;
    }

    for (id, name) in [(1i64, "New Business"), (2, "Renewal"), (3, "Cancellation")] {
        sqlx::query(
            "INSERT OR REPLACE INTO transaction_type (transaction_type_id, name) VALUES (?, ?)",
        )
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    }

    // (risk, proposer, cover level, copay code)
    for (risk_id, proposer_id, cover, copay) in [(20i64, 30i64, 100i64, 2i64), (21, 31, 101, 1)] {
        sqlx::query(
            "INSERT OR REPLACE INTO risk (risk_id, proposer_id, cover_level_code, copay_code)
             VALUES (?, ?, ?, ?)",
        )
        .bind(risk_id)
        .bind(proposer_id)
        .bind(cover)
        .bind(copay)
        .execute(pool)
        .await?;
    }

    let transactions: &[(i64, i64, i64, i32, &str, i64, f64)] = &[
        (10, 1, 20, 1, "2024-06-01", 1, 300.0),
        (11, 2, 21, 1, "2024-07-15", 2, 120.0),
    ];
    for (history_id, policy_id, risk_id, adjustment, effective, type_id, gwp) in transactions.iter().copied() {
        sqlx::query(
            "INSERT OR REPLACE INTO policy_history (
                policy_history_id, policy_master_id, risk_id, adjustment_number,
                effective_date, transaction_type_id, gwp
             ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(history_id)
        .bind(policy_id)
        .bind(risk_id)
        .bind(adjustment)
        .bind(effective)
        .bind(type_id)
        .bind(gwp)
        .execute(pool)
        .await?;
    }

    // (id, risk, rank, name, subtype, breed, size, gender, cost, dob)
    let pets: &[(i64, i64, i32, &str, i64, i64, i64, i64, f64, &str)] = &[
        (40, 20, 1, "Rex", 200, 300, 400, 501, 450.0, "2020-05-10"),
        (41, 20, 2, "Bella", 200, 300, 400, 500, 450.0, "2022-06-20"),
        (42, 21, 1, "Whiskers", 201, 301, 400, 500, 120.0, "2023-01-15"),
    ];
    for (id, risk_id, rank, name, subtype, breed, size, gender, cost, dob) in pets.iter().copied() {
        sqlx::query(
            "INSERT OR REPLACE INTO pet_risk_pet (
                pet_risk_pet_id, risk_id, pet_number, name, sub_type_code, breed_code,
                size_code, gender_code, has_been_neutered, has_been_chipped,
                has_vaccinations, has_pre_existing_conditions, has_aggressive_history,
                is_pet_yours, cost_of_pet, date_of_birth
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, 1, 0, 0, 0, 1, ?, ?)",
        )
        .bind(id)
        .bind(risk_id)
        .bind(rank)
        .bind(name)
        .bind(subtype)
        .bind(breed)
        .bind(size)
        .bind(gender)
        .bind(cost)
        .bind(dob)
        .execute(pool)
        .await?;
    }

    let proposers: &[(i64, i64, &str)] = &[(30, 50, "1984-03-02"), (31, 51, "2004-09-20")];
    for (proposer_id, address_id, dob) in proposers.iter().copied() {
        sqlx::query(
            "INSERT OR REPLACE INTO proposer (
                proposer_id, address_id, date_of_birth, uk_resident, kept_at_address, trade_business
             ) VALUES (?, ?, ?, 1, 1, 0)",
        )
        .bind(proposer_id)
        .bind(address_id)
        .bind(dob)
        .execute(pool)
        .await?;
    }

    for (address_id, postcode) in [(50i64, "SW1A 1AA"), (51, "B90 4AA")] {
        sqlx::query("INSERT OR REPLACE INTO address (address_id, postcode) VALUES (?, ?)")
            .bind(address_id)
            .bind(postcode)
            .execute(pool)
            .await?;
    }

    sqlx::query("DELETE FROM premium_comment").execute(pool).await?;
    let comments: &[(i64, &str)] = &[
        (10, "Rex Belongs to proposer at a premium of £180.00"),
        (10, "Bella Belongs to proposer at a premium of £120.00"),
        (11, "Whiskers Belongs to proposer at a premium of £120.00"),
    ];
    for (history_id, comment) in comments.iter().copied() {
        sqlx::query("INSERT INTO premium_comment (policy_history_id, comment) VALUES (?, ?)")
            .bind(history_id)
            .bind(comment)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Rate card covering both demo policies end to end.
pub fn demo_rate_entries() -> Vec<RateEntry> {
    let dog_silver: &[(Factor, Option<&str>, f64)] = &[
        (Factor::BaseRate, None, 1.25),
        (Factor::DogBreed, Some("border collie"), 1.3),
        (Factor::PetAge, Some("49–54"), 1.2),
        (Factor::PetAge, Some("24–28"), 1.1),
        (Factor::PetAgeGender, Some("male: 1–50"), 1.05),
        (Factor::PetAgeGender, Some("female: 1–50"), 1.0),
        (Factor::PetPrice, Some("£301–£600"), 1.1),
        (Factor::NeuteredGender, Some("male: yes"), 0.95),
        (Factor::NeuteredGender, Some("female: yes"), 0.97),
        (Factor::Chipped, Some("yes"), 0.98),
        (Factor::Vaccinations, Some("no"), 1.05),
        (Factor::PreExisting, Some("no"), 1.0),
        (Factor::Aggressive, Some("no"), 1.0),
        (Factor::IsPetYours, Some("yes"), 1.0),
        (Factor::Postcode, Some("sw"), 1.12),
        (Factor::UkResident, Some("yes"), 1.0),
        (Factor::KeptAtAddress, Some("yes"), 1.0),
        (Factor::TradeBusiness, Some("no"), 1.0),
        (Factor::PhAge, Some("40 - 49.999"), 1.0),
        (Factor::Copay, Some("no"), 1.0),
        (Factor::Copay, Some("yes"), 0.8),
        (Factor::Multipet, Some("yes"), 0.95),
        (Factor::Multipet, Some("no"), 1.0),
    ];

    let cat_gold: &[(Factor, Option<&str>, f64)] = &[
        (Factor::BaseRate, None, 0.95),
        (Factor::CatBreed, Some("moggie"), 1.0),
        (Factor::PetAge, Some("18"), 1.0),
        (Factor::PetAgeGender, Some("female: 1–50"), 1.0),
        (Factor::PetPrice, Some("£76–£150"), 1.0),
        (Factor::NeuteredGender, Some("female: yes"), 1.0),
        (Factor::Chipped, Some("yes"), 0.98),
        (Factor::Vaccinations, Some("no"), 1.05),
        (Factor::PreExisting, Some("no"), 1.0),
        (Factor::Aggressive, Some("no"), 1.0),
        (Factor::IsPetYours, Some("yes"), 1.0),
        (Factor::Postcode, Some("b"), 1.0),
        (Factor::UkResident, Some("yes"), 1.0),
        (Factor::KeptAtAddress, Some("yes"), 1.0),
        (Factor::TradeBusiness, Some("no"), 1.0),
        (Factor::PhAge, Some("20 - 29.999"), 1.0),
        (Factor::Copay, Some("yes"), 0.8),
        (Factor::Copay, Some("no"), 1.0),
        (Factor::Multipet, Some("no"), 1.0),
        (Factor::Multipet, Some("yes"), 0.95),
    ];

    let mut entries = Vec::new();
    for (factor, option, rate) in dog_silver {
        entries.push(entry(PetType::Dog, "silver", 3000.0, *factor, *option, *rate));
    }
    for (factor, option, rate) in cat_gold {
        entries.push(entry(PetType::Cat, "gold", 4000.0, *factor, *option, *rate));
    }
    entries
}

fn entry(
    pet_type: PetType,
    scheme: &str,
    limit: f64,
    factor: Factor,
    option: Option<&str>,
    rate: f64,
) -> RateEntry {
    RateEntry {
        key: RateKey {
            pet_type,
            scheme: scheme.to_string(),
            factor,
            option: option.map(str::to_string),
        },
        rate,
        limit,
    }
}
