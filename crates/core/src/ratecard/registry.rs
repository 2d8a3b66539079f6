//! Fixed wiring between rating factors and the rate-card sheets that carry
//! them: sheet name, header keyword(s), and the species filter for the
//! shared breed sheet. The rate card's layout is a stable contract with the
//! underwriters, so this lives in code rather than configuration.

use crate::domain::{Factor, PetType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetSpec {
    pub factor: Factor,
    pub sheet: &'static str,
    pub keyword: &'static str,
    pub keyword2: Option<&'static str>,
    pub pet_type_filter: Option<PetType>,
}

const fn single(factor: Factor, sheet: &'static str, keyword: &'static str) -> SheetSpec {
    SheetSpec { factor, sheet, keyword, keyword2: None, pet_type_filter: None }
}

pub const SHEET_SPECS: &[SheetSpec] = &[
    single(Factor::BaseRate, "base_rates", "base rate"),
    SheetSpec {
        factor: Factor::PetAgeGender,
        sheet: "pet_age_gender",
        keyword: "animal age",
        keyword2: Some("animal gender"),
        pet_type_filter: None,
    },
    single(Factor::PetAge, "pet_age", "age in months"),
    single(Factor::PetPrice, "pet_price", "purchase price"),
    SheetSpec {
        factor: Factor::NeuteredGender,
        sheet: "neutered",
        keyword: "neutered",
        keyword2: Some("animal gender"),
        pet_type_filter: None,
    },
    single(Factor::Chipped, "chipped", "chipped"),
    single(Factor::Vaccinations, "vaccinations", "vaccinations"),
    single(Factor::PreExisting, "pre_existing", "pre-existing"),
    single(Factor::Aggressive, "aggressive", "aggressive"),
    single(Factor::IsPetYours, "is_pet_yours", "is pet yours"),
    single(Factor::Postcode, "postcode", "postcode area"),
    single(Factor::UkResident, "uk_resident", "uk resident"),
    single(Factor::KeptAtAddress, "kept_at_address", "kept at address"),
    single(Factor::TradeBusiness, "trade_business", "trade or business"),
    single(Factor::PhAge, "ph_age", "policyholder age"),
    single(Factor::Copay, "copay", "co-pay"),
    single(Factor::Multipet, "multipet", "multipet"),
    // Both species share one breed sheet; the filter keeps dog rates out of
    // the cat factor and vice versa.
    SheetSpec {
        factor: Factor::DogBreed,
        sheet: "breed",
        keyword: "dog breed",
        keyword2: None,
        pet_type_filter: Some(PetType::Dog),
    },
    SheetSpec {
        factor: Factor::CatBreed,
        sheet: "breed",
        keyword: "cat breed",
        keyword2: None,
        pet_type_filter: Some(PetType::Cat),
    },
];

pub fn spec_for(factor: Factor) -> Option<&'static SheetSpec> {
    SHEET_SPECS.iter().find(|spec| spec.factor == factor)
}

/// Distinct sheet names a refresh has to load, in registry order.
pub fn sheet_names() -> Vec<&'static str> {
    let mut names = Vec::new();
    for spec in SHEET_SPECS {
        if !names.contains(&spec.sheet) {
            names.push(spec.sheet);
        }
    }
    names
}
