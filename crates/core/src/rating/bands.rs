//! Pure band derivations: raw pet/proposer attributes in, rate-card option
//! labels out. Every label here must match the option labels the rate-card
//! parser produces, down to the dash; the engine joins on exact strings.

use chrono::{Datelike, NaiveDate};

use crate::domain::{PetType, PET_AGE_ORDER, PET_PRICE_ORDER, PH_AGE_ORDER};

/// Upper bounds of the pet-age range bands above the 0–23 singletons,
/// aligned with the tail of `PET_AGE_ORDER`.
const PET_AGE_RANGE_UPPERS: [i32; 36] = [
    28, 31, 34, 37, 40, 43, 46, 48, 54, 60, 66, 72, 78, 84, 90, 96, 102, 108, 114, 120, 126, 132,
    138, 144, 150, 156, 162, 168, 174, 180, 186, 192, 204, 216, 228, 240,
];

const PH_AGE_UPPERS: [f64; 8] = [19.999, 29.999, 39.999, 49.999, 59.999, 69.999, 79.999, 89.999];

const PET_PRICE_UPPERS: [f64; 5] = [75.0, 150.0, 300.0, 600.0, 1200.0];

/// Whole months between the pet's birth and the transaction's effective
/// date, ignoring days (year and month arithmetic only).
pub fn pet_age_months(effective: NaiveDate, date_of_birth: NaiveDate) -> i32 {
    (effective.year() - date_of_birth.year()) * 12
        + (effective.month() as i32 - date_of_birth.month() as i32)
}

/// Fine-grained pet-age band: singleton labels through 23 months, then the
/// widening ranges, `241+` at the tail. Each label covers exactly the months
/// it names, so 24 lands in `24–28`, not in the `23` singleton.
pub fn pet_age_band(months: i32) -> Option<&'static str> {
    if months < 0 {
        return None;
    }
    if months <= 23 {
        return Some(PET_AGE_ORDER[months as usize]);
    }
    for (index, &upper) in PET_AGE_RANGE_UPPERS.iter().enumerate() {
        if months <= upper {
            return Some(PET_AGE_ORDER[24 + index]);
        }
    }
    Some(PET_AGE_ORDER[PET_AGE_ORDER.len() - 1])
}

/// Coarse three-bucket pet-age band used only inside the gender composite.
pub fn pet_age_coarse_band(months: i32) -> Option<&'static str> {
    if months < 0 {
        return None;
    }
    Some(match months {
        0..=50 => "1–50",
        51..=100 => "51–100",
        _ => "101+",
    })
}

/// Policyholder age in whole years at the transaction's effective date
/// (year arithmetic, matching the band edges at x9.999).
pub fn ph_age_years(effective: NaiveDate, date_of_birth: NaiveDate) -> f64 {
    f64::from(effective.year() - date_of_birth.year())
}

pub fn ph_age_band(age_years: f64) -> Option<&'static str> {
    if age_years < 0.0 {
        return None;
    }
    for (index, &upper) in PH_AGE_UPPERS.iter().enumerate() {
        if age_years <= upper {
            return Some(PH_AGE_ORDER[index]);
        }
    }
    Some(PH_AGE_ORDER[PH_AGE_ORDER.len() - 1])
}

pub fn pet_price_band(price: f64) -> Option<&'static str> {
    if price < 0.0 {
        return None;
    }
    for (index, &upper) in PET_PRICE_UPPERS.iter().enumerate() {
        if price <= upper {
            return Some(PET_PRICE_ORDER[index]);
        }
    }
    Some(PET_PRICE_ORDER[PET_PRICE_ORDER.len() - 1])
}

/// Leading one or two alphabetic characters of the trimmed, lower-cased
/// postcode. Numeric and trailing parts are discarded; a postcode with no
/// leading letters yields no area.
pub fn postcode_area(postcode: &str) -> Option<String> {
    let area: String = postcode
        .trim()
        .to_lowercase()
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .take(2)
        .collect();
    (!area.is_empty()).then_some(area)
}

/// Species from the coded subtype label: the dog subtypes are crossbreed,
/// pedigree and mongrel; everything else rates as cat.
pub fn pet_type_for_subtype(sub_type: &str) -> PetType {
    match sub_type.trim().to_lowercase().as_str() {
        "crossbreed" | "pedigree" | "mongrel" => PetType::Dog,
        _ => PetType::Cat,
    }
}

/// Rate-card breed label: moggies rate under their subtype, cross-breeds and
/// mongrels are disambiguated by the first word of the size label, and
/// everything else passes through. Whitespace collapses to match the parsed
/// breed-sheet options.
pub fn breed_label(sub_type: &str, breed: &str, size: &str) -> String {
    let sub_type = sub_type.trim().to_lowercase();
    let breed = collapse(breed);
    match sub_type.as_str() {
        "moggie" => sub_type,
        "crossbreed" | "mongrel" => {
            let size_word = size.split_whitespace().next().unwrap_or("").to_lowercase();
            format!("{breed}: {size_word}")
        }
        _ => breed,
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Coinsurance rule codes: 1 carries the 20% co-pay, 2 does not. Any other
/// code leaves the dimension unresolved.
pub fn copay_label(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("yes"),
        2 => Some("no"),
        _ => None,
    }
}

pub fn neutered_gender_label(gender: &str, neutered: bool) -> String {
    format!("{}: {}", gender.trim().to_lowercase(), yes_no(neutered))
}

pub fn pet_age_gender_label(gender: &str, months: i32) -> Option<String> {
    let coarse = pet_age_coarse_band(months)?;
    Some(format!("{}: {}", gender.trim().to_lowercase(), coarse))
}

fn collapse(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
