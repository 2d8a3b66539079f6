//! Single-quote rate lookup backing the premium-calculator surface: given a
//! pet's headline attributes, surface the base rate, cover limit, and the
//! two age-driven factors. Missing entries stay `None` — the calculator
//! never substitutes a neutral 1.0 for a hole in the card.

use serde::{Deserialize, Serialize};

use crate::domain::{Factor, PetType};
use crate::ratecard::RateTable;

#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorRequest<'a> {
    pub pet_type: PetType,
    pub scheme: &'a str,
    pub gender: &'a str,
    /// Coarse age bucket label (`1–50`, `51–100`, `101+`).
    pub coarse_age: &'a str,
    /// Fine-grained monthly age band label.
    pub age_band: &'a str,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculatorQuote {
    pub base_rate: Option<f64>,
    pub limit: Option<f64>,
    pub pet_age_gender_rate: Option<f64>,
    pub pet_age_rate: Option<f64>,
}

pub fn quote(table: &RateTable, request: &CalculatorRequest<'_>) -> CalculatorQuote {
    let scheme = crate::domain::normalize_scheme(request.scheme);
    let age_gender =
        format!("{}: {}", request.gender.trim().to_lowercase(), request.coarse_age.trim());

    CalculatorQuote {
        base_rate: table.rate(request.pet_type, &scheme, Factor::BaseRate, None),
        limit: table.limit(request.pet_type, &scheme),
        pet_age_gender_rate: table.rate(
            request.pet_type,
            &scheme,
            Factor::PetAgeGender,
            Some(&age_gender),
        ),
        pet_age_rate: table.rate(
            request.pet_type,
            &scheme,
            Factor::PetAge,
            Some(request.age_band.trim()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{Factor, PetType, RateEntry, RateKey};
    use crate::ratecard::RateTable;

    use super::{quote, CalculatorRequest};

    fn entry(factor: Factor, option: Option<&str>, rate: f64) -> RateEntry {
        RateEntry {
            key: RateKey {
                pet_type: PetType::Dog,
                scheme: "silver".to_string(),
                factor,
                option: option.map(str::to_string),
            },
            rate,
            limit: 3000.0,
        }
    }

    #[test]
    fn resolves_rates_and_limit_for_a_quote() {
        let table = RateTable::from_entries(vec![
            entry(Factor::BaseRate, None, 1.4),
            entry(Factor::PetAgeGender, Some("female: 1–50"), 0.95),
            entry(Factor::PetAge, Some("12"), 1.05),
        ]);

        let result = quote(
            &table,
            &CalculatorRequest {
                pet_type: PetType::Dog,
                scheme: "Silver",
                gender: "Female",
                coarse_age: "1–50",
                age_band: "12",
            },
        );

        assert_eq!(result.base_rate, Some(1.4));
        assert_eq!(result.limit, Some(3000.0));
        assert_eq!(result.pet_age_gender_rate, Some(0.95));
        assert_eq!(result.pet_age_rate, Some(1.05));
    }

    #[test]
    fn missing_entries_stay_none() {
        let table = RateTable::from_entries(vec![entry(Factor::BaseRate, None, 1.4)]);

        let result = quote(
            &table,
            &CalculatorRequest {
                pet_type: PetType::Cat,
                scheme: "silver",
                gender: "male",
                coarse_age: "101+",
                age_band: "241+",
            },
        );

        assert_eq!(result.base_rate, None);
        assert_eq!(result.limit, None);
        assert_eq!(result.pet_age_gender_rate, None);
        assert_eq!(result.pet_age_rate, None);
    }
}
