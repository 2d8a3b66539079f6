pub mod fact;
pub mod source;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rate assigned to an option the underwriter refuses to quote.
pub const DECLINE_RATE: f64 = 999.0;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown pet type `{0}` (expected dog|cat)")]
    UnknownPetType(String),
    #[error("unknown rating factor `{0}`")]
    UnknownFactor(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Dog,
    Cat,
}

impl PetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
        }
    }

    /// Breed rates are stored per species under their own factor name.
    pub fn breed_factor(self) -> Factor {
        match self {
            Self::Dog => Factor::DogBreed,
            Self::Cat => Factor::CatBreed,
        }
    }
}

impl fmt::Display for PetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dog" => Ok(Self::Dog),
            "cat" => Ok(Self::Cat),
            other => Err(DomainError::UnknownPetType(other.to_string())),
        }
    }
}

/// The closed list of rating factors carried by the rate card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    BaseRate,
    PetAgeGender,
    PetAge,
    PetPrice,
    NeuteredGender,
    Chipped,
    Vaccinations,
    PreExisting,
    Aggressive,
    IsPetYours,
    Postcode,
    UkResident,
    KeptAtAddress,
    TradeBusiness,
    PhAge,
    Copay,
    Multipet,
    DogBreed,
    CatBreed,
}

/// The 16 dimensions resolved by a plain `(pet_type, scheme, factor, option)`
/// lookup. Base rate (no option) and the per-species breed factors are
/// resolved separately by the engine.
pub const GENERIC_DIMENSIONS: [Factor; 16] = [
    Factor::PetAgeGender,
    Factor::PetAge,
    Factor::PetPrice,
    Factor::NeuteredGender,
    Factor::Chipped,
    Factor::Vaccinations,
    Factor::PreExisting,
    Factor::Aggressive,
    Factor::IsPetYours,
    Factor::Postcode,
    Factor::UkResident,
    Factor::KeptAtAddress,
    Factor::TradeBusiness,
    Factor::PhAge,
    Factor::Copay,
    Factor::Multipet,
];

impl Factor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BaseRate => "base_rate",
            Self::PetAgeGender => "pet_age_gender",
            Self::PetAge => "pet_age",
            Self::PetPrice => "pet_price",
            Self::NeuteredGender => "neutered_gender",
            Self::Chipped => "chipped",
            Self::Vaccinations => "vaccinations",
            Self::PreExisting => "pre_existing",
            Self::Aggressive => "aggressive",
            Self::IsPetYours => "is_pet_yours",
            Self::Postcode => "postcode",
            Self::UkResident => "uk_resident",
            Self::KeptAtAddress => "kept_at_address",
            Self::TradeBusiness => "trade_business",
            Self::PhAge => "ph_age",
            Self::Copay => "copay",
            Self::Multipet => "multipet",
            Self::DogBreed => "dog_breed",
            Self::CatBreed => "cat_breed",
        }
    }

    pub fn is_breed(self) -> bool {
        matches!(self, Self::DogBreed | Self::CatBreed)
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Factor {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base_rate" => Ok(Self::BaseRate),
            "pet_age_gender" => Ok(Self::PetAgeGender),
            "pet_age" => Ok(Self::PetAge),
            "pet_price" => Ok(Self::PetPrice),
            "neutered_gender" => Ok(Self::NeuteredGender),
            "chipped" => Ok(Self::Chipped),
            "vaccinations" => Ok(Self::Vaccinations),
            "pre_existing" => Ok(Self::PreExisting),
            "aggressive" => Ok(Self::Aggressive),
            "is_pet_yours" => Ok(Self::IsPetYours),
            "postcode" => Ok(Self::Postcode),
            "uk_resident" => Ok(Self::UkResident),
            "kept_at_address" => Ok(Self::KeptAtAddress),
            "trade_business" => Ok(Self::TradeBusiness),
            "ph_age" => Ok(Self::PhAge),
            "copay" => Ok(Self::Copay),
            "multipet" => Ok(Self::Multipet),
            "dog_breed" => Ok(Self::DogBreed),
            "cat_breed" => Ok(Self::CatBreed),
            other => Err(DomainError::UnknownFactor(other.to_string())),
        }
    }
}

/// Canonical scheme key: lower-cased, spaces collapsed to underscores, so
/// the sheet's "Premier Plus" and the stored `premier_plus` agree.
pub fn normalize_scheme(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Identity of one rate-card cell after normalization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateKey {
    pub pet_type: PetType,
    pub scheme: String,
    pub factor: Factor,
    pub option: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    #[serde(flatten)]
    pub key: RateKey,
    pub rate: f64,
    pub limit: f64,
}

/// Monthly pet-age bands: singleton months up to 23, then widening ranges.
pub const PET_AGE_ORDER: [&str; 61] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16",
    "17", "18", "19", "20", "21", "22", "23", "24–28", "29–31", "32–34", "35–37", "38–40", "41–43",
    "44–46", "47–48", "49–54", "55–60", "61–66", "67–72", "73–78", "79–84", "85–90", "91–96",
    "97–102", "103–108", "109–114", "115–120", "121–126", "127–132", "133–138", "139–144",
    "145–150", "151–156", "157–162", "163–168", "169–174", "175–180", "181–186", "187–192",
    "193–204", "205–216", "217–228", "229–240", "241+",
];

pub const PH_AGE_ORDER: [&str; 9] = [
    "0 - 19.999",
    "20 - 29.999",
    "30 - 39.999",
    "40 - 49.999",
    "50 - 59.999",
    "60 - 69.999",
    "70 - 79.999",
    "80 - 89.999",
    "90 and over",
];

pub const PET_PRICE_ORDER: [&str; 6] =
    ["£0–£75", "£76–£150", "£151–£300", "£301–£600", "£601–£1,200", "£1,201+"];

pub const PET_AGE_GENDER_ORDER: [&str; 6] = [
    "female: 1–50",
    "female: 51–100",
    "female: 101+",
    "male: 1–50",
    "male: 51–100",
    "male: 101+",
];

/// Sort a factor's option labels into display order: the banded factors use
/// their fixed domain ordering, everything else sorts alphabetically.
/// Unrecognized labels sink to the end.
pub fn sort_options(factor: Factor, options: &mut [String]) {
    let order: Option<&[&str]> = match factor {
        Factor::PetAge => Some(&PET_AGE_ORDER),
        Factor::PhAge => Some(&PH_AGE_ORDER),
        Factor::PetPrice => Some(&PET_PRICE_ORDER),
        Factor::PetAgeGender => Some(&PET_AGE_GENDER_ORDER),
        _ => None,
    };

    match order {
        Some(order) => options.sort_by_key(|option| {
            order.iter().position(|label| label == option).unwrap_or(usize::MAX)
        }),
        None => options.sort(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{normalize_scheme, sort_options, Factor, PetType, GENERIC_DIMENSIONS};

    #[test]
    fn factor_names_round_trip() {
        for factor in GENERIC_DIMENSIONS {
            assert_eq!(Factor::from_str(factor.as_str()).expect("round trip"), factor);
        }
        assert_eq!(Factor::from_str("dog_breed").expect("dog breed"), Factor::DogBreed);
        assert_eq!(Factor::from_str("base_rate").expect("base rate"), Factor::BaseRate);
    }

    #[test]
    fn breed_factor_is_chosen_by_pet_type() {
        assert_eq!(PetType::Dog.breed_factor(), Factor::DogBreed);
        assert_eq!(PetType::Cat.breed_factor(), Factor::CatBreed);
    }

    #[test]
    fn scheme_names_normalize_to_stored_keys() {
        assert_eq!(normalize_scheme("Premier Plus"), "premier_plus");
        assert_eq!(normalize_scheme("  Bronze "), "bronze");
    }

    #[test]
    fn banded_options_sort_by_domain_order() {
        let mut options =
            vec!["24–28".to_string(), "3".to_string(), "241+".to_string(), "0".to_string()];
        sort_options(Factor::PetAge, &mut options);
        assert_eq!(options, vec!["0", "3", "24–28", "241+"]);

        let mut unknown = vec!["zz".to_string(), "aa".to_string()];
        sort_options(Factor::Postcode, &mut unknown);
        assert_eq!(unknown, vec!["aa", "zz"]);
    }
}
