use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Factor, PetType};

/// One fully-banded row per (policy, transaction, insured pet). Built fresh
/// on every re-rating pass; never persisted.
///
/// Dimensions whose derivation can fail (age bands outside the label set,
/// a postcode with no leading letters, an unknown co-pay code) are `Option`
/// so the unresolved state survives to the engine instead of collapsing to
/// a lookalike label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyFact {
    pub policy_number: String,
    pub adjustment_number: i32,
    pub pet_name: String,
    pub pet_type: PetType,
    pub scheme: String,
    pub effective_date: NaiveDate,
    /// `YYYY-MM` label of the transaction's effective date.
    pub inception_month: String,
    /// Written premium for the whole transaction.
    pub transaction_gwp: f64,
    /// Share of `transaction_gwp` allocated to this pet.
    pub gwp_per_pet: f64,

    pub breed: String,
    pub pet_age: Option<String>,
    pub pet_age_gender: Option<String>,
    pub pet_price: Option<String>,
    pub neutered_gender: String,
    pub chipped: String,
    pub vaccinations: String,
    pub pre_existing: String,
    pub aggressive: String,
    pub is_pet_yours: String,
    pub postcode: Option<String>,
    pub uk_resident: String,
    pub kept_at_address: String,
    pub trade_business: String,
    pub ph_age: Option<String>,
    pub copay: Option<String>,
    pub multipet: String,
}

impl PolicyFact {
    /// The derived option label for a generic rating dimension, `None` when
    /// the band could not be derived from the raw attributes.
    pub fn dimension_label(&self, factor: Factor) -> Option<&str> {
        match factor {
            Factor::PetAgeGender => self.pet_age_gender.as_deref(),
            Factor::PetAge => self.pet_age.as_deref(),
            Factor::PetPrice => self.pet_price.as_deref(),
            Factor::NeuteredGender => Some(&self.neutered_gender),
            Factor::Chipped => Some(&self.chipped),
            Factor::Vaccinations => Some(&self.vaccinations),
            Factor::PreExisting => Some(&self.pre_existing),
            Factor::Aggressive => Some(&self.aggressive),
            Factor::IsPetYours => Some(&self.is_pet_yours),
            Factor::Postcode => self.postcode.as_deref(),
            Factor::UkResident => Some(&self.uk_resident),
            Factor::KeptAtAddress => Some(&self.kept_at_address),
            Factor::TradeBusiness => Some(&self.trade_business),
            Factor::PhAge => self.ph_age.as_deref(),
            Factor::Copay => self.copay.as_deref(),
            Factor::Multipet => Some(&self.multipet),
            Factor::BaseRate | Factor::DogBreed | Factor::CatBreed => None,
        }
    }

    pub fn group_key(&self) -> (String, i32) {
        (self.policy_number.clone(), self.adjustment_number)
    }
}

/// Resolution of one factor for one fact row. `rate = None` means no
/// matching rate-card entry (or no derivable option label).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactorResolution {
    pub factor: Factor,
    pub option: Option<String>,
    pub rate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatedFact {
    pub fact: PolicyFact,
    /// Base rate, breed factor, then the 16 generic dimensions.
    pub resolutions: Vec<FactorResolution>,
    /// Strict product of all resolved factors; `None` as soon as any factor
    /// is unresolved.
    pub re_rated_premium: Option<f64>,
    /// True when any resolved factor carries the decline sentinel.
    pub decline: bool,
}

impl RatedFact {
    pub fn decline_flag(&self) -> &'static str {
        if self.decline {
            "Y"
        } else {
            "N"
        }
    }

    pub fn is_fully_rated(&self) -> bool {
        self.re_rated_premium.is_some()
    }
}

/// Per-(policy, adjustment) aggregate of the re-rating pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyPremium {
    pub policy_number: String,
    pub adjustment_number: i32,
    pub actual_gwp: f64,
    pub re_rated_premium: Option<f64>,
}

/// Actual vs re-rated totals for one inception month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub inception_month: String,
    pub actual_total: f64,
    pub re_rated_total: f64,
    /// `re_rated_total / actual_total - 1`, zero when the actual is zero.
    pub rate_change: f64,
}
