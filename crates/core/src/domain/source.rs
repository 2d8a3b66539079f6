//! Plain-row mirrors of the upstream policy-administration schema. The db
//! crate materializes these from SQLite; the fact assembler joins them in
//! memory so the whole rating pass stays pure and testable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyRow {
    pub policy_master_id: i64,
    pub policy_number: String,
}

/// One policy-history transaction: a New Business, Renewal, cancellation or
/// endorsement event with the written premium for the whole policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyTransactionRow {
    pub policy_history_id: i64,
    pub policy_master_id: i64,
    pub risk_id: i64,
    pub adjustment_number: i32,
    pub effective_date: NaiveDate,
    pub transaction_type_id: i64,
    pub gwp: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionTypeRow {
    pub transaction_type_id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskRow {
    pub risk_id: i64,
    pub proposer_id: i64,
    /// Coded cover level, resolved to a scheme name via the coded-value lookup.
    pub cover_level_code: i64,
    /// Coinsurance rule: 1 = 20% co-pay, 2 = none.
    pub copay_code: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PetRow {
    pub pet_risk_pet_id: i64,
    pub risk_id: i64,
    /// Position of the pet on the risk; ranks above 1 mark a multi-pet policy.
    pub pet_number: i32,
    pub name: String,
    pub sub_type_code: i64,
    pub breed_code: i64,
    pub size_code: i64,
    pub gender_code: i64,
    pub neutered: bool,
    pub chipped: bool,
    pub vaccinations: bool,
    pub pre_existing: bool,
    pub aggressive: bool,
    pub is_pet_yours: bool,
    pub cost_of_pet: f64,
    pub date_of_birth: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposerRow {
    pub proposer_id: i64,
    pub address_id: i64,
    pub date_of_birth: NaiveDate,
    pub uk_resident: bool,
    pub kept_at_address: bool,
    pub trade_business: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddressRow {
    pub address_id: i64,
    pub postcode: String,
}

/// Generic list-of-values row resolving coded attributes (cover level,
/// pet subtype, breed, size, gender) to their human labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodedValue {
    pub code: i64,
    pub label: String,
}

/// Free-text transaction comment; the per-pet premium split is recovered
/// from comments shaped like `"<pet name> Belongs to proposer ... £12.34"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PremiumCommentRow {
    pub policy_history_id: i64,
    pub comment: String,
}

/// Everything a re-rating pass reads from the upstream store, fetched once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyBook {
    pub policies: Vec<PolicyRow>,
    pub transactions: Vec<PolicyTransactionRow>,
    pub transaction_types: Vec<TransactionTypeRow>,
    pub risks: Vec<RiskRow>,
    pub pets: Vec<PetRow>,
    pub proposers: Vec<ProposerRow>,
    pub addresses: Vec<AddressRow>,
    pub coded_values: Vec<CodedValue>,
    pub premium_comments: Vec<PremiumCommentRow>,
}

impl PolicyBook {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
