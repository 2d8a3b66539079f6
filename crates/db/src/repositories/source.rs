use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row};
use tracing::info;

use petrate_core::domain::source::{
    AddressRow, CodedValue, PetRow, PolicyBook, PolicyRow, PolicyTransactionRow,
    PremiumCommentRow, ProposerRow, RiskRow, TransactionTypeRow,
};

use super::{PolicySource, RepositoryError};
use crate::DbPool;

pub struct SqlPolicySource {
    pool: DbPool,
}

impl SqlPolicySource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn transaction_from_row(row: &SqliteRow) -> Result<PolicyTransactionRow, RepositoryError> {
        Ok(PolicyTransactionRow {
            policy_history_id: row.try_get("policy_history_id")?,
            policy_master_id: row.try_get("policy_master_id")?,
            risk_id: row.try_get("risk_id")?,
            adjustment_number: row.try_get("adjustment_number")?,
            effective_date: row.try_get::<NaiveDate, _>("effective_date")?,
            transaction_type_id: row.try_get("transaction_type_id")?,
            gwp: row.try_get("gwp")?,
        })
    }

    fn pet_from_row(row: &SqliteRow) -> Result<PetRow, RepositoryError> {
        Ok(PetRow {
            pet_risk_pet_id: row.try_get("pet_risk_pet_id")?,
            risk_id: row.try_get("risk_id")?,
            pet_number: row.try_get("pet_number")?,
            name: row.try_get("name")?,
            sub_type_code: row.try_get("sub_type_code")?,
            breed_code: row.try_get("breed_code")?,
            size_code: row.try_get("size_code")?,
            gender_code: row.try_get("gender_code")?,
            neutered: row.try_get("has_been_neutered")?,
            chipped: row.try_get("has_been_chipped")?,
            vaccinations: row.try_get("has_vaccinations")?,
            pre_existing: row.try_get("has_pre_existing_conditions")?,
            aggressive: row.try_get("has_aggressive_history")?,
            is_pet_yours: row.try_get("is_pet_yours")?,
            cost_of_pet: row.try_get("cost_of_pet")?,
            date_of_birth: row.try_get::<NaiveDate, _>("date_of_birth")?,
        })
    }
}

#[async_trait]
impl PolicySource for SqlPolicySource {
    async fn load_book(&self) -> Result<PolicyBook, RepositoryError> {
        let policies = sqlx::query("SELECT policy_master_id, policy_number FROM policy_master")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| {
                Ok(PolicyRow {
                    policy_master_id: row.try_get("policy_master_id")?,
                    policy_number: row.try_get("policy_number")?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let transactions = sqlx::query(
            "SELECT policy_history_id, policy_master_id, risk_id, adjustment_number,
                    effective_date, transaction_type_id, gwp
             FROM policy_history",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(Self::transaction_from_row)
        .collect::<Result<Vec<_>, _>>()?;

        let transaction_types =
            sqlx::query("SELECT transaction_type_id, name FROM transaction_type")
                .fetch_all(&self.pool)
                .await?
                .iter()
                .map(|row| {
                    Ok(TransactionTypeRow {
                        transaction_type_id: row.try_get("transaction_type_id")?,
                        name: row.try_get("name")?,
                    })
                })
                .collect::<Result<Vec<_>, RepositoryError>>()?;

        let risks =
            sqlx::query("SELECT risk_id, proposer_id, cover_level_code, copay_code FROM risk")
                .fetch_all(&self.pool)
                .await?
                .iter()
                .map(|row| {
                    Ok(RiskRow {
                        risk_id: row.try_get("risk_id")?,
                        proposer_id: row.try_get("proposer_id")?,
                        cover_level_code: row.try_get("cover_level_code")?,
                        copay_code: row.try_get("copay_code")?,
                    })
                })
                .collect::<Result<Vec<_>, RepositoryError>>()?;

        let pets = sqlx::query(
            "SELECT pet_risk_pet_id, risk_id, pet_number, name, sub_type_code, breed_code,
                    size_code, gender_code, has_been_neutered, has_been_chipped,
                    has_vaccinations, has_pre_existing_conditions, has_aggressive_history,
                    is_pet_yours, cost_of_pet, date_of_birth
             FROM pet_risk_pet",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(Self::pet_from_row)
        .collect::<Result<Vec<_>, _>>()?;

        let proposers = sqlx::query(
            "SELECT proposer_id, address_id, date_of_birth, uk_resident, kept_at_address,
                    trade_business
             FROM proposer",
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(ProposerRow {
                proposer_id: row.try_get("proposer_id")?,
                address_id: row.try_get("address_id")?,
                date_of_birth: row.try_get::<NaiveDate, _>("date_of_birth")?,
                uk_resident: row.try_get("uk_resident")?,
                kept_at_address: row.try_get("kept_at_address")?,
                trade_business: row.try_get("trade_business")?,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

        let addresses = sqlx::query("SELECT address_id, postcode FROM address")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| {
                Ok(AddressRow {
                    address_id: row.try_get("address_id")?,
                    postcode: row.try_get("postcode")?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let coded_values = sqlx::query("SELECT code, label FROM coded_value")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| {
                Ok(CodedValue { code: row.try_get("code")?, label: row.try_get("label")? })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let premium_comments =
            sqlx::query("SELECT policy_history_id, comment FROM premium_comment")
                .fetch_all(&self.pool)
                .await?
                .iter()
                .map(|row| {
                    Ok(PremiumCommentRow {
                        policy_history_id: row.try_get("policy_history_id")?,
                        comment: row.try_get("comment")?,
                    })
                })
                .collect::<Result<Vec<_>, RepositoryError>>()?;

        let book = PolicyBook {
            policies,
            transactions,
            transaction_types,
            risks,
            pets,
            proposers,
            addresses,
            coded_values,
            premium_comments,
        };
        info!(
            policies = book.policies.len(),
            transactions = book.transactions.len(),
            pets = book.pets.len(),
            "loaded policy book"
        );
        Ok(book)
    }
}
