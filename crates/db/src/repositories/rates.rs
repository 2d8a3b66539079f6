use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};
use tracing::info;

use petrate_core::domain::{sort_options, Factor, PetType, RateKey};
use petrate_core::{RateEntry, RateTable};

use super::{RateStore, RepositoryError};
use crate::DbPool;

pub struct SqlRateStore {
    pool: DbPool,
}

impl SqlRateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn entry_from_row(row: &SqliteRow) -> Result<RateEntry, RepositoryError> {
        let pet_type: String = row.try_get("pet_type")?;
        let pet_type = PetType::from_str(&pet_type)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let factor: String = row.try_get("factor")?;
        let factor = Factor::from_str(&factor)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        Ok(RateEntry {
            key: RateKey {
                pet_type,
                scheme: row.try_get("scheme")?,
                factor,
                option: row.try_get("option")?,
            },
            rate: row.try_get("rate")?,
            limit: row.try_get("cover_limit")?,
        })
    }
}

#[async_trait]
impl RateStore for SqlRateStore {
    async fn replace_all(&self, entries: &[RateEntry]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM pet_rates").execute(&mut *tx).await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO pet_rates (pet_type, scheme, factor, option, rate, cover_limit)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(entry.key.pet_type.as_str())
            .bind(&entry.key.scheme)
            .bind(entry.key.factor.as_str())
            .bind(entry.key.option.as_deref())
            .bind(entry.rate)
            .bind(entry.limit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(entries = entries.len(), "replaced rate table");
        Ok(())
    }

    async fn load_table(&self) -> Result<RateTable, RepositoryError> {
        let rows = sqlx::query(
            "SELECT pet_type, scheme, factor, option, rate, cover_limit FROM pet_rates",
        )
        .fetch_all(&self.pool)
        .await?;

        let entries =
            rows.iter().map(Self::entry_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(RateTable::from_entries(entries))
    }

    async fn factor_entries(&self, factor: Factor) -> Result<Vec<RateEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT pet_type, scheme, factor, option, rate, cover_limit
             FROM pet_rates
             WHERE factor = ?
             ORDER BY pet_type, scheme, option",
        )
        .bind(factor.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::entry_from_row).collect()
    }

    async fn factor_options(&self, factor: Factor) -> Result<Vec<String>, RepositoryError> {
        let mut options: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT option FROM pet_rates WHERE factor = ? AND option IS NOT NULL",
        )
        .bind(factor.as_str())
        .fetch_all(&self.pool)
        .await?;

        sort_options(factor, &mut options);
        Ok(options)
    }
}
