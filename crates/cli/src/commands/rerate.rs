//! One full re-rating pass: load the rate table and the policy book,
//! assemble and band the facts, rate every row, and report the monthly
//! actual-vs-re-rated comparison. Partially unrateable rows degrade to a
//! null premium; a wholesale load failure aborts the pass.

use serde_json::json;

use petrate_core::rating::{assemble_facts, filter_rated, monthly_summary, policy_premiums, rate_all};
use petrate_db::{connect_with_settings, PolicySource, RateStore, SqlPolicySource, SqlRateStore};

use super::{load_config, runtime, CommandResult};

pub fn run(copay: &str, month: Option<&str>, include_declines: bool, full: bool) -> CommandResult {
    if !matches!(copay, "yes" | "no" | "*") {
        return CommandResult::failure(
            "rerate",
            "bad_argument",
            format!("--copay must be yes, no or * (got `{copay}`)"),
            2,
        );
    }

    let config = match load_config("rerate") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match runtime("rerate") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let table = SqlRateStore::new(pool.clone())
            .load_table()
            .await
            .map_err(|error| ("rate_table", error.to_string(), 5u8))?;

        let book = SqlPolicySource::new(pool.clone())
            .load_book()
            .await
            .map_err(|error| ("policy_source", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>((table, book))
    });

    let (table, book) = match result {
        Ok(loaded) => loaded,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("rerate", error_class, message, exit_code);
        }
    };

    let facts = assemble_facts(&book, config.rating.year_floor);
    let rated = rate_all(&table, &facts);
    let total_rows = rated.len();
    let rated = filter_rated(rated, Some(copay), month, include_declines);

    let unrated = rated.iter().filter(|row| !row.is_fully_rated()).count();
    let declined = rated.iter().filter(|row| row.decline).count();
    let premiums = policy_premiums(&rated);
    let summary = monthly_summary(&rated);

    let mut report = json!({
        "command": "rerate",
        "status": "ok",
        "rate_entries": table.len(),
        "facts": facts.len(),
        "rows_before_filters": total_rows,
        "rows": rated.len(),
        "unrated_rows": unrated,
        "declined_rows": declined,
        "policies": premiums.len(),
        "monthly_summary": summary,
    });

    if full {
        let rows: Vec<_> = rated
            .iter()
            .map(|row| {
                json!({
                    "policy_number": row.fact.policy_number,
                    "adjustment_number": row.fact.adjustment_number,
                    "pet_name": row.fact.pet_name,
                    "pet_type": row.fact.pet_type.as_str(),
                    "scheme": row.fact.scheme,
                    "inception_month": row.fact.inception_month,
                    "gwp_per_pet": row.fact.gwp_per_pet,
                    "re_rated_premium": row.re_rated_premium,
                    "decline_flag": row.decline_flag(),
                })
            })
            .collect();
        report["rated_rows"] = json!(rows);
    }

    CommandResult::report(report)
}
