use std::str::FromStr;

use serde_json::json;

use petrate_core::domain::Factor;
use petrate_db::{connect_with_settings, RateStore, SqlRateStore};

use super::{load_config, runtime, CommandResult};

pub fn run(factor: &str) -> CommandResult {
    let factor = match Factor::from_str(factor) {
        Ok(factor) => factor,
        Err(error) => {
            return CommandResult::failure("rates", "bad_argument", error.to_string(), 2);
        }
    };

    let config = match load_config("rates") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match runtime("rates") {
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

        let store = SqlRateStore::new(pool.clone());
        let entries = store
            .factor_entries(factor)
            .await
            .map_err(|error| ("rate_table", error.to_string(), 5u8))?;
        let options = store
            .factor_options(factor)
            .await
            .map_err(|error| ("rate_table", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>((entries, options))
    });

    match result {
        Ok((entries, options)) => {
            let rows: Vec<_> = entries
                .iter()
                .map(|entry| {
                    json!({
                        "pet_type": entry.key.pet_type.as_str(),
                        "scheme": entry.key.scheme,
                        "option": entry.key.option,
                        "rate": entry.rate,
                        "limit": entry.limit,
                    })
                })
                .collect();
            CommandResult::report(json!({
                "command": "rates",
                "status": "ok",
                "factor": factor.as_str(),
                "options": options,
                "entries": rows,
            }))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("rates", error_class, message, exit_code)
        }
    }
}
