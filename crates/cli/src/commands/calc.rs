use std::str::FromStr;

use serde_json::json;

use petrate_core::domain::PetType;
use petrate_core::rating::{quote, CalculatorRequest};
use petrate_db::{connect_with_settings, RateStore, SqlRateStore};

use super::{load_config, runtime, CommandResult};

pub fn run(
    pet_type: &str,
    scheme: &str,
    gender: &str,
    coarse_age: &str,
    age_band: &str,
) -> CommandResult {
    let pet_type = match PetType::from_str(pet_type) {
        Ok(pet_type) => pet_type,
        Err(error) => {
            return CommandResult::failure("calc", "bad_argument", error.to_string(), 2);
        }
    };

    let config = match load_config("calc") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match runtime("calc") {
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

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(table)
    });

    match result {
        Ok(table) => {
            let resolved = quote(
                &table,
                &CalculatorRequest { pet_type, scheme, gender, coarse_age, age_band },
            );
            CommandResult::report(json!({
                "command": "calc",
                "status": "ok",
                "pet_type": pet_type.as_str(),
                "scheme": scheme,
                "base_rate": resolved.base_rate,
                "limit": resolved.limit,
                "pet_age_gender_rate": resolved.pet_age_gender_rate,
                "pet_age_rate": resolved.pet_age_rate,
            }))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("calc", error_class, message, exit_code)
        }
    }
}
