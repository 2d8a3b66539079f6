//! Rate-card refresh: read one CSV per sheet, run the structural parser for
//! every factor, fold the results into one nested table, and atomically
//! replace the persisted rate set. A structural failure on any sheet aborts
//! the refresh before anything is written.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use petrate_core::ratecard::{parse_factor_sheet, sheet_names, NestedRateTable, Sheet, SHEET_SPECS};
use petrate_db::{connect_with_settings, migrations, RateStore, SqlRateStore};

use super::{load_config, runtime, CommandResult};

pub fn run(dir: &Path) -> CommandResult {
    let config = match load_config("refresh-rates") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let mut sheets: HashMap<&'static str, Sheet> = HashMap::new();
    for name in sheet_names() {
        let path = dir.join(format!("{name}.csv"));
        match load_sheet(&path, name) {
            Ok(sheet) => {
                sheets.insert(name, sheet);
            }
            Err(error) => {
                return CommandResult::failure(
                    "refresh-rates",
                    "rate_source",
                    format!("could not read sheet `{}`: {error}", path.display()),
                    6,
                );
            }
        }
    }

    let mut combined = NestedRateTable::new();
    for spec in SHEET_SPECS {
        let sheet = &sheets[spec.sheet];
        let rows = match parse_factor_sheet(sheet, spec, &config.rating.cover_limits) {
            Ok(rows) => rows,
            Err(error) => {
                return CommandResult::failure(
                    "refresh-rates",
                    "structural_parse",
                    error.to_string(),
                    6,
                );
            }
        };
        combined.merge(NestedRateTable::from_rows(rows, spec.factor));
    }

    let entries = combined.flatten(&config.rating.cover_limits);
    info!(entries = entries.len(), "parsed rate card");

    let runtime = match runtime("refresh-rates") {
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

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        SqlRateStore::new(pool.clone())
            .replace_all(&entries)
            .await
            .map_err(|error| ("rate_store_replace", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<(), (&'static str, String, u8)>(())
    });

    match result {
        Ok(()) => CommandResult::success(
            "refresh-rates",
            format!("replaced rate table with {} entries", entries.len()),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("refresh-rates", error_class, message, exit_code)
        }
    }
}

/// One sheet per CSV file, every cell a string; blank cells become empty.
fn load_sheet(path: &Path, name: &str) -> Result<Sheet, csv::Error> {
    let mut reader =
        csv::ReaderBuilder::new().has_headers(false).flexible(true).from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| {
                    let cell = cell.trim();
                    (!cell.is_empty()).then(|| cell.to_string())
                })
                .collect(),
        );
    }
    Ok(Sheet::new(name, rows))
}
