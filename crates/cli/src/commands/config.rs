use serde_json::json;

use petrate_core::config::{AppConfig, LoadOptions, LogFormat};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return serde_json::to_string_pretty(&json!({
                "command": "config",
                "status": "error",
                "message": error.to_string(),
            }))
            .unwrap_or_else(|_| error.to_string());
        }
    };

    let cover_limits: serde_json::Map<String, serde_json::Value> = config
        .rating
        .cover_limits
        .iter()
        .map(|(scheme, limit)| (scheme.to_string(), json!(limit)))
        .collect();

    let payload = json!({
        "command": "config",
        "status": "ok",
        "database": {
            "url": config.database.url,
            "max_connections": config.database.max_connections,
            "timeout_secs": config.database.timeout_secs,
        },
        "rating": {
            "year_floor": config.rating.year_floor,
            "cover_limits": cover_limits,
        },
        "logging": {
            "level": config.logging.level,
            "format": match config.logging.format {
                LogFormat::Compact => "compact",
                LogFormat::Pretty => "pretty",
                LogFormat::Json => "json",
            },
        },
    });

    serde_json::to_string_pretty(&payload).unwrap_or_else(|error| error.to_string())
}
