use std::env;
use std::sync::{Mutex, OnceLock};

use petrate_cli::commands::{calc, migrate, rates, rerate, seed};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("PETRATE_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("PETRATE_DATABASE_URL", "postgres://nope")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(&[("PETRATE_DATABASE_URL", "sqlite::memory:")], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["command"], "seed");
        assert_eq!(first_payload["status"], "ok");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(second_payload["message"], first_payload["message"]);
    });
}

#[test]
fn rerate_rejects_bad_copay_argument() {
    with_env(&[("PETRATE_DATABASE_URL", "sqlite::memory:")], || {
        let result = rerate::run("maybe", None, false, false);
        assert_eq!(result.exit_code, 2, "expected bad-argument failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "rerate");
        assert_eq!(payload["error_class"], "bad_argument");
    });
}

#[test]
fn rerate_fails_cleanly_when_the_schema_is_missing() {
    with_env(&[("PETRATE_DATABASE_URL", "sqlite::memory:")], || {
        // a fresh in-memory database has no pet_rates table, so the pass
        // aborts with a structured load failure instead of a partial run
        let result = rerate::run("*", None, false, false);
        assert_ne!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "rerate");
        assert_eq!(payload["status"], "error");
    });
}

#[test]
fn rates_rejects_unknown_factor_names() {
    with_env(&[], || {
        let result = rates::run("not_a_factor");
        assert_eq!(result.exit_code, 2, "expected bad-argument failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "rates");
        assert_eq!(payload["error_class"], "bad_argument");
    });
}

#[test]
fn calc_rejects_unknown_pet_types() {
    with_env(&[], || {
        let result = calc::run("rabbit", "silver", "female", "1–50", "12");
        assert_eq!(result.exit_code, 2, "expected bad-argument failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "calc");
        assert_eq!(payload["error_class"], "bad_argument");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "PETRATE_DATABASE_URL",
        "PETRATE_DATABASE_MAX_CONNECTIONS",
        "PETRATE_DATABASE_TIMEOUT_SECS",
        "PETRATE_RATING_YEAR_FLOOR",
        "PETRATE_LOGGING_LEVEL",
        "PETRATE_LOGGING_FORMAT",
        "PETRATE_LOG_LEVEL",
        "PETRATE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
