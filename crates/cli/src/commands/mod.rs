pub mod calc;
pub mod config;
pub mod migrate;
pub mod rates;
pub mod refresh;
pub mod rerate;
pub mod seed;

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn report(value: serde_json::Value) -> Self {
        let output = serde_json::to_string_pretty(&value)
            .unwrap_or_else(|error| format!("{{\"error\":\"serialization: {error}\"}}"));
        Self { exit_code: 0, output }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Build the current-thread runtime every async command runs on.
pub(crate) fn runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Load configuration the way every command needs it.
pub(crate) fn load_config(command: &str) -> Result<petrate_core::AppConfig, CommandResult> {
    petrate_core::AppConfig::load(petrate_core::LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::CommandResult;

    #[test]
    fn success_payload_is_machine_readable() {
        let result = CommandResult::success("migrate", "applied pending migrations");
        assert_eq!(result.exit_code, 0);
        let payload: serde_json::Value =
            serde_json::from_str(&result.output).expect("valid json");
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    }

    #[test]
    fn failure_payload_carries_error_class_and_exit_code() {
        let result = CommandResult::failure("rerate", "policy_source", "boom", 4);
        assert_eq!(result.exit_code, 4);
        let payload: serde_json::Value =
            serde_json::from_str(&result.output).expect("valid json");
        assert_eq!(payload["error_class"], "policy_source");
        assert_eq!(payload["status"], "error");
    }
}
