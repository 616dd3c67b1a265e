use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

/// JSON envelope printed with `--json`.
#[derive(Debug, Serialize, Clone)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: Some(message.into()),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Error,
            message: Some(message.into()),
            data: Value::Null,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CommandStatus::Error
    }
}
