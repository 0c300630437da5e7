//! Time and user identity helpers

use chrono::Utc;

/// Current time in milliseconds since the Unix epoch
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Detect the current user from git config or OS environment
pub fn get_current_user() -> String {
    use std::env;
    use std::process::Command;

    // Git config first, for project context
    if let Ok(output) = Command::new("git").args(["config", "user.name"]).output() {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }

    env::var("USER") // Linux/Mac
        .or_else(|_| env::var("USERNAME")) // Windows
        .unwrap_or_else(|_| "anonymous".to_string())
}
