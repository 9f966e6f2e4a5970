use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;
use tokio::process::Command;
use wiremock::MockServer;

/// An isolated credential location for one test.
pub struct Sandbox {
    _dir: TempDir,
    pub credentials: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let credentials = dir.path().join("credential.json");
        Self {
            _dir: dir,
            credentials,
        }
    }

    /// Write a raw credential file as the CLI would.
    pub fn seed(&self, token: &str) {
        let json = serde_json::json!({
            "token": token,
            "user": { "id": "u1", "name": "Asha" },
            "saved_at": "2026-01-01T00:00:00Z",
        });
        std::fs::write(&self.credentials, json.to_string()).expect("Failed to seed credential");
    }

    /// Token currently on disk, if any.
    pub fn token(&self) -> Option<String> {
        read_field(&self.credentials, "/token")
    }

    /// Id of the user saved next to the token, if any.
    pub fn user_id(&self) -> Option<String> {
        read_field(&self.credentials, "/user/id")
    }
}

fn read_field(path: &Path, pointer: &str) -> Option<String> {
    let json = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&json).ok()?;
    value.pointer(pointer)?.as_str().map(str::to_string)
}

/// Run the CLI binary against `server` with the sandboxed credential file.
pub async fn run_cli(args: &[&str], sandbox: &Sandbox, server: &MockServer) -> Output {
    Command::new(env!("CARGO_BIN_EXE_estatedesk"))
        .args(args)
        .env("ESTATEDESK_API", server.uri())
        .env("ESTATEDESK_CREDENTIALS", &sandbox.credentials)
        .env_remove("ESTATEDESK_PASSWORD")
        .env_remove("RUST_LOG")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub async fn run_cli_success(args: &[&str], sandbox: &Sandbox, server: &MockServer) -> String {
    let output = run_cli(args, sandbox, server).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}
