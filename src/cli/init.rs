//! Init command implementation
//!
//! Writes a starter `tasker.toml` and `.env.example`.

use super::output::Output;
use std::fs;
use std::path::Path;

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    Success,
    /// tasker.toml already exists and `--force` was not given
    AlreadyExists,
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    pub path: std::path::PathBuf,
    pub force: bool,
    pub host: String,
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Tasker");

    let base_path = &config.path;
    if let Err(e) = fs::create_dir_all(base_path) {
        output.error(&format!("Failed to create {}: {}", base_path.display(), e));
        return InitResult::Error(e.to_string());
    }

    let config_path = base_path.join("tasker.toml");
    if config_path.exists() && !config.force {
        output.warning("tasker.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = write_file(&config_path, &generate_tasker_toml(&config), config.force) {
        output.error(&format!("Failed to create tasker.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "tasker.toml");

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.skipped(".env.example", "already exists");
    } else if let Err(e) = write_file(&env_example_path, generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        output.created("env", ".env.example");
    }

    output.success("Tasker initialized");

    output.header("Next Steps");
    output.newline();
    output.info("1. Set up environment variables:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set JWT_SECRET (min 32 bytes)");
    output.newline();
    output.info("2. Start the server:");
    output.command("tasker-server");

    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_tasker_toml(config: &InitConfig) -> String {
    format!(
        r#"# Tasker configuration
# Secrets are never stored here; each *_env key names an environment variable.

[server]
host = "{host}"
port = {port}
log_level = "info"
# "pretty" or "json"
log_format = "pretty"

[auth]
# Env var holding the token signing secret (at least 32 bytes)
jwt_secret_env = "JWT_SECRET"
token_lifetime_minutes = 60

# Uncomment to create an administrator at startup
# admin_email_env = "TASKER_ADMIN_EMAIL"
# admin_password_env = "TASKER_ADMIN_PASSWORD"
"#,
        host = config.host,
        port = config.port,
    )
}

fn generate_env_example() -> &'static str {
    r#"# Token signing secret, at least 32 bytes
JWT_SECRET=change-me-to-a-long-random-string-of-32-bytes-or-more

# Startup administrator (used only when enabled in tasker.toml)
# TASKER_ADMIN_EMAIL=admin@example.com
# TASKER_ADMIN_PASSWORD=change-me

# Log filter override
# RUST_LOG=tasker=debug,tower_http=debug
"#
}
