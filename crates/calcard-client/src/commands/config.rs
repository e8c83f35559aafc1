//! Configuration commands.

use calcard_core::EventRules;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    println!("{}", dump_string(config)?);
    Ok(())
}

fn dump_string(config: &ClientConfig) -> ClientResult<String> {
    let mut redacted = config.clone();
    if let Some(ref mut ha) = redacted.homeassistant {
        if !ha.token.starts_with("env::") && !ha.token.starts_with("pass::") {
            ha.token = "<redacted>".to_string();
        }
    }
    let toml_str = toml::to_string_pretty(&redacted)
        .map_err(|e| ClientError::config(format!("failed to serialize config: {}", e)))?;
    Ok(format!(
        "# config.toml ({})\n{}",
        ClientConfig::default_path().display(),
        toml_str
    ))
}

/// Validate the configuration: card options, expressions and token.
pub fn check(config: &ClientConfig) -> ClientResult<()> {
    validate(config)?;
    println!(
        "Configuration is valid ({} calendar(s)).",
        config.card.entities.len()
    );
    Ok(())
}

fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.card.validate()?;
    EventRules::from_config(&config.card)?;
    let provider = config.provider_config()?;
    if !provider.has_token() {
        return Err(ClientError::config("Home Assistant token is empty"));
    }
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}
