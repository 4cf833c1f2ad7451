#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_bot_token, validate_non_empty_string, validate_range, validate_url,
};

pub const MAX_POLL_TIMEOUT_SECS: u64 = 300;
pub const MAX_CONVERSION_TIMEOUT_SECS: u64 = 600;

/// Shared checks for every configuration source.
pub fn validate_provider<P: ConfigProvider + ?Sized>(config: &P) -> Result<()> {
    validate_bot_token("telegram.token", config.bot_token())?;
    validate_url("telegram.api_base_url", config.api_base_url())?;
    validate_range(
        "telegram.poll_timeout_seconds",
        config.poll_timeout().as_secs(),
        0,
        MAX_POLL_TIMEOUT_SECS,
    )?;
    validate_non_empty_string("converter.binary", config.converter_binary())?;
    validate_range(
        "converter.timeout_seconds",
        config.conversion_timeout().as_secs(),
        1,
        MAX_CONVERSION_TIMEOUT_SECS,
    )?;
    Ok(())
}
