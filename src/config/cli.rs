use crate::adapters::telegram::DEFAULT_API_BASE_URL;
use crate::adapters::wkhtmltopdf::DEFAULT_BINARY;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Parser)]
#[command(name = "rx-doc-bot")]
#[command(about = "Telegram bot that turns prescription JSON into a PDF document")]
pub struct CliConfig {
    /// Bot API token from @BotFather
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, required_unless_present = "config")]
    pub token: Option<String>,

    #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Long-poll wait in seconds
    #[arg(long, default_value = "60")]
    pub poll_timeout: u64,

    #[arg(long, env = "WKHTMLTOPDF_PATH", default_value = DEFAULT_BINARY)]
    pub wkhtmltopdf: String,

    /// Extra option passed to wkhtmltopdf (repeatable)
    #[arg(long = "converter-arg", allow_hyphen_values = true)]
    pub converter_args: Vec<String>,

    /// Upper bound for a single PDF conversion in seconds
    #[arg(long, default_value = "60")]
    pub conversion_timeout: u64,

    /// TOML configuration file; replaces the options above when given
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory after each message")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn bot_token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout)
    }

    fn converter_binary(&self) -> &str {
        &self.wkhtmltopdf
    }

    fn converter_args(&self) -> &[String] {
        &self.converter_args
    }

    fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout)
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitor
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        super::validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = CliConfig::try_parse_from(["rx-doc-bot", "--token", "123:abc"]).unwrap();

        assert_eq!(config.bot_token(), "123:abc");
        assert_eq!(config.poll_timeout(), Duration::from_secs(60));
        assert_eq!(config.conversion_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_converter_args_repeatable() {
        let config = CliConfig::try_parse_from([
            "rx-doc-bot",
            "--token",
            "123:abc",
            "--converter-arg",
            "--page-size",
            "--converter-arg",
            "A5",
        ])
        .unwrap();
        assert_eq!(config.converter_args(), ["--page-size", "A5"]);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let config = CliConfig::try_parse_from([
            "rx-doc-bot",
            "--token",
            "123:abc",
            "--conversion-timeout",
            "0",
        ])
        .unwrap();
        assert!(config.validate().is_err());

        let config = CliConfig::try_parse_from(["rx-doc-bot", "--token", "garbage"]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_makes_token_optional() {
        let config = CliConfig::try_parse_from(["rx-doc-bot", "--config", "bot.toml"]).unwrap();
        assert_eq!(config.config, Some(PathBuf::from("bot.toml")));
    }
}
