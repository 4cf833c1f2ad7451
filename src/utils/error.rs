use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Payload decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid issue date '{value}': {reason}")]
    DateParse { value: String, reason: String },

    #[error("Invalid expiration period '{value}': {reason}")]
    PeriodFormat { value: String, reason: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Document conversion failed: {message}")]
    Conversion { message: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("Telegram API call '{method}' failed ({code:?}): {description}")]
    Api {
        method: String,
        code: Option<i64>,
        description: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Rendering,
    Conversion,
    Transport,
    Configuration,
}

impl BotError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BotError::Decode(_) | BotError::DateParse { .. } | BotError::PeriodFormat { .. } => {
                ErrorCategory::Input
            }
            BotError::Template { .. } => ErrorCategory::Rendering,
            BotError::Conversion { .. } | BotError::Timeout { .. } | BotError::Io(_) => {
                ErrorCategory::Conversion
            }
            BotError::Http(_) | BotError::Api { .. } => ErrorCategory::Transport,
            BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// Reply text shown to the chat user when processing of their message stops.
    pub fn user_friendly_message(&self) -> &'static str {
        match self {
            BotError::Decode(_) => {
                "Ошибка в формате данных. Пожалуйста, отправьте корректный JSON."
            }
            BotError::DateParse { .. } => {
                "Не удалось разобрать дату выдачи. Используйте формат ДД.ММ.ГГГГ."
            }
            BotError::PeriodFormat { .. } => {
                "Не удалось определить срок действия. Поле ExpPeriod должно начинаться с числа дней."
            }
            BotError::Template { .. } => "Не удалось сформировать документ рецепта.",
            BotError::Conversion { .. } | BotError::Timeout { .. } | BotError::Io(_) => {
                "Не удалось создать PDF. Попробуйте позже."
            }
            BotError::Http(_) | BotError::Api { .. } => "Ошибка связи с сервером Telegram.",
            BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. } => "Бот настроен неправильно.",
        }
    }
}

// Request URLs carry the bot token, so they never reach the error text.
impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Http(err.without_url())
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = BotError::PeriodFormat {
            value: "abc".to_string(),
            reason: "not a number".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);

        let err = BotError::Timeout {
            operation: "wkhtmltopdf".to_string(),
            seconds: 5,
        };
        assert_eq!(err.category(), ErrorCategory::Conversion);
        assert_eq!(err.to_string(), "wkhtmltopdf timed out after 5s");
    }

    #[test]
    fn test_decode_message_matches_invalid_format_reply() {
        let err: BotError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(
            err.user_friendly_message(),
            "Ошибка в формате данных. Пожалуйста, отправьте корректный JSON."
        );
    }
}
