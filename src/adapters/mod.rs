// Adapters layer: concrete implementations of the domain ports.

pub mod telegram;
pub mod wkhtmltopdf;

pub use telegram::{BotUser, TelegramClient};
pub use wkhtmltopdf::WkhtmltopdfConverter;
