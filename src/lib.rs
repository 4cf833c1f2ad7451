pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::{TelegramClient, WkhtmltopdfConverter};
pub use crate::core::{
    dispatcher::{DispatchOutcome, Dispatcher},
    engine::BotEngine,
    pipeline::{decode_prescription, DocumentPipeline},
    renderer::PrescriptionRenderer,
    validity::calculate_validity,
};
pub use domain::model::{DiscountStatus, Prescription};
pub use utils::error::{BotError, Result};
