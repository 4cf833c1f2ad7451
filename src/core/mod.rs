pub mod dispatcher;
pub mod engine;
pub mod pipeline;
pub mod renderer;
pub mod validity;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{DiscountStatus, Prescription, RenderedDocument};
pub use crate::domain::ports::{ChatTransport, ConfigProvider, DocumentConverter};
pub use crate::utils::error::Result;
