use serde::{Deserialize, Deserializer};

/// One prescription payload as submitted by a chat user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Prescription {
    #[serde(deserialize_with = "nullable_string")]
    pub lpu: String,
    #[serde(deserialize_with = "nullable_string")]
    pub discount: String,
    #[serde(deserialize_with = "nullable_string")]
    pub seria: String,
    #[serde(deserialize_with = "nullable_string")]
    pub number: String,
    #[serde(deserialize_with = "nullable_string")]
    pub date: String,
    /// Derived from `date` and `exp_period`; whatever the sender put here is overwritten.
    #[serde(deserialize_with = "nullable_string")]
    pub valid_until: String,
    #[serde(deserialize_with = "nullable_string")]
    pub exp_period: String,
    #[serde(deserialize_with = "nullable_string")]
    pub doctor_fio: String,
    #[serde(deserialize_with = "nullable_string")]
    pub medicine: String,
    #[serde(deserialize_with = "nullable_string")]
    pub medform: String,
    #[serde(deserialize_with = "nullable_string")]
    pub dose: String,
    #[serde(deserialize_with = "nullable_string")]
    pub dose_measure: String,
    #[serde(deserialize_with = "nullable_string")]
    pub pack_numb: String,
    #[serde(deserialize_with = "nullable_string")]
    pub pack_count: String,
    #[serde(deserialize_with = "nullable_string")]
    pub use_method: String,
}

impl Prescription {
    /// Whether the series/number line belongs on the document.
    pub fn has_series_or_number(&self) -> bool {
        not_null(&self.seria) || not_null(&self.number)
    }

    pub fn discount_status(&self) -> DiscountStatus {
        DiscountStatus::from_code(&self.discount)
    }
}

/// Empty strings and the literal `null` placeholder both count as absent.
pub fn not_null(value: &str) -> bool {
    !value.is_empty() && value != "null"
}

// A JSON null leaves the field empty instead of failing the whole payload.
fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountStatus {
    Commercial,
    Subsidized,
    NonSubsidized,
}

impl DiscountStatus {
    /// "2" is commercial, "1" subsidized; every other code falls back to non-subsidized.
    pub fn from_code(code: &str) -> Self {
        match code {
            "2" => DiscountStatus::Commercial,
            "1" => DiscountStatus::Subsidized,
            _ => DiscountStatus::NonSubsidized,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DiscountStatus::Commercial => "Коммерческий",
            DiscountStatus::Subsidized => "Льготный",
            DiscountStatus::NonSubsidized => "Нельготный",
        }
    }
}

/// Text message received from a chat, reduced to what the dispatcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

/// A finished PDF ready to be attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}
