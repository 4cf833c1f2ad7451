use crate::core::renderer::PrescriptionRenderer;
use crate::core::validity::calculate_validity;
use crate::domain::model::{Prescription, RenderedDocument};
use crate::domain::ports::DocumentConverter;
use crate::utils::error::{BotError, Result};

pub const DOCUMENT_FILENAME: &str = "prescription.pdf";

const FIELD_NAMES: [&str; 15] = [
    "Lpu", "Discount", "Seria", "Number", "Date", "ValidUntil", "ExpPeriod", "DoctorFio",
    "Medicine", "Medform", "Dose", "DoseMeasure", "PackNumb", "PackCount", "UseMethod",
];

/// Strict decode of a chat payload: it must be a JSON object. Field names
/// match case-insensitively (`expPeriod`, `date`); an exact name wins over a
/// differently-cased duplicate.
pub fn decode_prescription(text: &str) -> Result<Prescription> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Object(fields) = value else {
        return Err(BotError::Decode(serde::de::Error::custom(
            "payload must be a JSON object",
        )));
    };

    let mut canonical = serde_json::Map::with_capacity(fields.len());
    for (key, value) in &fields {
        let name = FIELD_NAMES
            .iter()
            .find(|name| name.eq_ignore_ascii_case(key))
            .map_or(key.as_str(), |name| *name);
        if name != key.as_str() && fields.contains_key(name) {
            continue;
        }
        canonical.insert(name.to_string(), value.clone());
    }

    Ok(serde_json::from_value(serde_json::Value::Object(canonical))?)
}

/// Validity, rendering and conversion for one prescription.
pub struct DocumentPipeline<C: DocumentConverter> {
    renderer: PrescriptionRenderer,
    converter: C,
}

impl<C: DocumentConverter> DocumentPipeline<C> {
    pub fn new(renderer: PrescriptionRenderer, converter: C) -> Self {
        Self { renderer, converter }
    }

    /// Fills in the validity end date, replacing anything the sender supplied.
    pub fn prepare(&self, mut rx: Prescription) -> Result<Prescription> {
        rx.valid_until = calculate_validity(&rx.date, &rx.exp_period)?;
        Ok(rx)
    }

    pub fn render_markup(&self, rx: &Prescription) -> Result<String> {
        self.renderer.render(rx)
    }

    pub async fn produce(&self, rx: Prescription) -> Result<RenderedDocument> {
        let rx = self.prepare(rx)?;
        tracing::debug!("Validity computed: {} + '{}' -> {}", rx.date, rx.exp_period, rx.valid_until);

        let markup = self.render_markup(&rx)?;
        let bytes = self.converter.convert(&markup).await?;
        tracing::debug!("PDF produced: {} bytes", bytes.len());

        Ok(RenderedDocument {
            filename: DOCUMENT_FILENAME.to_string(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{EchoConverter, FailingConverter};

    fn pipeline() -> DocumentPipeline<EchoConverter> {
        DocumentPipeline::new(PrescriptionRenderer::new().unwrap(), EchoConverter::default())
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        for text in ["", "not json", "[]", "null", "\"text\"", "42", "{\"Date\": 1}"] {
            let err = decode_prescription(text).unwrap_err();
            assert!(matches!(err, BotError::Decode(_)), "{:?}", text);
        }
    }

    #[test]
    fn test_decode_matches_field_names_ignoring_case() {
        let rx = decode_prescription(
            r#"{"date":"01.01.2024","expPeriod":"30 days","MEDICINE":"Aspirin","doseMeasure":"мг","Other":1}"#,
        )
        .unwrap();
        assert_eq!(rx.date, "01.01.2024");
        assert_eq!(rx.exp_period, "30 days");
        assert_eq!(rx.medicine, "Aspirin");
        assert_eq!(rx.dose_measure, "мг");
    }

    #[test]
    fn test_decode_prefers_exact_field_name() {
        let rx = decode_prescription(r#"{"medicine":"lower","Medicine":"Exact","medICINE":"mixed"}"#).unwrap();
        assert_eq!(rx.medicine, "Exact");
    }

    #[test]
    fn test_prepare_overwrites_valid_until() {
        let rx = decode_prescription(
            r#"{"Date":"01.01.2024","ExpPeriod":"30 days","ValidUntil":"01.01.1999"}"#,
        )
        .unwrap();
        let rx = pipeline().prepare(rx).unwrap();
        assert_eq!(rx.valid_until, "31.01.2024");
    }

    #[tokio::test]
    async fn test_produce_end_to_end() {
        let pipeline = pipeline();
        let rx = decode_prescription(
            r#"{"Date":"01.01.2024","ExpPeriod":"30 days","Discount":"1","Medicine":"Aspirin"}"#,
        )
        .unwrap();

        let document = pipeline.produce(rx).await.unwrap();
        assert_eq!(document.filename, DOCUMENT_FILENAME);

        let markup = pipeline.converter.last_markup().unwrap();
        assert!(markup.contains("Aspirin"));
        assert!(markup.contains("Льготный"));
        assert!(markup.contains("31.01.2024"));
        assert!(!markup.contains("Серия и номер:"));
    }

    #[tokio::test]
    async fn test_produce_stops_on_bad_date() {
        let pipeline = pipeline();
        let rx = decode_prescription(r#"{"Date":"2024-01-01","ExpPeriod":"30"}"#).unwrap();

        assert!(matches!(pipeline.produce(rx).await, Err(BotError::DateParse { .. })));
        assert!(pipeline.converter.last_markup().is_none());
    }

    #[tokio::test]
    async fn test_produce_surfaces_converter_error() {
        let pipeline = DocumentPipeline::new(PrescriptionRenderer::new().unwrap(), FailingConverter);
        let rx = decode_prescription(r#"{"Date":"01.01.2024","ExpPeriod":"1"}"#).unwrap();

        assert!(matches!(pipeline.produce(rx).await, Err(BotError::Conversion { .. })));
    }
}
