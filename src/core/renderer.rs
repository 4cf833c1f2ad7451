//! Fixed prescription template, compiled once and rendered per message.
//!
//! The template understands two tags:
//!
//! * `{{ Field }}` interpolates a prescription field, always HTML-escaped.
//!   `{{ DiscountLabel }}` is the human label of the discount code.
//! * `{{#series}} ... {{/series}}` keeps its body only when the series or
//!   the number carries a real value.

use crate::domain::model::Prescription;
use crate::utils::error::{BotError, Result};
use regex::Regex;

pub const PRESCRIPTION_TEMPLATE: &str = include_str!("../../templates/prescription.html");

const TAG_PATTERN: &str = r"\{\{\s*([#/]?)\s*([A-Za-z]+)\s*\}\}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Lpu,
    Discount,
    DiscountLabel,
    Seria,
    Number,
    Date,
    ValidUntil,
    ExpPeriod,
    DoctorFio,
    Medicine,
    Medform,
    Dose,
    DoseMeasure,
    PackNumb,
    PackCount,
    UseMethod,
}

impl Slot {
    fn from_name(name: &str) -> Option<Self> {
        let slot = match name {
            "Lpu" => Slot::Lpu,
            "Discount" => Slot::Discount,
            "DiscountLabel" => Slot::DiscountLabel,
            "Seria" => Slot::Seria,
            "Number" => Slot::Number,
            "Date" => Slot::Date,
            "ValidUntil" => Slot::ValidUntil,
            "ExpPeriod" => Slot::ExpPeriod,
            "DoctorFio" => Slot::DoctorFio,
            "Medicine" => Slot::Medicine,
            "Medform" => Slot::Medform,
            "Dose" => Slot::Dose,
            "DoseMeasure" => Slot::DoseMeasure,
            "PackNumb" => Slot::PackNumb,
            "PackCount" => Slot::PackCount,
            "UseMethod" => Slot::UseMethod,
            _ => return None,
        };
        Some(slot)
    }

    fn value<'a>(&self, rx: &'a Prescription) -> &'a str {
        match self {
            Slot::Lpu => &rx.lpu,
            Slot::Discount => &rx.discount,
            Slot::DiscountLabel => rx.discount_status().label(),
            Slot::Seria => &rx.seria,
            Slot::Number => &rx.number,
            Slot::Date => &rx.date,
            Slot::ValidUntil => &rx.valid_until,
            Slot::ExpPeriod => &rx.exp_period,
            Slot::DoctorFio => &rx.doctor_fio,
            Slot::Medicine => &rx.medicine,
            Slot::Medform => &rx.medform,
            Slot::Dose => &rx.dose,
            Slot::DoseMeasure => &rx.dose_measure,
            Slot::PackNumb => &rx.pack_numb,
            Slot::PackCount => &rx.pack_count,
            Slot::UseMethod => &rx.use_method,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Series,
}

impl Condition {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "series" => Some(Condition::Series),
            _ => None,
        }
    }

    fn holds(&self, rx: &Prescription) -> bool {
        match self {
            Condition::Series => rx.has_series_or_number(),
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Field(Slot),
    Section {
        condition: Condition,
        body: Vec<Segment>,
    },
}

/// Immutable compiled form of the document template.
#[derive(Debug, Clone)]
pub struct PrescriptionRenderer {
    segments: Vec<Segment>,
}

impl PrescriptionRenderer {
    /// Compiles the built-in template.
    pub fn new() -> Result<Self> {
        Self::compile(PRESCRIPTION_TEMPLATE)
    }

    pub fn compile(source: &str) -> Result<Self> {
        let tag = Regex::new(TAG_PATTERN).map_err(|e| BotError::Template {
            message: format!("tag pattern: {}", e),
        })?;

        let mut open: Vec<(Condition, Vec<Segment>)> = Vec::new();
        let mut current: Vec<Segment> = Vec::new();
        let mut last = 0;

        for caps in tag.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            push_text(&mut current, &source[last..whole.start()])?;
            last = whole.end();

            let name = &caps[2];
            match &caps[1] {
                "#" => {
                    let condition = Condition::from_name(name).ok_or_else(|| unknown("section", name))?;
                    open.push((condition, std::mem::take(&mut current)));
                }
                "/" => {
                    let condition = Condition::from_name(name).ok_or_else(|| unknown("section", name))?;
                    let (opened, parent) = open.pop().ok_or_else(|| BotError::Template {
                        message: format!("closing '{}' without an open section", name),
                    })?;
                    if opened != condition {
                        return Err(BotError::Template {
                            message: format!("section '{}' closed while '{:?}' is open", name, opened),
                        });
                    }
                    let body = std::mem::replace(&mut current, parent);
                    current.push(Segment::Section { condition, body });
                }
                _ => {
                    let slot = Slot::from_name(name).ok_or_else(|| unknown("placeholder", name))?;
                    current.push(Segment::Field(slot));
                }
            }
        }
        push_text(&mut current, &source[last..])?;

        if let Some((condition, _)) = open.last() {
            return Err(BotError::Template {
                message: format!("section {:?} is never closed", condition),
            });
        }

        Ok(Self { segments: current })
    }

    /// Renders the markup for a prescription whose validity date is already set.
    pub fn render(&self, rx: &Prescription) -> Result<String> {
        if rx.valid_until.is_empty() {
            return Err(BotError::Template {
                message: "validity end date has not been computed".to_string(),
            });
        }

        let mut out = String::with_capacity(PRESCRIPTION_TEMPLATE.len() + 512);
        write_segments(&mut out, &self.segments, rx);
        Ok(out)
    }
}

fn push_text(segments: &mut Vec<Segment>, text: &str) -> Result<()> {
    if text.contains("{{") {
        return Err(BotError::Template {
            message: format!("malformed tag near '{}'", text.trim().chars().take(40).collect::<String>()),
        });
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
    Ok(())
}

fn unknown(kind: &str, name: &str) -> BotError {
    BotError::Template {
        message: format!("unknown {} '{}'", kind, name),
    }
}

fn write_segments(out: &mut String, segments: &[Segment], rx: &Prescription) {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Field(slot) => escape_html_into(out, slot.value(rx)),
            Segment::Section { condition, body } => {
                if condition.holds(rx) {
                    write_segments(out, body, rx);
                }
            }
        }
    }
}

fn escape_html_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
