//! Content-type detection for payloads delivered to the surface.
//!
//! Some adapters deliver finished SVG markup, others raw diagram source that
//! the surface must render itself. For `svg` payloads the trimmed text counts
//! as markup when any of these hold:
//!
//! - it starts with `<svg`
//! - it starts with an XML declaration (`<?xml`)
//! - it contains `<svg` anywhere
//!
//! The last check is deliberately permissive: some compilers prepend noise
//! before the real tag, and such payloads must never be misrouted as source.
//! It is a heuristic, not a contract. Everything else is raw source.
//! `png` payloads are always direct-display images.

use std::fmt;

use super::message::Payload;
use crate::core::ImageFormat;

const SVG_TAG: &str = "<svg";
const XML_DECL: &str = "<?xml";
const PREVIEW_CHARS: usize = 100;

/// The three boolean detection signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub starts_with_svg: bool,
    pub starts_with_xml: bool,
    pub contains_svg: bool,
}

impl Signals {
    pub fn of(text: &str) -> Self {
        let trimmed = text.trim();
        Self {
            starts_with_svg: trimmed.starts_with(SVG_TAG),
            starts_with_xml: trimmed.starts_with(XML_DECL),
            contains_svg: trimmed.contains(SVG_TAG),
        }
    }

    pub fn is_markup(self) -> bool {
        self.starts_with_svg || self.starts_with_xml || self.contains_svg
    }
}

/// How the surface should present a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Already-rendered markup, insert directly.
    Markup,
    /// Diagram source, hand to the in-surface engine.
    RawSource,
    /// Binary image, display as-is.
    Image,
}

impl Detection {
    pub fn name(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::RawSource => "raw-source",
            Self::Image => "image",
        }
    }
}

/// Diagnostic record logged for every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub format: ImageFormat,
    pub length: usize,
    pub preview: String,
    pub signals: Signals,
    pub detection: Detection,
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "format={} length={} preview=\"{}\" starts_with_svg={} starts_with_xml={} contains_svg={} -> {}",
            self.format.extension(),
            self.length,
            self.preview,
            self.signals.starts_with_svg,
            self.signals.starts_with_xml,
            self.signals.contains_svg,
            self.detection.name(),
        )
    }
}

/// Classify a payload and log the decision.
///
/// The report is logged on every update, independent of `--verbose`.
pub fn inspect(payload: &Payload, format: ImageFormat) -> UpdateReport {
    let report = classify(payload, format);
    crate::log!("surface"; "update {}", report);
    report
}

fn classify(payload: &Payload, format: ImageFormat) -> UpdateReport {
    let (signals, preview) = match payload {
        Payload::Text(text) => (Signals::of(text), preview(text)),
        Payload::Binary(bytes) => match format {
            ImageFormat::Png => (Signals::default(), format!("<{} bytes>", bytes.len())),
            ImageFormat::Svg => {
                let text = String::from_utf8_lossy(bytes);
                (Signals::of(&text), preview(&text))
            }
        },
    };

    let detection = match format {
        ImageFormat::Png => Detection::Image,
        ImageFormat::Svg if signals.is_markup() => Detection::Markup,
        ImageFormat::Svg => Detection::RawSource,
    };

    UpdateReport {
        format,
        length: payload.len(),
        preview,
        signals,
        detection,
    }
}

/// Markup with any leading noise before the XML declaration or `<svg` cut off.
pub fn markup_body(text: &str) -> &str {
    let trimmed = text.trim();
    [XML_DECL, SVG_TAG]
        .iter()
        .filter_map(|tag| trimmed.find(tag))
        .min()
        .map_or(trimmed, |start| &trimmed[start..])
}

/// First characters of the payload on one line.
fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    let head = head.replace('\n', "\\n").replace('\r', "\\r");
    if text.chars().count() > PREVIEW_CHARS {
        format!("{head}...")
    } else {
        head
    }
}
