//! Unit-aware quantity parsing for entity mention text.
//!
//! Pulls the first plausible `value unit` pair out of free text like
//! "Live Load, 40 psf" or "WIND LOADS: 1.2 kPa". The numeric value is
//! parsed (thousands separators stripped); the unit string is preserved
//! verbatim with no conversion.

use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Option<String>,
}

pub struct QuantityParser {
    pattern: Regex,
}

impl QuantityParser {
    pub fn new() -> Self {
        // value: integer with optional thousands separators, optional
        // decimals; unit: letter-led token, optionally a ratio like kN/m²
        let pattern = Regex::new(
            r"(?P<value>[+-]?\d{1,3}(?:,\d{3})+(?:\.\d+)?|[+-]?\d+(?:\.\d+)?)\s*(?P<unit>[A-Za-z°µ%][A-Za-z°µ%²³0-9]*(?:/[A-Za-z°µ%²³0-9]+)?)?",
        )
        .expect("quantity pattern is valid");

        Self { pattern }
    }

    /// First quantity in the text. Candidates glued to a preceding
    /// letter or digit (the "20" in "HS20") are skipped, and a candidate
    /// that carries a unit is preferred over one that does not.
    pub fn parse(&self, text: &str) -> Option<Quantity> {
        let mut bare: Option<Quantity> = None;

        for caps in self.pattern.captures_iter(text) {
            let m = caps.name("value").expect("value group always present");

            if let Some(prev) = text[..m.start()].chars().next_back() {
                if prev.is_alphanumeric() {
                    continue;
                }
            }

            let value: f64 = match m.as_str().replace(',', "").parse() {
                Ok(v) => v,
                Err(_) => continue,
            };

            let unit = caps
                .name("unit")
                .map(|u| u.as_str().to_string())
                .filter(|u| !u.is_empty());

            let quantity = Quantity { value, unit };
            if quantity.unit.is_some() {
                return Some(quantity);
            }
            if bare.is_none() {
                bare = Some(quantity);
            }
        }

        bare
    }
}

impl Default for QuantityParser {
    fn default() -> Self {
        Self::new()
    }
}
