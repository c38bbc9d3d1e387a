//! Quantity-unit normalization.
//!
//! Order lines record quantities in whatever unit the field app captured
//! (kilograms, quintals, tons, or bags of a packaging-dependent weight).
//! Every kilogram total in the report engine goes through [`normalize_to_kg`],
//! applied per line item before summation. Summing first and converting
//! second loses the per-line packaging context and is never done.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Kilograms per quintal.
const QUINTAL_KG: Decimal = dec!(100);

/// Kilograms per metric ton.
const TON_KG: Decimal = dec!(1000);

/// Bag weight assumed when the packaging description is missing or
/// unparsable. Historical data carries free-text packaging; 50 kg is the
/// dominant pack size, so unresolved bags fall back to it rather than
/// failing the report.
pub const DEFAULT_BAG_WEIGHT_KG: Decimal = dec!(50);

/// Ordered packaging rules, highest priority first. Each pattern tolerates
/// whitespace before "kg" ("25kg", "25 kg") and refuses a leading digit so
/// that "5kg" cannot fire inside "25kg".
static BAG_WEIGHT_RULES: Lazy<Vec<(Decimal, Regex)>> = Lazy::new(|| {
    [
        (dec!(5), "5"),
        (dec!(10), "10"),
        (dec!(25), "25"),
        (dec!(40), "40"),
        (dec!(50), "50"),
    ]
    .into_iter()
    .map(|(weight, literal)| {
        let pattern = format!(r"(?i)(?:^|[^0-9]){literal}\s*kg");
        (
            weight,
            Regex::new(&pattern).expect("bag weight pattern is valid"),
        )
    })
    .collect()
});

/// Generic `<number>kg` extraction for pack sizes outside the rule table.
static GENERIC_KG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*kg").expect("generic kg pattern is valid"));

/// Derives the per-bag weight in kilograms from a free-text packaging
/// description such as "25kg Bags". Falls back to
/// [`DEFAULT_BAG_WEIGHT_KG`] when nothing matches.
pub fn bag_weight_kg(packaging: Option<&str>) -> Decimal {
    let Some(packaging) = packaging else {
        return DEFAULT_BAG_WEIGHT_KG;
    };

    for (weight, pattern) in BAG_WEIGHT_RULES.iter() {
        if pattern.is_match(packaging) {
            return *weight;
        }
    }

    if let Some(caps) = GENERIC_KG_PATTERN.captures(packaging) {
        if let Ok(weight) = caps[1].parse::<Decimal>() {
            return weight;
        }
    }

    DEFAULT_BAG_WEIGHT_KG
}

/// Converts a line-item quantity to kilograms.
///
/// Unknown unit strings pass through unchanged: dropping the line would
/// silently understate aggregate totals, so the engine fails open and leaves
/// strict unit validation to ingestion.
pub fn normalize_to_kg(quantity: Decimal, unit: &str, packaging: Option<&str>) -> Decimal {
    let unit = unit.trim();
    if unit.eq_ignore_ascii_case("kg") {
        quantity
    } else if unit.eq_ignore_ascii_case("quintal") {
        quantity * QUINTAL_KG
    } else if unit.eq_ignore_ascii_case("ton") {
        quantity * TON_KG
    } else if unit.eq_ignore_ascii_case("bags") {
        quantity * bag_weight_kg(packaging)
    } else {
        quantity
    }
}
