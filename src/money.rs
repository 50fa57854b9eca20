// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

static NON_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9,.\-]").unwrap());
static INNER_MINUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)(.)-").unwrap());

/// Normalize a heterogeneous monetary string into an exact decimal.
///
/// Unparseable input is worth zero, never an error: one malformed amount must
/// not sink a whole batch. Handles thousands separators and decimal commas
/// ("1.234,56", "1,234.56", "12,5 kr") and strips trailing currency junk.
pub fn parse_amount(raw: &str) -> Decimal {
    let s = raw.trim();
    if s.is_empty() {
        return Decimal::ZERO;
    }
    if let Ok(d) = s.parse::<Decimal>() {
        return d;
    }

    let cleaned = NON_AMOUNT.replace_all(s, "");
    // A minus sign is only meaningful in front.
    let cleaned = INNER_MINUS.replace_all(&cleaned, "$1");
    let cleaned = normalize_separators(&cleaned);
    cleaned.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

fn normalize_separators(s: &str) -> String {
    let dots = s.matches('.').count();
    let commas = s.matches(',').count();
    match (dots, commas) {
        (0, 0) => s.to_string(),
        // Both present: whichever comes last is the decimal separator.
        (_, _) if dots > 0 && commas > 0 => {
            let last_dot = s.rfind('.').unwrap_or(0);
            let last_comma = s.rfind(',').unwrap_or(0);
            if last_comma > last_dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        // Lone comma followed by exactly three trailing digits is an
        // English-locale thousands mark ("1,234"); anything else is a
        // decimal comma. Repeated commas are always thousands marks.
        (0, 1) => {
            let idx = s.rfind(',').unwrap_or(0);
            let frac = &s[idx + 1..];
            if frac.len() == 3 && frac.chars().all(|c| c.is_ascii_digit()) {
                s.replace(',', "")
            } else {
                s.replace(',', ".")
            }
        }
        (0, _) => s.replace(',', ""),
        (1, 0) => s.to_string(),
        // Repeated dots are thousands marks ("1.234.567").
        (_, 0) => s.replace('.', ""),
        _ => s.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    // Captured as a JSON number token so the exact digits survive, instead of
    // round-tripping through f64.
    Num(serde_json::Number),
    Text(String),
}

/// Serde adapter for money fields that arrive as string, number or null.
pub fn de_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(match raw {
        None => Decimal::ZERO,
        Some(RawAmount::Num(n)) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        Some(RawAmount::Text(s)) => parse_amount(&s),
    })
}
