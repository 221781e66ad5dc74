use crate::models::ParsedAddress;
use once_cell::sync::Lazy;
use regex::Regex;

/// `<prefix> <region> <zip>` anchored at the end of the string
static REGION_POSTAL_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+([A-Z]{2})\s+(\d{5}(?:-\d{4})?)$").unwrap());

/// Greedy prefix so the last street-type token wins
static STREET_THEN_CITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(.+\s(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Circle|Cir|Court|Ct|Place|Pl|Highway|Hwy)\.?),?(?:\s+(.+))?$",
    )
    .unwrap()
});

/// Split a normalized address line into street, city, region and postal code.
///
/// Never fails: input without a trailing `XX 00000` comes back whole in
/// `street_address` with the remaining fields empty.
pub fn parse_address(raw: &str) -> ParsedAddress {
    if raw.trim().is_empty() {
        return ParsedAddress::default();
    }

    let Some(caps) = REGION_POSTAL_TAIL.captures(raw.trim()) else {
        return ParsedAddress {
            street_address: raw.to_string(),
            ..ParsedAddress::default()
        };
    };

    let prefix = caps[1].trim().trim_end_matches(',').trim_end();
    let (street_address, city) = split_street_and_city(prefix);

    ParsedAddress {
        street_address,
        city,
        region_code: caps[2].to_string(),
        postal_code: caps[3].to_string(),
    }
}

fn split_street_and_city(prefix: &str) -> (String, String) {
    if let Some(caps) = STREET_THEN_CITY.captures(prefix) {
        let street = caps[1].trim().to_string();
        let city = caps
            .get(2)
            .map(|m| clean_part(m.as_str()))
            .unwrap_or_default();
        return (street, city);
    }

    // No street type: fall back to word positions
    let words: Vec<&str> = prefix.split_whitespace().collect();
    match words.len() {
        0 | 1 => (prefix.to_string(), String::new()),
        2 | 3 => {
            let mid = words.len() / 2;
            (clean_part(&words[..mid].join(" ")), clean_part(&words[mid..].join(" ")))
        }
        _ => (clean_part(&words[..3].join(" ")), clean_part(&words[3..].join(" "))),
    }
}

fn clean_part(part: &str) -> String {
    part.trim().trim_matches(',').trim().to_string()
}
