use crate::models::ExtractedContent;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::Value;
use tracing::debug;

/// One way of locating an address inside a rendered page
pub type AddressStrategy = fn(&Html) -> Option<String>;

/// Address strategies in the order they are tried; the first hit wins
pub const ADDRESS_STRATEGIES: [(&str, AddressStrategy); 4] = [
    ("structured-data", address_from_structured_data),
    ("meta-tags", address_from_meta_tags),
    ("page-text", address_from_page_text),
    ("address-elements", address_from_elements),
];

static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[property], meta[name]").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static TEL_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"a[href^="tel:"]"#).unwrap());
static ANY_ELEMENT: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());
static CLASS_HINTS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [r#"[class*="address"]"#, r#"[class*="location"]"#, r#"[class*="contact"]"#]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});
static INFO_BLOCKS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [".property-info", ".contact-info"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// Loose address shape used to vet metadata and element text
static ADDRESS_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\d+.*?(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way).*?[A-Z]{2}\s+\d{5}",
    )
    .unwrap()
});

static TEXT_ADDRESS_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(
            r"(?i)\d+\s+[A-Za-z\s]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Circle|Cir|Court|Ct|Place|Pl)\s*[A-Za-z\s]*,?\s*[A-Za-z\s]+,?\s*[A-Z]{2}\s+\d{5}(?:-\d{4})?",
        )
        .unwrap(),
        Regex::new(
            r"(?i)\d+[^,]*(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Circle|Cir|Court|Ct|Place|Pl)[^,]*,\s*[A-Za-z\s]+,\s*[A-Z]{2}\s+\d{5}(?:-\d{4})?",
        )
        .unwrap(),
    ]
});

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})").unwrap()
});

/// Pull the raw address and phone out of a rendered page
pub fn extract_fields(html: &str) -> ExtractedContent {
    let document = Html::parse_document(html);

    let address = ADDRESS_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let found = strategy(&document).filter(|a| !a.trim().is_empty());
            if found.is_some() {
                debug!("Address found via {}", name);
            }
            found
        })
        .unwrap_or_default();

    let phone = phone_from_tel_link(&document)
        .or_else(|| phone_from_page_text(&document))
        .unwrap_or_default();

    ExtractedContent::new(&address, &phone)
}

/// Embedded JSON-LD blocks carrying an `address`
pub fn address_from_structured_data(document: &Html) -> Option<String> {
    document.select(&JSON_LD).find_map(|script| {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&raw) {
            Ok(data) => address_in_json(&data),
            Err(e) => {
                debug!("Skipping malformed structured data: {}", e);
                None
            }
        }
    })
}

fn address_in_json(data: &Value) -> Option<String> {
    match data {
        Value::Array(items) => items.iter().find_map(address_in_json),
        Value::Object(map) => {
            if let Some(address) = map.get("address") {
                match address {
                    Value::String(s) if !s.trim().is_empty() => return Some(s.clone()),
                    Value::Object(parts) => {
                        if let Some(street) = parts.get("streetAddress").and_then(Value::as_str) {
                            let part = |key: &str| {
                                parts.get(key).and_then(Value::as_str).unwrap_or("")
                            };
                            return Some(format!(
                                "{}, {}, {} {}",
                                street,
                                part("addressLocality"),
                                part("addressRegion"),
                                part("postalCode")
                            ));
                        }
                    }
                    _ => {}
                }
            }
            map.get("@graph").and_then(address_in_json)
        }
        _ => None,
    }
}

/// `<meta>` tags whose content looks like a street address
pub fn address_from_meta_tags(document: &Html) -> Option<String> {
    document
        .select(&META)
        .filter_map(|meta| meta.value().attr("content"))
        .find(|content| ADDRESS_SHAPE.is_match(content))
        .map(str::to_string)
}

/// Regex search over the visible page text, strictest pattern first
pub fn address_from_page_text(document: &Html) -> Option<String> {
    let text = visible_text(document);
    TEXT_ADDRESS_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(&text))
        .map(|m| m.as_str().trim().to_string())
}

/// Elements whose class or data attributes hint at an address block
pub fn address_from_elements(document: &Html) -> Option<String> {
    let shaped = |element: ElementRef| {
        let text = element.text().collect::<String>();
        let text = text.trim();
        ADDRESS_SHAPE.is_match(text).then(|| text.to_string())
    };

    let by_class = |selector: &Selector| document.select(selector).find_map(shaped);

    CLASS_HINTS
        .iter()
        .find_map(|selector| by_class(selector))
        .or_else(|| {
            document
                .select(&ANY_ELEMENT)
                .filter(|element| {
                    element
                        .value()
                        .attrs()
                        .any(|(name, value)| name.starts_with("data-") && value.contains("address"))
                })
                .find_map(shaped)
        })
        .or_else(|| INFO_BLOCKS.iter().find_map(|selector| by_class(selector)))
}

/// First `tel:` link, reduced to digits and formatted when it is a US number
pub fn phone_from_tel_link(document: &Html) -> Option<String> {
    let href = document.select(&TEL_LINK).next()?.value().attr("href")?;
    let digits: String = href
        .trim_start_matches("tel:")
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    let phone = match digits.len() {
        10 => format!("+1 {} {} {}", &digits[..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1 {} {} {}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ => digits,
    };

    (!phone.is_empty()).then_some(phone)
}

/// Phone-shaped text anywhere on the page
pub fn phone_from_page_text(document: &Html) -> Option<String> {
    let text = visible_text(document);
    PHONE
        .captures(&text)
        .map(|caps| format!("+1 {} {} {}", &caps[1], &caps[2], &caps[3]))
}

/// Text of the body, skipping script-like containers
pub fn visible_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    for node in root.descendants() {
        if let Node::Text(fragment) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                matches!(
                    ancestor.value().as_element().map(|e| e.name()),
                    Some("script" | "style" | "noscript" | "template")
                )
            });
            if !hidden {
                text.push_str(fragment);
                text.push(' ');
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(head: &str, body: &str) -> String {
        format!("<html><head>{}</head><body>{}</body></html>", head, body)
    }

    #[test]
    fn test_structured_data_object_address() {
        let html = page(
            r#"<script type="application/ld+json">
            {"@type": "ApartmentComplex", "address": {"streetAddress": "123 Main St",
             "addressLocality": "Springfield", "addressRegion": "IL", "postalCode": "62701"}}
            </script>"#,
            "<p>Call us</p>",
        );
        let content = extract_fields(&html);
        assert_eq!(content.raw_address, "123 Main St, Springfield, IL 62701");
    }

    #[test]
    fn test_structured_data_skips_malformed_blocks() {
        let html = page(
            r#"<script type="application/ld+json">{ not json</script>
            <script type="application/ld+json">[{"@type": "Org"},
              {"address": "77 Ocean Dr, Miami Beach, FL 33139"}]</script>"#,
            "",
        );
        let document = Html::parse_document(&html);
        assert_eq!(
            address_from_structured_data(&document).as_deref(),
            Some("77 Ocean Dr, Miami Beach, FL 33139")
        );
    }

    #[test]
    fn test_structured_data_graph() {
        let html = page(
            r#"<script type="application/ld+json">{"@graph": [{"@type": "WebPage"},
              {"address": {"streetAddress": "9 Elm Ave", "addressLocality": "Austin",
               "addressRegion": "TX", "postalCode": "78701"}}]}</script>"#,
            "",
        );
        let document = Html::parse_document(&html);
        assert_eq!(
            address_from_structured_data(&document).as_deref(),
            Some("9 Elm Ave, Austin, TX 78701")
        );
    }

    #[test]
    fn test_meta_tag_address() {
        let html = page(
            r#"<meta name="description" content="Luxury living downtown">
            <meta property="og:street" content="400 Pine Street Seattle WA 98101">"#,
            "",
        );
        let content = extract_fields(&html);
        assert_eq!(content.raw_address, "400 Pine Street Seattle WA 98101");
    }

    #[test]
    fn test_page_text_address_ignores_scripts() {
        let html = page(
            "",
            r#"<script>var fake = "1 Script Way Nowhere ZZ 00000";</script>
            <div><h1>The Ellis</h1><p>Visit us at 250 Harbor Blvd, Tampa, FL 33602 today</p></div>"#,
        );
        let content = extract_fields(&html);
        assert!(content.raw_address.starts_with("250 Harbor Blvd"));
        assert!(content.raw_address.ends_with("FL 33602"));
    }

    #[test]
    fn test_address_elements_fallback() {
        let document = Html::parse_document(&page(
            "",
            r#"<div class="footer-contact-block">Leasing office: 18 Kings Ln Charleston SC 29401</div>"#,
        ));
        assert_eq!(
            address_from_elements(&document).as_deref(),
            Some("Leasing office: 18 Kings Ln Charleston SC 29401")
        );
    }

    #[test]
    fn test_address_elements_data_attribute() {
        let document = Html::parse_document(&page(
            "",
            r#"<span data-role="address-line">5 Mill Rd Dover DE 19901</span>"#,
        ));
        assert_eq!(
            address_from_elements(&document).as_deref(),
            Some("5 Mill Rd Dover DE 19901")
        );
    }

    #[test]
    fn test_no_address_found() {
        let content = extract_fields(&page("", "<p>Coming soon</p>"));
        assert_eq!(content, ExtractedContent::default());
    }

    #[test]
    fn test_tel_link_ten_digits() {
        let document =
            Html::parse_document(&page("", r#"<a href="tel:(217) 555-0100">Call</a>"#));
        assert_eq!(phone_from_tel_link(&document).as_deref(), Some("+1 217 555 0100"));
    }

    #[test]
    fn test_tel_link_leading_country_code() {
        let document = Html::parse_document(&page("", r#"<a href="tel:+1-217-555-0100">Call</a>"#));
        assert_eq!(phone_from_tel_link(&document).as_deref(), Some("+1 217 555 0100"));
    }

    #[test]
    fn test_tel_link_other_length_keeps_digits() {
        let document = Html::parse_document(&page("", r#"<a href="tel:555-0100">Call</a>"#));
        assert_eq!(phone_from_tel_link(&document).as_deref(), Some("5550100"));
    }

    #[test]
    fn test_phone_from_text_when_no_tel_link() {
        let html = page("", "<p>Questions? Call (813) 555-0142 anytime.</p>");
        assert_eq!(extract_fields(&html).raw_phone, "+1 813 555 0142");
    }

    #[test]
    fn test_empty_tel_link_falls_back_to_text() {
        let html = page("", r#"<a href="tel:">Call</a><p>813.555.0142</p>"#);
        assert_eq!(extract_fields(&html).raw_phone, "+1 813 555 0142");
    }

    #[test]
    fn test_structured_data_wins_over_text() {
        let html = page(
            r#"<script type="application/ld+json">{"address": "1 First St Boston MA 02108"}</script>"#,
            "<p>Mail to 99 Other Ave, Denver, CO 80202</p>",
        );
        assert_eq!(extract_fields(&html).raw_address, "1 First St Boston MA 02108");
    }
}
