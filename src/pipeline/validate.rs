use crate::models::{ExtractedContent, ParsedAddress};
use std::fmt;

/// Why a page's data was not written to the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub missing: Vec<&'static str>,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing {}", self.missing.join(", "))
    }
}

/// Check that a record has a phone, region, postal code and some street or city.
pub fn validate_record(content: &ExtractedContent, address: &ParsedAddress) -> Result<(), Rejection> {
    let present = |value: &str| !value.trim().is_empty();

    let mut missing = Vec::new();
    if !present(&content.raw_phone) {
        missing.push("phone");
    }
    if !present(&address.postal_code) {
        missing.push("zip");
    }
    if !present(&address.region_code) {
        missing.push("state");
    }
    if !present(&address.street_address) && !present(&address.city) {
        missing.push("address/city");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Rejection { missing })
    }
}

pub fn is_valid_record(content: &ExtractedContent, address: &ParsedAddress) -> bool {
    validate_record(content, address).is_ok()
}
