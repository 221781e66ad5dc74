use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Suffix appended to the cleaned community name to build the manager email
pub const EMAIL_SUFFIX: &str = "mgr@greystar.com";

/// A community page discovered in the property directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommunityLink {
    /// Region (state) heading the community was listed under
    #[serde(rename = "state")]
    pub origin_region: String,
    #[serde(rename = "communityName")]
    pub name: String,
    /// Unique key for the community
    #[serde(rename = "communityUrl")]
    pub source_url: String,
}

/// Raw address and phone pulled from one rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub raw_address: String,
    pub raw_phone: String,
}

impl ExtractedContent {
    /// Build normalized content (whitespace collapsed and trimmed)
    pub fn new(raw_address: &str, raw_phone: &str) -> Self {
        Self {
            raw_address: collapse_whitespace(raw_address),
            raw_phone: collapse_whitespace(raw_phone),
        }
    }
}

/// Address split into its structured parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street_address: String,
    pub city: String,
    pub region_code: String,
    pub postal_code: String,
}

/// One row of the output table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PropertyRecord {
    #[serde(rename = "state_name")]
    pub origin_region: String,
    #[serde(rename = "communityName")]
    pub name: String,
    #[serde(rename = "address")]
    pub street_address: String,
    pub city: String,
    #[serde(rename = "state_code")]
    pub region_code: String,
    #[serde(rename = "zip")]
    pub postal_code: String,
    pub phone: String,
    pub email: String,
}

impl PropertyRecord {
    pub fn new(link: &CommunityLink, address: ParsedAddress, phone: &str) -> Self {
        Self {
            origin_region: link.origin_region.clone(),
            name: link.name.clone(),
            street_address: address.street_address,
            city: address.city,
            region_code: address.region_code,
            postal_code: address.postal_code,
            phone: phone.to_string(),
            email: synthesize_email(&link.name),
        }
    }
}

/// Durable set of processed source URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub processed_urls: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_processed: usize,
}

impl ProgressState {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            processed_urls: BTreeSet::new(),
            last_updated: None,
            total_processed: 0,
        }
    }

    /// Union `urls` into the processed set, returning how many were new
    pub fn absorb<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.processed_urls.len();
        self.processed_urls.extend(urls);
        self.total_processed = self.processed_urls.len();
        self.total_processed - before
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the manager email from a community name.
///
/// "Oak Park Apartments" becomes "oakparkapartmentsmgr@greystar.com"; a name with
/// no ASCII letters or digits yields an empty string.
pub fn synthesize_email(name: &str) -> String {
    let clean: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    if clean.is_empty() {
        String::new()
    } else {
        format!("{}{}", clean, EMAIL_SUFFIX)
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str) -> CommunityLink {
        CommunityLink {
            origin_region: "Illinois".to_string(),
            name: name.to_string(),
            source_url: "https://example.com/oak-park".to_string(),
        }
    }

    #[test]
    fn test_email_from_name() {
        assert_eq!(
            synthesize_email("Oak Park Apartments"),
            "oakparkapartmentsmgr@greystar.com"
        );
        assert_eq!(synthesize_email("The Lofts @ 55th"), "thelofts55thmgr@greystar.com");
        assert_eq!(synthesize_email("Café Flats"), "cafflatsmgr@greystar.com");
    }

    #[test]
    fn test_email_empty_for_symbol_names() {
        assert_eq!(synthesize_email("!!! --- ???"), "");
        assert_eq!(synthesize_email(""), "");
    }

    #[test]
    fn test_record_carries_link_fields() {
        let address = ParsedAddress {
            street_address: "123 Main St".to_string(),
            city: "Springfield".to_string(),
            region_code: "IL".to_string(),
            postal_code: "62701".to_string(),
        };
        let record = PropertyRecord::new(&link("Oak Park"), address, "+1 217 555 0100");

        assert_eq!(record.origin_region, "Illinois");
        assert_eq!(record.name, "Oak Park");
        assert_eq!(record.city, "Springfield");
        assert_eq!(record.email, "oakparkmgr@greystar.com");
    }

    #[test]
    fn test_extracted_content_is_normalized() {
        let content = ExtractedContent::new("  123  Main\n St \t", " +1 217\n555 0100 ");
        assert_eq!(content.raw_address, "123 Main St");
        assert_eq!(content.raw_phone, "+1 217 555 0100");
    }

    #[test]
    fn test_absorb_counts_only_new_urls() {
        let mut state = ProgressState::new();
        assert_eq!(state.absorb(vec!["a".to_string(), "b".to_string()]), 2);
        assert_eq!(state.absorb(vec!["b".to_string(), "c".to_string()]), 1);
        assert_eq!(state.total_processed, 3);
    }

    #[test]
    fn test_link_uses_cache_field_names() {
        let json = serde_json::to_value(link("Oak Park")).unwrap();
        assert_eq!(json["state"], "Illinois");
        assert_eq!(json["communityName"], "Oak Park");
        assert_eq!(json["communityUrl"], "https://example.com/oak-park");
    }
}
