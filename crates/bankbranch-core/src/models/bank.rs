use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::contains_ignore_case;

/// A single bank branch.
///
/// Field names match the listing service exactly so the same struct is used
/// for the wire format and the cache file. `favourite` is never sent by the
/// service and defaults to `false` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    pub ifsc: String,
    pub bank_id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub branch: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub district: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bank_name: String,
    #[serde(default)]
    pub favourite: bool,
}

/// The service returns `null` for some address fields.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl BankRecord {
    /// Whether the branch is in `city`, ignoring case.
    pub fn in_city(&self, city: &str) -> bool {
        self.city.to_lowercase() == city.to_lowercase()
    }

    /// Whether any attribute, rendered as text, contains `needle`.
    ///
    /// Every attribute participates, including `bank_id` and the favourite
    /// flag, so searching for "true" lists favourites.
    pub fn matches_text(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }

        let text_fields = [
            &self.ifsc,
            &self.branch,
            &self.address,
            &self.city,
            &self.district,
            &self.state,
            &self.bank_name,
        ];

        text_fields.iter().any(|f| contains_ignore_case(f, needle))
            || contains_ignore_case(&self.bank_id.to_string(), needle)
            || contains_ignore_case(if self.favourite { "true" } else { "false" }, needle)
    }

    pub fn favourite_marker(&self) -> &'static str {
        if self.favourite {
            "★"
        } else {
            "☆"
        }
    }
}

#[cfg(test)]
pub(crate) fn sample(ifsc: &str, city: &str) -> BankRecord {
    BankRecord {
        ifsc: ifsc.to_string(),
        bank_id: 60,
        branch: format!("{} MAIN", city.to_uppercase()),
        address: format!("1 STATION ROAD, {}", city.to_uppercase()),
        city: city.to_string(),
        district: city.to_uppercase(),
        state: "MAHARASHTRA".to_string(),
        bank_name: "STATE BANK OF INDIA".to_string(),
        favourite: false,
    }
}
