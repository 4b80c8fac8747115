use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Values picked out of a page by label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedFields {
    pub name: String,
    pub address: String,
    pub case_number: String,
    pub date: String,
}

impl ExtractedFields {
    /// Value for a `{{placeholder}}` key
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(self.name.as_str()),
            "address" => Some(self.address.as_str()),
            "caseNumber" => Some(self.case_number.as_str()),
            "date" => Some(self.date.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.address.is_empty() && self.case_number.is_empty() && self.date.is_empty()
    }
}

static NAME: LazyLock<Regex> = LazyLock::new(|| label(r"name"));
static ADDRESS: LazyLock<Regex> = LazyLock::new(|| label(r"address"));
static CASE_NUMBER: LazyLock<Regex> = LazyLock::new(|| label(r"(?:case\s*(?:number|#|no\.?)|case\s*id)"));
static DATE: LazyLock<Regex> = LazyLock::new(|| label(r"date"));

/// `<label>[:] <rest of line>`, case-insensitive
fn label(pattern: &str) -> Regex {
    Regex::new(&format!(r"(?i){}\s*:?\s*([^\n]+)", pattern)).expect("valid regex")
}

fn first_value(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .unwrap_or_default()
}

/// Pull the labelled fields out of a page's text. Expects line breaks intact.
pub fn extract_fields(text: &str) -> ExtractedFields {
    ExtractedFields {
        name: first_value(&NAME, text),
        address: first_value(&ADDRESS, text),
        case_number: first_value(&CASE_NUMBER, text),
        date: first_value(&DATE, text),
    }
}
