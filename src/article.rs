use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Searchable metadata of one document, as stored in `lunr-store.js`.
///
/// Every key is always present: an absent teaser is written as `null` and a
/// record read back without a `teaser` key is rejected.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(deny_unknown_fields)]
pub struct PostRecord {
    pub title: String,
    pub excerpt: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub url: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub teaser: Option<String>,
}

impl PostRecord {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Store(format!(
                "record `{}` has an empty url",
                self.title
            )));
        }
        Ok(())
    }
}
