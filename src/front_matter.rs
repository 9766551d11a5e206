use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Header options used by the store; everything else in `header` is ignored.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Header {
    #[serde(default, deserialize_with = "text")]
    pub teaser: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "text")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "text")]
    pub permalink: Option<String>,
    pub published: Option<bool>,
    pub search: Option<bool>,
    #[serde(deserialize_with = "text")]
    category: Option<String>,
    #[serde(deserialize_with = "labels")]
    categories: Vec<String>,
    #[serde(deserialize_with = "text")]
    tag: Option<String>,
    #[serde(deserialize_with = "labels")]
    tags: Vec<String>,
    pub header: Option<Header>,
}

impl FrontMatter {
    pub fn parse(header: &str) -> Result<FrontMatter, serde_yaml::Error> {
        match serde_yaml::from_str::<Value>(header)? {
            Value::Null => Ok(FrontMatter::default()),
            value => serde_yaml::from_value(value),
        }
    }

    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(true)
    }

    pub fn is_searchable(&self) -> bool {
        self.search.unwrap_or(true)
    }

    /// A singular `category` wins over `categories`, as in Jekyll.
    pub fn categories(&self) -> Vec<String> {
        pluralized(self.category.as_ref(), &self.categories)
    }

    pub fn tags(&self) -> Vec<String> {
        pluralized(self.tag.as_ref(), &self.tags)
    }

    pub fn teaser(&self) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|h| h.teaser.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

fn pluralized(singular: Option<&String>, plural: &[String]) -> Vec<String> {
    let candidates = match singular {
        Some(one) if !one.trim().is_empty() => vec![one.trim().to_string()],
        _ => plural.to_vec(),
    };
    let mut labels: Vec<String> = Vec::with_capacity(candidates.len());
    for label in candidates {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Splits a document into its YAML header and body.
///
/// The first line must be `---`; the header runs up to the next `---` or
/// `...` line. Returns `None` when the document has no front matter.
pub fn split(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let first_end = source.find('\n')?;
    if source[..first_end].trim_end() != "---" {
        return None;
    }
    let rest = &source[first_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar))
}

/// A label list is either a YAML sequence or a whitespace separated string.
fn labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Sequence(items)) => items
            .into_iter()
            .filter_map(scalar)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(other) => scalar(other).into_iter().collect(),
        None => vec![],
    };
    Ok(labels)
}
