use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::Result;

/// Default pattern for documents outside `_posts`.
pub const COLLECTION_PATTERN: &str = "/:collection/:path:output_ext";
const OUTPUT_EXT: &str = ".html";

/// Values substituted into a permalink pattern for one document.
#[derive(Debug, Clone, Copy)]
pub struct Placeholders<'a> {
    pub date: Option<NaiveDate>,
    pub slug: &'a str,
    pub categories: &'a [String],
    pub collection: &'a str,
    /// Path of the document inside its collection, without extension.
    pub path: &'a str,
}

/// Resolves a builtin style name to its pattern; anything else is a pattern.
pub fn pattern_for(style: &str) -> &str {
    match style {
        "date" => "/:categories/:year/:month/:day/:title:output_ext",
        "pretty" => "/:categories/:year/:month/:day/:title/",
        "ordinal" => "/:categories/:year/:y_day/:title:output_ext",
        "none" => "/:categories/:title:output_ext",
        pattern => pattern,
    }
}

/// Compiled permalink expander.
#[derive(Debug, Clone)]
pub struct Permalink {
    placeholder: Regex,
    slashes: Regex,
}

impl Permalink {
    pub fn new() -> Result<Permalink> {
        // longer names first so `:i_month` is not read as `:i` + `_month`
        let placeholder = Regex::new(
            r":(output_ext|categories|collection|short_year|i_month|i_day|y_day|month|title|year|slug|path|day)",
        )?;
        let slashes = Regex::new(r"/{2,}")?;
        Ok(Permalink {
            placeholder,
            slashes,
        })
    }

    pub fn expand(&self, pattern: &str, values: &Placeholders) -> String {
        let date = |format: &str| {
            values
                .date
                .map(|d| d.format(format).to_string())
                .unwrap_or_default()
        };
        let expanded = self
            .placeholder
            .replace_all(pattern, |caps: &regex::Captures| match &caps[1] {
                "year" => date("%Y"),
                "short_year" => date("%y"),
                "month" => date("%m"),
                "i_month" => values.date.map(|d| d.month().to_string()).unwrap_or_default(),
                "day" => date("%d"),
                "i_day" => values.date.map(|d| d.day().to_string()).unwrap_or_default(),
                "y_day" => date("%j"),
                "title" | "slug" => values.slug.to_string(),
                "categories" => values
                    .categories
                    .iter()
                    .map(|c| c.to_lowercase())
                    .collect::<Vec<_>>()
                    .join("/"),
                "collection" => values.collection.to_string(),
                "path" => values.path.to_string(),
                "output_ext" => OUTPUT_EXT.to_string(),
                _ => caps[0].to_string(),
            });
        let url = format!("/{}", expanded.trim());
        self.slashes.replace_all(&url, "/").replace(' ', "%20")
    }
}

/// Prefixes a site-relative path with the site's base url.
pub fn relative_url(baseurl: &str, path: &str) -> String {
    let base = baseurl.trim().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if base.is_empty() {
        return format!("/{path}");
    }
    let base = base.trim_start_matches('/');
    format!("/{base}/{path}")
}
