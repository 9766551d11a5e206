use comrak::ComrakOptions;
use regex::Regex;

use crate::error::Result;

/// Turns a Markdown body into the plain text indexed by the search store.
#[derive(Debug)]
pub struct Excerpter {
    option: ComrakOptions,
    liquid_regex: Regex,
    hidden_regex: Regex,
    block_end_regex: Regex,
    tag_regex: Regex,
}

impl Excerpter {
    pub fn new() -> Result<Excerpter> {
        let mut option = ComrakOptions::default();
        option.extension.strikethrough = true;
        option.extension.autolink = true;
        option.extension.table = true;
        option.extension.description_lists = true;
        option.parse.smart = true;
        option.render.unsafe_ = true;
        let liquid_regex = Regex::new(r"(?s)\{%.*?%\}|\{\{.*?\}\}")?;
        let hidden_regex =
            Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>")?;
        let block_end_regex = Regex::new(r"(?i)</p\s*>|</h[1-6]\s*>|<br\s*/?>|\n")?;
        let tag_regex = Regex::new(r"<[^>]*>")?;

        Ok(Excerpter {
            option,
            liquid_regex,
            hidden_regex,
            block_end_regex,
            tag_regex,
        })
    }

    /// Full searchable text when `words` is `None`, otherwise the text cut
    /// down with [`truncate_words`].
    pub fn excerpt(&self, markdown: &str, words: Option<usize>) -> String {
        let markdown = self.liquid_regex.replace_all(markdown, "");
        let html = comrak::markdown_to_html(&markdown, &self.option);
        let html = self.hidden_regex.replace_all(&html, " ");
        let html = self.block_end_regex.replace_all(&html, " ");
        let text = self.tag_regex.replace_all(&html, "");
        let text = decode_entities(&text);
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        match words {
            Some(words) => truncate_words(&text, words),
            None => text,
        }
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Keeps the first `words` words followed by `...` when the text is longer,
/// otherwise returns the text unchanged.
pub fn truncate_words(text: &str, words: usize) -> String {
    let words = words.max(1);
    let mut iter = text.split_whitespace();
    let kept: Vec<&str> = iter.by_ref().take(words).collect();
    if iter.next().is_none() {
        return text.to_string();
    }
    format!("{}...", kept.join(" "))
}
