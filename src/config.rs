//! Site settings: `_config.yml` values with command-line overrides on top.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "_config.yml";
pub const POSTS: &str = "posts";
const DEFAULT_PERMALINK: &str = "date";
const DEFAULT_EXCERPT_WORDS: usize = 50;
const DEFAULT_SEARCH_OUTPUT: &str = "assets/js/lunr/lunr-store.js";

/// Jekyll accepts `collections` either as a list of names or as a map from
/// name to collection options.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum RawCollections {
    List(Vec<String>),
    Map(serde_yaml::Mapping),
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RawConfig {
    pub baseurl: Option<String>,
    pub permalink: Option<String>,
    pub teaser: Option<String>,
    pub search_full_content: Option<bool>,
    pub excerpt_words: Option<usize>,
    pub future: Option<bool>,
    pub collections: Option<RawCollections>,
    pub search_output: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override `baseurl` from the site configuration.
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Index the full text of each document instead of a truncated excerpt.
    #[arg(long = "full-content", action = clap::ArgAction::SetTrue)]
    pub full_content: bool,

    /// Include posts dated in the future.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub future: bool,

    /// Store path, relative to the destination directory.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub baseurl: String,
    pub permalink: String,
    pub teaser: Option<String>,
    pub full_content: bool,
    pub excerpt_words: usize,
    pub future: bool,
    /// Indexed collections in output order; `posts` always comes first.
    pub collections: Vec<String>,
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            baseurl: String::new(),
            permalink: DEFAULT_PERMALINK.to_string(),
            teaser: None,
            full_content: false,
            excerpt_words: DEFAULT_EXCERPT_WORDS,
            future: false,
            collections: vec![POSTS.to_string()],
            output: PathBuf::from(DEFAULT_SEARCH_OUTPUT),
        }
    }
}

impl RawConfig {
    pub fn read(source: &Path) -> Result<RawConfig> {
        let path = source.join(CONFIG_FILE);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no site configuration, using defaults");
            return Ok(RawConfig::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        RawConfig::parse(&text).map_err(|source| Error::Yaml { path, source })
    }

    pub fn parse(text: &str) -> std::result::Result<RawConfig, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(RawConfig::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(base_url) = overrides.base_url.as_ref() {
            self.baseurl = Some(base_url.clone());
        }
        if overrides.full_content {
            self.search_full_content = Some(true);
        }
        if overrides.future {
            self.future = Some(true);
        }
        if let Some(output) = overrides.output.as_ref() {
            self.search_output = Some(output.clone());
        }
    }
}

impl Settings {
    pub fn load(source: &Path, overrides: &Overrides) -> Result<Settings> {
        let mut raw = RawConfig::read(source)?;
        raw.apply_overrides(overrides);
        Settings::from_raw(raw)
    }

    pub fn from_raw(raw: RawConfig) -> Result<Settings> {
        let defaults = Settings::default();

        let excerpt_words = raw.excerpt_words.unwrap_or(defaults.excerpt_words);
        if excerpt_words == 0 {
            return Err(Error::Config("excerpt_words must be positive".to_string()));
        }

        let output = raw.search_output.unwrap_or(defaults.output);
        if output.as_os_str().is_empty() || output.is_absolute() {
            return Err(Error::Config(format!(
                "search_output must be a relative file path, got `{}`",
                output.display()
            )));
        }

        let permalink = match raw.permalink {
            Some(p) if !p.trim().is_empty() => p.trim().to_string(),
            _ => defaults.permalink,
        };

        Ok(Settings {
            baseurl: raw.baseurl.unwrap_or_default().trim().to_string(),
            permalink,
            teaser: raw.teaser.filter(|t| !t.trim().is_empty()),
            full_content: raw.search_full_content.unwrap_or(false),
            excerpt_words,
            future: raw.future.unwrap_or(false),
            collections: collection_names(raw.collections)?,
            output,
        })
    }
}

fn collection_names(raw: Option<RawCollections>) -> Result<Vec<String>> {
    let configured = match raw {
        None => vec![],
        Some(RawCollections::List(names)) => names,
        Some(RawCollections::Map(map)) => map
            .keys()
            .map(|key| {
                key.as_str().map(str::to_string).ok_or_else(|| {
                    Error::Config(format!("collection name must be text, got {key:?}"))
                })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    let mut names = vec![POSTS.to_string()];
    for name in configured {
        let name = name.trim().to_string();
        if name.is_empty() || name.contains('/') || name.starts_with('.') {
            return Err(Error::Config(format!("invalid collection name `{name}`")));
        }
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}
