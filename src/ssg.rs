use crate::article::PostRecord;
use crate::config::{Settings, POSTS};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::excerpt::Excerpter;
use crate::front_matter::{self, FrontMatter};
use crate::permalink::{self, Permalink, Placeholders, COLLECTION_PATTERN};
use crate::store;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fs::read_dir;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MARKDOWN_EXTENSIONS: [&str; 5] = ["md", "markdown", "mkdown", "mkdn", "mkd"];

#[derive(Debug)]
pub struct Ssg {
    src: PathBuf,
    settings: Settings,
    excerpter: Excerpter,
    permalink: Permalink,
    post_name_regex: Regex,
}

impl Ssg {
    pub fn new(src: PathBuf, settings: Settings) -> Result<Ssg> {
        let post_name_regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(.+)$")?;

        Ok(Ssg {
            src,
            settings,
            excerpter: Excerpter::new()?,
            permalink: Permalink::new()?,
            post_name_regex,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Writes the store under `dest` and returns its path.
    pub fn build(&self, dest: &Path, now: DateTime<FixedOffset>) -> Result<PathBuf> {
        let records = self.collect(now)?;
        let path = dest.join(&self.settings.output);
        store::write(&path, &records)?;
        info!(
            path = %path.display(),
            records = records.len(),
            "search store written"
        );
        Ok(path)
    }

    /// Records of every searchable document, collection by collection.
    pub fn collect(&self, now: DateTime<FixedOffset>) -> Result<Vec<PostRecord>> {
        let mut records = vec![];
        for collection in &self.settings.collections {
            let root = self.src.join(format!("_{collection}"));
            if !root.is_dir() {
                debug!(collection = %collection, "collection directory missing, skipping");
                continue;
            }
            let mut documents = vec![];
            self.process(collection, &root, &root, now, &mut documents)?;
            documents.sort();
            info!(
                collection = %collection,
                documents = documents.len(),
                "collection indexed"
            );
            records.extend(documents.into_iter().map(Document::into_record));
        }
        Ok(records)
    }

    fn process(
        &self,
        collection: &str,
        root: &Path,
        current: &Path,
        now: DateTime<FixedOffset>,
        documents: &mut Vec<Document>,
    ) -> Result<()> {
        let mut entries = read_dir(current)
            .map_err(|e| Error::io(current, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| Error::io(current, e))?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let fname = entry.file_name();
            let Some(fname) = fname.to_str() else {
                warn!(path = %path.display(), "file name is not UTF-8, skipping");
                continue;
            };
            if fname.starts_with('.') || fname.starts_with('_') {
                continue;
            }
            let ftype = entry.file_type().map_err(|e| Error::io(&path, e))?;
            if ftype.is_dir() {
                self.process(collection, root, &path, now, documents)?;
            } else if ftype.is_file() && is_markdown(&path) {
                if let Some(document) =
                    self.process_markdown_file(collection, root, &path, now)?
                {
                    documents.push(document);
                }
            }
        }
        Ok(())
    }

    fn process_markdown_file(
        &self,
        collection: &str,
        root: &Path,
        file: &Path,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<Document>> {
        debug!(path = %file.display(), "processing");
        let source = std::fs::read_to_string(file).map_err(|e| Error::io(file, e))?;

        let Some((header, body)) = front_matter::split(&source) else {
            debug!(path = %file.display(), "no front matter, not a document");
            return Ok(None);
        };
        let front = FrontMatter::parse(header).map_err(|e| Error::FrontMatter {
            path: file.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !front.is_published() {
            debug!(path = %file.display(), "unpublished, skipping");
            return Ok(None);
        }
        if !front.is_searchable() {
            debug!(path = %file.display(), "excluded from search");
            return Ok(None);
        }

        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let relative = file
            .strip_prefix(root)
            .unwrap_or(file)
            .with_extension("")
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect::<Vec<_>>()
            .join("/");

        let is_post = collection == POSTS;
        let (name_date, name_slug) = if is_post {
            let Some(caps) = self.post_name_regex.captures(stem) else {
                warn!(
                    path = %file.display(),
                    "post file name must look like YYYY-MM-DD-title, skipping"
                );
                return Ok(None);
            };
            let date = parse_date(&format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
                .ok_or_else(|| Error::Date {
                    path: file.to_path_buf(),
                    value: stem.to_string(),
                })?;
            (Some(date), caps[4].to_string())
        } else {
            (None, stem.to_string())
        };

        let date = match front.date.as_deref() {
            Some(value) => Some(parse_date(value).ok_or_else(|| Error::Date {
                path: file.to_path_buf(),
                value: value.to_string(),
            })?),
            None => name_date,
        };
        if let Some(date) = date {
            if date > now && !self.settings.future {
                debug!(path = %file.display(), %date, "dated in the future, skipping");
                return Ok(None);
            }
        }

        let slug = front.slug.clone().unwrap_or(name_slug);
        let categories = front.categories();
        let tags = front.tags();

        let pattern = match front.permalink.as_deref() {
            Some(pattern) => pattern,
            None if is_post => permalink::pattern_for(&self.settings.permalink),
            None => COLLECTION_PATTERN,
        };
        let url = self.permalink.expand(
            pattern,
            &Placeholders {
                date: date.map(|d| d.date_naive()),
                slug: &slug,
                categories: &categories,
                collection,
                path: &relative,
            },
        );

        let teaser = front
            .teaser()
            .or(self.settings.teaser.as_deref())
            .map(|teaser| {
                if teaser.contains("://") || teaser.starts_with("//") {
                    teaser.to_string()
                } else {
                    permalink::relative_url(&self.settings.baseurl, teaser)
                }
            });

        let words = (!self.settings.full_content).then_some(self.settings.excerpt_words);
        let record = PostRecord {
            title: front.title.clone().unwrap_or_else(|| titleize(&slug)),
            excerpt: self.excerpter.excerpt(body, words),
            categories,
            tags,
            url: permalink::relative_url(&self.settings.baseurl, &url),
            teaser,
        };

        info!(source = %file.display(), url = %record.url, "indexed");

        Ok(Some(match (is_post, date) {
            (true, Some(date)) => Document::Post(date, record),
            (_, date) => Document::Entry(date, record),
        }))
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` with an optional `±HHMM`
/// offset, `YYYY-MM-DDTHH:MM:SS`, and RFC 3339. Times without an offset are taken as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M %z"] {
        if let Ok(date) = DateTime::parse_from_str(value, format) {
            return Some(date);
        }
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// `lyra-part-1` -> `Lyra Part 1`
fn titleize(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Overrides, RawConfig};
    use std::fs;

    fn now() -> DateTime<FixedOffset> {
        parse_date("2023-01-01 00:00:00 +0000").unwrap()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(config: &str) -> (tempfile::TempDir, Ssg) {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = RawConfig::parse(config).unwrap();
        raw.apply_overrides(&Overrides::default());
        let settings = Settings::from_raw(raw).unwrap();
        let ssg = Ssg::new(dir.path().to_path_buf(), settings).unwrap();
        (dir, ssg)
    }

    #[test]
    fn parse_date_formats() {
        let expected = parse_date("2022-03-07T00:00:00Z").unwrap();
        assert_eq!(parse_date("2022-03-07"), Some(expected));
        assert_eq!(parse_date("2022-03-07 00:00"), Some(expected));
        assert_eq!(parse_date("2022-03-07 09:00:00 +0900"), Some(expected));
        assert_eq!(parse_date("2022-03-07T00:00:00"), Some(expected));
        assert_eq!(parse_date("2022-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn titleize_slugs() {
        assert_eq!(titleize("lyra-part-1"), "Lyra Part 1");
        assert_eq!(titleize("custom_BLUEPRINT-nodes"), "Custom Blueprint Nodes");
    }

    #[test]
    fn post_record_fields() {
        let (dir, ssg) = site("permalink: /:title/\n");
        write(
            dir.path(),
            "_posts/2022-05-01-commonui-actionbar.md",
            "---\ntitle: \"Common UI: Action Bar\"\ncategories: [Common UI]\ntags: [unreal, CommonUI, UMG]\n---\nWhen the user interface is open in most modern games.\n",
        );
        let records = ssg.collect(now()).unwrap();
        assert_eq!(
            records,
            vec![PostRecord {
                title: "Common UI: Action Bar".to_string(),
                excerpt: "When the user interface is open in most modern games.".to_string(),
                categories: vec!["Common UI".to_string()],
                tags: vec!["unreal".to_string(), "CommonUI".to_string(), "UMG".to_string()],
                url: "/commonui-actionbar/".to_string(),
                teaser: None,
            }]
        );
    }

    #[test]
    fn posts_are_oldest_first() {
        let (dir, ssg) = site("permalink: pretty\n");
        write(dir.path(), "_posts/2022-01-01-lyra-part-1.md", "---\n---\none\n");
        write(dir.path(), "_posts/2022-02-01-lyra-part-2.md", "---\n---\ntwo\n");
        write(
            dir.path(),
            "_posts/2022-01-15-moved.md",
            "---\ndate: 2022-03-01 10:00:00 +0000\n---\nthree\n",
        );
        let urls: Vec<_> = ssg.collect(now()).unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "/2022/01/01/lyra-part-1/",
                "/2022/02/01/lyra-part-2/",
                "/2022/03/01/moved/"
            ]
        );
    }

    #[test]
    fn skips_unsearchable_documents() {
        let (dir, ssg) = site("");
        write(dir.path(), "_posts/2022-01-01-draft.md", "---\npublished: false\n---\nx\n");
        write(dir.path(), "_posts/2022-01-02-hidden.md", "---\nsearch: false\n---\nx\n");
        write(dir.path(), "_posts/2024-01-01-later.md", "---\n---\nx\n");
        write(dir.path(), "_posts/notes.md", "---\n---\nx\n");
        write(dir.path(), "_posts/2022-01-03-static.md", "no front matter\n");
        write(dir.path(), "_posts/2022-01-04-image.png", "---\n---\n");
        write(dir.path(), "_posts/.2022-01-05-dot.md", "---\n---\nx\n");
        write(dir.path(), "_posts/2022-01-06-kept.md", "---\n---\nx\n");
        let records = ssg.collect(now()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "/2022/01/06/kept.html");
        assert_eq!(records[0].title, "Kept");
    }

    #[test]
    fn future_posts_can_be_included() {
        let (dir, ssg) = site("future: true\npermalink: /:title/\n");
        write(dir.path(), "_posts/2024-01-01-later.md", "---\n---\nx\n");
        assert_eq!(ssg.collect(now()).unwrap()[0].url, "/later/");
    }

    #[test]
    fn teasers_and_baseurl() {
        let (dir, ssg) = site("baseurl: /blog\nteaser: /assets/default.png\npermalink: /:title/\n");
        write(
            dir.path(),
            "_posts/2022-01-01-own.md",
            "---\nheader:\n  teaser: assets/own.png\n---\nx\n",
        );
        write(
            dir.path(),
            "_posts/2022-01-02-remote.md",
            "---\nheader:\n  teaser: https://cdn.example.com/r.png\n---\nx\n",
        );
        write(dir.path(), "_posts/2022-01-03-fallback.md", "---\n---\nx\n");
        write(
            dir.path(),
            "_posts/2022-01-04-shared.md",
            "---\nheader:\n  teaser: //cdn.example.com/s.png\n---\nx\n",
        );
        let records = ssg.collect(now()).unwrap();
        let teasers: Vec<_> = records
            .iter()
            .map(|r| (r.url.as_str(), r.teaser.as_deref()))
            .collect();
        assert_eq!(
            teasers,
            vec![
                ("/blog/own/", Some("/blog/assets/own.png")),
                ("/blog/remote/", Some("https://cdn.example.com/r.png")),
                ("/blog/fallback/", Some("/blog/assets/default.png")),
                ("/blog/shared/", Some("//cdn.example.com/s.png")),
            ]
        );
    }

    #[test]
    fn other_collections_follow_posts() {
        let (dir, ssg) = site("collections:\n  docs:\n    output: true\n");
        write(dir.path(), "_docs/guides/setup.md", "---\ntitle: Setup\n---\nInstall it.\n");
        write(dir.path(), "_docs/about.md", "---\npermalink: /about/\n---\nAbout.\n");
        write(dir.path(), "_posts/2022-01-01-hello.md", "---\ncategories: News\n---\nHi\n");
        let urls: Vec<_> = ssg.collect(now()).unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec!["/news/2022/01/01/hello.html", "/about/", "/docs/guides/setup.html"]
        );
    }

    #[test]
    fn iso_date_without_offset_is_accepted() {
        let (dir, ssg) = site("permalink: pretty\n");
        write(
            dir.path(),
            "_posts/2022-01-01-iso.md",
            "---\ndate: 2022-03-01T10:00:00\n---\nx\n",
        );
        assert_eq!(ssg.collect(now()).unwrap()[0].url, "/2022/03/01/iso/");
    }

    #[test]
    fn front_matter_slug_replaces_file_slug() {
        let (dir, ssg) = site("permalink: /:title/\n");
        write(
            dir.path(),
            "_posts/2022-01-01-lyra-part-1.md",
            "---\nslug: lyra-introduction\n---\nx\n",
        );
        let records = ssg.collect(now()).unwrap();
        assert_eq!(records[0].url, "/lyra-introduction/");
        assert_eq!(records[0].title, "Lyra Introduction");
    }

    #[test]
    fn underscore_names_are_skipped() {
        let (dir, ssg) = site("permalink: /:title/\n");
        write(dir.path(), "_posts/_2022-01-01-partial.md", "---\n---\nx\n");
        write(dir.path(), "_posts/_drafts/2022-01-02-draft.md", "---\n---\nx\n");
        write(dir.path(), "_posts/unreal/2022-01-03-nested.md", "---\n---\nx\n");
        let urls: Vec<_> = ssg.collect(now()).unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/nested/"]);
    }

    #[test]
    fn future_entries_are_skipped_in_other_collections() {
        let (dir, ssg) = site("collections: [docs]\n");
        write(dir.path(), "_docs/later.md", "---\ndate: 2024-06-01\n---\nx\n");
        write(dir.path(), "_docs/earlier.md", "---\ndate: 2022-06-01\n---\nx\n");
        let urls: Vec<_> = ssg.collect(now()).unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/docs/earlier.html"]);
    }

    #[test]
    fn bad_front_matter_names_the_file() {
        let (dir, ssg) = site("");
        write(dir.path(), "_posts/2022-01-01-broken.md", "---\ntags: [x\n---\nx\n");
        let err = ssg.collect(now()).unwrap_err();
        assert!(matches!(err, Error::FrontMatter { .. }));
        assert!(err.to_string().contains("2022-01-01-broken.md"));
    }

    #[test]
    fn bad_front_matter_date_is_an_error() {
        let (dir, ssg) = site("");
        write(dir.path(), "_posts/2022-01-01-when.md", "---\ndate: someday\n---\nx\n");
        assert!(matches!(ssg.collect(now()), Err(Error::Date { .. })));
    }

    #[test]
    fn build_writes_store_file() {
        let (dir, ssg) = site("permalink: /:title/\n");
        write(dir.path(), "_posts/2022-01-01-hello.md", "---\n---\nHi\n");
        let dest = dir.path().join("_site");
        let path = ssg.build(&dest, now()).unwrap();
        assert_eq!(path, dest.join("assets/js/lunr/lunr-store.js"));
        let records = store::read(&path).unwrap();
        assert_eq!(records[0].url, "/hello/");
    }
}
