//! Blog posts: front matter, derived metadata and body.
//!
//! A post file is optional front matter followed by the body:
//!
//! ```text
//! ---
//! title: Hello
//! tags:
//!   - rust
//!   - blog
//! ---
//! Body text.
//! ```

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::block::ContentNode;
use crate::config::PostConfig;
use crate::error::{Error, Result};
use crate::parser::segment;

/// A single front matter value: `key: value` or a `key:` followed by `  - item` lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FrontMatterValue {
    Scalar(String),
    List(Vec<String>),
}

pub type FrontMatter = BTreeMap<String, FrontMatterValue>;

/// Split `raw` into front matter and body.
///
/// Front matter must open the document with `---` on its own line and be
/// closed by another `---` line followed by a newline. Otherwise the whole
/// input is the body.
pub fn parse_front_matter(raw: &str) -> (FrontMatter, &str) {
    let Some(after_open) = raw.strip_prefix("---\n") else {
        return (FrontMatter::new(), raw);
    };
    let Some(close) = after_open.find("\n---\n") else {
        return (FrontMatter::new(), raw);
    };

    let header = &after_open[..close];
    let body = &after_open[close + "\n---\n".len()..];
    (parse_header(header), body)
}

fn parse_header(header: &str) -> FrontMatter {
    let mut front_matter = FrontMatter::new();
    let mut open_list: Option<(String, Vec<String>)> = None;

    for line in header.lines() {
        if let Some(item) = line.strip_prefix("  - ") {
            if let Some((_, items)) = open_list.as_mut() {
                items.push(item.trim().to_string());
            }
        } else if let Some((key, value)) = line.split_once(':') {
            if let Some((list_key, items)) = open_list.take() {
                front_matter.insert(list_key, FrontMatterValue::List(items));
            }
            let key = key.trim().to_string();
            let value = value.trim();
            if value.is_empty() {
                open_list = Some((key, Vec::new()));
            } else {
                front_matter.insert(key, FrontMatterValue::Scalar(value.to_string()));
            }
        }
    }

    if let Some((key, items)) = open_list {
        front_matter.insert(key, FrontMatterValue::List(items));
    }
    front_matter
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    /// Minutes
    pub read_time: usize,
    pub tags: Vec<String>,
    pub featured: bool,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub meta: PostMeta,
    pub body: String,
}

impl Post {
    /// Build a post from file contents. `fallback_slug` is used when the
    /// front matter has no `slug`, typically the file stem.
    pub fn from_source(raw: &str, fallback_slug: &str, config: &PostConfig) -> Self {
        let (front_matter, body) = parse_front_matter(raw);
        let scalar = |key: &str| match front_matter.get(key) {
            Some(FrontMatterValue::Scalar(value)) => Some(value.clone()),
            _ => None,
        };

        let published_at = scalar("publishedAt");
        let read_time = scalar("readTime")
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|minutes| *minutes > 0)
            .unwrap_or_else(|| estimate_read_time(body, config.words_per_minute));
        let excerpt = scalar("excerpt")
            .unwrap_or_else(|| derive_excerpt(&segment(body), config.excerpt_length));
        let tags = match front_matter.get("tags") {
            Some(FrontMatterValue::List(tags)) => tags.clone(),
            _ => Vec::new(),
        };

        let meta = PostMeta {
            title: scalar("title").unwrap_or_default(),
            slug: scalar("slug").unwrap_or_else(|| fallback_slug.to_string()),
            excerpt,
            updated_at: scalar("updatedAt").or_else(|| published_at.clone()),
            published_at,
            read_time,
            tags,
            featured: scalar("featured").is_some_and(|value| value == "true"),
            cover_image: scalar("coverImage"),
        };

        Self {
            meta,
            body: body.to_string(),
        }
    }

    /// Read a post file; the file stem is the fallback slug.
    pub fn load(path: &Path, config: &PostConfig) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let slug = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_source(&raw, &slug, config))
    }

    /// Load every `*.md` file in `dir`, newest `publishedAt` first.
    ///
    /// Dates are compared as strings, so they should be ISO 8601. Undated
    /// posts come before dated ones; ties keep file name order.
    pub fn load_dir(dir: &Path, config: &PostConfig) -> Result<Vec<Self>> {
        let io_error = |source: std::io::Error| Error::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut posts = paths
            .iter()
            .map(|path| Self::load(path, config))
            .collect::<Result<Vec<_>>>()?;
        posts.sort_by_key(|post| {
            Reverse((post.meta.published_at.is_none(), post.meta.published_at.clone()))
        });
        Ok(posts)
    }

    /// The post body as content nodes.
    pub fn content(&self) -> Vec<ContentNode> {
        segment(&self.body)
    }
}

/// The post whose effective slug (front matter or file stem) is `slug`.
pub fn find_by_slug<'a>(posts: &'a [Post], slug: &str) -> Option<&'a Post> {
    posts.iter().find(|post| post.meta.slug == slug)
}

/// Whole minutes to read `body`, never less than one.
pub fn estimate_read_time(body: &str, words_per_minute: usize) -> usize {
    let words = body.split_whitespace().count();
    words.div_ceil(words_per_minute.max(1)).max(1)
}

/// Plain text of the first paragraph, cut to `max_chars` with an ellipsis.
pub fn derive_excerpt(nodes: &[ContentNode], max_chars: usize) -> String {
    let Some(text) = nodes.iter().find_map(|node| match node {
        ContentNode::Paragraph { .. } => node.plain_text(),
        _ => None,
    }) else {
        return String::new();
    };

    if text.chars().count() <= max_chars {
        return text;
    }
    let mut excerpt: String = text.chars().take(max_chars).collect();
    excerpt.truncate(excerpt.trim_end().len());
    excerpt.push('…');
    excerpt
}
