use std::collections::HashSet;
use std::path::PathBuf;

use crate::block::{ContentNode, InlineSpan};

/// Image sources that failed to load during one rendering session.
///
/// Entries are only ever added. Start a fresh set when rendering a
/// different document unless the two should share image state.
#[derive(Debug, Clone, Default)]
pub struct BrokenImages {
    sources: HashSet<String>,
}

impl BrokenImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed load. Returns `true` the first time a source is seen.
    pub fn mark_broken(&mut self, src: impl Into<String>) -> bool {
        let src = src.into();
        log::trace!("image marked broken: {src}");
        self.sources.insert(src)
    }

    pub fn is_broken(&self, src: &str) -> bool {
        self.sources.contains(src)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    /// Ask `probe` to load every image in `nodes`, marking the failures.
    /// Sources already known to be broken are not retried.
    pub fn probe(&mut self, nodes: &[ContentNode], probe: &dyn ImageProbe) {
        for src in nodes.iter().flat_map(ContentNode::image_sources) {
            if !self.is_broken(src) && !probe.load(src) {
                self.mark_broken(src);
            }
        }
    }

    /// Swap broken images for placeholders.
    ///
    /// A standalone image becomes a paragraph holding one placeholder whose
    /// text is the alt, or the source when alt is empty. An inline image
    /// keeps its alt as is; surfaces print `image` for an empty one.
    pub fn resolve(&self, nodes: &[ContentNode]) -> Vec<ContentNode> {
        nodes.iter().map(|node| self.resolve_node(node)).collect()
    }

    fn resolve_node(&self, node: &ContentNode) -> ContentNode {
        match node {
            ContentNode::Image { alt, src } if self.is_broken(src) => {
                let label = if alt.is_empty() { src } else { alt };
                ContentNode::Paragraph {
                    spans: vec![InlineSpan::BrokenImagePlaceholder {
                        alt: label.clone(),
                    }],
                }
            }
            ContentNode::Heading { level, spans } => ContentNode::Heading {
                level: *level,
                spans: self.resolve_spans(spans),
            },
            ContentNode::Paragraph { spans } => ContentNode::Paragraph {
                spans: self.resolve_spans(spans),
            },
            ContentNode::Blockquote { spans } => ContentNode::Blockquote {
                spans: self.resolve_spans(spans),
            },
            ContentNode::List { items } => ContentNode::List {
                items: items.iter().map(|item| self.resolve_spans(item)).collect(),
            },
            other => other.clone(),
        }
    }

    fn resolve_spans(&self, spans: &[InlineSpan]) -> Vec<InlineSpan> {
        spans
            .iter()
            .map(|span| match span {
                InlineSpan::InlineImage { alt, src } if self.is_broken(src) => {
                    InlineSpan::BrokenImagePlaceholder { alt: alt.clone() }
                }
                other => other.clone(),
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for BrokenImages {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut images = Self::new();
        images.extend(iter);
        images
    }
}

impl<S: Into<String>> Extend<S> for BrokenImages {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for src in iter {
            self.mark_broken(src);
        }
    }
}

/// Whatever actually loads images: reports whether `src` could be loaded.
pub trait ImageProbe {
    fn load(&self, src: &str) -> bool;
}

/// Checks image sources against the local filesystem.
///
/// Remote (`http://`, `https://`) and `data:` sources are assumed to load;
/// anything else is a path relative to `base_dir` and must exist. A leading
/// `/` means the root of `base_dir`, not of the filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileProbe {
    pub base_dir: PathBuf,
}

impl LocalFileProbe {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl ImageProbe for LocalFileProbe {
    fn load(&self, src: &str) -> bool {
        const REMOTE: [&str; 3] = ["http://", "https://", "data:"];
        if REMOTE.iter().any(|scheme| src.starts_with(scheme)) {
            return true;
        }
        // site-rooted sources (`/img/a.png`) still resolve under base_dir
        let relative = src.trim_start_matches("file://").trim_start_matches('/');
        let path = self.base_dir.join(relative);
        let found = path.is_file();
        if !found {
            log::debug!("image not found: {}", path.display());
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::segment;
    use pretty_assertions::assert_eq;

    struct FailingProbe(&'static str);

    impl ImageProbe for FailingProbe {
        fn load(&self, src: &str) -> bool {
            src != self.0
        }
    }

    #[test]
    fn mark_broken_is_idempotent() {
        let mut images = BrokenImages::new();
        assert!(images.mark_broken("a.png"));
        assert!(!images.mark_broken("a.png"));
        assert_eq!(images.len(), 1);
        assert!(images.is_broken("a.png"));
        assert!(!images.is_broken("b.png"));
    }

    #[test]
    fn broken_standalone_image_becomes_placeholder() {
        let images: BrokenImages = ["http://x/y.png"].into_iter().collect();
        let nodes = vec![ContentNode::Image {
            alt: "cat".to_string(),
            src: "http://x/y.png".to_string(),
        }];
        assert_eq!(
            images.resolve(&nodes),
            vec![ContentNode::Paragraph {
                spans: vec![InlineSpan::BrokenImagePlaceholder {
                    alt: "cat".to_string(),
                }],
            }]
        );
    }

    #[test]
    fn empty_alt_falls_back_to_source() {
        let images: BrokenImages = ["y.png"].into_iter().collect();
        let resolved = images.resolve(&segment("![](y.png)"));
        assert_eq!(
            resolved,
            vec![ContentNode::Paragraph {
                spans: vec![InlineSpan::BrokenImagePlaceholder {
                    alt: "y.png".to_string(),
                }],
            }]
        );
    }

    #[test]
    fn inline_images_in_lists_are_resolved() {
        let images: BrokenImages = ["bad.png"].into_iter().collect();
        let resolved = images.resolve(&segment("- ![a](bad.png)\n- ![b](good.png)"));
        assert_eq!(
            resolved,
            vec![ContentNode::List {
                items: vec![
                    vec![InlineSpan::BrokenImagePlaceholder { alt: "a".to_string() }],
                    vec![InlineSpan::InlineImage {
                        alt: "b".to_string(),
                        src: "good.png".to_string(),
                    }],
                ],
            }]
        );
    }

    #[test]
    fn working_images_are_untouched() {
        let nodes = segment("![a](ok.png)\ntext ![b](ok2.png)");
        assert_eq!(BrokenImages::new().resolve(&nodes), nodes);
    }

    #[test]
    fn probe_marks_failures() {
        let nodes = segment("![a](good.png)\n> quote ![b](bad.png)");
        let mut images = BrokenImages::new();
        images.probe(&nodes, &FailingProbe("bad.png"));
        assert_eq!(images.iter().collect::<Vec<_>>(), vec!["bad.png"]);
    }

    #[test]
    fn local_probe_checks_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("here.png"), b"png").unwrap();
        let probe = LocalFileProbe::new(dir.path());

        assert!(probe.load("here.png"));
        assert!(!probe.load("missing.png"));
        assert!(probe.load("https://example.com/remote.png"));
    }

    #[test]
    fn site_rooted_paths_resolve_under_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        std::fs::write(dir.path().join("img").join("a.png"), b"png").unwrap();
        let local = LocalFileProbe::new(dir.path());

        assert!(local.load("img/a.png"));
        assert!(local.load("/img/a.png"));
        assert!(!local.load("/img/b.png"));
    }
}
