use serde::ser::{Serialize, SerializeMap, Serializer};

/// Inline text spans within a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSpan {
    Text(String),
    /// Content between `**` markers, kept literal
    Bold(String),
    Code(String),
    InlineImage {
        alt: String,
        src: String,
    },
    /// Stands in for an image whose source failed to load
    BrokenImagePlaceholder {
        alt: String,
    },
}

impl InlineSpan {
    /// Text content with all markup removed.
    pub fn plain_text(&self) -> &str {
        match self {
            InlineSpan::Text(value) | InlineSpan::Bold(value) | InlineSpan::Code(value) => value,
            InlineSpan::InlineImage { alt, .. } | InlineSpan::BrokenImagePlaceholder { alt } => alt,
        }
    }
}

/// Flat `{"type": ..., fields}` maps, the same shape as `ContentNode`.
/// Text-carrying variants put their text under `value`.
impl Serialize for InlineSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            InlineSpan::Text(value) => {
                map.serialize_entry("type", "text")?;
                map.serialize_entry("value", value)?;
            }
            InlineSpan::Bold(value) => {
                map.serialize_entry("type", "bold")?;
                map.serialize_entry("value", value)?;
            }
            InlineSpan::Code(value) => {
                map.serialize_entry("type", "code")?;
                map.serialize_entry("value", value)?;
            }
            InlineSpan::InlineImage { alt, src } => {
                map.serialize_entry("type", "inline_image")?;
                map.serialize_entry("alt", alt)?;
                map.serialize_entry("src", src)?;
            }
            InlineSpan::BrokenImagePlaceholder { alt } => {
                map.serialize_entry("type", "broken_image_placeholder")?;
                map.serialize_entry("alt", alt)?;
            }
        }
        map.end()
    }
}

/// Block-level content, in document order
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    Heading {
        level: u8,
        spans: Vec<InlineSpan>,
    },
    Paragraph {
        spans: Vec<InlineSpan>,
    },
    Blockquote {
        spans: Vec<InlineSpan>,
    },
    CodeBlock {
        language: String,
        lines: Vec<String>,
    },
    /// Flat list; dash, star and numbered items all share it
    List {
        items: Vec<Vec<InlineSpan>>,
    },
    Image {
        alt: String,
        src: String,
    },
    Divider,
}

impl ContentNode {
    /// Every image source referenced by this node, standalone or inline.
    pub fn image_sources(&self) -> Vec<&str> {
        fn inline_sources<'a>(spans: &'a [InlineSpan], out: &mut Vec<&'a str>) {
            for span in spans {
                if let InlineSpan::InlineImage { src, .. } = span {
                    out.push(src);
                }
            }
        }

        let mut out = Vec::new();
        match self {
            ContentNode::Heading { spans, .. }
            | ContentNode::Paragraph { spans }
            | ContentNode::Blockquote { spans } => inline_sources(spans, &mut out),
            ContentNode::List { items } => {
                for item in items {
                    inline_sources(item, &mut out);
                }
            }
            ContentNode::Image { src, .. } => out.push(src),
            ContentNode::CodeBlock { .. } | ContentNode::Divider => {}
        }
        out
    }

    /// Concatenated plain text of the node, or `None` for nodes without prose.
    pub fn plain_text(&self) -> Option<String> {
        let join = |spans: &[InlineSpan]| -> String {
            spans.iter().map(InlineSpan::plain_text).collect()
        };
        match self {
            ContentNode::Heading { spans, .. }
            | ContentNode::Paragraph { spans }
            | ContentNode::Blockquote { spans } => Some(join(spans)),
            ContentNode::List { items } => Some(
                items
                    .iter()
                    .map(|item| join(item))
                    .collect::<Vec<String>>()
                    .join(" "),
            ),
            ContentNode::CodeBlock { lines, .. } => Some(lines.join(" ")),
            ContentNode::Image { .. } | ContentNode::Divider => None,
        }
    }
}
