use crate::block::{ContentNode, InlineSpan};
use crate::inline::{find_image, inline_format};

const FENCE: &str = "```";

/// Split post content into block nodes, in document order.
///
/// Never fails: anything unrecognised becomes a paragraph. A code fence
/// left open at the end of the input is dropped along with its lines.
pub fn segment(content: &str) -> Vec<ContentNode> {
    let content = trim(content);
    if content.is_empty() {
        return Vec::new();
    }

    let mut state = SegmentState::default();
    for line in content.split('\n') {
        state.push_line(line);
    }
    state.finish()
}

/// What the segmenter is in the middle of.
#[derive(Debug, Default)]
enum Mode {
    #[default]
    Normal,
    InCodeBlock {
        language: String,
        lines: Vec<String>,
    },
    InList {
        items: Vec<Vec<InlineSpan>>,
    },
}

#[derive(Debug, Default)]
struct SegmentState {
    mode: Mode,
    nodes: Vec<ContentNode>,
}

impl SegmentState {
    fn push_line(&mut self, line: &str) {
        if let Mode::InCodeBlock { language, lines } = &mut self.mode {
            if trim(line).starts_with(FENCE) {
                let node = ContentNode::CodeBlock {
                    language: std::mem::take(language),
                    lines: std::mem::take(lines),
                };
                self.nodes.push(node);
                self.mode = Mode::Normal;
            } else {
                lines.push(line.to_string());
            }
            return;
        }

        let trimmed = trim(line);

        if let Some(language) = trimmed.strip_prefix(FENCE) {
            self.flush_list();
            self.mode = Mode::InCodeBlock {
                language: language.to_string(),
                lines: Vec::new(),
            };
            return;
        }

        if trimmed.starts_with("![") {
            if let Some((alt, src)) = find_image(trimmed) {
                self.flush_list();
                self.nodes.push(ContentNode::Image { alt, src });
                return;
            }
        }

        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            self.push_list_item(item);
            return;
        }

        if matches!(self.mode, Mode::InList { .. }) {
            if let Some(item) = strip_numbered_marker(trimmed) {
                self.push_list_item(item);
                return;
            }
        }

        self.flush_list();

        if let Some(node) = single_line_block(trimmed) {
            self.nodes.push(node);
        }
    }

    fn push_list_item(&mut self, item: &str) {
        let spans = inline_format(item);
        match &mut self.mode {
            Mode::InList { items } => items.push(spans),
            _ => self.mode = Mode::InList { items: vec![spans] },
        }
    }

    fn flush_list(&mut self) {
        if let Mode::InList { items } = &mut self.mode {
            let items = std::mem::take(items);
            self.nodes.push(ContentNode::List { items });
            self.mode = Mode::Normal;
        }
    }

    fn finish(mut self) -> Vec<ContentNode> {
        self.flush_list();
        if let Mode::InCodeBlock { lines, .. } = &self.mode {
            log::debug!(
                "dropping unterminated code block with {} line(s)",
                lines.len()
            );
        }
        self.nodes
    }
}

/// Whitespace trim that also drops byte order marks, so a post saved with a
/// BOM keeps its first block.
fn trim(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Headings, quotes, dividers and paragraphs. Blank lines yield nothing.
fn single_line_block(trimmed: &str) -> Option<ContentNode> {
    const HEADINGS: [(&str, u8); 3] = [("# ", 1), ("## ", 2), ("### ", 3)];

    for (marker, level) in HEADINGS {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Some(ContentNode::Heading {
                level,
                spans: inline_format(rest),
            });
        }
    }

    if let Some(rest) = trimmed.strip_prefix("> ") {
        return Some(ContentNode::Blockquote {
            spans: inline_format(rest),
        });
    }

    match trimmed {
        "---" => Some(ContentNode::Divider),
        "" => None,
        _ => Some(ContentNode::Paragraph {
            spans: inline_format(trimmed),
        }),
    }
}

/// Strip a leading `12. ` style marker: ASCII digits, a period, then exactly
/// one whitespace character.
fn strip_numbered_marker(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => Some(chars.as_str()),
        _ => None,
    }
}
