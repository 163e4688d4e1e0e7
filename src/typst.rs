use crate::block::{ContentNode, InlineSpan};
use crate::images::BrokenImages;

/// Convert nodes to Typst markup
pub fn nodes_to_typst(nodes: &[ContentNode], images: &BrokenImages) -> String {
    let mut out = String::new();

    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n\n");

    let mut i = 0;
    while i < nodes.len() {
        let node = &nodes[i];

        match node {
            ContentNode::Heading { .. } => {
                // Keep heading with following content using a block that prevents breaks
                out.push_str("#block(breakable: false)[\n");
                emit_node(node, images, &mut out);

                if i + 1 < nodes.len() {
                    i += 1;
                    emit_node(&nodes[i], images, &mut out);
                }
                out.push_str("]\n\n");
            }
            _ => {
                emit_node(node, images, &mut out);
            }
        }

        i += 1;
    }

    out
}

fn emit_node(node: &ContentNode, images: &BrokenImages, out: &mut String) {
    match node {
        ContentNode::Heading { level, spans } => {
            for _ in 0..*level {
                out.push('=');
            }
            out.push(' ');
            spans_to_typst(spans, images, out);
            out.push_str("\n\n");
        }
        ContentNode::Paragraph { spans } => {
            spans_to_typst(spans, images, out);
            out.push_str("\n\n");
        }
        ContentNode::Blockquote { spans } => {
            out.push_str("#quote(block: true)[");
            spans_to_typst(spans, images, out);
            out.push_str("]\n\n");
        }
        ContentNode::CodeBlock { language, lines } => {
            // Keep code blocks together when possible
            out.push_str("#block(breakable: false)[\n```");
            out.push_str(language);
            out.push('\n');
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("```\n]\n\n");
        }
        ContentNode::List { items } => {
            // Short lists stay on one page
            let keep_together = items.len() <= 5;
            if keep_together {
                out.push_str("#block(breakable: false)[\n");
            }
            for item in items {
                out.push_str("- ");
                spans_to_typst(item, images, out);
                out.push('\n');
            }
            out.push_str(if keep_together { "]\n\n" } else { "\n" });
        }
        ContentNode::Image { alt, src } if images.is_broken(src) => {
            let label = if alt.is_empty() { src } else { alt };
            escape_text(&format!("⚠ Failed to load image: {label}"), out);
            out.push_str("\n\n");
        }
        ContentNode::Image { alt, src } => {
            out.push_str(&format!(
                "#image(\"{}\", alt: \"{}\")\n\n",
                escape_string(src),
                escape_string(alt)
            ));
        }
        ContentNode::Divider => {
            out.push_str("#line(length: 100%)\n\n");
        }
    }
}

fn spans_to_typst(spans: &[InlineSpan], images: &BrokenImages, out: &mut String) {
    for span in spans {
        span_to_typst(span, images, out);
    }
}

fn span_to_typst(span: &InlineSpan, images: &BrokenImages, out: &mut String) {
    match span {
        InlineSpan::Text(text) => escape_text(text, out),
        InlineSpan::Bold(text) => {
            out.push('*');
            escape_text(text, out);
            out.push('*');
        }
        // Backtick raw text has no escapes, so fall back to a raw() call
        InlineSpan::Code(text) if text.contains('`') => {
            out.push_str(&format!("#raw(\"{}\")", escape_string(text)));
        }
        InlineSpan::Code(text) => {
            out.push('`');
            out.push_str(text);
            out.push('`');
        }
        InlineSpan::InlineImage { alt, src } if !images.is_broken(src) => {
            out.push_str(&format!(
                "#box(image(\"{}\", alt: \"{}\"))",
                escape_string(src),
                escape_string(alt)
            ));
        }
        InlineSpan::InlineImage { alt, .. } | InlineSpan::BrokenImagePlaceholder { alt } => {
            let label: &str = if alt.is_empty() { "image" } else { alt };
            escape_text(&format!("[{label}]"), out);
        }
    }
}

/// Escape special Typst characters in markup text
fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '=' | '-' | '+'
            | '/' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

/// Escape a value placed inside a Typst string literal
fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
