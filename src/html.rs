use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::block::{ContentNode, InlineSpan};
use crate::config::{Config, RenderConfig};
use crate::images::BrokenImages;
use crate::post::Post;

/// Convert nodes to HTML.
///
/// Images are checked against `images` as they are written out: a broken
/// standalone image becomes an error box, a broken inline image a bracketed
/// label.
pub fn nodes_to_html(nodes: &[ContentNode], images: &BrokenImages, config: &Config) -> String {
    let mut out = String::new();
    let writer = HtmlWriter {
        images,
        render: &config.render,
    };

    if config.render.wrap {
        out.push_str("<div class=\"rich-text-renderer\">\n");
    }
    for node in nodes {
        writer.block(node, &mut out);
        out.push('\n');
    }
    if config.render.wrap {
        out.push_str("</div>\n");
    }

    out
}

/// Convert a whole post to an HTML article: title, meta line, tags, body.
pub fn post_to_html(post: &Post, images: &BrokenImages, config: &Config) -> String {
    let meta = &post.meta;
    let mut out = String::new();

    out.push_str("<article class=\"blog-post-view\">\n<header class=\"post-view-header\">\n");
    out.push_str(&format!(
        "<h1 class=\"post-view-title\">{}</h1>\n",
        encode_text(&meta.title)
    ));
    out.push_str("<div class=\"post-view-meta\">");
    if let Some(published) = &meta.published_at {
        out.push_str(&format!(
            "<time datetime=\"{}\">Published: {}</time><span class=\"post-view-separator\">•</span>",
            encode_double_quoted_attribute(published),
            encode_text(published)
        ));
    }
    out.push_str(&format!("<span>{} min read</span></div>\n", meta.read_time));

    if !meta.tags.is_empty() {
        out.push_str("<div class=\"post-view-tags\">");
        for tag in &meta.tags {
            out.push_str(&format!(
                "<span class=\"post-view-tag\">{}</span>",
                encode_text(tag)
            ));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</header>\n<div class=\"post-view-content\">\n");
    out.push_str(&nodes_to_html(&post.content(), images, config));
    out.push_str("</div>\n");

    if let Some(updated) = meta.updated_at.as_deref() {
        if meta.published_at.as_deref() != Some(updated) {
            out.push_str(&format!(
                "<footer class=\"post-view-footer\"><p class=\"post-view-updated\">Updated: {}</p></footer>\n",
                encode_text(updated)
            ));
        }
    }
    out.push_str("</article>\n");

    out
}

/// Tags shown on an index card; the rest are only on the post page
const CARD_TAGS: usize = 3;

/// A post listing: one card per post, in the order given.
pub fn posts_index_to_html(posts: &[Post]) -> String {
    let mut out = String::from("<section class=\"blog-post-list\">\n");

    for post in posts {
        let meta = &post.meta;
        let class = if meta.featured {
            "blog-post-card featured"
        } else {
            "blog-post-card"
        };
        out.push_str(&format!(
            "<article class=\"{class}\" data-slug=\"{}\">\n",
            encode_double_quoted_attribute(&meta.slug)
        ));
        out.push_str(&format!(
            "<h3 class=\"post-card-title\">{}</h3>\n",
            encode_text(&meta.title)
        ));
        out.push_str("<div class=\"post-card-meta\">");
        if let Some(published) = &meta.published_at {
            out.push_str(&format!(
                "<time class=\"post-card-date\" datetime=\"{}\">{}</time><span class=\"post-card-separator\">•</span>",
                encode_double_quoted_attribute(published),
                encode_text(published)
            ));
        }
        out.push_str(&format!(
            "<span class=\"post-card-read-time\">{} min read</span></div>\n",
            meta.read_time
        ));
        if !meta.excerpt.is_empty() {
            out.push_str(&format!(
                "<p class=\"post-card-excerpt\">{}</p>\n",
                encode_text(&meta.excerpt)
            ));
        }
        if !meta.tags.is_empty() {
            out.push_str("<div class=\"post-card-tags\">");
            for tag in meta.tags.iter().take(CARD_TAGS) {
                out.push_str(&format!(
                    "<span class=\"post-card-tag\">{}</span>",
                    encode_text(tag)
                ));
            }
            out.push_str("</div>\n");
        }
        out.push_str("</article>\n");
    }

    out.push_str("</section>\n");
    out
}

struct HtmlWriter<'a> {
    images: &'a BrokenImages,
    render: &'a RenderConfig,
}

impl HtmlWriter<'_> {
    fn block(&self, node: &ContentNode, out: &mut String) {
        match node {
            ContentNode::Heading { level, spans } => {
                out.push_str(&format!(
                    "<h{level} class=\"{} {}\">",
                    self.render.class("heading"),
                    self.render.class(&format!("heading-{level}"))
                ));
                self.spans(spans, out);
                out.push_str(&format!("</h{level}>"));
            }
            ContentNode::Paragraph { spans } => {
                out.push_str(&format!("<p class=\"{}\">", self.render.class("paragraph")));
                self.spans(spans, out);
                out.push_str("</p>");
            }
            ContentNode::Blockquote { spans } => {
                out.push_str(&format!(
                    "<blockquote class=\"{}\"><p>",
                    self.render.class("blockquote")
                ));
                self.spans(spans, out);
                out.push_str("</p></blockquote>");
            }
            ContentNode::CodeBlock { language, lines } => {
                out.push_str(&format!(
                    "<pre class=\"{}\"><code class=\"language-{}\">",
                    self.render.class("code-block"),
                    encode_double_quoted_attribute(language)
                ));
                out.push_str(&encode_text(&lines.join("\n")));
                out.push_str("</code></pre>");
            }
            ContentNode::List { items } => {
                out.push_str(&format!("<ul class=\"{}\">", self.render.class("list")));
                for item in items {
                    out.push_str("<li>");
                    self.spans(item, out);
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
            ContentNode::Image { alt, src } if self.images.is_broken(src) => {
                let label = if alt.is_empty() { src } else { alt };
                out.push_str(&format!(
                    "<div class=\"{}\">⚠️ Failed to load image: {}</div>",
                    self.render.class("image-error"),
                    encode_text(label)
                ));
            }
            ContentNode::Image { alt, src } => {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" class=\"{}\">",
                    encode_double_quoted_attribute(src),
                    encode_double_quoted_attribute(alt),
                    self.render.class("image")
                ));
            }
            ContentNode::Divider => {
                out.push_str(&format!("<hr class=\"{}\">", self.render.class("divider")));
            }
        }
    }

    fn spans(&self, spans: &[InlineSpan], out: &mut String) {
        for span in spans {
            self.span(span, out);
        }
    }

    fn span(&self, span: &InlineSpan, out: &mut String) {
        match span {
            InlineSpan::Text(text) => out.push_str(&encode_text(text)),
            InlineSpan::Bold(text) => {
                out.push_str("<strong>");
                out.push_str(&encode_text(text));
                out.push_str("</strong>");
            }
            InlineSpan::Code(text) => {
                out.push_str(&format!(
                    "<code class=\"{}\">{}</code>",
                    self.render.class("inline-code"),
                    encode_text(text)
                ));
            }
            InlineSpan::InlineImage { alt, src } if self.images.is_broken(src) => {
                self.inline_placeholder(alt, out);
            }
            InlineSpan::InlineImage { alt, src } => {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" class=\"{}\">",
                    encode_double_quoted_attribute(src),
                    encode_double_quoted_attribute(alt),
                    self.render.class("image")
                ));
            }
            InlineSpan::BrokenImagePlaceholder { alt } => self.inline_placeholder(alt, out),
        }
    }

    fn inline_placeholder(&self, alt: &str, out: &mut String) {
        let label = if alt.is_empty() { "image" } else { alt };
        out.push_str(&format!(
            "<span class=\"{}\">[{}]</span>",
            self.render.class("image-error"),
            encode_text(label)
        ));
    }
}
