mod block;
mod config;
mod error;
mod html;
mod images;
mod inline;
mod parser;
mod post;
mod typst;

pub use block::{ContentNode, InlineSpan};
pub use config::{Config, ConfigError, ImagesConfig, PostConfig, RenderConfig};
pub use error::{Error, Result};
pub use html::{nodes_to_html, post_to_html, posts_index_to_html};
pub use images::{BrokenImages, ImageProbe, LocalFileProbe};
pub use inline::inline_format;
pub use post::{
    FrontMatter, FrontMatterValue, Post, PostMeta, derive_excerpt, estimate_read_time,
    find_by_slug, parse_front_matter,
};
pub use typst::nodes_to_typst;

/// Parse post content into a sequence of block nodes.
pub fn segment(content: &str) -> Vec<ContentNode> {
    parser::segment(content)
}

/// Render post content to HTML using default config.
pub fn render_html(content: &str, images: &BrokenImages) -> String {
    render_html_with_config(content, images, &Config::compiled_default())
}

/// Render post content to HTML with custom config.
pub fn render_html_with_config(content: &str, images: &BrokenImages, config: &Config) -> String {
    let nodes = segment(content);
    html::nodes_to_html(&nodes, images, config)
}

/// Convert post content to Typst markup.
pub fn markdown_to_typst(content: &str, images: &BrokenImages) -> String {
    let nodes = segment(content);
    typst::nodes_to_typst(&nodes, images)
}

/// Serialize the content tree as JSON, with broken images already swapped
/// for placeholders.
pub fn render_json(content: &str, images: &BrokenImages) -> serde_json::Result<String> {
    let nodes = images.resolve(&segment(content));
    serde_json::to_string_pretty(&nodes)
}
