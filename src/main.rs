use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use blogmark::{
    BrokenImages, Config, ContentNode, LocalFileProbe, Post, PostMeta, find_by_slug,
    nodes_to_html, nodes_to_typst, post_to_html, posts_index_to_html,
};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use serde::Serialize;

/// Config picked up from the working directory when `--config` is not given
const LOCAL_CONFIG: &str = "blogmark.toml";

#[derive(Parser)]
#[command(name = "blogmark")]
#[command(about = "Render blog post markdown to HTML, JSON or Typst")]
struct Cli {
    /// Input markdown file, or a directory of posts to index
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Config file (defaults to ./blogmark.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat an image source as broken (repeatable)
    #[arg(long = "broken", value_name = "URL")]
    broken: Vec<String>,

    /// Parse front matter and render the full post view
    #[arg(long)]
    post: bool,

    /// With a posts directory, render the post with this slug
    #[arg(long)]
    slug: Option<String>,

    /// Don't check local image paths
    #[arg(long)]
    no_probe: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Json,
    Typst,
}

#[derive(Serialize)]
struct PostJson<'a> {
    meta: &'a PostMeta,
    content: Vec<ContentNode>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref(), Path::new(LOCAL_CONFIG))?;

    let rendered = if cli.input.is_dir() {
        render_dir(cli, &config)?
    } else {
        render_file(cli, &config)?
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => io::stdout()
            .write_all(rendered.as_bytes())
            .context("writing to stdout")?,
    }

    Ok(())
}

fn render_file(cli: &Cli, config: &Config) -> Result<String> {
    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let base_dir = cli.input.parent().unwrap_or(Path::new(""));

    if cli.post {
        let stem = cli
            .input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let post = Post::from_source(&raw, &stem, &config.post);
        render(cli, config, &post.content(), Some(&post), base_dir)
    } else {
        render(cli, config, &blogmark::segment(&raw), None, base_dir)
    }
}

/// A posts directory: the index, or one post when `--slug` is given.
fn render_dir(cli: &Cli, config: &Config) -> Result<String> {
    let posts = Post::load_dir(&cli.input, &config.post)?;
    log::debug!("loaded {} post(s) from {}", posts.len(), cli.input.display());

    let Some(slug) = &cli.slug else {
        return match cli.format {
            Format::Html => Ok(posts_index_to_html(&posts)),
            Format::Json => {
                let metas: Vec<&PostMeta> = posts.iter().map(|post| &post.meta).collect();
                Ok(serde_json::to_string_pretty(&metas)?)
            }
            Format::Typst => bail!("typst output needs a single post, pass --slug"),
        };
    };

    let post = find_by_slug(&posts, slug)
        .with_context(|| format!("no post with slug {slug} in {}", cli.input.display()))?;
    render(cli, config, &post.content(), Some(post), &cli.input)
}

fn render(
    cli: &Cli,
    config: &Config,
    nodes: &[ContentNode],
    post: Option<&Post>,
    base_dir: &Path,
) -> Result<String> {
    let mut images: BrokenImages = config.images.broken.iter().cloned().collect();
    images.extend(cli.broken.iter().cloned());
    if config.images.probe_local && !cli.no_probe {
        images.probe(nodes, &LocalFileProbe::new(base_dir));
    }
    log::debug!(
        "{} block(s), {} broken image(s)",
        nodes.len(),
        images.len()
    );

    let rendered = match (cli.format, post) {
        (Format::Html, Some(post)) => post_to_html(post, &images, config),
        (Format::Html, None) => nodes_to_html(nodes, &images, config),
        (Format::Json, Some(post)) => serde_json::to_string_pretty(&PostJson {
            meta: &post.meta,
            content: images.resolve(nodes),
        })?,
        (Format::Json, None) => serde_json::to_string_pretty(&images.resolve(nodes))?,
        (Format::Typst, _) => nodes_to_typst(nodes, &images),
    };
    Ok(rendered)
}
