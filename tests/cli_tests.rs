use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn blogmark() -> Command {
    Command::cargo_bin("blogmark").unwrap()
}

#[test]
fn renders_html_to_stdout() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("post.md"), "# Hello\n\n**hi** there").unwrap();

    blogmark()
        .current_dir(dir.path())
        .arg("post.md")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<h1 class=\"blog-heading blog-heading-1\">Hello</h1>",
        ))
        .stdout(predicate::str::contains("<strong>hi</strong> there"));
}

#[test]
fn missing_local_image_is_placeholder() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("here.png"), b"png").unwrap();
    fs::write(
        dir.path().join("post.md"),
        "![present](here.png)\n![absent](missing.png)",
    )
    .unwrap();

    blogmark()
        .current_dir(dir.path())
        .arg("post.md")
        .assert()
        .success()
        .stdout(predicate::str::contains("<img src=\"here.png\""))
        .stdout(predicate::str::contains("Failed to load image: absent"));
}

#[test]
fn no_probe_keeps_images() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("post.md"), "![absent](missing.png)").unwrap();

    blogmark()
        .current_dir(dir.path())
        .args(["post.md", "--no-probe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<img src=\"missing.png\""));
}

#[test]
fn broken_flag_marks_remote_image() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("post.md"), "a ![x](https://e.com/x.png)").unwrap();

    blogmark()
        .current_dir(dir.path())
        .args(["post.md", "--broken", "https://e.com/x.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x]</span>"));
}

#[test]
fn post_json_includes_meta() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("first.md"),
        "---\ntitle: First\ntags:\n  - rust\n---\nBody text.\n",
    )
    .unwrap();

    let output = blogmark()
        .current_dir(dir.path())
        .args(["first.md", "--post", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["meta"]["title"], "First");
    assert_eq!(value["meta"]["slug"], "first");
    assert_eq!(value["meta"]["tags"][0], "rust");
    assert_eq!(value["meta"]["excerpt"], "Body text.");
    assert_eq!(value["content"][0]["type"], "paragraph");
}

#[test]
fn post_html_has_header() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("p.md"),
        "---\ntitle: A <b> title\npublishedAt: 2024-05-01\nupdatedAt: 2024-06-01\n---\nText\n",
    )
    .unwrap();

    blogmark()
        .current_dir(dir.path())
        .args(["p.md", "--post"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<h1 class=\"post-view-title\">A &lt;b&gt; title</h1>",
        ))
        .stdout(predicate::str::contains("Updated: 2024-06-01"));
}

#[test]
fn typst_to_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc.md"), "Plain").unwrap();

    blogmark()
        .current_dir(dir.path())
        .args(["doc.md", "-f", "typst", "-o", "doc.typ"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let typst = fs::read_to_string(dir.path().join("doc.typ")).unwrap();
    assert!(typst.ends_with("Plain\n\n"));
}

#[test]
fn local_config_is_used() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("blogmark.toml"), "[render]\nwrap = false\nclass_prefix = \"x\"\n").unwrap();
    fs::write(dir.path().join("doc.md"), "---").unwrap();

    blogmark()
        .current_dir(dir.path())
        .arg("doc.md")
        .assert()
        .success()
        .stdout("<hr class=\"x-divider\">\n");
}

#[test]
fn bad_config_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.toml"), "[render\n").unwrap();
    fs::write(dir.path().join("doc.md"), "x").unwrap();

    blogmark()
        .current_dir(dir.path())
        .args(["doc.md", "--config", "bad.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn missing_input_fails() {
    let dir = tempdir().unwrap();

    blogmark()
        .current_dir(dir.path())
        .arg("nope.md")
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading nope.md"));
}

fn posts_dir() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    let posts = dir.path().join("posts");
    fs::create_dir(&posts).unwrap();
    fs::write(
        posts.join("older.md"),
        "---\ntitle: Older\npublishedAt: 2024-01-01\n---\nFirst post.",
    )
    .unwrap();
    fs::write(
        posts.join("newer.md"),
        "---\ntitle: Newer\npublishedAt: 2024-05-01\nslug: fresh\n---\n![gone](gone.png)",
    )
    .unwrap();
    dir
}

#[test]
fn directory_renders_index_newest_first() {
    let dir = posts_dir();

    let output = blogmark()
        .current_dir(dir.path())
        .arg("posts")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let newer = stdout.find("data-slug=\"fresh\"").unwrap();
    let older = stdout.find("data-slug=\"older\"").unwrap();
    assert!(newer < older);
    assert!(stdout.contains("<h3 class=\"post-card-title\">Older</h3>"));
}

#[test]
fn directory_json_lists_meta() {
    let dir = posts_dir();

    blogmark()
        .current_dir(dir.path())
        .args(["posts", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slug\": \"fresh\""))
        .stdout(predicate::str::contains("\"publishedAt\": \"2024-01-01\""));
}

#[test]
fn directory_slug_renders_one_post() {
    let dir = posts_dir();

    blogmark()
        .current_dir(dir.path())
        .args(["posts", "--slug", "fresh"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<h1 class=\"post-view-title\">Newer</h1>",
        ))
        .stdout(predicate::str::contains("Failed to load image: gone"));
}

#[test]
fn directory_unknown_slug_fails() {
    let dir = posts_dir();

    blogmark()
        .current_dir(dir.path())
        .args(["posts", "--slug", "newer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no post with slug newer"));
}

#[test]
fn directory_typst_needs_slug() {
    let dir = posts_dir();

    blogmark()
        .current_dir(dir.path())
        .args(["posts", "--format", "typst"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --slug"));
}
