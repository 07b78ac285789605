//! End-to-end generation tests
//!
//! These tests run the command-line flow against manifests written to a
//! temporary directory and inspect the generated Go files.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;

use clap::Parser;
use jadegen::{Cli, run};
use jadegen_infrastructure::parse_go_src;
use tempfile::tempdir;

const MANIFEST: &str = r#"
units:
  - seed: index
    body: "buffer.WriteString(html.EscapeString(title))"
    meta:
      name: Index
      params:
        - name: title
          type: string
  - seed: list
    file_name: list.go
    body: "for _, item := range items {\nbuffer.WriteString(strings.ToUpper(item))\n}"
    legacy:
      name: List
      args: "items []string"
      import: "\"strings\""
"#;

fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("jadegen").chain(args.iter().copied()))
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

fn no_env() -> Vec<(String, String)> {
    Vec::new()
}

#[tokio::test]
async fn test_generates_one_file_per_unit() {
    let temp = tempdir().expect("Failed to create temp directory");
    let manifest = temp.path().join("units.yaml");
    std::fs::write(&manifest, MANIFEST).unwrap();
    let out = temp.path().join("gen");

    let output = run(
        cli(&[path_str(&manifest), "-o", path_str(&out), "--pkg", "views"]),
        no_env(),
    )
    .await
    .expect("generation succeeds");

    assert_eq!(
        output.written,
        vec![out.join("index.jade.go"), out.join("list.go")]
    );

    let index = std::fs::read_to_string(out.join("index.jade.go")).unwrap();
    assert!(index.starts_with("// Code generated by \"jadegen\"; DO NOT EDIT.\n\npackage views\n"));
    assert!(index.contains("\t\"html\"\n"));
    assert!(index.contains("pool \"github.com/valyala/bytebufferpool\""));
    assert!(index.contains("func Index(title string, buffer *pool.ByteBuffer) {\n"));
    assert!(index.contains("\tbuffer.WriteString(html.EscapeString(title))\n"));
    parse_go_src("index.jade.go", &index).unwrap();

    let list = std::fs::read_to_string(out.join("list.go")).unwrap();
    assert!(list.contains("\t\"strings\"\n"));
    assert!(list.contains("func List(items []string, buffer *pool.ByteBuffer) {\n"));
    assert!(list.contains("\tfor _, item := range items {\n\t\tbuffer.WriteString(strings.ToUpper(item))\n\t}\n"));
    assert!(!list.contains("\"html\""));
}

#[tokio::test]
async fn test_settings_file_env_and_flags_are_layered() {
    let temp = tempdir().expect("Failed to create temp directory");
    let manifest = temp.path().join("units.json");
    std::fs::write(
        &manifest,
        r#"{"units": [{"seed": "page", "body": "buffer.WriteString(\"hi\")"}]}"#,
    )
    .unwrap();
    let config = temp.path().join("jadegen.yaml");
    std::fs::write(&config, "package: site\noutput_suffix: .go\n").unwrap();
    let out = temp.path().join("out");

    let env = vec![
        ("JADEGEN_PKG".to_string(), "fromenv".to_string()),
        ("JADEGEN_STDBUF".to_string(), "true".to_string()),
    ];
    run(
        cli(&[path_str(&manifest), "--config", path_str(&config), "--out", path_str(&out)]),
        env,
    )
    .await
    .unwrap();

    let page = std::fs::read_to_string(out.join("page.go")).unwrap();
    assert!(page.contains("package fromenv\n"));
    assert!(page.contains("func tpl_page(buffer *bytes.Buffer) {\n"));
    assert!(page.contains("\t\"bytes\"\n"));
    assert!(!page.contains("bytebufferpool"));
}

#[tokio::test]
async fn test_no_imports_keeps_rendered_text() {
    let temp = tempdir().expect("Failed to create temp directory");
    let manifest = temp.path().join("units.yaml");
    std::fs::write(&manifest, "units:\n  - seed: raw\n    body: buffer.WriteString(\"x\")\n").unwrap();
    let out = temp.path().join("out");

    run(
        cli(&[path_str(&manifest), "-o", path_str(&out), "--no-imports"]),
        no_env(),
    )
    .await
    .unwrap();

    let raw = std::fs::read_to_string(out.join("raw.jade.go")).unwrap();
    assert!(raw.contains("func tpl_raw(buffer *pool.ByteBuffer)"));
    assert!(raw.contains("\nimport (\n"));
}

#[tokio::test]
async fn test_syntax_error_fails_the_run() {
    let temp = tempdir().expect("Failed to create temp directory");
    let manifest = temp.path().join("units.yaml");
    std::fs::write(&manifest, "units:\n  - seed: bad\n    body: \"if x {\"\n").unwrap();
    let out = temp.path().join("out");

    let err = run(cli(&[path_str(&manifest), "-o", path_str(&out)]), no_env())
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("generation failed"), "{message}");
    assert!(message.contains("bad.jade.go"), "{message}");
    assert!(!out.join("bad.jade.go").exists());
}

#[tokio::test]
async fn test_missing_manifest_and_bad_settings() {
    let temp = tempdir().expect("Failed to create temp directory");
    let missing = temp.path().join("missing.yaml");
    let err = run(cli(&[path_str(&missing)]), no_env()).await.unwrap_err();
    assert!(format!("{err:#}").contains("missing.yaml"));

    let manifest = temp.path().join("units.yaml");
    std::fs::write(&manifest, "units: []\n").unwrap();
    let err = run(cli(&[path_str(&manifest), "--pkg", "not-a-name"]), no_env())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("invalid settings"));
}
