use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipArchive;

const DECK: &str = r#"[
    {"textBlocks": [{"text": "John 3:16 For God so loved the world", "fontSize": 32}], "fullText": ""},
    {"textBlocks": [], "fullText": "Announcements\nWe love the church"},
    {"textBlocks": [], "fullText": ""}
]"#;

fn run_command(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slide-render"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn write_deck(dir: &Path) -> String {
    let path = dir.join("deck.json");
    fs::write(&path, DECK).expect("Failed to write deck file");
    path.to_str().unwrap().to_string()
}

fn archive_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("Failed to open archive");
    let mut archive = ZipArchive::new(file).expect("Failed to read archive");
    let mut names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect();
    names.sort();
    names
}

#[test]
fn test_info_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let deck = write_deck(temp_dir.path());

    let output = run_command(&["info", "-i", &deck]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3");
}

#[test]
fn test_preview_command_writes_pngs() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let deck = write_deck(temp_dir.path());
    let out_dir = temp_dir.path().join("previews");

    let output = run_command(&[
        "preview",
        "-i",
        &deck,
        "-o",
        out_dir.to_str().unwrap(),
        "--width",
        "200",
        "--height",
        "150",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    for name in ["slide_1.png", "slide_2.png", "slide_3.png"] {
        let path = out_dir.join(name);
        assert!(path.exists(), "Missing preview {}", name);
        let img = image::open(&path).expect("Preview is not a valid image");
        assert_eq!((img.width(), img.height()), (200, 150));
    }
}

#[test]
fn test_preview_data_uri_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let deck = write_deck(temp_dir.path());

    let output = run_command(&["preview", "-i", &deck, "--slides", "2", "--data-uri"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("data:image/png;base64,"));
}

#[test]
fn test_export_command_creates_archive() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let deck = write_deck(temp_dir.path());
    let settings = temp_dir.path().join("settings.json");
    fs::write(
        &settings,
        r##"{"highlightKeywords": ["love"], "verseColor": "#8B0000"}"##,
    )
    .expect("Failed to write settings file");
    let archive = temp_dir.path().join("export.zip");

    let output = run_command(&[
        "export",
        "-i",
        &deck,
        "-o",
        archive.to_str().unwrap(),
        "--settings",
        settings.to_str().unwrap(),
        "--slides",
        "1,3,9",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(archive.exists(), "Archive was not created");
    assert_eq!(archive_names(&archive), vec!["slide_1.png", "slide_3.png"]);
}

#[test]
fn test_pack_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let deck = write_deck(temp_dir.path());
    let slides_dir = temp_dir.path().join("slides");

    let output = run_command(&[
        "export",
        "-i",
        &deck,
        "--output-dir",
        slides_dir.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let archive = temp_dir.path().join("packed.zip");
    let output = run_command(&[
        "pack",
        "-i",
        slides_dir.to_str().unwrap(),
        "-o",
        archive.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        archive_names(&archive),
        vec!["slide_1.png", "slide_2.png", "slide_3.png"]
    );
}

#[test]
fn test_invalid_selection_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let deck = write_deck(temp_dir.path());

    let output = run_command(&["export", "-i", &deck, "--slides", "0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}
