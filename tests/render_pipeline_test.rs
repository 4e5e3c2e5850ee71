use slide_render::{
    export_selected, render, write_archive_file, BlockFace, Color, JsonDeck, ManualColorOverride,
    RenderConfig, SlideSource,
};
use std::fs;
use std::io::Read;
use tempfile::TempDir;
use zip::ZipArchive;

const DECK: &str = r#"{"slides": [
    {"slideIndex": 0, "textBlocks": [
        {"text": "주일 예배", "fontSize": 44, "bold": true},
        {"text": "창세기 1:1 태초에 하나님이 천지를 창조하시니라", "fontSize": 28, "bold": false}
    ], "fullText": "주일 예배\n창세기 1:1 태초에 하나님이 천지를 창조하시니라"},
    {"slideIndex": 1, "textBlocks": [], "fullText": "We love the church\nGrace and peace"},
    {"slideIndex": 2, "textBlocks": [], "fullText": ""}
]}"#;

fn pipeline_config() -> RenderConfig {
    let mut config = RenderConfig {
        highlight_keywords: vec!["love".to_string(), "하나님".to_string()],
        verse_color: Color::rgb(0x8B, 0x00, 0x00),
        verse_detection_enabled: true,
        width: 400,
        height: 300,
        ..RenderConfig::default()
    };
    config.overrides.insert(ManualColorOverride {
        slide_index: 0,
        block_index: 0,
        color: Color::rgb(0x00, 0x00, 0xFF),
    });
    config
}

#[test]
fn test_full_pipeline() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let deck_path = temp_dir.path().join("deck.json");
    fs::write(&deck_path, DECK).expect("Failed to write deck file");

    // STEP 1: Load the deck
    let deck = JsonDeck::open(&deck_path).expect("Failed to load deck");
    assert_eq!(deck.slide_count().unwrap(), 3);

    let config = pipeline_config();
    let face = BlockFace;

    // STEP 2: Previews for every slide
    for index in 0..deck.slide_count().unwrap() {
        let slide = deck.slide(index).unwrap();
        let preview = render(&slide, &config, &face).expect("Failed to render preview");
        assert_eq!((preview.width(), preview.height()), (400, 300));
    }

    // STEP 3: High-resolution export of a selection
    let exported =
        export_selected(&deck, &[0, 1], &config, &face).expect("Failed to export slides");
    assert_eq!(exported.len(), 2);

    let first = image::load_from_memory(&exported[0].png)
        .expect("Export is not a valid PNG")
        .to_rgb8();
    assert_eq!(first.dimensions(), (2560, 1440));
    let has = |img: &image::RgbImage, c: [u8; 3]| img.pixels().any(|p| p.0 == c);
    assert!(has(&first, [0x00, 0x00, 0xFF]), "override color missing");
    assert!(has(&first, [0x8B, 0x00, 0x00]), "verse color missing");

    let second = image::load_from_memory(&exported[1].png)
        .expect("Export is not a valid PNG")
        .to_rgb8();
    let palette_red = slide_render::PALETTE[0];
    assert!(has(&second, [palette_red.r, palette_red.g, palette_red.b]), "keyword color missing");

    // STEP 4: Package
    let archive_path = temp_dir.path().join("out").join("converted_images.zip");
    write_archive_file(&archive_path, &exported).expect("Failed to write archive");

    let file = fs::File::open(&archive_path).expect("Failed to open archive");
    let mut archive = ZipArchive::new(file).expect("Failed to read archive");
    let mut names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect();
    names.sort();
    assert_eq!(names, vec!["slide_1.png", "slide_2.png"]);

    let mut bytes = Vec::new();
    archive
        .by_name("slide_2.png")
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    assert_eq!(bytes, exported[1].png);
}

#[test]
fn test_preview_and_export_agree_on_colors() {
    let deck = JsonDeck::from_json(DECK).unwrap();
    let slide = deck.slide(0).unwrap();
    let config = RenderConfig {
        width: 1280,
        height: 720,
        ..pipeline_config()
    };
    let face = BlockFace;

    let preview = render(&slide, &config, &face).unwrap();
    let export = slide_render::render_high_res(&slide, &config, 1280, 720, 2.0, &face).unwrap();

    for color in [Color::rgb(0x00, 0x00, 0xFF), Color::rgb(0x8B, 0x00, 0x00)] {
        assert_eq!(preview.contains_color(color), export.contains_color(color));
    }
}
