// ABOUTME: Library module for the slide-render program.
// ABOUTME: Contains text layout, highlighting and rasterization of extracted slide text.

// Reexport modules
pub mod color;
pub mod config;
pub mod errors;
pub mod export;
pub mod highlight;
pub mod render;
pub mod resolve;
pub mod slide;
pub mod typeface;
pub mod utils;
pub mod verse;
pub mod watch;
pub mod wrap;

// Reexport common types and functions
pub use color::Color;
pub use config::Config;
pub use errors::{RenderError, Result};
pub use export::{
    export_selected, export_slide, pack_directory, slide_file_name, spawn_export, write_archive,
    write_archive_file, ExportJob, ExportedSlide,
};
pub use highlight::{highlight, palette_color, Segment, PALETTE};
pub use render::{
    preview_data_uri, render, render_high_res, render_previews, RasterImage, Rasterizer,
    RenderConfig, RenderTarget,
};
pub use resolve::resolve_block_color;
pub use slide::{ColorOverrides, JsonDeck, ManualColorOverride, SlideData, SlideSource, TextBlock};
pub use typeface::{BlockFace, FontFace, Typeface};
pub use verse::is_verse_like;
pub use watch::{watch_deck, WatchConfig};
pub use wrap::{wrap, RenderedLine, Run, TextMeasure};
