// ABOUTME: Main entry point for the slide-render program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use slide_render::{
    export_selected, pack_directory, preview_data_uri, render, slide_file_name, utils,
    watch_deck, write_archive_file, Config, JsonDeck, SlideSource, WatchConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log progress (repeat for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of slides in a deck
    Info(InfoArgs),

    /// Render preview images
    Preview(PreviewArgs),

    /// Render high-resolution export images
    Export(ExportArgs),

    /// Package rendered slide_N.png files into a ZIP archive
    Pack(PackArgs),

    /// Re-render previews whenever the deck or settings change
    Watch(WatchArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Path to the slide deck JSON file
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Args)]
struct PreviewArgs {
    /// Path to the slide deck JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for preview images
    #[arg(short, long, default_value = "previews")]
    output: PathBuf,

    /// Render settings JSON file (colors, keywords, overrides)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Slides to render, 1-based (e.g. "1,3,5-7"); all when omitted
    #[arg(long)]
    slides: Option<String>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Print data URIs instead of writing files
    #[arg(long)]
    data_uri: bool,
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the slide deck JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Output ZIP archive
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write individual PNG files into this directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Render settings JSON file (colors, keywords, overrides)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Slides to export, 1-based (e.g. "1,3,5-7"); all when omitted
    #[arg(long)]
    slides: Option<String>,
}

#[derive(Args)]
struct PackArgs {
    /// Directory containing slide_N.png files
    #[arg(short, long)]
    input: PathBuf,

    /// Output ZIP archive
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct WatchArgs {
    /// Path to the slide deck JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for preview images
    #[arg(short, long, default_value = "previews")]
    output: PathBuf,

    /// Render settings JSON file (colors, keywords, overrides)
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Debounce time in milliseconds
    #[arg(long, default_value_t = 500)]
    debounce_ms: u64,
}

fn selected_indices(deck: &JsonDeck, slides: Option<&str>) -> anyhow::Result<Vec<usize>> {
    match slides {
        Some(selection) => Ok(utils::parse_slide_selection(selection)?),
        None => Ok((0..deck.slide_count()?).collect()),
    }
}

fn run_info(args: &InfoArgs) -> anyhow::Result<()> {
    let deck = JsonDeck::open(&args.input)?;
    println!("{}", deck.slide_count()?);
    Ok(())
}

fn run_preview(args: &PreviewArgs, app_config: &Config) -> anyhow::Result<()> {
    let deck = JsonDeck::open(&args.input)?;
    let render_config =
        app_config.resolve_render_config(args.settings.as_deref(), args.width, args.height)?;
    let face = app_config.load_typeface()?;

    if !args.data_uri {
        utils::ensure_directory_exists(&args.output)?;
    }

    for index in selected_indices(&deck, args.slides.as_deref())? {
        let slide = match deck.slide(index) {
            Ok(slide) => slide,
            Err(e) => {
                log::warn!("{}", e);
                continue;
            }
        };

        if args.data_uri {
            if let Some(uri) = preview_data_uri(Some(&slide), &render_config, face.as_ref())? {
                println!("{}", uri);
            }
        } else {
            let path = args.output.join(slide_file_name(index));
            render(&slide, &render_config, face.as_ref())?
                .save_png(&path)
                .with_context(|| format!("Failed to write preview {:?}", path))?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn run_export(args: &ExportArgs, app_config: &Config) -> anyhow::Result<()> {
    let deck = JsonDeck::open(&args.input)?;
    let render_config = app_config.resolve_render_config(args.settings.as_deref(), None, None)?;
    let face = app_config.load_typeface()?;
    let indices = selected_indices(&deck, args.slides.as_deref())?;

    let exported = export_selected(&deck, &indices, &render_config, face.as_ref())?;

    if let Some(dir) = &args.output_dir {
        for path in slide_render::export::write_slide_files(dir, &exported)? {
            println!("{}", path.display());
        }
    }

    if args.output.is_some() || args.output_dir.is_none() {
        let archive = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from("converted_images.zip"));
        write_archive_file(&archive, &exported)?;
        println!("{}", archive.display());
    }
    Ok(())
}

fn run_pack(args: &PackArgs) -> anyhow::Result<()> {
    let count = pack_directory(&args.input, &args.output)?;
    println!("Packed {} slides into {}", count, args.output.display());
    Ok(())
}

fn run_watch(args: &WatchArgs, app_config: &Config) -> anyhow::Result<()> {
    let config = WatchConfig {
        deck_path: args.input.clone(),
        settings_path: args.settings.clone(),
        output_dir: args.output.clone(),
        width: args.width,
        height: args.height,
        debounce_ms: args.debounce_ms,
    };
    watch_deck(config, app_config)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let app_config = Config::from_env();

    let result = match &cli.command {
        Some(Commands::Info(args)) => run_info(args),
        Some(Commands::Preview(args)) => run_preview(args, &app_config),
        Some(Commands::Export(args)) => run_export(args, &app_config),
        Some(Commands::Pack(args)) => run_pack(args),
        Some(Commands::Watch(args)) => run_watch(args, &app_config),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
