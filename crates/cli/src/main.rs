//! CLI for patching the portfolio deck with the 07 쇼핑몰(SHOP) section.

mod section;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deckpatch_core::text::preview;
use deckpatch_core::Emu;
use deckpatch_pptx::{PptxPackage, Shape, SlideShapes};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Patch the portfolio deck with the 07 쇼핑몰(SHOP) section.
#[derive(Parser, Debug)]
#[command(name = "deckpatch")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a per-slide text preview of a deck
    Inspect {
        /// Input deck (.pptx)
        input: PathBuf,

        /// Emit the full report (shape frames and styles included) as JSON
        #[arg(long)]
        json: bool,
    },

    /// Insert the 07 section: TOC entry, cover slide, and content slide
    AddSection {
        /// Input deck (.pptx); never modified in place
        input: PathBuf,

        /// Output path (default: "<stem>_수정본.pptx" next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Screenshot of the user-facing shop page
        #[arg(long, default_value = "public/img/main.png")]
        main_image: PathBuf,

        /// Screenshot of the admin product master page
        #[arg(long, default_value = "public/img/admin.png")]
        admin_image: PathBuf,
    },

    /// Re-open a patched deck and check for the expected section text
    Verify {
        /// Deck to check (.pptx)
        input: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct SlideReport {
    number: usize,
    texts: Vec<String>,
    shapes: Vec<Shape>,
}

#[derive(Debug, Serialize)]
struct DeckReport {
    file: String,
    slide_count: usize,
    width: Emu,
    height: Emu,
    slides: Vec<SlideReport>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::Inspect { input, json } => run_inspect(&input, json),
        Command::AddSection {
            input,
            output,
            main_image,
            admin_image,
        } => run_add_section(&input, output, &main_image, &admin_image),
        Command::Verify { input } => run_verify(&input),
    }
}

fn open_package(path: &Path) -> Result<PptxPackage> {
    PptxPackage::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn run_inspect(input: &Path, json: bool) -> Result<()> {
    let pkg = open_package(input)?;
    let (width, height) = pkg.slide_size()?;

    let mut slides = Vec::new();
    for (index, slide_path) in pkg.slide_paths()?.iter().enumerate() {
        let shapes = SlideShapes::parse(&pkg.part_str(slide_path)?)?;
        slides.push(SlideReport {
            number: index + 1,
            texts: shapes.texts(),
            shapes: shapes.shapes,
        });
    }

    let report = DeckReport {
        file: input.display().to_string(),
        slide_count: slides.len(),
        width,
        height,
        slides,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("file: {}", report.file);
        println!("slides: {}", report.slide_count);
        println!("size: {} {}", report.width.0, report.height.0);
        for slide in &report.slides {
            println!(
                "{:02}: {}",
                slide.number,
                preview(&slide.texts.join(" | "), 220)
            );
        }
    }
    Ok(())
}

fn run_add_section(
    input: &Path,
    output: Option<PathBuf>,
    main_image: &Path,
    admin_image: &Path,
) -> Result<()> {
    let mut pkg = open_package(input)?;

    let (toc_number_style, toc_label_style) =
        section::add_toc_entry(&mut pkg).context("Failed to add the table-of-contents entry")?;
    let (_, cover_title_style) =
        section::add_cover_slide(&mut pkg, &toc_number_style, &toc_label_style)
            .context("Failed to add the section cover slide")?;
    section::add_content_slide(&mut pkg, cover_title_style.name.clone(), main_image, admin_image)
        .context("Failed to add the content slide")?;

    let output = output.unwrap_or_else(|| default_output_path(input));
    pkg.save_file(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("OK: {}", output.display());
    Ok(())
}

fn run_verify(input: &Path) -> Result<()> {
    let pkg = open_package(input)?;
    let report = section::verify(&pkg)?;

    println!("file: {}", input.display());
    println!("slides: {}", report.slides);
    println!("toc_has_07: {}", report.toc_has_entry);
    println!("last_slide_text_preview: {}", report.last_slide_preview);

    if !report.toc_has_entry {
        anyhow::bail!("table of contents is missing the {} entry", section::SECTION_NUMBER);
    }
    Ok(())
}

/// Default output path: "<stem>_수정본.pptx" next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let file_name = format!("{}_수정본.pptx", stem);

    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("deck.pptx")),
            PathBuf::from("deck_수정본.pptx")
        );
        assert_eq!(
            default_output_path(Path::new("slides/이기창 포트폴리오(작업용).pptx")),
            PathBuf::from("slides/이기창 포트폴리오(작업용)_수정본.pptx")
        );
    }
}
