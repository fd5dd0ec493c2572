//! Assembly of the "07 쇼핑몰(SHOP)" section.
//!
//! Everything deck-specific lives here: the text of the existing TOC and
//! cover shapes we borrow styles from, the new section's strings, the
//! fallback styles, and the layout arithmetic. The general mechanics
//! (style extraction, shape insertion, package bookkeeping) live in
//! `deckpatch-pptx`.

use anyhow::{anyhow, Result};
use deckpatch_core::geometry::max_bottom;
use deckpatch_core::text::{contains_label, matches_label, preview};
use deckpatch_core::{Align, Color, Emu, Rect, TextStyle};
use deckpatch_pptx::{PptxPackage, SlideEditor, SlideShapes};
use std::path::Path;

/// 0-based index of the table-of-contents slide.
pub const TOC_SLIDE_INDEX: usize = 2;

/// 0-based index of the "01 프로젝트 개요" cover used as the reference for
/// the new section cover.
pub const COVER_REF_SLIDE_INDEX: usize = 3;

/// TOC shapes whose bottom edges anchor the new third row.
const ROW2_NUMBERS: [&str; 3] = ["04", "05", "06"];

/// Existing shapes the new entries copy their look from.
const STYLE_REF_NUMBER: &str = "06";
const STYLE_REF_LABEL: &str = "핵심 기능";
const COVER_REF_NUMBER: &str = "01";
const COVER_REF_TITLE: &str = "프로젝트 개요";

pub const SECTION_NUMBER: &str = "07";
pub const SECTION_TITLE: &str = "쇼핑몰(SHOP)";

const CONTENT_TITLE: &str = "07 쇼핑몰(SHOP) 기능/화면 개요";
const CONTENT_BULLETS: [&str; 4] = [
    "사용자: 상품 조회 · 주문 진입",
    "관리자: 상품 마스터 등록/수정/삭제",
    "판매상태(판매중/품절/비활성) 관리",
    "ERP·MES 연계 확장 고려(주문 → 재고/출고)",
];
const MAIN_CAPTION: &str = "사용자 메인";
const ADMIN_CAPTION: &str = "관리자 상품 마스터";

const BACKGROUND: Color = Color::new(0x0B, 0x12, 0x20);
const BODY_TEXT: Color = Color::new(0xE5, 0xE7, 0xEB);
const CAPTION_TEXT: Color = Color::new(0xCB, 0xD5, 0xE1);

/// Insert the "07" / "쇼핑몰(SHOP)" pair on the TOC slide.
///
/// Styles are inferred from the bottom-row "06" number and the
/// "핵심 기능" label; gaps fall back to bold white 36pt / 16pt. Returns
/// the styles actually used so later steps can reuse the inferred font.
pub fn add_toc_entry(pkg: &mut PptxPackage) -> Result<(TextStyle, TextStyle)> {
    let (slide_w, slide_h) = pkg.slide_size()?;
    let toc_path = pkg.slide_path(TOC_SLIDE_INDEX)?;
    let shapes = SlideShapes::parse(&pkg.part_str(&toc_path)?)?;

    let number_defaults = TextStyle::new(None, Some(36.0), Some(true), Some(Color::WHITE));
    let label_defaults = TextStyle::new(None, Some(16.0), Some(true), Some(Color::WHITE));

    let number_style = match shapes.find_by_text(STYLE_REF_NUMBER) {
        Some(shape) => shape.style.or(&number_defaults),
        None => number_defaults,
    };
    let label_style = match shapes.find_by_text(STYLE_REF_LABEL) {
        Some(shape) => shape.style.or(&label_defaults),
        None => label_defaults,
    };

    let row2_frames = ROW2_NUMBERS
        .iter()
        .map(|number| shapes.find_by_text(number).and_then(|shape| shape.frame));
    let y_base = max_bottom(row2_frames).unwrap_or_else(|| slide_h.scaled(0.68));

    let (number_box, label_box) = toc_row_placement(slide_w, slide_h, y_base);
    log::debug!(
        "TOC row 3: base y={}, number y={}, label y={}",
        y_base.0,
        number_box.y.0,
        label_box.y.0
    );

    let mut editor = SlideEditor::open(pkg, &toc_path)?;
    editor.add_textbox(number_box, SECTION_NUMBER, &number_style, Align::Center)?;
    editor.add_textbox(label_box, SECTION_TITLE, &label_style, Align::Center)?;
    editor.commit();

    Ok((number_style, label_style))
}

/// Compute the centered third-row boxes below `y_base`, clamped against
/// the slide bottom.
///
/// The number box sits 0.25" below the base and the label 0.55" below the
/// number. If the label would cross within 0.35" of the slide bottom, the
/// pair is re-anchored at a fixed 1.45" above the bottom instead.
fn toc_row_placement(slide_w: Emu, slide_h: Emu, y_base: Emu) -> (Rect, Rect) {
    let number = Rect::new(
        Emu::ZERO,
        y_base + Emu::inches(0.25),
        Emu::inches(1.2),
        Emu::inches(0.55),
    )
    .centered_horizontally(slide_w);
    let label = Rect::new(
        Emu::ZERO,
        number.y + Emu::inches(0.55),
        Emu::inches(3.0),
        Emu::inches(0.4),
    )
    .centered_horizontally(slide_w);

    let limit = slide_h - Emu::inches(0.35);
    if label.bottom() > limit {
        let number_y = slide_h - Emu::inches(1.45);
        (
            Rect { y: number_y, ..number },
            Rect {
                y: number_y + Emu::inches(0.55),
                ..label
            },
        )
    } else {
        (number, label)
    }
}

/// Add the section cover slide, modeled on the "01 프로젝트 개요" cover.
///
/// The new slide uses the reference cover's layout; the number and title
/// boxes copy the reference shapes' positions and first-run styles, with
/// fixed fallback geometry (and the TOC fonts at 40pt / 28pt) when the
/// reference shapes are missing. Returns the number and title styles used.
pub fn add_cover_slide(
    pkg: &mut PptxPackage,
    toc_number_style: &TextStyle,
    toc_label_style: &TextStyle,
) -> Result<(TextStyle, TextStyle)> {
    let ref_path = pkg.slide_path(COVER_REF_SLIDE_INDEX)?;
    let layout_path = pkg.layout_for_slide(&ref_path)?;
    let shapes = SlideShapes::parse(&pkg.part_str(&ref_path)?)?;

    let mut number_box = Rect::new(
        Emu::inches(1.2),
        Emu::inches(1.8),
        Emu::inches(1.4),
        Emu::inches(0.8),
    );
    let mut title_box = Rect::new(
        Emu::inches(1.2),
        Emu::inches(2.6),
        Emu::inches(7.6),
        Emu::inches(0.8),
    );

    let number_defaults = TextStyle::new(
        toc_number_style.name.as_deref(),
        Some(40.0),
        Some(true),
        Some(Color::WHITE),
    );
    let title_defaults = TextStyle::new(
        toc_label_style.name.as_deref(),
        Some(28.0),
        Some(true),
        Some(Color::WHITE),
    );

    let number_style = match shapes.find_by_text(COVER_REF_NUMBER) {
        Some(shape) => {
            if let Some(frame) = shape.frame {
                number_box = frame;
            }
            shape.style.or(&number_defaults)
        }
        None => number_defaults,
    };
    let title_style = match shapes.find_by_text(COVER_REF_TITLE) {
        Some(shape) => {
            if let Some(frame) = shape.frame {
                title_box = frame;
            }
            shape.style.or(&title_defaults)
        }
        None => title_defaults,
    };

    let cover_path = pkg.add_slide(&layout_path)?;
    log::debug!("cover slide {} on layout {}", cover_path, layout_path);

    let mut editor = SlideEditor::open(pkg, &cover_path)?;
    editor.add_textbox(number_box, SECTION_NUMBER, &number_style, Align::Left)?;
    editor.add_textbox(title_box, SECTION_TITLE, &title_style, Align::Left)?;
    editor.commit();

    Ok((number_style, title_style))
}

/// Add the content slide: full-bleed dark background, title, bullet list,
/// and a right-hand column with two captioned screenshots.
///
/// Missing screenshot files are logged and skipped together with their
/// captions.
pub fn add_content_slide(
    pkg: &mut PptxPackage,
    title_font: Option<String>,
    main_image: &Path,
    admin_image: &Path,
) -> Result<()> {
    let (slide_w, slide_h) = pkg.slide_size()?;

    // Blank layout by convention; first layout when the deck has fewer.
    let layouts = pkg.layout_paths();
    let layout_path = layouts
        .get(6)
        .or_else(|| layouts.first())
        .cloned()
        .ok_or_else(|| anyhow!("deck has no slide layouts"))?;

    let slide_path = pkg.add_slide(&layout_path)?;
    let mut editor = SlideEditor::open(pkg, &slide_path)?;

    editor.add_solid_rect(
        Rect::new(Emu::ZERO, Emu::ZERO, slide_w, slide_h),
        BACKGROUND,
        BACKGROUND,
    )?;

    let title_style = TextStyle {
        name: title_font,
        size_pt: Some(30.0),
        bold: Some(true),
        color: Some(Color::WHITE),
    };
    editor.add_textbox(
        Rect::new(
            Emu::inches(0.7),
            Emu::inches(0.45),
            Emu::inches(8.8),
            Emu::inches(0.6),
        ),
        CONTENT_TITLE,
        &title_style,
        Align::Left,
    )?;

    let body_style = TextStyle::new(None, Some(16.0), Some(false), Some(BODY_TEXT));
    editor.add_bullets(
        Rect::new(
            Emu::inches(0.75),
            Emu::inches(1.2),
            Emu::inches(4.5),
            Emu::inches(3.9),
        ),
        &CONTENT_BULLETS,
        &body_style,
        Align::Left,
    )?;

    let image_w = Emu::inches(4.2);
    let image_h = Emu::inches(2.35);
    let column_x = Emu::inches(5.2);
    let caption_style = TextStyle::new(None, Some(12.0), Some(true), Some(CAPTION_TEXT));

    let screenshots = [
        (main_image, MAIN_CAPTION, Emu::inches(1.25)),
        (admin_image, ADMIN_CAPTION, Emu::inches(3.85)),
    ];
    for (path, caption, y) in screenshots {
        if !path.exists() {
            log::warn!("screenshot not found, skipping: {}", path.display());
            continue;
        }
        let frame = Rect::new(column_x, y, image_w, image_h);
        editor.add_picture_from_file(path, frame)?;
        let caption_frame = Rect::new(
            column_x,
            frame.bottom() + Emu::inches(0.08),
            image_w,
            Emu::inches(0.25),
        );
        editor.add_textbox(caption_frame, caption, &caption_style, Align::Center)?;
    }
    editor.commit();

    Ok(())
}

/// Outcome of re-opening a patched deck.
#[derive(Debug)]
pub struct VerifyReport {
    pub slides: usize,
    pub toc_has_entry: bool,
    pub last_slide_preview: String,
}

/// Re-open checks: the TOC carries "07" and a 쇼핑몰 label, and the last
/// slide's text is previewed for eyeballing.
pub fn verify(pkg: &PptxPackage) -> Result<VerifyReport> {
    let slide_paths = pkg.slide_paths()?;

    let toc_path = pkg.slide_path(TOC_SLIDE_INDEX)?;
    let toc = SlideShapes::parse(&pkg.part_str(&toc_path)?)?;
    let texts = toc.texts();
    let toc_has_entry = texts.iter().any(|t| matches_label(t, SECTION_NUMBER))
        && texts.iter().any(|t| contains_label(t, "쇼핑몰"));

    let last_path = slide_paths
        .last()
        .ok_or_else(|| anyhow!("deck has no slides"))?;
    let last = SlideShapes::parse(&pkg.part_str(last_path)?)?;
    let last_slide_preview = preview(&last.texts().join(" | "), 140);

    Ok(VerifyReport {
        slides: slide_paths.len(),
        toc_has_entry,
        last_slide_preview,
    })
}
