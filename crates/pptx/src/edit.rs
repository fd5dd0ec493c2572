//! Slide editing: inserting text boxes, filled rectangles, and pictures.
//!
//! Edits are textual patches against the slide part: each new shape is
//! serialized as a `p:sp`/`p:pic` fragment and spliced in front of the
//! closing `</p:spTree>` tag, leaving the hand-authored shapes untouched.

use crate::inspect::SlideShapes;
use crate::package::{ImageFormat, PptxPackage};
use crate::xmlutil::insert_before_close;
use deckpatch_core::{Align, Color, Error, Rect, Result, TextStyle};
use quick_xml::escape::escape;
use std::path::Path;

/// Editor over a single slide part.
///
/// Accumulates shape insertions in memory; nothing is written back to the
/// package until [`SlideEditor::commit`].
pub struct SlideEditor<'a> {
    pkg: &'a mut PptxPackage,
    slide_path: String,
    xml: String,
    next_id: u64,
}

impl<'a> SlideEditor<'a> {
    /// Open an editor over an existing slide part.
    pub fn open(pkg: &'a mut PptxPackage, slide_path: &str) -> Result<Self> {
        let xml = pkg.part_str(slide_path)?;
        let shapes = SlideShapes::parse(&xml)?;
        Ok(Self {
            pkg,
            slide_path: slide_path.to_string(),
            xml,
            next_id: shapes.max_shape_id + 1,
        })
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_shape(&mut self, fragment: &str) -> Result<()> {
        self.xml = insert_before_close(&self.xml, "</p:spTree>", fragment)?;
        Ok(())
    }

    /// Add a text box with a single run.
    pub fn add_textbox(
        &mut self,
        frame: Rect,
        text: &str,
        style: &TextStyle,
        align: Align,
    ) -> Result<()> {
        let id = self.alloc_id();
        let fragment = textbox_xml(id, frame, &[text], style, align);
        self.insert_shape(&fragment)
    }

    /// Add a text box with one paragraph per line, all sharing one style.
    pub fn add_bullets(
        &mut self,
        frame: Rect,
        lines: &[&str],
        style: &TextStyle,
        align: Align,
    ) -> Result<()> {
        let id = self.alloc_id();
        let fragment = textbox_xml(id, frame, lines, style, align);
        self.insert_shape(&fragment)
    }

    /// Add a solid-filled rectangle with a solid outline.
    pub fn add_solid_rect(&mut self, frame: Rect, fill: Color, line: Color) -> Result<()> {
        let id = self.alloc_id();
        let fragment = solid_rect_xml(id, frame, fill, line);
        self.insert_shape(&fragment)
    }

    /// Add a picture from raw image bytes (format sniffed from magic).
    pub fn add_picture_bytes(&mut self, data: Vec<u8>, frame: Rect) -> Result<()> {
        let format = ImageFormat::from_magic(&data).ok_or_else(|| {
            Error::UnsupportedFormat("unrecognized image format (expected PNG or JPEG)".into())
        })?;
        let rel_id = self.pkg.add_media(&self.slide_path, data, format)?;
        let id = self.alloc_id();
        let fragment = picture_xml(id, frame, &rel_id);
        self.insert_shape(&fragment)
    }

    /// Add a picture from a file on disk.
    pub fn add_picture_from_file(&mut self, path: &Path, frame: Rect) -> Result<()> {
        let data = std::fs::read(path)?;
        self.add_picture_bytes(data, frame)
    }

    /// Write the edited slide back into the package.
    pub fn commit(self) {
        self.pkg.set_part(&self.slide_path, self.xml.into_bytes());
    }
}

fn xfrm_xml(frame: Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x.0, frame.y.0, frame.cx.0, frame.cy.0
    )
}

/// Run properties for a style, emitting only the fields that are set.
///
/// Returns an empty string when the style is fully unset, so the run
/// inherits everything from the layout/master chain.
fn run_properties_xml(style: &TextStyle) -> String {
    let mut attrs = String::new();
    if let Some(size_pt) = style.size_pt {
        attrs.push_str(&format!(r#" sz="{}""#, (size_pt * 100.0).round() as i64));
    }
    if let Some(bold) = style.bold {
        attrs.push_str(&format!(r#" b="{}""#, if bold { "1" } else { "0" }));
    }

    let mut children = String::new();
    if let Some(color) = style.color {
        children.push_str(&format!(
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            color.to_hex()
        ));
    }
    if let Some(name) = &style.name {
        children.push_str(&format!(r#"<a:latin typeface="{}"/>"#, escape(name)));
    }

    if attrs.is_empty() && children.is_empty() {
        String::new()
    } else if children.is_empty() {
        format!("<a:rPr{}/>", attrs)
    } else {
        format!("<a:rPr{}>{}</a:rPr>", attrs, children)
    }
}

fn textbox_xml(id: u64, frame: Rect, lines: &[&str], style: &TextStyle, align: Align) -> String {
    let run_props = run_properties_xml(style);
    let mut paragraphs = String::new();
    for line in lines {
        paragraphs.push_str(&format!(
            r#"<a:p><a:pPr algn="{}"/><a:r>{}<a:t>{}</a:t></a:r></a:p>"#,
            align.algn(),
            run_props,
            escape(line)
        ));
    }

    format!(
        "<p:sp>\
         <p:nvSpPr><p:cNvPr id=\"{id}\" name=\"TextBox {id}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
         <p:spPr>{xfrm}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>\
         <p:txBody><a:bodyPr wrap=\"square\"/><a:lstStyle/>{paragraphs}</p:txBody>\
         </p:sp>",
        id = id,
        xfrm = xfrm_xml(frame),
        paragraphs = paragraphs
    )
}

fn solid_rect_xml(id: u64, frame: Rect, fill: Color, line: Color) -> String {
    format!(
        "<p:sp>\
         <p:nvSpPr><p:cNvPr id=\"{id}\" name=\"Rectangle {id}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
         <p:spPr>{xfrm}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom>\
         <a:solidFill><a:srgbClr val=\"{fill}\"/></a:solidFill>\
         <a:ln><a:solidFill><a:srgbClr val=\"{line}\"/></a:solidFill></a:ln>\
         </p:spPr>\
         <p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody>\
         </p:sp>",
        id = id,
        xfrm = xfrm_xml(frame),
        fill = fill.to_hex(),
        line = line.to_hex()
    )
}

fn picture_xml(id: u64, frame: Rect, rel_id: &str) -> String {
    format!(
        "<p:pic>\
         <p:nvPicPr><p:cNvPr id=\"{id}\" name=\"Picture {id}\"/>\
         <p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>\
         <p:blipFill><a:blip r:embed=\"{rel_id}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
         <p:spPr>{xfrm}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr>\
         </p:pic>",
        id = id,
        rel_id = rel_id,
        xfrm = xfrm_xml(frame)
    )
}
