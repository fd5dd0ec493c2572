//! Shape extraction from slide XML: text, bounding boxes, and first-run
//! styles.

use crate::xmlutil::{attr_i64, attr_string, attr_u64, local_name};
use deckpatch_core::text::{compact, matches_label};
use deckpatch_core::{Color, Emu, Rect, Result, TextStyle};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Reader;
use serde::Serialize;

/// A shape read from a slide part.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Shape {
    /// `p:cNvPr@name`, often empty for hand-drawn shapes.
    pub name: String,

    /// Shape text, paragraphs joined with newlines. Empty for pictures.
    pub text: String,

    /// Bounding box from `a:off`/`a:ext`, when both were present.
    pub frame: Option<Rect>,

    /// Style of the shape's first text run. Fields the run does not set
    /// (or that no run exists to provide) stay `None`.
    pub style: TextStyle,

    /// Whether the shape carries a `p:txBody` at all.
    pub has_text_frame: bool,
}

impl Shape {
    /// Shape text with whitespace collapsed, for label comparison.
    pub fn compact_text(&self) -> String {
        compact(&self.text)
    }
}

/// All shapes of one slide, plus the id headroom for inserting new ones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlideShapes {
    pub shapes: Vec<Shape>,

    /// Highest `p:cNvPr@id` seen anywhere on the slide.
    pub max_shape_id: u64,
}

impl SlideShapes {
    /// Parse a slide part.
    ///
    /// XML errors mid-slide are logged and skipped so one malformed shape
    /// does not lose the rest of the slide.
    pub fn parse(xml: &str) -> Result<SlideShapes> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut state = ParseState::default();
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => state.open(e, false),
                Ok(Event::Empty(ref e)) => state.open(e, true),
                Ok(Event::Text(ref e)) => state.text(e),
                Ok(Event::End(ref e)) => state.close(e),
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("XML parsing error (continuing): {}", e);
                }
                _ => {}
            }
        }

        Ok(SlideShapes {
            shapes: state.shapes,
            max_shape_id: state.max_shape_id,
        })
    }

    /// The first shape whose compacted text equals `label`.
    pub fn find_by_text(&self, label: &str) -> Option<&Shape> {
        self.shapes
            .iter()
            .find(|shape| matches_label(&shape.text, label))
    }

    /// Non-empty compacted shape texts, in document order.
    pub fn texts(&self) -> Vec<String> {
        self.shapes
            .iter()
            .map(|shape| shape.compact_text())
            .filter(|text| !text.is_empty())
            .collect()
    }
}

/// A shape currently being assembled during the event walk.
#[derive(Default)]
struct PendingShape {
    shape: Shape,
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
    style_done: bool,
}

#[derive(Default)]
struct ParseState {
    shapes: Vec<Shape>,
    max_shape_id: u64,
    current: Option<PendingShape>,
    in_text_body: bool,
    in_paragraph: bool,
    in_run_props: bool,
    in_fill: bool,
}

impl ParseState {
    fn open(&mut self, e: &BytesStart, is_empty: bool) {
        match local_name(e.name().as_ref()) {
            b"sp" | b"pic" if !is_empty => {
                if self.current.is_none() {
                    self.current = Some(PendingShape::default());
                }
            }
            b"cNvPr" => {
                if let Some(id) = attr_u64(e, b"id") {
                    self.max_shape_id = self.max_shape_id.max(id);
                }
                if let Some(cur) = &mut self.current {
                    if cur.shape.name.is_empty() {
                        if let Some(name) = attr_string(e, b"name") {
                            cur.shape.name = name;
                        }
                    }
                }
            }
            b"off" => {
                if let Some(cur) = &mut self.current {
                    if cur.off.is_none() {
                        if let (Some(x), Some(y)) = (attr_i64(e, b"x"), attr_i64(e, b"y")) {
                            cur.off = Some((x, y));
                        }
                    }
                }
            }
            b"ext" => {
                if let Some(cur) = &mut self.current {
                    if cur.ext.is_none() {
                        if let (Some(cx), Some(cy)) = (attr_i64(e, b"cx"), attr_i64(e, b"cy")) {
                            cur.ext = Some((cx, cy));
                        }
                    }
                }
            }
            b"txBody" => {
                self.in_text_body = true;
                if let Some(cur) = &mut self.current {
                    cur.shape.has_text_frame = true;
                }
            }
            b"p" if self.in_text_body => {
                self.in_paragraph = true;
                if let Some(cur) = &mut self.current {
                    if !cur.shape.text.is_empty() {
                        cur.shape.text.push('\n');
                    }
                }
            }
            b"rPr" if self.in_text_body => {
                if let Some(cur) = &mut self.current {
                    if !cur.style_done {
                        if let Some(sz) = attr_i64(e, b"sz") {
                            // sz is hundredths of a point
                            cur.shape.style.size_pt = Some(sz as f64 / 100.0);
                        }
                        if let Some(b) = attr_string(e, b"b") {
                            cur.shape.style.bold = Some(b == "1" || b == "true");
                        }
                        if is_empty {
                            cur.style_done = true;
                        } else {
                            self.in_run_props = true;
                        }
                    }
                }
            }
            b"solidFill" if self.in_run_props && !is_empty => {
                self.in_fill = true;
            }
            b"srgbClr" if self.in_fill => {
                if let Some(cur) = &mut self.current {
                    if let Some(hex) = attr_string(e, b"val") {
                        cur.shape.style.color = Color::from_hex(&hex);
                    }
                }
            }
            b"latin" if self.in_run_props => {
                if let Some(cur) = &mut self.current {
                    if let Some(typeface) = attr_string(e, b"typeface") {
                        cur.shape.style.name = Some(typeface);
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, e: &BytesText) {
        if !self.in_paragraph {
            return;
        }
        if let Some(cur) = &mut self.current {
            let text = e.unescape().unwrap_or_default();
            cur.shape.text.push_str(&text);
        }
    }

    fn close(&mut self, e: &BytesEnd) {
        match local_name(e.name().as_ref()) {
            b"sp" | b"pic" => {
                if let Some(mut cur) = self.current.take() {
                    cur.shape.text = cur.shape.text.trim().to_string();
                    cur.shape.frame = match (cur.off, cur.ext) {
                        (Some((x, y)), Some((cx, cy))) => {
                            Some(Rect::new(Emu(x), Emu(y), Emu(cx), Emu(cy)))
                        }
                        _ => None,
                    };
                    self.shapes.push(cur.shape);
                }
                self.in_text_body = false;
                self.in_paragraph = false;
                self.in_run_props = false;
                self.in_fill = false;
            }
            b"txBody" => self.in_text_body = false,
            b"p" => self.in_paragraph = false,
            // The first run settles the style even when it had no a:rPr.
            b"r" if self.in_text_body => {
                if let Some(cur) = &mut self.current {
                    cur.style_done = true;
                }
                self.in_run_props = false;
                self.in_fill = false;
            }
            b"rPr" => {
                if self.in_run_props {
                    if let Some(cur) = &mut self.current {
                        cur.style_done = true;
                    }
                }
                self.in_run_props = false;
                self.in_fill = false;
            }
            b"solidFill" => self.in_fill = false,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn test_parse_minimal_slide() {
        let slides = SlideShapes::parse(testutil::SLIDE1_XML).unwrap();
        assert_eq!(slides.shapes.len(), 2);
        assert_eq!(slides.max_shape_id, 3);

        let number = &slides.shapes[0];
        assert_eq!(number.text, "01");
        assert!(number.has_text_frame);
        assert_eq!(
            number.frame,
            Some(Rect::new(
                Emu(100_000),
                Emu(200_000),
                Emu(300_000),
                Emu(400_000)
            ))
        );
        assert_eq!(number.style.size_pt, Some(40.0));
        assert_eq!(number.style.bold, Some(true));
        assert_eq!(number.style.color, Some(Color::WHITE));
        assert_eq!(number.style.name.as_deref(), Some("Arial"));
    }

    #[test]
    fn test_shape_without_run_props_has_empty_style() {
        let slides = SlideShapes::parse(testutil::SLIDE1_XML).unwrap();
        let label = &slides.shapes[1];
        assert_eq!(label.text, "프로젝트 개요");
        assert!(label.style.is_empty());
    }

    #[test]
    fn test_find_by_text_is_whitespace_insensitive() {
        let slides = SlideShapes::parse(testutil::SLIDE1_XML).unwrap();
        assert!(slides.find_by_text("프로젝트   개요").is_some());
        assert!(slides.find_by_text("없는 라벨").is_none());
    }

    #[test]
    fn test_texts_skips_empty_shapes() {
        let slides = SlideShapes::parse(testutil::SLIDE1_XML).unwrap();
        assert_eq!(slides.texts(), vec!["01", "프로젝트 개요"]);
    }

    #[test]
    fn test_multi_paragraph_text_joined_with_newline() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:cNvPr id="2" name="body"/></p:nvSpPr>
            <p:txBody><a:bodyPr/>
            <a:p><a:r><a:t>first</a:t></a:r></a:p>
            <a:p><a:r><a:t>second</a:t></a:r></a:p>
            </p:txBody></p:sp>
            </p:spTree></p:cSld></p:sld>"#;
        let slides = SlideShapes::parse(xml).unwrap();
        assert_eq!(slides.shapes[0].text, "first\nsecond");
        assert_eq!(slides.shapes[0].compact_text(), "first second");
    }

    #[test]
    fn test_only_first_run_style_is_captured() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:cNvPr id="2" name="s"/></p:nvSpPr>
            <p:txBody><a:bodyPr/>
            <a:p>
            <a:r><a:rPr sz="1600" b="0"/><a:t>small</a:t></a:r>
            <a:r><a:rPr sz="4400" b="1"/><a:t>big</a:t></a:r>
            </a:p>
            </p:txBody></p:sp>
            </p:spTree></p:cSld></p:sld>"#;
        let slides = SlideShapes::parse(xml).unwrap();
        let style = &slides.shapes[0].style;
        assert_eq!(style.size_pt, Some(16.0));
        assert_eq!(style.bold, Some(false));
    }

    #[test]
    fn test_plain_first_run_keeps_empty_style() {
        // A first run without a:rPr settles the style as all-unset; a
        // later styled run must not take its place.
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:cNvPr id="2" name="s"/></p:nvSpPr>
            <p:txBody><a:bodyPr/>
            <a:p>
            <a:r><a:t>plain</a:t></a:r>
            <a:r><a:rPr sz="4400" b="1"/><a:t>big</a:t></a:r>
            </a:p>
            </p:txBody></p:sp>
            </p:spTree></p:cSld></p:sld>"#;
        let slides = SlideShapes::parse(xml).unwrap();
        assert!(slides.shapes[0].style.is_empty());
    }

    #[test]
    fn test_fill_color_outside_run_props_is_ignored() {
        // Shape-level solidFill (background color) must not leak into the
        // run style.
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:cNvPr id="2" name="s"/></p:nvSpPr>
            <p:spPr><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></p:spPr>
            <p:txBody><a:bodyPr/><a:p><a:r><a:t>x</a:t></a:r></a:p></p:txBody></p:sp>
            </p:spTree></p:cSld></p:sld>"#;
        let slides = SlideShapes::parse(xml).unwrap();
        assert_eq!(slides.shapes[0].style.color, None);
    }

    #[test]
    fn test_picture_shape_has_no_text_frame() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:pic><p:nvPicPr><p:cNvPr id="7" name="Picture 7"/></p:nvPicPr>
            <p:spPr><a:xfrm><a:off x="10" y="20"/><a:ext cx="30" cy="40"/></a:xfrm></p:spPr>
            </p:pic>
            </p:spTree></p:cSld></p:sld>"#;
        let slides = SlideShapes::parse(xml).unwrap();
        let pic = &slides.shapes[0];
        assert!(!pic.has_text_frame);
        assert_eq!(pic.text, "");
        assert_eq!(pic.frame, Some(Rect::new(Emu(10), Emu(20), Emu(30), Emu(40))));
        assert_eq!(slides.max_shape_id, 7);
    }
}
