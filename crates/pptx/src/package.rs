//! In-memory PPTX package with the OPC bookkeeping needed for slide edits.

use crate::xmlutil::{
    attr_i64, attr_string, attr_u64, extract_number, insert_before_close, local_name,
    rels_path_for, resolve_target,
};
use deckpatch_core::{Emu, Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Slide part with an empty shape tree, used when a slide is added.
const EMPTY_SLIDE_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
    r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
    r#" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:spTree>"#,
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    r#"</p:spTree></p:cSld>"#,
    r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
);

/// Detected container format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    /// Modern PPTX (ZIP-based Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Detected only so it can be rejected.
    LegacyPpt,
}

impl PackageFormat {
    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::LegacyPpt);
        }

        None
    }
}

/// Embedded image format, sniffed from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        None
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// A parsed `<Relationship>` entry.
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

/// A whole `.pptx` archive held in memory as a part-path -> bytes map.
///
/// Edits replace individual parts; everything else is written back out
/// exactly as it was read.
pub struct PptxPackage {
    parts: BTreeMap<String, Vec<u8>>,
}

impl fmt::Debug for PptxPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PptxPackage")
            .field("parts", &self.parts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PptxPackage {
    /// Open a package from a file path.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a package from any seekable reader.
    ///
    /// Checks the magic bytes first so a legacy binary `.ppt` is rejected
    /// with a format error rather than a confusing ZIP error.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 8];
        let read = reader.read(&mut magic)?;
        reader.seek(SeekFrom::Start(0))?;

        match PackageFormat::from_magic(&magic[..read]) {
            Some(PackageFormat::Pptx) => {}
            Some(PackageFormat::LegacyPpt) => {
                return Err(Error::UnsupportedFormat(
                    "legacy binary .ppt (OLE/CFB) is not supported".into(),
                ));
            }
            None => {
                return Err(Error::UnsupportedFormat(
                    "not a ZIP-based presentation".into(),
                ));
            }
        }

        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = BTreeMap::new();
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::Zip(format!("Failed to read archive entry: {}", e)))?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.insert(file.name().to_string(), data);
        }

        if !parts.contains_key(PRESENTATION_PART) {
            return Err(Error::Corrupted(format!(
                "archive has no {}",
                PRESENTATION_PART
            )));
        }

        log::debug!("opened package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// Write the package out as a deflate-compressed ZIP archive.
    pub fn save<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::Zip(format!("Failed to start entry '{}': {}", name, e)))?;
            zip.write_all(data)?;
        }
        zip.finish()
            .map_err(|e| Error::Zip(format!("Failed to finish archive: {}", e)))?;
        Ok(())
    }

    /// Write the package to a file path.
    pub fn save_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.save(BufWriter::new(file))
    }

    /// Raw bytes of a part.
    pub fn part(&self, path: &str) -> Result<&[u8]> {
        self.parts
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingPart(path.to_string()))
    }

    /// A part decoded as UTF-8 (all OOXML parts we touch are).
    pub fn part_str(&self, path: &str) -> Result<String> {
        String::from_utf8(self.part(path)?.to_vec())
            .map_err(|_| Error::Corrupted(format!("part '{}' is not UTF-8", path)))
    }

    /// Replace or insert a part.
    pub fn set_part(&mut self, path: &str, data: Vec<u8>) {
        self.parts.insert(path.to_string(), data);
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// Slide part paths in presentation order.
    ///
    /// Order comes from the presentation relationships, sorted by the
    /// numeric suffix of the relationship id (falling back to the target).
    pub fn slide_paths(&self) -> Result<Vec<String>> {
        let rels = parse_relationships(&self.part_str(PRESENTATION_RELS_PART)?)?;

        let mut slides: Vec<(String, Option<usize>)> = rels
            .iter()
            .filter(|rel| rel.rel_type == REL_TYPE_SLIDE)
            .map(|rel| {
                let order = extract_number(&rel.id).or_else(|| extract_number(&rel.target));
                (resolve_target("ppt", &rel.target), order)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Part path of the slide at a 0-based presentation index.
    pub fn slide_path(&self, index: usize) -> Result<String> {
        self.slide_paths()?
            .get(index)
            .cloned()
            .ok_or(Error::SlideOutOfRange(index))
    }

    /// Slide dimensions from `p:sldSz`, in EMU.
    pub fn slide_size(&self) -> Result<(Emu, Emu)> {
        let xml = self.part_str(PRESENTATION_PART)?;
        let mut reader = Reader::from_str(&xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldSz" =>
                {
                    let cx = attr_i64(e, b"cx")
                        .ok_or_else(|| Error::Xml("p:sldSz is missing cx".into()))?;
                    let cy = attr_i64(e, b"cy")
                        .ok_or_else(|| Error::Xml("p:sldSz is missing cy".into()))?;
                    return Ok((Emu(cx), Emu(cy)));
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing presentation.xml: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Err(Error::Xml("presentation.xml has no p:sldSz".into()))
    }

    /// Slide layout part paths in numeric order.
    pub fn layout_paths(&self) -> Vec<String> {
        let mut layouts: Vec<String> = self
            .parts
            .keys()
            .filter(|key| {
                key.starts_with("ppt/slideLayouts/slideLayout") && key.ends_with(".xml")
            })
            .cloned()
            .collect();
        layouts.sort_by_key(|path| extract_number(path).unwrap_or(usize::MAX));
        layouts
    }

    /// The layout part a given slide is based on, via the slide's rels.
    pub fn layout_for_slide(&self, slide_path: &str) -> Result<String> {
        let rels_path = rels_path_for(slide_path);
        let rels = parse_relationships(&self.part_str(&rels_path)?)?;

        rels.iter()
            .find(|rel| rel.rel_type == REL_TYPE_SLIDE_LAYOUT)
            .map(|rel| resolve_target("ppt/slides", &rel.target))
            .ok_or_else(|| Error::Xml(format!("{} has no slideLayout relationship", rels_path)))
    }

    /// Append a new, empty slide based on `layout_path`.
    ///
    /// Creates the slide part and its rels, registers the content-type
    /// override, adds the presentation relationship, and appends a
    /// `p:sldId` entry, so the new slide becomes the last slide of the
    /// deck. Returns the new slide's part path.
    pub fn add_slide(&mut self, layout_path: &str) -> Result<String> {
        if !self.has_part(layout_path) {
            return Err(Error::MissingPart(layout_path.to_string()));
        }
        let layout_file = layout_path.rsplit_once('/').map(|(_, f)| f).unwrap_or(layout_path);

        let number = self.next_part_number("ppt/slides/slide");
        let slide_path = format!("ppt/slides/slide{}.xml", number);
        let slide_rels_path = rels_path_for(&slide_path);

        self.set_part(&slide_path, EMPTY_SLIDE_XML.as_bytes().to_vec());
        let slide_rels = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" Type=\"{}\" Target=\"../slideLayouts/{}\"/>\
             </Relationships>",
            REL_TYPE_SLIDE_LAYOUT, layout_file
        );
        self.set_part(&slide_rels_path, slide_rels.into_bytes());

        let content_types = self.part_str(CONTENT_TYPES_PART)?;
        let override_entry = format!(
            r#"<Override PartName="/{}" ContentType="{}"/>"#,
            slide_path, SLIDE_CONTENT_TYPE
        );
        self.set_part(
            CONTENT_TYPES_PART,
            insert_before_close(&content_types, "</Types>", &override_entry)?.into_bytes(),
        );

        let pres_rels = self.part_str(PRESENTATION_RELS_PART)?;
        let rel_id = next_rel_id(&pres_rels)?;
        let rel_entry = format!(
            r#"<Relationship Id="{}" Type="{}" Target="slides/slide{}.xml"/>"#,
            rel_id, REL_TYPE_SLIDE, number
        );
        self.set_part(
            PRESENTATION_RELS_PART,
            insert_before_close(&pres_rels, "</Relationships>", &rel_entry)?.into_bytes(),
        );

        let presentation = self.part_str(PRESENTATION_PART)?;
        let slide_id = next_slide_id(&presentation)?;
        let sld_id_entry = format!(r#"<p:sldId id="{}" r:id="{}"/>"#, slide_id, rel_id);
        self.set_part(
            PRESENTATION_PART,
            insert_before_close(&presentation, "</p:sldIdLst>", &sld_id_entry)?.into_bytes(),
        );

        log::debug!(
            "added slide {} (sldId {}, {} on layout {})",
            slide_path,
            slide_id,
            rel_id,
            layout_file
        );
        Ok(slide_path)
    }

    /// Store image bytes as a media part and relate them to `slide_path`.
    ///
    /// Registers the content-type default for the extension on first use.
    /// Returns the relationship id to use as `r:embed`.
    pub fn add_media(
        &mut self,
        slide_path: &str,
        data: Vec<u8>,
        format: ImageFormat,
    ) -> Result<String> {
        let number = self.next_part_number("ppt/media/image");
        let media_path = format!("ppt/media/image{}.{}", number, format.extension());

        let content_types = self.part_str(CONTENT_TYPES_PART)?;
        let default_marker = format!(r#"Extension="{}""#, format.extension());
        if !content_types.contains(&default_marker) {
            let default_entry = format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            );
            self.set_part(
                CONTENT_TYPES_PART,
                insert_before_close(&content_types, "</Types>", &default_entry)?.into_bytes(),
            );
        }

        self.set_part(&media_path, data);

        let rels_path = rels_path_for(slide_path);
        let rels = self.part_str(&rels_path)?;
        let rel_id = next_rel_id(&rels)?;
        let rel_entry = format!(
            r#"<Relationship Id="{}" Type="{}" Target="../media/image{}.{}"/>"#,
            rel_id,
            REL_TYPE_IMAGE,
            number,
            format.extension()
        );
        self.set_part(
            &rels_path,
            insert_before_close(&rels, "</Relationships>", &rel_entry)?.into_bytes(),
        );

        log::debug!("added media {} as {} of {}", media_path, rel_id, slide_path);
        Ok(rel_id)
    }

    /// Next free part number under a path prefix like `ppt/slides/slide`.
    fn next_part_number(&self, prefix: &str) -> usize {
        self.parts
            .keys()
            .filter_map(|key| {
                let rest = key.strip_prefix(prefix)?;
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<usize>().ok()
            })
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Parse all `<Relationship>` entries of a rels part.
fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut rels = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                rels.push(Relationship {
                    id: attr_string(e, b"Id").unwrap_or_default(),
                    rel_type: attr_string(e, b"Type").unwrap_or_default(),
                    target: attr_string(e, b"Target").unwrap_or_default(),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing relationships: {}", e)));
            }
            _ => {}
        }
    }
    Ok(rels)
}

/// Next free `rIdN` in a rels part.
fn next_rel_id(rels_xml: &str) -> Result<String> {
    let max = parse_relationships(rels_xml)?
        .iter()
        .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    Ok(format!("rId{}", max + 1))
}

/// Next free `p:sldId` id. The OOXML floor for slide ids is 256.
fn next_slide_id(presentation_xml: &str) -> Result<u64> {
    let mut reader = Reader::from_str(presentation_xml);
    reader.trim_text(true);

    let mut max = 255u64;
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = attr_u64(e, b"id") {
                    max = max.max(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing presentation.xml: {}", e)));
            }
            _ => {}
        }
    }
    Ok(max + 1)
}
