//! Small XML and package-path helpers shared across the crate.

use deckpatch_core::{Error, Result};
use quick_xml::events::BytesStart;

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Value of the named attribute, if present.
pub(crate) fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

pub(crate) fn attr_i64(e: &BytesStart, key: &[u8]) -> Option<i64> {
    attr_string(e, key)?.parse().ok()
}

pub(crate) fn attr_u64(e: &BytesStart, key: &[u8]) -> Option<u64> {
    attr_string(e, key)?.parse().ok()
}

/// Insert `fragment` immediately before the last occurrence of `close_tag`.
///
/// This is how all package edits land: new shapes go in front of
/// `</p:spTree>`, new relationships in front of `</Relationships>`, and so
/// on. The rest of the document is left byte-for-byte untouched.
pub(crate) fn insert_before_close(xml: &str, close_tag: &str, fragment: &str) -> Result<String> {
    let pos = xml
        .rfind(close_tag)
        .ok_or_else(|| Error::Xml(format!("missing {} element", close_tag)))?;

    let mut out = String::with_capacity(xml.len() + fragment.len());
    out.push_str(&xml[..pos]);
    out.push_str(fragment);
    out.push_str(&xml[pos..]);
    Ok(out)
}

/// Relationships part path for a given part, per OPC conventions.
///
/// `ppt/slides/slide3.xml` -> `ppt/slides/_rels/slide3.xml.rels`.
pub(crate) fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// Targets are either package-absolute (`/ppt/slides/slide1.xml`) or
/// relative with `..` components (`../media/image1.png`).
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for component in target.split('/') {
        match component {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Extract a part number from a string like "rId2" or "slide3.xml".
pub(crate) fn extract_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
