//! The OPC container: ZIP parts, relationships, and content types.

use ppt_core::presentation::PartRel;
use ppt_core::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::xml::{self, Element, XmlBuilder};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const ROOT_RELS_PART: &str = "_rels/.rels";

pub const NS_PACKAGE_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
pub const NS_OFFICE_RELS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
pub const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
pub const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
pub const CT_NOTES_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
pub const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
pub const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
pub const CT_EXTENDED: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";
pub const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_XML: &str = "application/xml";
pub const CT_PRES_PROPS: &str = "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
pub const CT_VIEW_PROPS: &str = "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
pub const CT_TABLE_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";

/// Relationship type URIs end in a short name (`slide`, `slideLayout`, ...).
pub fn rel_type(kind: &str) -> String {
    match kind {
        "core-properties" => format!("{NS_PACKAGE_RELS}/metadata/core-properties"),
        _ => format!("{NS_OFFICE_RELS}/{kind}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Resolved part name, or the raw URL for external targets.
    pub target: String,
    pub external: bool,
}

impl Relationship {
    pub fn new(id: impl Into<String>, kind: &str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type(kind),
            target: target.into(),
            external: false,
        }
    }

    pub fn external(id: impl Into<String>, kind: &str, url: impl Into<String>) -> Self {
        Self {
            external: true,
            ..Self::new(id, kind, url)
        }
    }

    /// Last path segment of the type URI, e.g. `slideLayout`.
    pub fn kind(&self) -> &str {
        self.rel_type.rsplit('/').next().unwrap_or_default()
    }
}

impl From<&Relationship> for PartRel {
    fn from(rel: &Relationship) -> Self {
        PartRel {
            id: rel.id.clone(),
            rel_type: rel.rel_type.clone(),
            target: rel.target.clone(),
            external: rel.external,
        }
    }
}

impl From<&PartRel> for Relationship {
    fn from(rel: &PartRel) -> Self {
        Relationship {
            id: rel.id.clone(),
            rel_type: rel.rel_type.clone(),
            target: rel.target.clone(),
            external: rel.external,
        }
    }
}

/// Whether `key` is an attribute in the relationships namespace, such as `r:embed`.
fn is_relationship_attr(key: &str, prefixes: &BTreeSet<String>) -> bool {
    key.split_once(':')
        .is_some_and(|(prefix, _)| prefixes.contains(prefix))
}

/// Relationship ids that attributes in `el` refer to. Namespace
/// declarations must be on `el` or inside it.
pub fn relationship_refs(el: &Element) -> BTreeSet<String> {
    let mut prefixes = BTreeSet::new();
    el.prefixes_for(NS_OFFICE_RELS, &mut prefixes);
    let mut ids = BTreeSet::new();
    el.visit_attrs(&mut |key, value| {
        if is_relationship_attr(key, &prefixes) {
            ids.insert(value.to_string());
        }
    });
    ids
}

/// Rewrite relationship id attributes through `ids`; unknown ids stay as they are.
pub fn remap_relationship_refs(el: &mut Element, ids: &HashMap<String, String>) {
    let mut prefixes = BTreeSet::new();
    el.prefixes_for(NS_OFFICE_RELS, &mut prefixes);
    el.visit_attrs_mut(&mut |key, value| {
        if is_relationship_attr(key, &prefixes) {
            if let Some(new_id) = ids.get(value.as_str()) {
                *value = new_id.clone();
            }
        }
    });
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None if part.is_empty() => ROOT_RELS_PART.to_string(),
        None => format!("_rels/{part}.rels"),
    }
}

fn directory(part: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = part.split('/').collect();
    segments.pop();
    segments.retain(|s| !s.is_empty());
    segments
}

/// Resolve a relationship target against the part that owns the relationship.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments = directory(source_part);
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Path from `source_part`'s directory to `target_part`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let from = directory(source_part);
    let to: Vec<&str> = target_part.split('/').collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();
    let mut segments: Vec<&str> = vec![".."; from.len() - common];
    segments.extend(&to[common..]);
    segments.join("/")
}

/// Serialize a relationships part.
pub fn rels_xml(source_part: &str, rels: &[Relationship]) -> String {
    let mut xml = XmlBuilder::new();
    xml.open("Relationships", &[("xmlns", NS_PACKAGE_RELS)]);
    for rel in rels {
        let target = if rel.external {
            rel.target.clone()
        } else {
            relative_target(source_part, &rel.target)
        };
        let mut attrs = vec![
            ("Id", rel.id.as_str()),
            ("Type", rel.rel_type.as_str()),
            ("Target", target.as_str()),
        ];
        if rel.external {
            attrs.push(("TargetMode", "External"));
        }
        xml.empty("Relationship", &attrs);
    }
    xml.close("Relationships");
    xml.finish()
}

/// `[Content_Types].xml`: defaults by extension and overrides by part name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentTypes {
    pub defaults: BTreeMap<String, String>,
    /// Keyed by part name without the leading slash.
    pub overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn parse(root: &Element) -> Self {
        let mut types = ContentTypes::default();
        for el in root.elements() {
            match el.local() {
                "Default" => {
                    if let (Some(ext), Some(ct)) = (el.attr("Extension"), el.attr("ContentType")) {
                        types.defaults.insert(ext.to_ascii_lowercase(), ct.to_string());
                    }
                }
                "Override" => {
                    if let (Some(part), Some(ct)) = (el.attr("PartName"), el.attr("ContentType")) {
                        types
                            .overrides
                            .insert(part.trim_start_matches('/').to_string(), ct.to_string());
                    }
                }
                _ => {}
            }
        }
        types
    }

    pub fn to_xml(&self) -> String {
        let mut xml = XmlBuilder::new();
        xml.open("Types", &[("xmlns", NS_CONTENT_TYPES)]);
        for (ext, ct) in &self.defaults {
            xml.empty("Default", &[("Extension", ext.as_str()), ("ContentType", ct.as_str())]);
        }
        for (part, ct) in &self.overrides {
            let name = format!("/{part}");
            xml.empty("Override", &[("PartName", name.as_str()), ("ContentType", ct.as_str())]);
        }
        xml.close("Types");
        xml.finish()
    }
}

/// Every part of a package, by name.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {i}: {e}")))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            parts.insert(name, bytes);
        }
        log::debug!("read {} package parts", parts.len());
        Ok(Self { parts })
    }

    /// Write every part, content types first.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let ordered = self
            .parts
            .get_key_value(CONTENT_TYPES_PART)
            .into_iter()
            .chain(self.parts.iter().filter(|(name, _)| *name != CONTENT_TYPES_PART));
        for (name, bytes) in ordered {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(bytes)?;
        }
        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.parts.insert(name.into(), bytes.into());
    }

    /// Parse a part as XML.
    pub fn xml(&self, name: &str) -> Result<Element> {
        let bytes = self
            .get(name)
            .ok_or_else(|| Error::PptxParseError(format!("Missing part '{name}'")))?;
        xml::parse_bytes(bytes).map_err(|e| Error::PptxParseError(format!("{name}: {e}")))
    }

    /// Relationships owned by `part`. A part without a rels part has none.
    pub fn relationships(&self, part: &str) -> Result<Vec<Relationship>> {
        let rels_name = rels_part_name(part);
        if !self.contains(&rels_name) {
            return Ok(Vec::new());
        }
        let root = self.xml(&rels_name)?;
        let rels = root
            .children_named("Relationship")
            .filter_map(|el| {
                let id = el.attr("Id")?;
                let rel_type = el.attr("Type")?;
                let target = el.attr("Target")?;
                let external = el.attr("TargetMode") == Some("External");
                Some(Relationship {
                    id: id.to_string(),
                    rel_type: rel_type.to_string(),
                    target: if external {
                        target.to_string()
                    } else {
                        resolve_target(part, target)
                    },
                    external,
                })
            })
            .collect();
        Ok(rels)
    }

    pub fn content_types(&self) -> Result<ContentTypes> {
        Ok(ContentTypes::parse(&self.xml(CONTENT_TYPES_PART)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_rels_part_names() {
        assert_eq!(rels_part_name("ppt/slides/slide1.xml"), "ppt/slides/_rels/slide1.xml.rels");
        assert_eq!(rels_part_name(""), "_rels/.rels");
    }

    #[test]
    fn test_target_resolution() {
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(resolve_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
        assert_eq!(resolve_target("ppt/presentation.xml", "/ppt/theme/theme1.xml"), "ppt/theme/theme1.xml");
        assert_eq!(
            relative_target("ppt/slides/slide1.xml", "ppt/media/image1.png"),
            "../media/image1.png"
        );
        assert_eq!(relative_target("ppt/presentation.xml", "ppt/slides/slide3.xml"), "slides/slide3.xml");
        assert_eq!(relative_target("", "docProps/core.xml"), "docProps/core.xml");
    }

    #[test]
    fn test_relationship_kind() {
        let rel = Relationship::new("rId1", "slideLayout", "ppt/slideLayouts/slideLayout1.xml");
        assert_eq!(rel.kind(), "slideLayout");
        let core = Relationship::new("rId2", "core-properties", "docProps/core.xml");
        assert_eq!(core.kind(), "core-properties");
    }

    #[test]
    fn test_relationship_refs_follow_the_namespace() {
        let source = format!(
            r#"<p:grpSp xmlns:r="{NS_OFFICE_RELS}" xmlns:x="urn:other"><a:blip r:embed="rId4" x:id="rId9"/><dgm:relIds xmlns:rel="{NS_OFFICE_RELS}" rel:dm="rId5"/></p:grpSp>"#
        );
        let mut el = xml::parse(&source).unwrap();
        let refs: Vec<String> = relationship_refs(&el).into_iter().collect();
        assert_eq!(refs, vec!["rId4", "rId5"]);

        let ids = HashMap::from([("rId4".to_string(), "rId2".to_string())]);
        remap_relationship_refs(&mut el, &ids);
        let out = el.to_xml();
        assert!(out.contains(r#"r:embed="rId2""#), "{out}");
        assert!(out.contains(r#"x:id="rId9""#));
        assert!(out.contains(r#"rel:dm="rId5""#));
    }

    #[test]
    fn test_zip_round_trip_with_rels() {
        let mut package = Package::default();
        let rels = vec![
            Relationship::new("rId1", "slideLayout", "ppt/slideLayouts/slideLayout1.xml"),
            Relationship::external("rId2", "hyperlink", "https://example.com/?a=1&b=2"),
        ];
        package.insert("ppt/slides/slide1.xml", "<p:sld/>");
        package.insert(
            rels_part_name("ppt/slides/slide1.xml"),
            rels_xml("ppt/slides/slide1.xml", &rels),
        );
        let types = ContentTypes {
            defaults: BTreeMap::from([("rels".to_string(), CT_RELS.to_string())]),
            overrides: BTreeMap::from([("ppt/slides/slide1.xml".to_string(), CT_SLIDE.to_string())]),
        };
        package.insert(CONTENT_TYPES_PART, types.to_xml());

        let mut buffer = Cursor::new(Vec::new());
        package.write_to(&mut buffer).unwrap();
        buffer.set_position(0);
        let reread = Package::from_reader(buffer).unwrap();

        assert_eq!(reread.relationships("ppt/slides/slide1.xml").unwrap(), rels);
        assert_eq!(reread.content_types().unwrap(), types);
        assert!(reread.relationships("ppt/slides/slide2.xml").unwrap().is_empty());
    }
}
