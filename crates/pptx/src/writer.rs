//! Writing the presentation model back out as a `.pptx` package.
//!
//! Slides, charts, media, `presentation.xml`, `docProps` and all
//! relationship and content-type parts are regenerated. Everything the
//! reader retained (theme, masters, layouts) is written back unchanged.

use chrono::SecondsFormat;
use ppt_core::presentation::RawXml;
use ppt_core::shape::{ImageFilter, Picture, Shape, ShapeKind};
use ppt_core::slide::Slide;
use ppt_core::table::Table;
use ppt_core::{Chart, CoreProperties, Error, Presentation, Result};
use std::collections::{BTreeSet, HashMap};
use std::io::{Seek, Write};

use crate::chart_part::write_chart;
use crate::drawingml::{write_effects, write_fill, write_line, write_solid_fill, write_text_body, write_xfrm};
use crate::package::{
    remap_relationship_refs, rels_part_name, rels_xml, ContentTypes, Package, Relationship,
    CONTENT_TYPES_PART, CT_CHART, CT_CORE, CT_EXTENDED, CT_NOTES_SLIDE, CT_PRESENTATION, CT_RELS,
    CT_SLIDE, CT_XML, ROOT_RELS_PART,
};
use crate::xml::{self, XmlBuilder};

pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const URI_TABLE: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";
const NS_CORE: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const NS_EXTENDED: &str = "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
const NS_VT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const CORE_PART: &str = "docProps/core.xml";
const APP_PART: &str = "docProps/app.xml";
/// Built-in "Medium Style 2 - Accent 1".
const TABLE_STYLE_ID: &str = "{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}";
/// Smallest id allowed for masters and layouts.
const FIRST_MASTER_ID: u64 = 2_147_483_648;

/// Writer for PPTX (Office Open XML) packages.
#[derive(Debug, Default)]
pub struct PptxWriter;

impl PptxWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write<W: Write + Seek>(&self, presentation: &Presentation, writer: W) -> Result<()> {
        self.to_package(presentation)?.write_to(writer)
    }

    pub fn to_package(&self, presentation: &Presentation) -> Result<Package> {
        let retained = &presentation.package;
        let mut out = PackageBuilder {
            package: Package::default(),
            content_types: ContentTypes {
                defaults: retained.default_types.clone(),
                overrides: retained.content_types.clone(),
            },
            taken: retained.parts.keys().cloned().collect(),
        };
        out.content_types.defaults.insert("rels".into(), CT_RELS.into());
        out.content_types.defaults.insert("xml".into(), CT_XML.into());
        for (name, bytes) in &retained.parts {
            out.package.insert(name.clone(), bytes.clone());
        }

        let mut pres_rels = Vec::new();
        for master in &presentation.masters {
            let id = format!("rId{}", pres_rels.len() + 1);
            pres_rels.push(Relationship::new(id, "slideMaster", master.part_name.clone()));
        }
        let mut slide_entries = Vec::new();
        for (i, slide) in presentation.slides.iter().enumerate() {
            let part = format!("ppt/slides/slide{}.xml", i + 1);
            out.write_slide(presentation, slide, &part)?;
            let id = format!("rId{}", pres_rels.len() + 1);
            slide_entries.push((slide.slide_id, id.clone()));
            pres_rels.push(Relationship::new(id, "slide", part));
        }
        let mut special_lists = Vec::new();
        for rel in &retained.presentation_rels {
            let id = format!("rId{}", pres_rels.len() + 1);
            let kind = rel.rel_type.rsplit('/').next().unwrap_or_default();
            if matches!(kind, "notesMaster" | "handoutMaster") {
                special_lists.push((kind.to_string(), id.clone()));
            }
            pres_rels.push(Relationship {
                id,
                rel_type: rel.rel_type.clone(),
                target: rel.target.clone(),
                external: false,
            });
        }

        let pres_xml = presentation_xml(presentation, &slide_entries, &special_lists)?;
        out.add_part(PRESENTATION_PART, CT_PRESENTATION, pres_xml);
        out.package
            .insert(rels_part_name(PRESENTATION_PART), rels_xml(PRESENTATION_PART, &pres_rels));

        out.add_part(CORE_PART, CT_CORE, core_xml(&presentation.core));
        out.add_part(APP_PART, CT_EXTENDED, app_xml(presentation));
        let root_rels = [
            Relationship::new("rId1", "officeDocument", PRESENTATION_PART),
            Relationship::new("rId2", "core-properties", CORE_PART),
            Relationship::new("rId3", "extended-properties", APP_PART),
        ];
        out.package.insert(ROOT_RELS_PART, rels_xml("", &root_rels));
        out.package.insert(CONTENT_TYPES_PART, out.content_types.to_xml());

        log::debug!(
            "wrote package with {} parts for {} slides",
            out.package.parts.len(),
            presentation.slides.len()
        );
        Ok(out.package)
    }
}

struct PackageBuilder {
    package: Package,
    content_types: ContentTypes,
    taken: BTreeSet<String>,
}

impl PackageBuilder {
    fn add_part(&mut self, name: &str, content_type: &str, body: String) {
        self.content_types
            .overrides
            .insert(name.to_string(), content_type.to_string());
        self.taken.insert(name.to_string());
        self.package.insert(name, body.into_bytes());
    }

    /// First unused `{dir}/{stem}{n}.{ext}`.
    fn allocate(&mut self, dir: &str, stem: &str, ext: &str) -> String {
        let mut n = 1;
        loop {
            let name = format!("{dir}/{stem}{n}.{ext}");
            if self.taken.insert(name.clone()) {
                return name;
            }
            n += 1;
        }
    }

    fn write_slide(&mut self, presentation: &Presentation, slide: &Slide, part: &str) -> Result<()> {
        let layout = presentation
            .layout_of(slide)
            .or_else(|| presentation.layouts().first())
            .ok_or_else(|| Error::invalid("Presentation has no slide layouts to base slides on"))?;

        let notes_part = slide
            .notes
            .as_ref()
            .map(|_| self.allocate("ppt/notesSlides", "notesSlide", "xml"));
        let mut writer = SlideWriter {
            out: self,
            part,
            rels: vec![Relationship::new("rId1", "slideLayout", layout.part_name.clone())],
        };
        let body = writer.slide_xml(slide)?;
        if let Some(notes_part) = &notes_part {
            writer.add_rel("notesSlide", notes_part.clone());
        }
        let rels = rels_xml(part, &writer.rels);
        self.add_part(part, CT_SLIDE, body);
        self.package.insert(rels_part_name(part), rels);

        if let (Some(notes), Some(notes_part)) = (&slide.notes, &notes_part) {
            self.write_notes(notes, notes_part, part);
        }
        Ok(())
    }

    /// Notes keep their markup and relationship ids; only the back link
    /// to the slide is pointed at the slide's new part.
    fn write_notes(&mut self, notes: &RawXml, notes_part: &str, slide_part: &str) {
        let mut rels: Vec<Relationship> = notes.rels.iter().map(Relationship::from).collect();
        match rels.iter_mut().find(|r| r.kind() == "slide" && !r.external) {
            Some(rel) => rel.target = slide_part.to_string(),
            None => {
                let mut n = rels.len() + 1;
                while rels.iter().any(|r| r.id == format!("rId{n}")) {
                    n += 1;
                }
                rels.push(Relationship::new(format!("rId{n}"), "slide", slide_part));
            }
        }
        self.add_part(notes_part, CT_NOTES_SLIDE, format!("{}{}", xml::XML_DECLARATION, notes.xml));
        self.package.insert(rels_part_name(notes_part), rels_xml(notes_part, &rels));
    }
}

struct SlideWriter<'a> {
    out: &'a mut PackageBuilder,
    part: &'a str,
    rels: Vec<Relationship>,
}

impl SlideWriter<'_> {
    fn add_rel(&mut self, kind: &str, target: String) -> String {
        let id = format!("rId{}", self.rels.len() + 1);
        self.rels.push(Relationship::new(id.clone(), kind, target));
        id
    }

    /// Relationship id for a hyperlink URL, reusing an existing one.
    fn link(&mut self, url: &str) -> String {
        if let Some(rel) = self.rels.iter().find(|r| r.external && r.target == url) {
            return rel.id.clone();
        }
        let id = format!("rId{}", self.rels.len() + 1);
        self.rels.push(Relationship::external(id.clone(), "hyperlink", url));
        id
    }

    fn slide_xml(&mut self, slide: &Slide) -> Result<String> {
        let mut xml = XmlBuilder::new();
        xml.open("p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)]);
        xml.open("p:cSld", &[]);
        if let Some(fill) = &slide.background {
            xml.open("p:bg", &[]).open("p:bgPr", &[]);
            write_fill(&mut xml, fill);
            xml.empty("a:effectLst", &[]);
            xml.close("p:bgPr").close("p:bg");
        }
        xml.open("p:spTree", &[]);
        xml.open("p:nvGrpSpPr", &[])
            .empty("p:cNvPr", &[("id", "1"), ("name", "")])
            .empty("p:cNvGrpSpPr", &[])
            .empty("p:nvPr", &[])
            .close("p:nvGrpSpPr");
        xml.open("p:grpSpPr", &[]).open("a:xfrm", &[]);
        xml.empty("a:off", &[("x", "0"), ("y", "0")])
            .empty("a:ext", &[("cx", "0"), ("cy", "0")])
            .empty("a:chOff", &[("x", "0"), ("y", "0")])
            .empty("a:chExt", &[("cx", "0"), ("cy", "0")]);
        xml.close("a:xfrm").close("p:grpSpPr");

        for shape in &slide.shapes {
            self.write_shape(&mut xml, shape)?;
        }
        xml.close("p:spTree").close("p:cSld");
        xml.open("p:clrMapOvr", &[]).empty("a:masterClrMapping", &[]).close("p:clrMapOvr");

        if let Some(transition) = &slide.transition {
            let mut attrs = vec![("spd", transition.speed.as_ooxml())];
            if !transition.advance_on_click {
                attrs.push(("advClick", "0"));
            }
            let advance = transition.advance_after_ms.map(|ms| ms.to_string());
            if let Some(ms) = &advance {
                attrs.push(("advTm", ms));
            }
            xml.open("p:transition", &attrs);
            xml.empty(&format!("p:{}", transition.kind.element()), &[]);
            xml.close("p:transition");
        }
        xml.close("p:sld");
        Ok(xml.finish())
    }

    fn write_shape(&mut self, xml: &mut XmlBuilder, shape: &Shape) -> Result<()> {
        match &shape.kind {
            ShapeKind::AutoShape { .. } | ShapeKind::TextBox | ShapeKind::Placeholder { .. } => {
                self.write_sp(xml, shape);
            }
            ShapeKind::Picture(picture) => self.write_pic(xml, shape, picture),
            ShapeKind::Connector(kind) => {
                let id = shape.id.to_string();
                xml.open("p:cxnSp", &[]).open("p:nvCxnSpPr", &[]);
                xml.empty("p:cNvPr", &[("id", &id), ("name", &shape.name)]);
                xml.empty("p:cNvCxnSpPr", &[]).empty("p:nvPr", &[]);
                xml.close("p:nvCxnSpPr");
                xml.open("p:spPr", &[]);
                write_xfrm(xml, "a:xfrm", &shape.frame);
                xml.open("a:prstGeom", &[("prst", kind.preset())]).empty("a:avLst", &[]).close("a:prstGeom");
                if let Some(line) = &shape.line {
                    write_line(xml, line);
                }
                write_effects(xml, &shape.effects);
                xml.close("p:spPr");
                write_style(xml, 1, 0);
                xml.close("p:cxnSp");
            }
            ShapeKind::Table(table) => {
                self.open_graphic_frame(xml, shape, URI_TABLE);
                self.write_table(xml, table);
                close_graphic_frame(xml);
            }
            ShapeKind::Chart(chart) => self.write_chart_frame(xml, shape, chart),
            ShapeKind::Opaque(raw) => self.write_opaque(xml, raw)?,
        }
        Ok(())
    }

    /// Kept markup goes back as read, with its relationships renumbered
    /// into this slide's rels.
    fn write_opaque(&mut self, xml: &mut XmlBuilder, raw: &RawXml) -> Result<()> {
        let mut el = xml::parse(&raw.xml)?;
        let mut ids = HashMap::new();
        for rel in &raw.rels {
            let id = format!("rId{}", self.rels.len() + 1);
            ids.insert(rel.id.clone(), id.clone());
            self.rels.push(Relationship {
                id,
                ..Relationship::from(rel)
            });
        }
        remap_relationship_refs(&mut el, &ids);
        xml.raw(&el.to_xml());
        Ok(())
    }

    fn write_sp(&mut self, xml: &mut XmlBuilder, shape: &Shape) {
        let id = shape.id.to_string();
        xml.open("p:sp", &[]).open("p:nvSpPr", &[]);
        xml.empty("p:cNvPr", &[("id", &id), ("name", &shape.name)]);
        match &shape.kind {
            ShapeKind::TextBox => {
                xml.empty("p:cNvSpPr", &[("txBox", "1")]);
                xml.empty("p:nvPr", &[]);
            }
            ShapeKind::Placeholder { idx, kind } => {
                xml.open("p:cNvSpPr", &[]).empty("a:spLocks", &[("noGrp", "1")]).close("p:cNvSpPr");
                let idx = idx.to_string();
                let mut ph: Vec<(&str, &str)> = Vec::new();
                if kind.as_ooxml() != "obj" {
                    ph.push(("type", kind.as_ooxml()));
                }
                if idx != "0" {
                    ph.push(("idx", &idx));
                }
                xml.open("p:nvPr", &[]).empty("p:ph", &ph).close("p:nvPr");
            }
            _ => {
                xml.empty("p:cNvSpPr", &[]);
                xml.empty("p:nvPr", &[]);
            }
        }
        xml.close("p:nvSpPr");

        xml.open("p:spPr", &[]);
        write_xfrm(xml, "a:xfrm", &shape.frame);
        match &shape.kind {
            ShapeKind::AutoShape { preset } => {
                xml.open("a:prstGeom", &[("prst", preset)]).empty("a:avLst", &[]).close("a:prstGeom");
            }
            ShapeKind::TextBox => {
                xml.open("a:prstGeom", &[("prst", "rect")]).empty("a:avLst", &[]).close("a:prstGeom");
            }
            _ => {}
        }
        match (&shape.fill, &shape.kind) {
            (Some(fill), _) => write_fill(xml, fill),
            (None, ShapeKind::TextBox) => {
                xml.empty("a:noFill", &[]);
            }
            _ => {}
        }
        if let Some(line) = &shape.line {
            write_line(xml, line);
        }
        write_effects(xml, &shape.effects);
        xml.close("p:spPr");

        if matches!(shape.kind, ShapeKind::AutoShape { .. }) {
            write_style(xml, 2, 1);
        }
        if let Some(text) = &shape.text {
            write_text_body(xml, "p:txBody", text, &mut |url: &str| self.link(url));
        }
        xml.close("p:sp");
    }

    fn write_pic(&mut self, xml: &mut XmlBuilder, shape: &Shape, picture: &Picture) {
        let media = self.out.allocate("ppt/media", "image", picture.format.extension());
        self.out.package.insert(media.clone(), picture.data.clone());
        self.out
            .content_types
            .defaults
            .entry(picture.format.extension().to_string())
            .or_insert_with(|| picture.format.content_type().to_string());
        let rid = self.add_rel("image", media);

        let id = shape.id.to_string();
        xml.open("p:pic", &[]).open("p:nvPicPr", &[]);
        xml.empty(
            "p:cNvPr",
            &[("id", &id), ("name", &shape.name), ("descr", &picture.description)],
        );
        xml.open("p:cNvPicPr", &[]).empty("a:picLocks", &[("noChangeAspect", "1")]).close("p:cNvPicPr");
        xml.empty("p:nvPr", &[]);
        xml.close("p:nvPicPr");

        xml.open("p:blipFill", &[]);
        let filters = picture.transparency.is_some() || picture.filter.is_some();
        if filters {
            xml.open("a:blip", &[("r:embed", &rid)]);
            if let Some(transparency) = picture.transparency {
                let amt = (((1.0 - transparency.clamp(0.0, 1.0)) * 100_000.0).round() as i64).to_string();
                xml.empty("a:alphaModFix", &[("amt", &amt)]);
            }
            match picture.filter {
                Some(ImageFilter::Grayscale) => {
                    xml.empty("a:grayscl", &[]);
                }
                Some(ImageFilter::BlackWhite(threshold)) => {
                    let thresh = ((threshold.clamp(0.0, 1.0) * 100_000.0).round() as i64).to_string();
                    xml.empty("a:biLevel", &[("thresh", &thresh)]);
                }
                None => {}
            }
            xml.close("a:blip");
        } else {
            xml.empty("a:blip", &[("r:embed", &rid)]);
        }
        xml.open("a:stretch", &[]).empty("a:fillRect", &[]).close("a:stretch");
        xml.close("p:blipFill");

        xml.open("p:spPr", &[]);
        write_xfrm(xml, "a:xfrm", &shape.frame);
        xml.open("a:prstGeom", &[("prst", "rect")]).empty("a:avLst", &[]).close("a:prstGeom");
        if let Some(line) = &shape.line {
            write_line(xml, line);
        }
        write_effects(xml, &shape.effects);
        xml.close("p:spPr");
        xml.close("p:pic");
    }

    fn open_graphic_frame(&self, xml: &mut XmlBuilder, shape: &Shape, uri: &str) {
        let id = shape.id.to_string();
        xml.open("p:graphicFrame", &[]).open("p:nvGraphicFramePr", &[]);
        xml.empty("p:cNvPr", &[("id", &id), ("name", &shape.name)]);
        xml.open("p:cNvGraphicFramePr", &[])
            .empty("a:graphicFrameLocks", &[("noGrp", "1")])
            .close("p:cNvGraphicFramePr");
        xml.empty("p:nvPr", &[]);
        xml.close("p:nvGraphicFramePr");
        write_xfrm(xml, "p:xfrm", &shape.frame);
        xml.open("a:graphic", &[]).open("a:graphicData", &[("uri", uri)]);
    }

    fn write_table(&mut self, xml: &mut XmlBuilder, table: &Table) {
        xml.open("a:tbl", &[]);
        let mut props: Vec<(&str, &str)> = Vec::new();
        if table.first_row {
            props.push(("firstRow", "1"));
        }
        if table.banded_rows {
            props.push(("bandRow", "1"));
        }
        xml.open("a:tblPr", &props).leaf("a:tableStyleId", &[], TABLE_STYLE_ID).close("a:tblPr");
        xml.open("a:tblGrid", &[]);
        for width in &table.columns {
            xml.empty("a:gridCol", &[("w", &width.to_string())]);
        }
        xml.close("a:tblGrid");
        for row in &table.rows {
            xml.open("a:tr", &[("h", &row.height.to_string())]);
            for cell in &row.cells {
                xml.open("a:tc", &[]);
                write_text_body(xml, "a:txBody", &cell.text, &mut |url: &str| self.link(url));
                let anchor: Vec<(&str, &str)> = cell.anchor.iter().map(|a| ("anchor", a.as_ooxml())).collect();
                match cell.fill {
                    Some(color) => {
                        xml.open("a:tcPr", &anchor);
                        write_solid_fill(xml, color);
                        xml.close("a:tcPr");
                    }
                    None => {
                        xml.empty("a:tcPr", &anchor);
                    }
                }
                xml.close("a:tc");
            }
            xml.close("a:tr");
        }
        xml.close("a:tbl");
    }

    fn write_chart_frame(&mut self, xml: &mut XmlBuilder, shape: &Shape, chart: &Chart) {
        let part = self.out.allocate("ppt/charts", "chart", "xml");
        self.out.add_part(&part, CT_CHART, write_chart(chart));
        let rid = self.add_rel("chart", part);
        log::debug!("{}: chart '{}' written with {}", self.part, shape.name, rid);

        self.open_graphic_frame(xml, shape, NS_CHART);
        xml.empty("c:chart", &[("xmlns:c", NS_CHART), ("xmlns:r", NS_R), ("r:id", &rid)]);
        close_graphic_frame(xml);
    }
}

fn close_graphic_frame(xml: &mut XmlBuilder) {
    xml.close("a:graphicData").close("a:graphic").close("p:graphicFrame");
}

/// Theme-based `p:style`, so shapes without explicit formatting look native.
fn write_style(xml: &mut XmlBuilder, line_idx: u8, fill_idx: u8) {
    let line_idx = line_idx.to_string();
    let fill_idx = fill_idx.to_string();
    xml.open("p:style", &[]);
    xml.open("a:lnRef", &[("idx", &line_idx)]);
    xml.open("a:schemeClr", &[("val", "accent1")]).empty("a:shade", &[("val", "50000")]).close("a:schemeClr");
    xml.close("a:lnRef");
    xml.open("a:fillRef", &[("idx", &fill_idx)]).empty("a:schemeClr", &[("val", "accent1")]).close("a:fillRef");
    xml.open("a:effectRef", &[("idx", "0")]).empty("a:schemeClr", &[("val", "accent1")]).close("a:effectRef");
    xml.open("a:fontRef", &[("idx", "minor")]).empty("a:schemeClr", &[("val", "lt1")]).close("a:fontRef");
    xml.close("p:style");
}

/// Master and layout ids already used inside the retained master parts.
fn used_layout_ids(presentation: &Presentation) -> BTreeSet<u64> {
    let mut ids = BTreeSet::new();
    for master in &presentation.masters {
        let Some(bytes) = presentation.package.parts.get(&master.part_name) else {
            continue;
        };
        let Ok(root) = xml::parse_bytes(bytes) else {
            continue;
        };
        if let Some(list) = root.child("sldLayoutIdLst") {
            ids.extend(
                list.children_named("sldLayoutId")
                    .filter_map(|l| l.attr("id"))
                    .filter_map(|id| id.parse::<u64>().ok()),
            );
        }
    }
    ids
}

fn presentation_xml(
    presentation: &Presentation,
    slides: &[(u32, String)],
    special_lists: &[(String, String)],
) -> Result<String> {
    let mut xml = XmlBuilder::new();
    xml.open(
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P), ("saveSubsetFonts", "1")],
    );

    let used = used_layout_ids(presentation);
    let mut next_id = FIRST_MASTER_ID;
    xml.open("p:sldMasterIdLst", &[]);
    for i in 0..presentation.masters.len() {
        while used.contains(&next_id) {
            next_id += 1;
        }
        let (id, rid) = (next_id.to_string(), format!("rId{}", i + 1));
        xml.empty("p:sldMasterId", &[("id", &id), ("r:id", &rid)]);
        next_id += 1;
    }
    xml.close("p:sldMasterIdLst");

    for (list, item) in [("notesMaster", "notesMasterIdLst"), ("handoutMaster", "handoutMasterIdLst")] {
        if let Some((_, rid)) = special_lists.iter().find(|(kind, _)| kind == list) {
            let tag = format!("p:{item}");
            xml.open(&tag, &[]);
            xml.empty(&format!("p:{list}Id"), &[("r:id", rid)]);
            xml.close(&tag);
        }
    }

    if !slides.is_empty() {
        xml.open("p:sldIdLst", &[]);
        let mut seen = BTreeSet::new();
        for (slide_id, rid) in slides {
            if !seen.insert(*slide_id) {
                return Err(Error::invalid(format!("Duplicate slide id {slide_id}")));
            }
            xml.empty("p:sldId", &[("id", &slide_id.to_string()), ("r:id", rid)]);
        }
        xml.close("p:sldIdLst");
    }
    let (cx, cy) = (presentation.slide_width.to_string(), presentation.slide_height.to_string());
    xml.empty("p:sldSz", &[("cx", &cx), ("cy", &cy)]);
    xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")]);
    if let Some(style) = &presentation.package.default_text_style {
        xml.raw(style);
    }
    xml.close("p:presentation");
    Ok(xml.finish())
}

fn core_xml(core: &CoreProperties) -> String {
    let mut xml = XmlBuilder::new();
    xml.open(
        "cp:coreProperties",
        &[
            ("xmlns:cp", NS_CORE),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:dcmitype", "http://purl.org/dc/dcmitype/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    );
    let fields = [
        ("dc:title", &core.title),
        ("dc:subject", &core.subject),
        ("dc:creator", &core.author),
        ("cp:keywords", &core.keywords),
        ("dc:description", &core.comments),
        ("cp:category", &core.category),
        ("cp:lastModifiedBy", &core.last_modified_by),
    ];
    for (tag, value) in fields {
        if !value.is_empty() {
            xml.leaf(tag, &[], value);
        }
    }
    if let Some(revision) = core.revision {
        xml.leaf("cp:revision", &[], &revision.to_string());
    }
    for (tag, stamp) in [("dcterms:created", core.created), ("dcterms:modified", core.modified)] {
        if let Some(stamp) = stamp {
            let value = stamp.to_rfc3339_opts(SecondsFormat::Secs, true);
            xml.leaf(tag, &[("xsi:type", "dcterms:W3CDTF")], &value);
        }
    }
    xml.close("cp:coreProperties");
    xml.finish()
}

fn app_xml(presentation: &Presentation) -> String {
    let mut xml = XmlBuilder::new();
    xml.open("Properties", &[("xmlns", NS_EXTENDED), ("xmlns:vt", NS_VT)]);
    xml.leaf("Application", &[], "Microsoft Office PowerPoint");
    xml.leaf("Slides", &[], &presentation.slides.len().to_string());
    xml.leaf("AppVersion", &[], "16.0000");
    xml.close("Properties");
    xml.finish()
}
