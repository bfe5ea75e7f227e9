//! Reading a `.pptx` package into the presentation model.

use chrono::{DateTime, Utc};
use ppt_core::presentation::{PackageRel, PartRel, PlaceholderSpec, RawXml, RetainedPackage};
use ppt_core::shape::{
    ConnectorKind, ImageFilter, ImageFormat, PlaceholderType, Picture, Shape, ShapeKind,
};
use ppt_core::slide::{LayoutRef, Slide, Transition, TransitionKind, TransitionSpeed};
use ppt_core::table::{Table, TableCell, TableRow};
use ppt_core::text::VerticalAnchor;
use ppt_core::{CoreProperties, Presentation, Result, SlideLayout, SlideMaster};
use std::collections::{BTreeSet, HashMap};
use std::io::{Read, Seek};

use crate::chart_part::read_chart;
use crate::drawingml::{read_color, read_effects, read_fill, read_line, read_text_body, read_xfrm};
use crate::package::{
    relationship_refs, rels_part_name, Package, Relationship, CONTENT_TYPES_PART, ROOT_RELS_PART,
};
use crate::xml::Element;

const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";
const PERCENT_UNIT: f64 = 100_000.0;

/// Reader for PPTX (Office Open XML) packages.
#[derive(Debug, Default)]
pub struct PptxReader;

impl PptxReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a package from a ZIP stream.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<Presentation> {
        self.read_package(&Package::from_reader(reader)?)
    }

    pub fn read_package(&self, package: &Package) -> Result<Presentation> {
        let root_rels = package.relationships("")?;
        let pres_part = root_rels
            .iter()
            .find(|r| r.kind() == "officeDocument" && !r.external)
            .map(|r| r.target.clone())
            .unwrap_or_else(|| DEFAULT_PRESENTATION_PART.to_string());
        let pres = package.xml(&pres_part)?;
        let pres_rels = package.relationships(&pres_part)?;
        let by_id: HashMap<&str, &Relationship> =
            pres_rels.iter().map(|r| (r.id.as_str(), r)).collect();

        let mut presentation = Presentation::default();
        if let Some(size) = pres.child("sldSz") {
            presentation.slide_width = size.attr_i64("cx").unwrap_or(presentation.slide_width);
            presentation.slide_height = size.attr_i64("cy").unwrap_or(presentation.slide_height);
        }

        for (i, id) in id_list(&pres, "sldMasterIdLst").iter().enumerate() {
            let Some(rel) = by_id.get(id.as_str()) else {
                log::warn!("slide master {id} has no relationship");
                continue;
            };
            presentation.masters.push(read_master(package, &rel.target, i)?);
        }

        let layouts: HashMap<&str, LayoutRef> = presentation
            .masters
            .iter()
            .enumerate()
            .flat_map(|(m, master)| {
                master.layouts.iter().enumerate().map(move |(l, layout)| {
                    (layout.part_name.as_str(), LayoutRef { master: m, layout: l })
                })
            })
            .collect();

        let mut slide_parts = Vec::new();
        let mut slides = Vec::new();
        if let Some(list) = pres.child("sldIdLst") {
            for sld in list.children_named("sldId") {
                let Some(rel) = sld.attr("r:id").and_then(|id| by_id.get(id)) else {
                    log::warn!("slide entry without a relationship skipped");
                    continue;
                };
                let slide_id = sld.attr_i64("id").unwrap_or(0).max(0) as u32;
                let (slide, chart_parts) = read_slide(package, &rel.target, slide_id, &layouts)?;
                slide_parts.push(rel.target.clone());
                slide_parts.extend(chart_parts);
                slides.push(slide);
            }
        }
        presentation.slides = slides;

        // Parts reached only through markup kept as read.
        let mut kept: BTreeSet<String> = BTreeSet::new();
        for slide in &presentation.slides {
            let opaque = slide.shapes.iter().filter_map(|shape| match &shape.kind {
                ShapeKind::Opaque(raw) => Some(raw),
                _ => None,
            });
            for raw in opaque.chain(slide.notes.as_ref()) {
                kept.extend(
                    raw.rels
                        .iter()
                        .filter(|r| !r.external && r.kind() != "slide")
                        .map(|r| r.target.clone()),
                );
            }
        }

        if let Some(core) = root_rels.iter().find(|r| r.kind() == "core-properties") {
            if let Some(bytes) = package.get(&core.target) {
                presentation.core = read_core_properties(&crate::xml::parse_bytes(bytes)?);
            }
        }

        let mut modeled: BTreeSet<String> = BTreeSet::new();
        modeled.insert(CONTENT_TYPES_PART.to_string());
        modeled.insert(ROOT_RELS_PART.to_string());
        modeled.insert(pres_part.clone());
        modeled.extend(root_rels.iter().filter(|r| !r.external).map(|r| r.target.clone()));
        modeled.extend(slide_parts);
        presentation.package = retain_parts(package, &modeled, &kept, &pres_rels, &pres)?;

        log::debug!(
            "read presentation: {} masters, {} slides, {} retained parts",
            presentation.masters.len(),
            presentation.slides.len(),
            presentation.package.parts.len()
        );
        Ok(presentation)
    }
}

/// `r:id` values of an id list such as `p:sldMasterIdLst`.
fn id_list(pres: &Element, list: &str) -> Vec<String> {
    pres.child(list)
        .map(|l| {
            l.elements()
                .filter_map(|e| e.attr("r:id").map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn retain_parts(
    package: &Package,
    modeled: &BTreeSet<String>,
    kept: &BTreeSet<String>,
    pres_rels: &[Relationship],
    pres: &Element,
) -> Result<RetainedPackage> {
    let is_modeled = |name: &str| {
        modeled.contains(name)
            || modeled
                .iter()
                .any(|part| rels_part_name(part) == name)
            || name.starts_with("ppt/notesSlides/")
    };
    let mut retained = RetainedPackage::default();
    let mut candidates: Vec<&String> = package
        .parts
        .keys()
        .filter(|name| !is_modeled(name.as_str()))
        .collect();

    // Media and embeddings survive only if a retained part still points at them.
    let mut referenced: BTreeSet<String> = kept.clone();
    for name in &candidates {
        if name.ends_with(".rels") {
            continue;
        }
        for rel in package.relationships(name)? {
            if !rel.external {
                referenced.insert(rel.target);
            }
        }
    }
    candidates.retain(|name| {
        let shared = name.starts_with("ppt/media/") || name.starts_with("ppt/embeddings/");
        !shared || referenced.contains(name.as_str())
    });

    let content_types = package.content_types()?;
    for name in candidates {
        if let Some(bytes) = package.get(name) {
            retained.parts.insert(name.clone(), bytes.to_vec());
        }
        if let Some(ct) = content_types.overrides.get(name.as_str()) {
            retained.content_types.insert(name.clone(), ct.clone());
        }
    }
    retained.default_types = content_types.defaults;

    for rel in pres_rels {
        if rel.external || matches!(rel.kind(), "slide" | "slideMaster") {
            continue;
        }
        if !retained.parts.contains_key(&rel.target) {
            log::warn!("dropping presentation relationship to missing part {}", rel.target);
            continue;
        }
        retained.presentation_rels.push(PackageRel {
            rel_type: rel.rel_type.clone(),
            target: rel.target.clone(),
        });
    }
    retained.default_text_style = pres.child("defaultTextStyle").map(Element::to_xml);
    Ok(retained)
}

fn shape_tree(root: &Element) -> Option<&Element> {
    root.path(&["cSld", "spTree"])
}

/// Placeholders share a position with the master placeholder of the same family.
fn placeholder_family(kind: &PlaceholderType) -> &'static str {
    match kind {
        PlaceholderType::Title | PlaceholderType::CenterTitle => "title",
        PlaceholderType::Date => "dt",
        PlaceholderType::Footer => "ftr",
        PlaceholderType::SlideNumber => "sldNum",
        PlaceholderType::Header => "hdr",
        _ => "body",
    }
}

fn read_placeholders(root: &Element, inherited: &[PlaceholderSpec]) -> Vec<PlaceholderSpec> {
    let Some(tree) = shape_tree(root) else {
        return Vec::new();
    };
    let mut specs = Vec::new();
    for sp in tree.children_named("sp") {
        let Some(ph) = sp.path(&["nvSpPr", "nvPr", "ph"]) else {
            continue;
        };
        let kind = PlaceholderType::from_ooxml(ph.attr("type"));
        let idx = ph.attr_i64("idx").unwrap_or(0).max(0) as u32;
        let name = sp
            .path(&["nvSpPr", "cNvPr"])
            .and_then(|c| c.attr("name"))
            .unwrap_or_default()
            .to_string();
        let frame = sp
            .path(&["spPr", "xfrm"])
            .map(read_xfrm)
            .or_else(|| {
                let family = placeholder_family(&kind);
                inherited
                    .iter()
                    .find(|p| placeholder_family(&p.kind) == family)
                    .map(|p| p.frame)
            })
            .unwrap_or_default();
        specs.push(PlaceholderSpec { idx, kind, name, frame });
    }
    specs
}

fn read_master(package: &Package, part: &str, index: usize) -> Result<SlideMaster> {
    let root = package.xml(part)?;
    let rels = package.relationships(part)?;
    let placeholders = read_placeholders(&root, &[]);

    let theme_name = rels
        .iter()
        .find(|r| r.kind() == "theme")
        .and_then(|r| package.get(&r.target))
        .and_then(|bytes| crate::xml::parse_bytes(bytes).ok())
        .and_then(|theme| theme.attr("name").map(str::to_string));
    let name = theme_name
        .or_else(|| root.child("cSld").and_then(|c| c.attr("name")).map(str::to_string))
        .unwrap_or_else(|| format!("Slide Master {}", index + 1));

    let by_id: HashMap<&str, &Relationship> = rels.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut layout_parts: Vec<&str> = id_list(&root, "sldLayoutIdLst")
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).map(|r| r.target.as_str()))
        .collect();
    if layout_parts.is_empty() {
        layout_parts = rels
            .iter()
            .filter(|r| r.kind() == "slideLayout")
            .map(|r| r.target.as_str())
            .collect();
    }

    let mut layouts = Vec::new();
    for (i, layout_part) in layout_parts.into_iter().enumerate() {
        let layout = package.xml(layout_part)?;
        layouts.push(SlideLayout {
            name: layout
                .child("cSld")
                .and_then(|c| c.attr("name"))
                .map(str::to_string)
                .unwrap_or_else(|| format!("Layout {}", i + 1)),
            part_name: layout_part.to_string(),
            placeholders: read_placeholders(&layout, &placeholders),
        });
    }

    Ok(SlideMaster {
        name,
        part_name: part.to_string(),
        placeholders,
        layouts,
    })
}

/// A slide, plus the chart parts it owns.
fn read_slide(
    package: &Package,
    part: &str,
    slide_id: u32,
    layouts: &HashMap<&str, LayoutRef>,
) -> Result<(Slide, Vec<String>)> {
    let root = package.xml(part)?;
    let rels = package.relationships(part)?;
    let layout = rels
        .iter()
        .find(|r| r.kind() == "slideLayout")
        .and_then(|r| layouts.get(r.target.as_str()).copied())
        .unwrap_or_else(|| {
            log::warn!("{part} has no known layout, using the first");
            LayoutRef::default()
        });

    let mut ctx = SlideContext {
        package,
        part,
        rels: &rels,
        namespaces: root.namespace_decls().cloned().collect(),
        chart_parts: Vec::new(),
    };
    let mut slide = Slide::new(slide_id, layout);
    slide.background = root
        .path(&["cSld", "bg", "bgPr"])
        .and_then(read_fill);
    slide.transition = read_transition(&root);
    slide.notes = rels
        .iter()
        .find(|r| r.kind() == "notesSlide" && !r.external)
        .and_then(|r| read_notes(package, &r.target));

    if let Some(tree) = shape_tree(&root) {
        for el in tree.elements() {
            let shape = match el.local() {
                "sp" => Some(ctx.read_sp(el)),
                "pic" => Some(ctx.read_pic(el).unwrap_or_else(|| ctx.opaque(el))),
                "cxnSp" => Some(ctx.read_connector(el)),
                "graphicFrame" => Some(ctx.read_graphic_frame(el).unwrap_or_else(|| ctx.opaque(el))),
                "nvGrpSpPr" | "grpSpPr" | "extLst" => None,
                other => {
                    log::debug!("{part}: keeping <{other}> as markup");
                    Some(ctx.opaque(el))
                }
            };
            slide.shapes.extend(shape);
        }
    }
    Ok((slide, ctx.chart_parts))
}

/// A notes slide, with its relationships as read.
fn read_notes(package: &Package, part: &str) -> Option<RawXml> {
    let read = || -> Result<RawXml> {
        let root = package.xml(part)?;
        let rels = package.relationships(part)?;
        Ok(RawXml {
            xml: root.to_xml(),
            element: root.local().to_string(),
            rels: rels.iter().map(PartRel::from).collect(),
        })
    };
    match read() {
        Ok(notes) => Some(notes),
        Err(e) => {
            log::warn!("{part}: notes slide unreadable, dropped: {e}");
            None
        }
    }
}

struct SlideContext<'a> {
    package: &'a Package,
    part: &'a str,
    rels: &'a [Relationship],
    /// Namespace declarations of the slide root, copied onto kept markup.
    namespaces: Vec<(String, String)>,
    chart_parts: Vec<String>,
}

fn non_visual(el: &Element, wrapper: &str) -> (u32, String) {
    let c_nv_pr = el.path(&[wrapper, "cNvPr"]);
    let id = c_nv_pr.and_then(|c| c.attr_i64("id")).unwrap_or(0).max(0) as u32;
    let name = c_nv_pr
        .and_then(|c| c.attr("name"))
        .unwrap_or_default()
        .to_string();
    (id, name)
}

impl SlideContext<'_> {
    fn rel(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    fn hyperlink(&self, id: &str) -> Option<String> {
        self.rel(id).map(|r| r.target.clone())
    }

    /// Keep `el` as markup, along with the relationships it refers to.
    fn opaque(&self, el: &Element) -> Shape {
        let mut markup = el.clone();
        for (key, value) in &self.namespaces {
            if markup.attr(key).is_none() {
                markup.attrs.push((key.clone(), value.clone()));
            }
        }
        let rels: Vec<PartRel> = relationship_refs(&markup)
            .iter()
            .filter_map(|id| {
                let rel = self.rel(id);
                if rel.is_none() {
                    log::warn!("{}: kept <{}> refers to unknown relationship {id}", self.part, el.name);
                }
                rel.map(PartRel::from)
            })
            .collect();

        let c_nv_pr = el
            .elements()
            .find(|c| c.local().starts_with("nv"))
            .and_then(|nv| nv.child("cNvPr"));
        let name = c_nv_pr
            .and_then(|c| c.attr("name"))
            .unwrap_or_default()
            .to_string();
        // Nested shapes carry ids too; new shapes must not reuse them.
        let mut ids = Vec::new();
        el.descendants("cNvPr", &mut ids);
        let id = ids
            .iter()
            .filter_map(|c| c.attr_i64("id"))
            .max()
            .unwrap_or(0)
            .max(0) as u32;
        let frame = el
            .path(&["grpSpPr", "xfrm"])
            .or_else(|| el.child("xfrm"))
            .or_else(|| el.path(&["spPr", "xfrm"]))
            .map(read_xfrm)
            .unwrap_or_default();

        let raw = RawXml {
            xml: markup.to_xml(),
            element: el.local().to_string(),
            rels,
        };
        Shape::new(id, name, frame, ShapeKind::Opaque(raw))
    }

    fn read_sp(&self, el: &Element) -> Shape {
        let (id, name) = non_visual(el, "nvSpPr");
        let sp_pr = el.child("spPr");
        let ph = el.path(&["nvSpPr", "nvPr", "ph"]);
        let kind = if let Some(ph) = ph {
            ShapeKind::Placeholder {
                idx: ph.attr_i64("idx").unwrap_or(0).max(0) as u32,
                kind: PlaceholderType::from_ooxml(ph.attr("type")),
            }
        } else if el.path(&["nvSpPr", "cNvSpPr"]).and_then(|c| c.attr_bool("txBox")) == Some(true) {
            ShapeKind::TextBox
        } else {
            let preset = sp_pr
                .and_then(|s| s.child("prstGeom"))
                .and_then(|g| g.attr("prst"))
                .unwrap_or("rect");
            ShapeKind::AutoShape {
                preset: preset.to_string(),
            }
        };
        let frame = sp_pr
            .and_then(|s| s.child("xfrm"))
            .map(read_xfrm)
            .unwrap_or_default();

        let mut shape = Shape::new(id, name, frame, kind);
        if let Some(sp_pr) = sp_pr {
            shape.fill = read_fill(sp_pr);
            shape.line = sp_pr.child("ln").map(read_line);
            shape.effects = read_effects(sp_pr);
        }
        if let Some(body) = el.child("txBody") {
            shape.text = Some(read_text_body(body, &|rid: &str| self.hyperlink(rid)));
        }
        shape
    }

    fn read_pic(&self, el: &Element) -> Option<Shape> {
        let (id, name) = non_visual(el, "nvPicPr");
        let blip = el.path(&["blipFill", "blip"])?;
        let Some(target) = blip
            .attr("r:embed")
            .and_then(|rid| self.rel(rid))
            .map(|r| r.target.as_str())
        else {
            log::warn!("{}: picture '{name}' has no embedded image", self.part);
            return None;
        };
        let Some(data) = self.package.get(target) else {
            log::warn!("{}: picture '{name}' points at missing part {target}", self.part);
            return None;
        };
        let extension = target.rsplit('.').next().unwrap_or_default();
        let Some(format) = ImageFormat::from_magic(data).or_else(|| ImageFormat::from_extension(extension)) else {
            log::warn!("{}: picture '{name}' has an unsupported image format", self.part);
            return None;
        };

        let mut picture = Picture::new(data.to_vec(), format);
        picture.description = el
            .path(&["nvPicPr", "cNvPr"])
            .and_then(|c| c.attr("descr"))
            .unwrap_or_default()
            .to_string();
        picture.transparency = blip
            .child("alphaModFix")
            .and_then(|a| a.attr_f64("amt"))
            .map(|amt| 1.0 - amt / PERCENT_UNIT);
        picture.filter = if blip.child("grayscl").is_some() {
            Some(ImageFilter::Grayscale)
        } else {
            blip.child("biLevel")
                .and_then(|b| b.attr_f64("thresh"))
                .map(|t| ImageFilter::BlackWhite(t / PERCENT_UNIT))
        };

        let sp_pr = el.child("spPr");
        let frame = sp_pr
            .and_then(|s| s.child("xfrm"))
            .map(read_xfrm)
            .unwrap_or_default();
        let mut shape = Shape::new(id, name, frame, ShapeKind::Picture(picture));
        if let Some(sp_pr) = sp_pr {
            shape.line = sp_pr.child("ln").map(read_line);
            shape.effects = read_effects(sp_pr);
        }
        Some(shape)
    }

    fn read_connector(&self, el: &Element) -> Shape {
        let (id, name) = non_visual(el, "nvCxnSpPr");
        let sp_pr = el.child("spPr");
        let kind = sp_pr
            .and_then(|s| s.child("prstGeom"))
            .and_then(|g| g.attr("prst"))
            .map(ConnectorKind::from_preset)
            .unwrap_or(ConnectorKind::Straight);
        let frame = sp_pr
            .and_then(|s| s.child("xfrm"))
            .map(read_xfrm)
            .unwrap_or_default();
        let mut shape = Shape::new(id, name, frame, ShapeKind::Connector(kind));
        shape.line = sp_pr.and_then(|s| s.child("ln")).map(read_line);
        shape
    }

    /// A table or chart; `None` for content the model does not cover.
    fn read_graphic_frame(&mut self, el: &Element) -> Option<Shape> {
        let (id, name) = non_visual(el, "nvGraphicFramePr");
        let frame = el.child("xfrm").map(read_xfrm).unwrap_or_default();
        let data = el.path(&["graphic", "graphicData"])?;

        if let Some(tbl) = data.child("tbl") {
            let table = self.read_table(tbl);
            return Some(Shape::new(id, name, frame, ShapeKind::Table(table)));
        }
        if let Some(chart_ref) = data.child("chart") {
            let target = chart_ref
                .attr("r:id")
                .and_then(|rid| self.rel(rid))
                .map(|r| r.target.clone())?;
            let chart = match self.package.xml(&target).and_then(|root| read_chart(&root)) {
                Ok(chart) => chart,
                Err(e) => {
                    log::warn!("{}: chart '{name}' kept as markup: {e}", self.part);
                    return None;
                }
            };
            self.chart_parts.push(target);
            return Some(Shape::new(id, name, frame, ShapeKind::Chart(Box::new(chart))));
        }
        log::debug!(
            "{}: graphic frame '{name}' with {} kept as markup",
            self.part,
            data.attr("uri").unwrap_or("unknown content")
        );
        None
    }

    fn read_table(&self, tbl: &Element) -> Table {
        let props = tbl.child("tblPr");
        let columns = tbl
            .child("tblGrid")
            .map(|g| g.children_named("gridCol").map(|c| c.attr_i64("w").unwrap_or(0)).collect())
            .unwrap_or_default();
        let rows = tbl
            .children_named("tr")
            .map(|tr| TableRow {
                height: tr.attr_i64("h").unwrap_or(0),
                cells: tr
                    .children_named("tc")
                    .map(|tc| {
                        let tc_pr = tc.child("tcPr");
                        TableCell {
                            text: tc
                                .child("txBody")
                                .map(|b| read_text_body(b, &|rid: &str| self.hyperlink(rid)))
                                .unwrap_or_default(),
                            fill: tc_pr.and_then(|p| p.child("solidFill")).and_then(read_color),
                            anchor: tc_pr
                                .and_then(|p| p.attr("anchor"))
                                .and_then(VerticalAnchor::from_ooxml),
                        }
                    })
                    .collect(),
            })
            .collect();
        Table {
            columns,
            rows,
            first_row: props.and_then(|p| p.attr_bool("firstRow")).unwrap_or(false),
            banded_rows: props.and_then(|p| p.attr_bool("bandRow")).unwrap_or(false),
        }
    }
}

/// `p:transition`, directly on the slide or in the fallback branch of `mc:AlternateContent`.
fn read_transition(root: &Element) -> Option<Transition> {
    let el = root.child("transition").or_else(|| {
        root.children_named("AlternateContent").find_map(|alt| {
            alt.path(&["Fallback", "transition"])
                .or_else(|| alt.path(&["Choice", "transition"]))
        })
    })?;
    let kind = el
        .elements()
        .find_map(|child| TransitionKind::from_element(child.local()))
        .unwrap_or(TransitionKind::Cut);
    let speed = match el.attr_i64("p14:dur") {
        Some(ms) => TransitionSpeed::from_duration_ms(ms.max(0) as u32),
        None => TransitionSpeed::from_ooxml(el.attr("spd").unwrap_or("fast")),
    };
    Some(Transition {
        kind,
        speed,
        advance_on_click: el.attr_bool("advClick").unwrap_or(true),
        advance_after_ms: el.attr_i64("advTm").map(|ms| ms.max(0) as u32),
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

pub(crate) fn read_core_properties(root: &Element) -> CoreProperties {
    let text = |local: &str| root.child(local).map(Element::text).unwrap_or_default();
    CoreProperties {
        title: text("title"),
        subject: text("subject"),
        author: text("creator"),
        keywords: text("keywords"),
        comments: text("description"),
        category: text("category"),
        last_modified_by: text("lastModifiedBy"),
        revision: root.child("revision").and_then(|r| r.text().trim().parse().ok()),
        created: root.child("created").and_then(|c| parse_timestamp(&c.text())),
        modified: root.child("modified").and_then(|c| parse_timestamp(&c.text())),
    }
}
