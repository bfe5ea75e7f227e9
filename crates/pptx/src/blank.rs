//! The default template: a 10 x 7.5 inch deck with one master, the eleven
//! standard layouts and an Office-style theme.
//!
//! The parts are generated and then run through the reader, so a blank
//! presentation is modeled exactly like one opened from disk.

use ppt_core::shape::Frame;
use ppt_core::units::{DEFAULT_SLIDE_HEIGHT, DEFAULT_SLIDE_WIDTH};
use ppt_core::{Presentation, Result};

use crate::package::{
    rels_xml, ContentTypes, Package, Relationship, CONTENT_TYPES_PART, CT_CORE, CT_EXTENDED,
    CT_PRESENTATION, CT_PRES_PROPS, CT_RELS, CT_SLIDE_LAYOUT, CT_SLIDE_MASTER, CT_TABLE_STYLES,
    CT_THEME, CT_VIEW_PROPS, CT_XML, ROOT_RELS_PART,
};
use crate::reader::PptxReader;
use crate::writer::{NS_A, NS_P, NS_R};
use crate::xml::XmlBuilder;

const MASTER_PART: &str = "ppt/slideMasters/slideMaster1.xml";
const THEME_PART: &str = "ppt/theme/theme1.xml";
const PRESENTATION_PART: &str = "ppt/presentation.xml";

const TITLE: Frame = frame(457_200, 274_638, 8_229_600, 1_143_000);
const BODY: Frame = frame(457_200, 1_600_200, 8_229_600, 4_525_963);
const DATE: Frame = frame(457_200, 6_356_350, 2_133_600, 365_125);
const FOOTER: Frame = frame(3_124_200, 6_356_350, 2_895_600, 365_125);
const SLIDE_NUMBER: Frame = frame(6_553_200, 6_356_350, 2_133_600, 365_125);

const fn frame(left: i64, top: i64, width: i64, height: i64) -> Frame {
    Frame {
        left,
        top,
        width,
        height,
        rotation: 0.0,
        flip_h: false,
        flip_v: false,
    }
}

/// A placeholder on a layout. `frame: None` inherits the master position.
struct Ph {
    name: &'static str,
    kind: Option<&'static str>,
    idx: u32,
    frame: Option<Frame>,
    vertical: bool,
}

fn ph(name: &'static str, kind: Option<&'static str>, idx: u32, frame: Option<Frame>) -> Ph {
    Ph {
        name,
        kind,
        idx,
        frame,
        vertical: false,
    }
}

fn vertical(mut p: Ph) -> Ph {
    p.vertical = true;
    p
}

struct LayoutDef {
    name: &'static str,
    kind: &'static str,
    placeholders: Vec<Ph>,
}

fn standard_layouts() -> Vec<LayoutDef> {
    let title = || ph("Title 1", Some("title"), 0, None);
    let layout = |name, kind, placeholders| LayoutDef {
        name,
        kind,
        placeholders,
    };
    vec![
        layout(
            "Title Slide",
            "title",
            vec![
                ph("Title 1", Some("ctrTitle"), 0, Some(frame(685_800, 2_130_425, 7_772_400, 1_470_025))),
                ph("Subtitle 2", Some("subTitle"), 1, Some(frame(1_371_600, 3_886_200, 6_400_800, 1_752_600))),
            ],
        ),
        layout(
            "Title and Content",
            "obj",
            vec![title(), ph("Content Placeholder 2", None, 1, None)],
        ),
        layout(
            "Section Header",
            "secHead",
            vec![
                ph("Title 1", Some("title"), 0, Some(frame(722_313, 4_406_900, 7_772_400, 1_362_075))),
                ph("Text Placeholder 2", Some("body"), 1, Some(frame(722_313, 2_906_713, 7_772_400, 1_500_187))),
            ],
        ),
        layout(
            "Two Content",
            "twoObj",
            vec![
                title(),
                ph("Content Placeholder 2", None, 1, Some(frame(457_200, 1_600_200, 4_038_600, 4_525_963))),
                ph("Content Placeholder 3", None, 2, Some(frame(4_648_200, 1_600_200, 4_038_600, 4_525_963))),
            ],
        ),
        layout(
            "Comparison",
            "twoTxTwoObj",
            vec![
                title(),
                ph("Text Placeholder 2", Some("body"), 1, Some(frame(457_200, 1_535_113, 4_040_188, 639_762))),
                ph("Content Placeholder 3", None, 2, Some(frame(457_200, 2_174_875, 4_040_188, 3_951_288))),
                ph("Text Placeholder 4", Some("body"), 3, Some(frame(4_645_025, 1_535_113, 4_041_775, 639_762))),
                ph("Content Placeholder 5", None, 4, Some(frame(4_645_025, 2_174_875, 4_041_775, 3_951_288))),
            ],
        ),
        layout("Title Only", "titleOnly", vec![title()]),
        layout("Blank", "blank", Vec::new()),
        layout(
            "Content with Caption",
            "objTx",
            vec![
                ph("Title 1", Some("title"), 0, Some(frame(457_200, 273_050, 3_008_313, 1_162_050))),
                ph("Content Placeholder 2", None, 1, Some(frame(3_575_050, 273_050, 5_111_750, 5_853_113))),
                ph("Text Placeholder 3", Some("body"), 2, Some(frame(457_200, 1_435_100, 3_008_313, 4_691_063))),
            ],
        ),
        layout(
            "Picture with Caption",
            "picTx",
            vec![
                ph("Title 1", Some("title"), 0, Some(frame(1_792_288, 4_800_600, 5_486_400, 566_738))),
                ph("Picture Placeholder 2", Some("pic"), 1, Some(frame(1_792_288, 612_775, 5_486_400, 4_114_800))),
                ph("Text Placeholder 3", Some("body"), 2, Some(frame(1_792_288, 5_367_338, 5_486_400, 804_862))),
            ],
        ),
        layout(
            "Title and Vertical Text",
            "vertTx",
            vec![title(), vertical(ph("Vertical Text Placeholder 2", Some("body"), 1, None))],
        ),
        layout(
            "Vertical Title and Text",
            "vertTitleAndTx",
            vec![
                vertical(ph("Vertical Title 1", Some("title"), 0, Some(frame(6_629_400, 274_638, 2_057_400, 5_851_525)))),
                vertical(ph("Vertical Text Placeholder 2", Some("body"), 1, Some(frame(457_200, 274_638, 6_019_800, 5_851_525)))),
            ],
        ),
    ]
}

fn footers() -> [Ph; 3] {
    [
        ph("Date Placeholder", Some("dt"), 10, None),
        ph("Footer Placeholder", Some("ftr"), 11, None),
        ph("Slide Number Placeholder", Some("sldNum"), 12, None),
    ]
}

fn prompt(kind: Option<&str>) -> &'static str {
    match kind {
        Some("title" | "ctrTitle") => "Click to edit Master title style",
        Some("subTitle") => "Click to edit Master subtitle style",
        Some("dt" | "ftr" | "sldNum") => "",
        _ => "Click to edit Master text styles",
    }
}

fn open_slide_part(xml: &mut XmlBuilder, root: &str, attrs: &[(&str, &str)], name: Option<&str>) {
    let mut all = vec![("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)];
    all.extend_from_slice(attrs);
    xml.open(root, &all);
    match name {
        Some(name) => xml.open("p:cSld", &[("name", name)]),
        None => xml.open("p:cSld", &[]),
    };
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
}

fn write_placeholder(xml: &mut XmlBuilder, id: u32, p: &Ph) {
    let id = id.to_string();
    let idx = p.idx.to_string();
    xml.open("p:sp", &[]).open("p:nvSpPr", &[]);
    xml.empty("p:cNvPr", &[("id", &id), ("name", p.name)]);
    xml.open("p:cNvSpPr", &[]).empty("a:spLocks", &[("noGrp", "1")]).close("p:cNvSpPr");
    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if let Some(kind) = p.kind {
        attrs.push(("type", kind));
    }
    if p.vertical {
        attrs.push(("orient", "vert"));
    }
    if p.idx != 0 {
        attrs.push(("idx", &idx));
    }
    xml.open("p:nvPr", &[]).empty("p:ph", &attrs).close("p:nvPr");
    xml.close("p:nvSpPr");
    match &p.frame {
        Some(frame) => {
            xml.open("p:spPr", &[]);
            crate::drawingml::write_xfrm(xml, "a:xfrm", frame);
            xml.close("p:spPr");
        }
        None => {
            xml.empty("p:spPr", &[]);
        }
    }
    xml.open("p:txBody", &[]);
    if p.vertical {
        xml.empty("a:bodyPr", &[("vert", "eaVert")]);
    } else {
        xml.empty("a:bodyPr", &[]);
    }
    xml.empty("a:lstStyle", &[]);
    xml.open("a:p", &[]);
    let text = prompt(p.kind);
    if !text.is_empty() {
        xml.open("a:r", &[]).empty("a:rPr", &[("lang", "en-US")]).leaf("a:t", &[], text).close("a:r");
    }
    xml.empty("a:endParaRPr", &[("lang", "en-US")]);
    xml.close("a:p");
    xml.close("p:txBody");
    xml.close("p:sp");
}

fn master_xml(layout_count: usize) -> String {
    let mut xml = XmlBuilder::new();
    open_slide_part(&mut xml, "p:sldMaster", &[], None);
    let master_placeholders = [
        ph("Title Placeholder 1", Some("title"), 0, Some(TITLE)),
        ph("Text Placeholder 2", Some("body"), 1, Some(BODY)),
        ph("Date Placeholder 3", Some("dt"), 2, Some(DATE)),
        ph("Footer Placeholder 4", Some("ftr"), 3, Some(FOOTER)),
        ph("Slide Number Placeholder 5", Some("sldNum"), 4, Some(SLIDE_NUMBER)),
    ];
    for (i, p) in master_placeholders.iter().enumerate() {
        write_placeholder(&mut xml, i as u32 + 2, p);
    }
    xml.close("p:spTree").close("p:cSld");
    xml.empty(
        "p:clrMap",
        &[
            ("bg1", "lt1"),
            ("tx1", "dk1"),
            ("bg2", "lt2"),
            ("tx2", "dk2"),
            ("accent1", "accent1"),
            ("accent2", "accent2"),
            ("accent3", "accent3"),
            ("accent4", "accent4"),
            ("accent5", "accent5"),
            ("accent6", "accent6"),
            ("hlink", "hlink"),
            ("folHlink", "folHlink"),
        ],
    );
    xml.open("p:sldLayoutIdLst", &[]);
    for i in 0..layout_count {
        let id = (2_147_483_649u64 + i as u64).to_string();
        let rid = format!("rId{}", i + 1);
        xml.empty("p:sldLayoutId", &[("id", &id), ("r:id", &rid)]);
    }
    xml.close("p:sldLayoutIdLst");

    xml.open("p:txStyles", &[]);
    xml.open("p:titleStyle", &[]);
    xml.open("a:lvl1pPr", &[("algn", "ctr")]).empty("a:buNone", &[]);
    xml.open("a:defRPr", &[("sz", "4400"), ("kern", "1200")]);
    xml.open("a:solidFill", &[]).empty("a:schemeClr", &[("val", "tx1")]).close("a:solidFill");
    xml.empty("a:latin", &[("typeface", "+mj-lt")]);
    xml.close("a:defRPr").close("a:lvl1pPr");
    xml.close("p:titleStyle");
    xml.open("p:bodyStyle", &[]);
    for (level, (size, margin, bullet)) in [
        (3200, 342_900, "\u{2022}"),
        (2800, 742_950, "\u{2013}"),
        (2400, 1_143_000, "\u{2022}"),
        (2000, 1_600_200, "\u{2013}"),
        (2000, 2_057_400, "\u{bb}"),
    ]
    .into_iter()
    .enumerate()
    {
        body_level(&mut xml, level + 1, size, margin, bullet);
    }
    xml.close("p:bodyStyle");
    xml.open("p:otherStyle", &[]);
    xml.open("a:lvl1pPr", &[]).empty("a:defRPr", &[("sz", "1800")]).close("a:lvl1pPr");
    xml.close("p:otherStyle");
    xml.close("p:txStyles");
    xml.close("p:sldMaster");
    xml.finish()
}

fn body_level(xml: &mut XmlBuilder, level: usize, size: u32, margin: i64, bullet: &str) {
    let tag = format!("a:lvl{level}pPr");
    let (margin, size) = (margin.to_string(), size.to_string());
    xml.open(&tag, &[("marL", &margin), ("indent", "-342900"), ("algn", "l")]);
    xml.open("a:spcBef", &[]).empty("a:spcPct", &[("val", "20000")]).close("a:spcBef");
    xml.empty("a:buFont", &[("typeface", "Arial")]);
    xml.empty("a:buChar", &[("char", bullet)]);
    xml.open("a:defRPr", &[("sz", &size), ("kern", "1200")]);
    xml.open("a:solidFill", &[]).empty("a:schemeClr", &[("val", "tx1")]).close("a:solidFill");
    xml.empty("a:latin", &[("typeface", "+mn-lt")]);
    xml.close("a:defRPr");
    xml.close(&tag);
}

fn layout_xml(def: &LayoutDef) -> String {
    let mut xml = XmlBuilder::new();
    open_slide_part(
        &mut xml,
        "p:sldLayout",
        &[("type", def.kind), ("preserve", "1")],
        Some(def.name),
    );
    let mut id = 2;
    for p in def.placeholders.iter().chain(footers().iter()) {
        write_placeholder(&mut xml, id, p);
        id += 1;
    }
    xml.close("p:spTree").close("p:cSld");
    xml.open("p:clrMapOvr", &[]).empty("a:masterClrMapping", &[]).close("p:clrMapOvr");
    xml.close("p:sldLayout");
    xml.finish()
}

fn presentation_xml() -> String {
    let (cx, cy) = (DEFAULT_SLIDE_WIDTH.to_string(), DEFAULT_SLIDE_HEIGHT.to_string());
    let mut xml = XmlBuilder::new();
    xml.open(
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P), ("saveSubsetFonts", "1")],
    );
    xml.open("p:sldMasterIdLst", &[])
        .empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])
        .close("p:sldMasterIdLst");
    xml.empty("p:sldSz", &[("cx", &cx), ("cy", &cy), ("type", "screen4x3")]);
    xml.empty("p:notesSz", &[("cx", "6858000"), ("cy", "9144000")]);
    xml.close("p:presentation");
    xml.finish()
}

const PRES_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentationPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#;

const VIEW_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:viewPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:normalViewPr><p:restoredLeft sz="15620"/><p:restoredTop sz="94660"/></p:normalViewPr><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#;

const TABLE_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:tblStyleLst xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" def="{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}"/>"#;

const THEME: &str = include_str!("../assets/theme1.xml");

const CORE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>PowerPoint Presentation</dc:title><cp:revision>1</cp:revision></cp:coreProperties>"#;

const APP: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>Microsoft Office PowerPoint</Application><Slides>0</Slides></Properties>"#;

/// Every part of the default template.
pub fn blank_package() -> Package {
    let layouts = standard_layouts();
    let mut package = Package::default();
    let mut types = ContentTypes::default();
    types.defaults.insert("rels".into(), CT_RELS.into());
    types.defaults.insert("xml".into(), CT_XML.into());
    let mut add = |name: &str, content_type: &str, body: String| {
        types.overrides.insert(name.to_string(), content_type.to_string());
        package.insert(name, body.into_bytes());
    };

    add(PRESENTATION_PART, CT_PRESENTATION, presentation_xml());
    add("ppt/presProps.xml", CT_PRES_PROPS, PRES_PROPS.to_string());
    add("ppt/viewProps.xml", CT_VIEW_PROPS, VIEW_PROPS.to_string());
    add("ppt/tableStyles.xml", CT_TABLE_STYLES, TABLE_STYLES.to_string());
    add(THEME_PART, CT_THEME, THEME.to_string());
    add(MASTER_PART, CT_SLIDE_MASTER, master_xml(layouts.len()));
    add("docProps/core.xml", CT_CORE, CORE.to_string());
    add("docProps/app.xml", CT_EXTENDED, APP.to_string());

    let mut master_rels = Vec::new();
    let mut rels_parts = Vec::new();
    for (i, def) in layouts.iter().enumerate() {
        let part = format!("ppt/slideLayouts/slideLayout{}.xml", i + 1);
        add(&part, CT_SLIDE_LAYOUT, layout_xml(def));
        let layout_rels = [Relationship::new("rId1", "slideMaster", MASTER_PART)];
        rels_parts.push((part.clone(), rels_xml(&part, &layout_rels)));
        master_rels.push(Relationship::new(format!("rId{}", i + 1), "slideLayout", part));
    }
    master_rels.push(Relationship::new(
        format!("rId{}", layouts.len() + 1),
        "theme",
        THEME_PART,
    ));
    rels_parts.push((MASTER_PART.to_string(), rels_xml(MASTER_PART, &master_rels)));

    let pres_rels = [
        Relationship::new("rId1", "slideMaster", MASTER_PART),
        Relationship::new("rId2", "presProps", "ppt/presProps.xml"),
        Relationship::new("rId3", "viewProps", "ppt/viewProps.xml"),
        Relationship::new("rId4", "theme", THEME_PART),
        Relationship::new("rId5", "tableStyles", "ppt/tableStyles.xml"),
    ];
    rels_parts.push((PRESENTATION_PART.to_string(), rels_xml(PRESENTATION_PART, &pres_rels)));
    let root_rels = [
        Relationship::new("rId1", "officeDocument", PRESENTATION_PART),
        Relationship::new("rId2", "core-properties", "docProps/core.xml"),
        Relationship::new("rId3", "extended-properties", "docProps/app.xml"),
    ];

    for (source, body) in rels_parts {
        package.insert(crate::package::rels_part_name(&source), body);
    }
    package.insert(ROOT_RELS_PART, rels_xml("", &root_rels));
    package.insert(CONTENT_TYPES_PART, types.to_xml());
    package
}

/// A presentation with no slides, based on the default template.
pub fn blank_presentation() -> Result<Presentation> {
    PptxReader::new().read_package(&blank_package())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppt_core::shape::PlaceholderType;

    #[test]
    fn test_blank_has_standard_layouts() {
        let pres = blank_presentation().unwrap();
        assert_eq!(pres.slide_width, 9_144_000);
        assert_eq!(pres.slide_height, 6_858_000);
        assert!(pres.slides.is_empty());
        assert_eq!(pres.masters.len(), 1);
        assert_eq!(pres.masters[0].name, "Office Theme");

        let names: Vec<&str> = pres.layouts().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names.len(), 11);
        assert_eq!(names[0], "Title Slide");
        assert_eq!(names[1], "Title and Content");
        assert_eq!(names[6], "Blank");
        assert_eq!(pres.core.title, "PowerPoint Presentation");
    }

    #[test]
    fn test_layout_placeholders_inherit_master_frames() {
        let pres = blank_presentation().unwrap();
        let content = &pres.layouts()[1];
        let title = &content.placeholders[0];
        assert_eq!(title.kind, PlaceholderType::Title);
        assert_eq!(title.frame, TITLE);
        let body = &content.placeholders[1];
        assert_eq!(body.kind, PlaceholderType::Object);
        assert_eq!(body.idx, 1);
        assert_eq!(body.frame, BODY);
        assert!(content.placeholders.iter().any(|p| p.kind == PlaceholderType::Footer));
    }

    #[test]
    fn test_add_slide_skips_footer_placeholders() {
        let mut pres = blank_presentation().unwrap();
        let index = pres.add_slide(0).unwrap();
        let slide = &pres.slides[index];
        assert_eq!(slide.shapes.len(), 2);
        assert!(slide.shapes[0].is_title());
    }

    #[test]
    fn test_retains_template_parts() {
        let pres = blank_presentation().unwrap();
        let parts = &pres.package.parts;
        assert!(parts.contains_key(THEME_PART));
        assert!(parts.contains_key(MASTER_PART));
        assert!(parts.contains_key("ppt/slideLayouts/slideLayout11.xml"));
        assert!(!parts.contains_key(PRESENTATION_PART));
        assert!(!parts.contains_key("docProps/core.xml"));
        assert!(pres
            .package
            .presentation_rels
            .iter()
            .any(|r| r.target == "ppt/presProps.xml"));
    }
}
