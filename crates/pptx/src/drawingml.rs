//! DrawingML pieces shared by slides, tables, and charts: transforms,
//! colors, fills, outlines, effects, and text bodies.

use ppt_core::shape::{Bevel, Fill, Frame, Glow, Line, Reflection, Shadow, ShapeEffects};
use ppt_core::text::{Alignment, AutoSize, Font, Paragraph, Run, TextEffect, TextFrame, VerticalAnchor};
use ppt_core::units::{emu_to_points, points, RgbColor};

use crate::xml::{Element, XmlBuilder};

/// Angles are stored in 60000ths of a degree.
const ANGLE_UNIT: f64 = 60_000.0;
/// Percentages are stored in 1000ths of a percent.
const PERCENT_UNIT: f64 = 100_000.0;

/// Line break inside a paragraph, as `a:br`.
pub const LINE_BREAK: char = '\u{b}';

fn angle(value: f64) -> String {
    ((value * ANGLE_UNIT).round() as i64).to_string()
}

fn percent(value: f64) -> String {
    ((value * PERCENT_UNIT).round() as i64).to_string()
}

fn emu_pt(value: f64) -> String {
    points(value).to_string()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// `a:xfrm` or `p:xfrm`.
pub fn read_xfrm(xfrm: &Element) -> Frame {
    let off = xfrm.child("off");
    let ext = xfrm.child("ext");
    Frame {
        left: off.and_then(|o| o.attr_i64("x")).unwrap_or(0),
        top: off.and_then(|o| o.attr_i64("y")).unwrap_or(0),
        width: ext.and_then(|e| e.attr_i64("cx")).unwrap_or(0),
        height: ext.and_then(|e| e.attr_i64("cy")).unwrap_or(0),
        rotation: xfrm.attr_f64("rot").map(|r| r / ANGLE_UNIT).unwrap_or(0.0),
        flip_h: xfrm.attr_bool("flipH").unwrap_or(false),
        flip_v: xfrm.attr_bool("flipV").unwrap_or(false),
    }
}

/// The `a:srgbClr` color inside a fill element. Theme colors are not resolved.
pub fn read_color(parent: &Element) -> Option<RgbColor> {
    parent
        .child("srgbClr")
        .and_then(|c| c.attr("val"))
        .and_then(RgbColor::from_hex)
}

/// `a:alpha` on a color, as 0.0-1.0.
fn read_alpha(parent: &Element) -> Option<f64> {
    parent
        .child("srgbClr")
        .and_then(|c| c.child("alpha"))
        .and_then(|a| a.attr_f64("val"))
        .map(|v| v / PERCENT_UNIT)
}

/// First fill among the children of `parent` (`spPr`, `bgPr`, `tcPr`).
pub fn read_fill(parent: &Element) -> Option<Fill> {
    for el in parent.elements() {
        match el.local() {
            "noFill" => return Some(Fill::NoFill),
            "solidFill" => {
                let color = read_color(el);
                if color.is_none() {
                    log::debug!("solid fill without an RGB color left to inherit");
                }
                return color.map(Fill::Solid);
            }
            "gradFill" => {
                let stops: Vec<(f64, RgbColor)> = el
                    .child("gsLst")
                    .map(|list| {
                        list.children_named("gs")
                            .filter_map(|gs| {
                                let pos = gs.attr_f64("pos").unwrap_or(0.0) / PERCENT_UNIT;
                                read_color(gs).map(|c| (pos, c))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                if stops.is_empty() {
                    return None;
                }
                let angle = el
                    .child("lin")
                    .and_then(|l| l.attr_f64("ang"))
                    .map(|a| a / ANGLE_UNIT)
                    .unwrap_or(0.0);
                return Some(Fill::Gradient { stops, angle });
            }
            _ => {}
        }
    }
    None
}

pub fn read_line(ln: &Element) -> Line {
    Line {
        color: ln.child("solidFill").and_then(read_color),
        width: ln.attr_i64("w"),
        hidden: ln.child("noFill").is_some(),
    }
}

fn emu_attr_pt(el: &Element, name: &str) -> Option<f64> {
    el.attr_i64(name).map(emu_to_points)
}

/// Effects from `spPr/a:effectLst` and `spPr/a:sp3d`.
pub fn read_effects(sp_pr: &Element) -> ShapeEffects {
    let mut effects = ShapeEffects::default();
    if let Some(list) = sp_pr.child("effectLst") {
        for el in list.elements() {
            match el.local() {
                "outerShdw" => {
                    let defaults = Shadow::default();
                    effects.shadow = Some(Shadow {
                        blur_pt: emu_attr_pt(el, "blurRad").unwrap_or(0.0),
                        distance_pt: emu_attr_pt(el, "dist").unwrap_or(0.0),
                        direction_deg: el.attr_f64("dir").map(|d| d / ANGLE_UNIT).unwrap_or(0.0),
                        color: read_color(el).unwrap_or(defaults.color),
                        alpha: read_alpha(el).unwrap_or(1.0),
                    });
                }
                "reflection" => {
                    effects.reflection = Some(Reflection {
                        blur_pt: emu_attr_pt(el, "blurRad").unwrap_or(0.0),
                        distance_pt: emu_attr_pt(el, "dist").unwrap_or(0.0),
                        start_alpha: el.attr_f64("stA").map(|v| v / PERCENT_UNIT).unwrap_or(1.0),
                        size: el.attr_f64("endPos").map(|v| v / PERCENT_UNIT).unwrap_or(1.0),
                    });
                }
                "glow" => {
                    effects.glow = Some(Glow {
                        radius_pt: emu_attr_pt(el, "rad").unwrap_or(0.0),
                        color: read_color(el).unwrap_or(RgbColor::BLACK),
                        alpha: read_alpha(el).unwrap_or(1.0),
                    });
                }
                "softEdge" => effects.soft_edges = emu_attr_pt(el, "rad"),
                other => log::debug!("effect '{other}' not modeled"),
            }
        }
    }
    if let Some(bevel) = sp_pr.path(&["sp3d", "bevelT"]) {
        effects.bevel = Some(Bevel {
            width_pt: emu_attr_pt(bevel, "w").unwrap_or(6.0),
            height_pt: emu_attr_pt(bevel, "h").unwrap_or(6.0),
        });
    }
    effects
}

/// Run properties (`a:rPr`, `a:defRPr`). Hyperlink ids are resolved by the caller.
pub fn read_font(rpr: &Element) -> Font {
    let mut effects = Vec::new();
    if let Some(ln) = rpr.child("ln") {
        if let Some(color) = ln.child("solidFill").and_then(read_color) {
            effects.push(TextEffect::Outline {
                color,
                width_pt: emu_attr_pt(ln, "w").unwrap_or(0.75),
            });
        }
    }
    if let Some(list) = rpr.child("effectLst") {
        for el in list.elements() {
            match el.local() {
                "outerShdw" => effects.push(TextEffect::Shadow {
                    color: read_color(el).unwrap_or(RgbColor::BLACK),
                    blur_pt: emu_attr_pt(el, "blurRad").unwrap_or(0.0),
                    distance_pt: emu_attr_pt(el, "dist").unwrap_or(0.0),
                    direction_deg: el.attr_f64("dir").map(|d| d / ANGLE_UNIT).unwrap_or(0.0),
                    alpha: read_alpha(el).unwrap_or(1.0),
                }),
                "glow" => effects.push(TextEffect::Glow {
                    color: read_color(el).unwrap_or(RgbColor::BLACK),
                    radius_pt: emu_attr_pt(el, "rad").unwrap_or(0.0),
                    alpha: read_alpha(el).unwrap_or(1.0),
                }),
                _ => {}
            }
        }
    }
    Font {
        name: rpr
            .child("latin")
            .and_then(|l| l.attr("typeface"))
            .map(str::to_string),
        size: rpr.attr_f64("sz").map(|s| s / 100.0),
        bold: rpr.attr_bool("b"),
        italic: rpr.attr_bool("i"),
        underline: rpr.attr("u").map(|u| u != "none"),
        color: rpr.child("solidFill").and_then(read_color),
        effects,
    }
}

/// Text body of a shape or cell. `hyperlink` maps a relationship id to its URL.
pub fn read_text_body(body: &Element, hyperlink: &dyn Fn(&str) -> Option<String>) -> TextFrame {
    let mut frame = TextFrame::default();
    if let Some(body_pr) = body.child("bodyPr") {
        frame.word_wrap = match body_pr.attr("wrap") {
            Some("none") => Some(false),
            Some("square") => Some(true),
            _ => None,
        };
        frame.anchor = body_pr.attr("anchor").and_then(VerticalAnchor::from_ooxml);
        for el in body_pr.elements() {
            match el.local() {
                "noAutofit" => frame.auto_size = Some(AutoSize::None),
                "spAutoFit" => frame.auto_size = Some(AutoSize::ShapeToFitText),
                "normAutofit" => frame.auto_size = Some(AutoSize::TextToFitShape),
                _ => {}
            }
        }
    }

    let paragraphs: Vec<Paragraph> = body
        .children_named("p")
        .map(|p| read_paragraph(p, hyperlink))
        .collect();
    if !paragraphs.is_empty() {
        frame.paragraphs = paragraphs;
    }
    frame
}

fn read_paragraph(p: &Element, hyperlink: &dyn Fn(&str) -> Option<String>) -> Paragraph {
    let mut para = Paragraph::default();
    if let Some(ppr) = p.child("pPr") {
        para.alignment = ppr.attr("algn").and_then(Alignment::from_ooxml);
        para.level = ppr.attr_i64("lvl").unwrap_or(0).clamp(0, 8) as u32;
        para.line_spacing = ppr
            .path(&["lnSpc", "spcPct"])
            .and_then(|s| s.attr_f64("val"))
            .map(|v| v / PERCENT_UNIT);
    }
    for el in p.elements() {
        let text = match el.local() {
            "r" | "fld" => el.child("t").map(Element::text).unwrap_or_default(),
            "br" => LINE_BREAK.to_string(),
            _ => continue,
        };
        let rpr = el.child("rPr");
        para.runs.push(Run {
            text,
            font: rpr.map(read_font).unwrap_or_default(),
            hyperlink: rpr
                .and_then(|r| r.child("hlinkClick"))
                .and_then(|h| h.attr("r:id"))
                .and_then(hyperlink),
        });
    }
    para
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// `a:xfrm` for shapes, or `p:xfrm` for graphic frames.
pub fn write_xfrm(xml: &mut XmlBuilder, tag: &str, frame: &Frame) {
    let mut attrs: Vec<(&str, String)> = Vec::new();
    if frame.rotation != 0.0 {
        attrs.push(("rot", angle(frame.rotation)));
    }
    if frame.flip_h {
        attrs.push(("flipH", "1".to_string()));
    }
    if frame.flip_v {
        attrs.push(("flipV", "1".to_string()));
    }
    let attrs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    xml.open(tag, &attrs);
    xml.empty(
        "a:off",
        &[("x", &frame.left.to_string()), ("y", &frame.top.to_string())],
    );
    xml.empty(
        "a:ext",
        &[("cx", &frame.width.to_string()), ("cy", &frame.height.to_string())],
    );
    xml.close(tag);
}

pub fn write_color(xml: &mut XmlBuilder, color: RgbColor, alpha: Option<f64>) {
    let hex = color.to_hex();
    match alpha {
        Some(alpha) if alpha < 1.0 => {
            xml.open("a:srgbClr", &[("val", &hex)]);
            xml.empty("a:alpha", &[("val", &percent(alpha))]);
            xml.close("a:srgbClr");
        }
        _ => {
            xml.empty("a:srgbClr", &[("val", &hex)]);
        }
    }
}

pub fn write_solid_fill(xml: &mut XmlBuilder, color: RgbColor) {
    xml.open("a:solidFill", &[]);
    write_color(xml, color, None);
    xml.close("a:solidFill");
}

pub fn write_fill(xml: &mut XmlBuilder, fill: &Fill) {
    match fill {
        Fill::NoFill => {
            xml.empty("a:noFill", &[]);
        }
        Fill::Solid(color) => write_solid_fill(xml, *color),
        Fill::Gradient { stops, angle: ang } => {
            xml.open("a:gradFill", &[("rotWithShape", "1")]);
            xml.open("a:gsLst", &[]);
            for (pos, color) in stops {
                xml.open("a:gs", &[("pos", &percent(*pos))]);
                write_color(xml, *color, None);
                xml.close("a:gs");
            }
            xml.close("a:gsLst");
            xml.empty("a:lin", &[("ang", &angle(*ang)), ("scaled", "0")]);
            xml.close("a:gradFill");
        }
    }
}

pub fn write_line(xml: &mut XmlBuilder, line: &Line) {
    let width = line.width.map(|w| w.to_string());
    let attrs: Vec<(&str, &str)> = width.iter().map(|w| ("w", w.as_str())).collect();
    if line.hidden {
        xml.open("a:ln", &attrs).empty("a:noFill", &[]).close("a:ln");
        return;
    }
    match line.color {
        Some(color) => {
            xml.open("a:ln", &attrs);
            write_solid_fill(xml, color);
            xml.close("a:ln");
        }
        None => {
            xml.empty("a:ln", &attrs);
        }
    }
}

pub fn write_effects(xml: &mut XmlBuilder, effects: &ShapeEffects) {
    if effects.has_effect_list() {
        xml.open("a:effectLst", &[]);
        if let Some(glow) = &effects.glow {
            xml.open("a:glow", &[("rad", &emu_pt(glow.radius_pt))]);
            write_color(xml, glow.color, Some(glow.alpha));
            xml.close("a:glow");
        }
        if let Some(shadow) = &effects.shadow {
            xml.open(
                "a:outerShdw",
                &[
                    ("blurRad", &emu_pt(shadow.blur_pt)),
                    ("dist", &emu_pt(shadow.distance_pt)),
                    ("dir", &angle(shadow.direction_deg)),
                    ("algn", "tl"),
                    ("rotWithShape", "0"),
                ],
            );
            write_color(xml, shadow.color, Some(shadow.alpha));
            xml.close("a:outerShdw");
        }
        if let Some(reflection) = &effects.reflection {
            xml.empty(
                "a:reflection",
                &[
                    ("blurRad", &emu_pt(reflection.blur_pt)),
                    ("stA", &percent(reflection.start_alpha)),
                    ("endPos", &percent(reflection.size)),
                    ("dist", &emu_pt(reflection.distance_pt)),
                    ("dir", "5400000"),
                    ("sy", "-100000"),
                    ("algn", "bl"),
                    ("rotWithShape", "0"),
                ],
            );
        }
        if let Some(radius) = effects.soft_edges {
            xml.empty("a:softEdge", &[("rad", &emu_pt(radius))]);
        }
        xml.close("a:effectLst");
    }
    if let Some(bevel) = &effects.bevel {
        xml.open("a:sp3d", &[]);
        xml.empty(
            "a:bevelT",
            &[("w", &emu_pt(bevel.width_pt)), ("h", &emu_pt(bevel.height_pt))],
        );
        xml.close("a:sp3d");
    }
}

/// `a:rPr`. `hyperlink_id` is the relationship id of the run's link, if any.
pub fn write_run_properties(xml: &mut XmlBuilder, tag: &str, font: &Font, hyperlink_id: Option<&str>) {
    let size = font.size.map(|s| ((s * 100.0).round() as i64).to_string());
    let mut attrs: Vec<(&str, &str)> = vec![("lang", "en-US")];
    if let Some(size) = &size {
        attrs.push(("sz", size));
    }
    if let Some(bold) = font.bold {
        attrs.push(("b", if bold { "1" } else { "0" }));
    }
    if let Some(italic) = font.italic {
        attrs.push(("i", if italic { "1" } else { "0" }));
    }
    if let Some(underline) = font.underline {
        attrs.push(("u", if underline { "sng" } else { "none" }));
    }
    attrs.push(("dirty", "0"));

    let outline = font.effects.iter().find_map(|e| match e {
        TextEffect::Outline { color, width_pt } => Some((*color, *width_pt)),
        _ => None,
    });
    let has_list = font
        .effects
        .iter()
        .any(|e| matches!(e, TextEffect::Shadow { .. } | TextEffect::Glow { .. }));
    let has_children =
        outline.is_some() || font.color.is_some() || has_list || font.name.is_some() || hyperlink_id.is_some();
    if !has_children {
        xml.empty(tag, &attrs);
        return;
    }

    xml.open(tag, &attrs);
    if let Some((color, width_pt)) = outline {
        xml.open("a:ln", &[("w", &emu_pt(width_pt))]);
        write_solid_fill(xml, color);
        xml.close("a:ln");
    }
    if let Some(color) = font.color {
        write_solid_fill(xml, color);
    }
    if has_list {
        xml.open("a:effectLst", &[]);
        for effect in &font.effects {
            if let TextEffect::Glow { color, radius_pt, alpha } = effect {
                xml.open("a:glow", &[("rad", &emu_pt(*radius_pt))]);
                write_color(xml, *color, Some(*alpha));
                xml.close("a:glow");
            }
        }
        for effect in &font.effects {
            if let TextEffect::Shadow {
                color,
                blur_pt,
                distance_pt,
                direction_deg,
                alpha,
            } = effect
            {
                xml.open(
                    "a:outerShdw",
                    &[
                        ("blurRad", &emu_pt(*blur_pt)),
                        ("dist", &emu_pt(*distance_pt)),
                        ("dir", &angle(*direction_deg)),
                        ("algn", "tl"),
                        ("rotWithShape", "0"),
                    ],
                );
                write_color(xml, *color, Some(*alpha));
                xml.close("a:outerShdw");
            }
        }
        xml.close("a:effectLst");
    }
    if let Some(name) = &font.name {
        xml.empty("a:latin", &[("typeface", name)]);
    }
    if let Some(id) = hyperlink_id {
        xml.empty("a:hlinkClick", &[("r:id", id)]);
    }
    xml.close(tag);
}

fn write_paragraph(xml: &mut XmlBuilder, para: &Paragraph, hyperlink_id: &mut dyn FnMut(&str) -> String) {
    xml.open("a:p", &[]);
    let level = para.level.to_string();
    let mut ppr: Vec<(&str, &str)> = Vec::new();
    if let Some(alignment) = para.alignment {
        ppr.push(("algn", alignment.as_ooxml()));
    }
    if para.level > 0 {
        ppr.push(("lvl", &level));
    }
    match para.line_spacing {
        Some(spacing) => {
            xml.open("a:pPr", &ppr);
            xml.open("a:lnSpc", &[]);
            xml.empty("a:spcPct", &[("val", &percent(spacing))]);
            xml.close("a:lnSpc");
            xml.close("a:pPr");
        }
        None if !ppr.is_empty() => {
            xml.empty("a:pPr", &ppr);
        }
        None => {}
    }

    for run in &para.runs {
        let link = run.hyperlink.as_deref().map(&mut *hyperlink_id);
        for (i, segment) in run.text.split(LINE_BREAK).enumerate() {
            if i > 0 {
                xml.open("a:br", &[]);
                write_run_properties(xml, "a:rPr", &run.font, None);
                xml.close("a:br");
            }
            if segment.is_empty() && !run.text.is_empty() {
                continue;
            }
            xml.open("a:r", &[]);
            write_run_properties(xml, "a:rPr", &run.font, link.as_deref());
            xml.leaf("a:t", &[], segment);
            xml.close("a:r");
        }
    }

    let end_font = para.runs.last().map(|r| r.font.clone()).unwrap_or_default();
    write_run_properties(xml, "a:endParaRPr", &end_font, None);
    xml.close("a:p");
}

/// A text body. `tag` is `p:txBody` for shapes and `a:txBody` for table cells;
/// `hyperlink_id` registers a link URL and returns its relationship id.
pub fn write_text_body(
    xml: &mut XmlBuilder,
    tag: &str,
    frame: &TextFrame,
    hyperlink_id: &mut dyn FnMut(&str) -> String,
) {
    xml.open(tag, &[]);
    let mut body_pr: Vec<(&str, &str)> = Vec::new();
    match frame.word_wrap {
        Some(true) => body_pr.push(("wrap", "square")),
        Some(false) => body_pr.push(("wrap", "none")),
        None => {}
    }
    body_pr.push(("rtlCol", "0"));
    if let Some(anchor) = frame.anchor {
        body_pr.push(("anchor", anchor.as_ooxml()));
    }
    match frame.auto_size {
        Some(AutoSize::None) => {
            xml.open("a:bodyPr", &body_pr).empty("a:noAutofit", &[]).close("a:bodyPr");
        }
        Some(AutoSize::ShapeToFitText) => {
            xml.open("a:bodyPr", &body_pr).empty("a:spAutoFit", &[]).close("a:bodyPr");
        }
        Some(AutoSize::TextToFitShape) => {
            xml.open("a:bodyPr", &body_pr).empty("a:normAutofit", &[]).close("a:bodyPr");
        }
        None => {
            xml.empty("a:bodyPr", &body_pr);
        }
    }
    xml.empty("a:lstStyle", &[]);
    if frame.paragraphs.is_empty() {
        xml.open("a:p", &[]).close("a:p");
    }
    for para in &frame.paragraphs {
        write_paragraph(xml, para, hyperlink_id);
    }
    xml.close(tag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse;

    fn no_links(_: &str) -> Option<String> {
        None
    }

    fn round_trip(frame: &TextFrame) -> TextFrame {
        let mut xml = XmlBuilder::fragment();
        let mut links = Vec::new();
        write_text_body(&mut xml, "p:txBody", frame, &mut |url: &str| {
            links.push(url.to_string());
            format!("rId{}", links.len())
        });
        let markup = xml.finish();
        let root = parse(&markup).unwrap();
        read_text_body(&root, &|id: &str| {
            id.strip_prefix("rId")
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| links.get(n - 1).cloned())
        })
    }

    #[test]
    fn test_text_body_keeps_formatting() {
        let mut frame = TextFrame::from_text("Heading\nBody text");
        frame.anchor = Some(VerticalAnchor::Middle);
        frame.auto_size = Some(AutoSize::ShapeToFitText);
        frame.word_wrap = Some(true);
        frame.paragraphs[0].alignment = Some(Alignment::Center);
        frame.paragraphs[1].line_spacing = Some(1.3);
        frame.paragraphs[1].level = 2;
        frame.paragraphs[0].runs[0].font = Font {
            name: Some("Segoe UI".into()),
            size: Some(28.0),
            bold: Some(true),
            color: Some(RgbColor::new(0, 120, 215)),
            effects: vec![TextEffect::Glow {
                color: RgbColor::new(0, 176, 240),
                radius_pt: 5.0,
                alpha: 0.6,
            }],
            ..Default::default()
        };
        frame.paragraphs[1].runs[0].hyperlink = Some("https://example.com".into());

        let back = round_trip(&frame);
        assert_eq!(back, frame);
    }

    #[test]
    fn test_line_breaks_become_br() {
        let frame = TextFrame::from_text(&format!("one{LINE_BREAK}two"));
        let mut xml = XmlBuilder::fragment();
        write_text_body(&mut xml, "p:txBody", &frame, &mut |_: &str| String::new());
        let markup = xml.finish();
        assert!(markup.contains("<a:br>"));
        let back = read_text_body(&parse(&markup).unwrap(), &no_links);
        assert_eq!(back.text(), format!("one{LINE_BREAK}two"));
    }

    #[test]
    fn test_fill_and_line_round_trip() {
        let fill = Fill::linear(RgbColor::WHITE, RgbColor::new(40, 40, 40), 45.0);
        let line = Line {
            color: Some(RgbColor::new(1, 2, 3)),
            width: Some(points(2.0)),
            hidden: false,
        };
        let mut xml = XmlBuilder::fragment();
        xml.open("p:spPr", &[]);
        write_fill(&mut xml, &fill);
        write_line(&mut xml, &line);
        xml.close("p:spPr");
        let root = parse(&xml.finish()).unwrap();
        assert_eq!(read_fill(&root), Some(fill));
        assert_eq!(read_line(root.child("ln").unwrap()), line);
    }

    #[test]
    fn test_hidden_line() {
        let mut xml = XmlBuilder::fragment();
        write_line(
            &mut xml,
            &Line {
                hidden: true,
                ..Default::default()
            },
        );
        let markup = xml.finish();
        assert_eq!(markup, "<a:ln><a:noFill/></a:ln>");
        assert!(read_line(&parse(&markup).unwrap()).hidden);
    }

    #[test]
    fn test_effects_round_trip() {
        let effects = ShapeEffects {
            shadow: Some(Shadow::default()),
            glow: Some(Glow {
                radius_pt: 5.0,
                color: RgbColor::new(0, 176, 240),
                alpha: 0.6,
            }),
            soft_edges: Some(8.0),
            bevel: Some(Bevel {
                width_pt: 6.0,
                height_pt: 6.0,
            }),
            ..Default::default()
        };
        let mut xml = XmlBuilder::fragment();
        xml.open("p:spPr", &[]);
        write_effects(&mut xml, &effects);
        xml.close("p:spPr");
        let back = read_effects(&parse(&xml.finish()).unwrap());
        assert_eq!(back, effects);
    }

    #[test]
    fn test_xfrm_round_trip() {
        let frame = Frame {
            rotation: 30.0,
            flip_v: true,
            ..Frame::new(914_400, 457_200, 1_828_800, 914_400)
        };
        let mut xml = XmlBuilder::fragment();
        write_xfrm(&mut xml, "a:xfrm", &frame);
        assert_eq!(read_xfrm(&parse(&xml.finish()).unwrap()), frame);
    }
}
