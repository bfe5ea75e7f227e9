//! PPTX (Office Open XML) package reader and writer.
//!
//! A `.pptx` file is a ZIP archive of XML parts. Slides, charts and document
//! properties are parsed into the `ppt-core` model; template parts such as
//! the theme, masters and layouts are carried through unchanged.

pub mod blank;
pub mod chart_part;
pub mod drawingml;
pub mod info;
pub mod package;
pub mod reader;
pub mod writer;
pub mod xml;

pub use blank::blank_presentation;
pub use info::{template_info, TemplateInfo};
pub use reader::PptxReader;
pub use writer::PptxWriter;

use ppt_core::{Presentation, Result};
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

/// A new presentation based on the built-in default template.
pub fn new_presentation() -> Result<Presentation> {
    blank_presentation()
}

/// Open a `.pptx` or `.potx` file.
pub fn open(path: &Path) -> Result<Presentation> {
    let file = File::open(path)?;
    log::debug!("opening {}", path.display());
    PptxReader::new().read(file)
}

pub fn read_from<R: Read + Seek>(reader: R) -> Result<Presentation> {
    PptxReader::new().read(reader)
}

/// Save as `.pptx`, replacing any existing file.
pub fn save(presentation: &Presentation, path: &Path) -> Result<()> {
    // Serialize fully before touching the destination.
    let bytes = to_bytes(presentation)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    log::debug!("saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

pub fn write_to<W: Write + Seek>(presentation: &Presentation, writer: W) -> Result<()> {
    PptxWriter::new().write(presentation, writer)
}

pub fn to_bytes(presentation: &Presentation) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_to(presentation, &mut cursor)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;
    use ppt_core::chart::{Chart, ChartType, Series};
    use ppt_core::shape::{ConnectorKind, Fill, Frame, ImageFormat, Line, Picture, ShapeKind};
    use ppt_core::slide::{Transition, TransitionKind, TransitionSpeed};
    use ppt_core::table::Table;
    use ppt_core::text::Run;
    use ppt_core::RgbColor;

    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
        0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0xF8, 0xCF, 0xC0, 0xF0,
        0x1F, 0x00, 0x05, 0x00, 0x01, 0xFF, 0x89, 0x99, 0x3D, 0x1D, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45,
        0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn round_trip(pres: &Presentation) -> Presentation {
        let bytes = to_bytes(pres).unwrap();
        read_from(Cursor::new(bytes)).unwrap()
    }

    /// Save, rewrite one part's markup, and read the package back.
    fn edit_part(pres: &Presentation, part: &str, edit: impl FnOnce(String) -> String) -> Presentation {
        let mut package = Package::from_reader(Cursor::new(to_bytes(pres).unwrap())).unwrap();
        let markup = String::from_utf8(package.get(part).unwrap().to_vec()).unwrap();
        package.insert(part, edit(markup));
        let mut bytes = Cursor::new(Vec::new());
        package.write_to(&mut bytes).unwrap();
        read_from(Cursor::new(bytes.into_inner())).unwrap()
    }

    fn saved_package(pres: &Presentation) -> Package {
        Package::from_reader(Cursor::new(to_bytes(pres).unwrap())).unwrap()
    }

    #[test]
    fn test_empty_presentation_round_trip() {
        let pres = new_presentation().unwrap();
        let back = round_trip(&pres);
        assert_eq!(back.masters, pres.masters);
        assert!(back.slides.is_empty());
        assert_eq!(back.package.parts, pres.package.parts);
    }

    #[test]
    fn test_slide_content_round_trip() {
        let mut pres = new_presentation().unwrap();
        let index = pres.add_slide(1).unwrap();
        let slide = &mut pres.slides[index];
        slide.title_mut().unwrap().text.as_mut().unwrap().set_text("Results");
        slide.background = Some(Fill::Solid(RgbColor::new(240, 240, 240)));
        slide.transition = Some(Transition::new(TransitionKind::Push, 1500));

        let shape = slide.add_shape(
            "Rounded Rectangle",
            Frame::new(914_400, 914_400, 1_828_800, 914_400),
            ShapeKind::AutoShape {
                preset: "roundRect".into(),
            },
        );
        shape.fill = Some(Fill::Solid(RgbColor::new(0, 120, 215)));
        shape.line = Some(Line {
            color: Some(RgbColor::new(0, 0, 0)),
            width: Some(25_400),
            hidden: false,
        });
        let text = shape.text.as_mut().unwrap();
        text.set_text("Click me");
        let mut link = Run::new(" docs");
        link.hyperlink = Some("https://example.com/docs".into());
        text.paragraphs[0].runs.push(link);

        let mut table = Table::new(2, 2, 3_657_600, 740_000);
        table.cell_mut(0, 0).unwrap().text.set_text("Region");
        table.cell_mut(1, 1).unwrap().text.set_text("42");
        table.cell_mut(0, 1).unwrap().fill = Some(RgbColor::new(255, 192, 0));
        slide.add_shape("Table", Frame::new(0, 0, 3_657_600, 740_000), ShapeKind::Table(table));

        let chart = Chart::new(
            ChartType::Column,
            vec!["A".into(), "B".into()],
            vec![Series::new("Sales", vec![3.0, 7.5])],
        )
        .unwrap();
        slide.add_shape(
            "Chart",
            Frame::new(0, 1_000_000, 4_000_000, 3_000_000),
            ShapeKind::Chart(Box::new(chart.clone())),
        );
        slide.add_shape(
            "Connector",
            Frame::from_endpoints(0, 0, 914_400, 457_200),
            ShapeKind::Connector(ConnectorKind::Elbow),
        );
        let mut picture = Picture::new(PNG_1X1.to_vec(), ImageFormat::Png);
        picture.transparency = Some(0.25);
        slide.add_shape("Picture", Frame::new(10, 20, 30, 40), ShapeKind::Picture(picture));

        let back = round_trip(&pres);
        assert_eq!(back.slides.len(), 1);
        let original = &pres.slides[0];
        let slide = &back.slides[0];
        assert_eq!(slide.shapes.len(), original.shapes.len());
        assert_eq!(slide.title_text().as_deref(), Some("Results"));
        assert_eq!(slide.background, original.background);
        let transition = slide.transition.unwrap();
        assert_eq!(transition.kind, TransitionKind::Push);
        assert_eq!(transition.speed, TransitionSpeed::Slow);

        let shape = &slide.shapes[2];
        assert_eq!(shape.kind, original.shapes[2].kind);
        assert_eq!(shape.fill, original.shapes[2].fill);
        assert_eq!(shape.text(), "Click me docs");
        let runs = &shape.text.as_ref().unwrap().paragraphs[0].runs;
        assert_eq!(runs[1].hyperlink.as_deref(), Some("https://example.com/docs"));

        let table = slide.shapes[3].table().unwrap();
        assert_eq!(table.texts(), vec![vec!["Region", ""], vec!["", "42"]]);
        assert_eq!(table.rows[0].cells[1].fill, Some(RgbColor::new(255, 192, 0)));

        assert_eq!(slide.shapes[4].chart(), Some(&chart));
        assert_eq!(slide.shapes[5].kind, ShapeKind::Connector(ConnectorKind::Elbow));
        assert_eq!(slide.shapes[5].frame, original.shapes[5].frame);
        match &slide.shapes[6].kind {
            ShapeKind::Picture(picture) => {
                assert_eq!(picture.data, PNG_1X1);
                assert_eq!(picture.transparency, Some(0.25));
            }
            other => panic!("expected picture, got {other:?}"),
        }
    }

    #[test]
    fn test_second_round_trip_is_stable() {
        let mut pres = new_presentation().unwrap();
        for layout in [0, 1, 5] {
            pres.add_slide(layout).unwrap();
        }
        let once = round_trip(&pres);
        let twice = round_trip(&once);
        assert_eq!(once.slides, twice.slides);
        assert_eq!(
            to_bytes(&once).unwrap().len(),
            to_bytes(&twice).unwrap().len()
        );
    }

    #[test]
    fn test_save_and_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        let mut pres = new_presentation().unwrap();
        pres.add_slide(0).unwrap();
        pres.core.author = "Analyst".into();
        save(&pres, &path).unwrap();

        let opened = open(&path).unwrap();
        assert_eq!(opened.slides.len(), 1);
        assert_eq!(opened.core.author, "Analyst");
        assert_eq!(opened.layouts().len(), 11);
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.pptx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(open(&path).is_err());
    }

    #[test]
    fn test_group_shape_survives_round_trip() {
        let mut pres = new_presentation().unwrap();
        pres.add_slide(1).unwrap();
        let slide = &mut pres.slides[0];
        slide.add_shape(
            "Logo",
            Frame::new(10, 20, 30, 40),
            ShapeKind::Picture(Picture::new(PNG_1X1.to_vec(), ImageFormat::Png)),
        );
        let count = slide.shapes.len();

        let grouped = edit_part(&pres, "ppt/slides/slide1.xml", |xml| {
            let start = xml.find("<p:pic>").unwrap();
            let end = xml.find("</p:pic>").unwrap() + "</p:pic>".len();
            format!(
                "{}<p:grpSp><p:nvGrpSpPr><p:cNvPr id=\"50\" name=\"Logo Group\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
                 <p:grpSpPr><a:xfrm><a:off x=\"10\" y=\"20\"/><a:ext cx=\"30\" cy=\"40\"/>\
                 <a:chOff x=\"10\" y=\"20\"/><a:chExt cx=\"30\" cy=\"40\"/></a:xfrm></p:grpSpPr>{}</p:grpSp>{}",
                &xml[..start],
                &xml[start..end],
                &xml[end..]
            )
        });
        let slide = &grouped.slides[0];
        assert_eq!(slide.shapes.len(), count);
        let group = &slide.shapes[count - 1];
        assert_eq!(group.kind.type_name(), "GROUP");
        assert_eq!(group.name, "Logo Group");
        assert_eq!(group.frame, Frame::new(10, 20, 30, 40));
        assert!(slide.next_shape_id() > 50);

        let again = round_trip(&grouped);
        assert_eq!(again.slides[0].shapes[count - 1].kind.type_name(), "GROUP");

        let package = saved_package(&again);
        let slide_xml = String::from_utf8(package.get("ppt/slides/slide1.xml").unwrap().to_vec()).unwrap();
        assert!(slide_xml.contains("<p:grpSp>"));
        let image = package
            .relationships("ppt/slides/slide1.xml")
            .unwrap()
            .into_iter()
            .find(|r| r.kind() == "image")
            .unwrap();
        assert!(slide_xml.contains(&format!("r:embed=\"{}\"", image.id)));
        assert_eq!(package.get(&image.target), Some(PNG_1X1));
    }

    #[test]
    fn test_speaker_notes_survive_round_trip() {
        let mut pres = new_presentation().unwrap();
        pres.add_slide(0).unwrap();
        let mut package = saved_package(&pres);
        package.insert(
            "ppt/notesSlides/notesSlide1.xml",
            "<p:notes xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:t>Mention the Q3 dip</a:t></a:r></a:p>\
             </p:txBody></p:sp></p:spTree></p:cSld></p:notes>",
        );
        package.insert(
            "ppt/notesSlides/_rels/notesSlide1.xml.rels",
            format!(
                "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
                 <Relationship Id=\"rId2\" Type=\"{}\" Target=\"../slides/slide1.xml\"/></Relationships>",
                crate::package::rel_type("slide")
            ),
        );
        let rels_part = "ppt/slides/_rels/slide1.xml.rels";
        let rels = String::from_utf8(package.get(rels_part).unwrap().to_vec()).unwrap();
        let notes_rel = format!(
            "<Relationship Id=\"rId99\" Type=\"{}\" Target=\"../notesSlides/notesSlide1.xml\"/></Relationships>",
            crate::package::rel_type("notesSlide")
        );
        package.insert(rels_part, rels.replace("</Relationships>", &notes_rel));
        let mut bytes = Cursor::new(Vec::new());
        package.write_to(&mut bytes).unwrap();
        let with_notes = read_from(Cursor::new(bytes.into_inner())).unwrap();

        let notes = with_notes.slides[0].notes.as_ref().unwrap();
        assert!(notes.xml.contains("Mention the Q3 dip"));

        let again = round_trip(&with_notes);
        assert_eq!(again.slides[0].notes.as_ref().unwrap().xml, notes.xml);
        let saved = saved_package(&again);
        let notes_part = saved
            .relationships("ppt/slides/slide1.xml")
            .unwrap()
            .into_iter()
            .find(|r| r.kind() == "notesSlide")
            .unwrap()
            .target;
        let back_link = saved.relationships(&notes_part).unwrap();
        assert_eq!(back_link.len(), 1);
        assert_eq!(back_link[0].id, "rId2");
        assert_eq!(back_link[0].target, "ppt/slides/slide1.xml");
        assert_eq!(
            saved.content_types().unwrap().overrides.get(&notes_part).map(String::as_str),
            Some(crate::package::CT_NOTES_SLIDE)
        );
    }

    #[test]
    fn test_unreadable_chart_is_kept_as_markup() {
        let mut pres = new_presentation().unwrap();
        pres.add_slide(6).unwrap();
        let chart = Chart::new(
            ChartType::Pie,
            vec!["A".into(), "B".into()],
            vec![Series::new("Share", vec![1.0, 2.0])],
        )
        .unwrap();
        pres.slides[0].add_shape(
            "Chart",
            Frame::new(0, 0, 4_000_000, 3_000_000),
            ShapeKind::Chart(Box::new(chart)),
        );
        let count = pres.slides[0].shapes.len();

        let broken = edit_part(&pres, "ppt/charts/chart1.xml", |xml| {
            xml.replacen("<c:ptCount val=\"2\"/>", "<c:ptCount val=\"4000000000000000000\"/>", 1)
        });
        let shape = &broken.slides[0].shapes[count - 1];
        assert_eq!(shape.kind.type_name(), "GRAPHIC_FRAME");
        assert!(shape.chart().is_none());

        let saved = saved_package(&broken);
        let chart_rel = saved
            .relationships("ppt/slides/slide1.xml")
            .unwrap()
            .into_iter()
            .find(|r| r.kind() == "chart")
            .unwrap();
        let chart_xml = String::from_utf8(saved.get(&chart_rel.target).unwrap().to_vec()).unwrap();
        assert!(chart_xml.contains("4000000000000000000"));
    }

    #[test]
    fn test_control_characters_do_not_reach_the_package() {
        let mut pres = new_presentation().unwrap();
        pres.add_slide(0).unwrap();
        pres.slides[0]
            .title_mut()
            .unwrap()
            .text
            .as_mut()
            .unwrap()
            .set_text("Q1\u{1}\u{8}Results");
        let back = round_trip(&pres);
        assert_eq!(back.slides[0].title_text().as_deref(), Some("Q1Results"));
    }
}
