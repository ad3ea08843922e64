//! Report Export Module
//! Builds the shareable artifacts: a PPTX deck of rendered chart images (two
//! per slide) and a JSON dump of the normalized and simulated tables.
//!
//! The PPTX is assembled as raw ZIP/XML because the available high-level
//! crates still lack image embedding.

use anyhow::Context;
use polars::prelude::*;
use serde::Serialize;
use serde_json::{json, Map as JsMap, Value as JsValue};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use ::zip::write::FileOptions;
use ::zip::ZipWriter;

use crate::data::DataBundle;

/// EMU (English Metric Units) conversion: 914400 EMU = 1 inch
const EMU_PER_INCH: i64 = 914_400;
/// 16:9 slide dimensions (13.33 x 7.5 inches, in EMU)
const SLIDE_WIDTH: i64 = 12_192_000;
const SLIDE_HEIGHT: i64 = 6_858_000;
/// Chart images laid out per slide, side by side
const IMAGES_PER_SLIDE: usize = 2;

/// Context echoed into the JSON export.
#[derive(Serialize)]
pub struct ReportMeta {
    pub source: String,
    pub multiplier: f64,
}

pub struct ReportGenerator;

impl ReportGenerator {
    /// Write a PPTX deck with the given (title, PNG bytes) chart images.
    pub fn generate_pptx(
        images: &[(String, Vec<u8>)],
        output_path: &Path,
        title: &str,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(!images.is_empty(), "no chart images to export");

        let file = File::create(output_path)
            .with_context(|| format!("cannot create {}", output_path.display()))?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default();

        // Side-by-side layout with outer margins and a center gap.
        let margin = EMU_PER_INCH / 2;
        let gap = EMU_PER_INCH / 4;
        let img_width = (SLIDE_WIDTH - 2 * margin - gap) / IMAGES_PER_SLIDE as i64;
        let img_height = SLIDE_HEIGHT - 2 * margin;
        let positions: [(i64, i64); IMAGES_PER_SLIDE] =
            [(margin, margin), (margin + img_width + gap, margin)];

        let slides: Vec<_> = images.chunks(IMAGES_PER_SLIDE).collect();
        let slide_count = slides.len();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml(slide_count).as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::rels_xml().as_bytes())?;

        zip.start_file("ppt/_rels/presentation.xml.rels", options)?;
        zip.write_all(Self::presentation_rels_xml(slide_count).as_bytes())?;

        zip.start_file("ppt/presentation.xml", options)?;
        zip.write_all(Self::presentation_xml(slide_count).as_bytes())?;

        let mut image_idx = 0;
        for (slide_idx, chunk) in slides.iter().enumerate() {
            let slide_num = slide_idx + 1;
            let image_ids: Vec<usize> = (0..chunk.len()).map(|i| image_idx + i + 1).collect();
            image_idx += chunk.len();

            zip.start_file(
                format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
                options,
            )?;
            zip.write_all(Self::slide_rels_xml(&image_ids).as_bytes())?;

            zip.start_file(format!("ppt/slides/slide{}.xml", slide_num), options)?;
            let placements: Vec<(i64, i64, i64, i64)> = (0..chunk.len())
                .map(|i| (positions[i].0, positions[i].1, img_width, img_height))
                .collect();
            zip.write_all(Self::slide_xml(&image_ids, &placements).as_bytes())?;
        }

        zip.start_file("ppt/slideLayouts/slideLayout1.xml", options)?;
        zip.write_all(Self::slide_layout_xml().as_bytes())?;
        zip.start_file("ppt/slideLayouts/_rels/slideLayout1.xml.rels", options)?;
        zip.write_all(Self::layout_rels_xml().as_bytes())?;

        zip.start_file("ppt/slideMasters/slideMaster1.xml", options)?;
        zip.write_all(Self::slide_master_xml().as_bytes())?;
        zip.start_file("ppt/slideMasters/_rels/slideMaster1.xml.rels", options)?;
        zip.write_all(Self::master_rels_xml().as_bytes())?;

        zip.start_file("ppt/theme/theme1.xml", options)?;
        zip.write_all(Self::theme_xml().as_bytes())?;

        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_props_xml(title).as_bytes())?;
        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(Self::app_props_xml(slide_count).as_bytes())?;

        for (idx, (_, png)) in images.iter().enumerate() {
            zip.start_file(format!("ppt/media/image{}.png", idx + 1), options)?;
            zip.write_all(png)?;
        }

        zip.finish()?;
        log::info!(
            "report written to {} ({} slides, {} charts)",
            output_path.display(),
            slide_count,
            images.len()
        );
        Ok(())
    }

    /// Write the normalized bundle, the simulated tables, and the export
    /// context as pretty JSON.
    pub fn export_json(
        bundle: &DataBundle,
        simulated: &DataBundle,
        meta: &ReportMeta,
        output_path: &Path,
    ) -> anyhow::Result<()> {
        let doc = json!({
            "meta": meta,
            "tables": {
                "salary_comparison": frame_records(&bundle.salary_comparison),
                "elderly_correlation": frame_records(&bundle.elderly_correlation),
                "country_benchmark": frame_records(&bundle.country_benchmark),
                "disease_share": frame_records(&bundle.disease_share),
                "projection": frame_records(&bundle.projection),
                "roi": bundle.roi.as_ref().map(frame_records),
                "catastrophic_trend": bundle.catastrophic_trend.as_ref().map(frame_records),
                "pension_trend": bundle.pension_trend.as_ref().map(frame_records),
            },
            "simulated": {
                "projection": frame_records(&simulated.projection),
                "roi": simulated.roi.as_ref().map(frame_records),
            },
        });

        let file = File::create(output_path)
            .with_context(|| format!("cannot create {}", output_path.display()))?;
        serde_json::to_writer_pretty(file, &doc)?;
        Ok(())
    }

    fn content_types_xml(slide_count: usize) -> String {
        let mut overrides = String::new();
        for i in 1..=slide_count {
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                i
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>{}</Types>"#,
            overrides
        )
    }

    fn rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    }

    fn presentation_rels_xml(slide_count: usize) -> String {
        let mut rels = String::from(
            r#"<Relationship Id="rIdMaster" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
        );
        for i in 1..=slide_count {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdSlide{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                i, i
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        )
    }

    fn presentation_xml(slide_count: usize) -> String {
        let mut slide_ids = String::new();
        for i in 1..=slide_count {
            slide_ids.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rIdSlide{}"/>"#,
                255 + i,
                i
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rIdMaster"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/></p:presentation>"#,
            slide_ids, SLIDE_WIDTH, SLIDE_HEIGHT, SLIDE_HEIGHT, SLIDE_WIDTH
        )
    }

    fn slide_rels_xml(image_ids: &[usize]) -> String {
        let mut rels = String::from(
            r#"<Relationship Id="rIdLayout" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#,
        );
        for id in image_ids {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdImg{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image{}.png"/>"#,
                id, id
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        )
    }

    fn slide_xml(image_ids: &[usize], placements: &[(i64, i64, i64, i64)]) -> String {
        let mut pictures = String::new();
        for (idx, (id, (x, y, w, h))) in image_ids.iter().zip(placements).enumerate() {
            pictures.push_str(&format!(
                r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Chart {}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rIdImg{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
                idx + 2,
                id,
                id,
                x,
                y,
                w,
                h
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>{}</p:spTree></p:cSld><p:clrMapOvr><a:overrideClrMapping bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:clrMapOvr></p:sld>"#,
            pictures
        )
    }

    fn slide_layout_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    }

    fn layout_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#
    }

    fn slide_master_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    }

    fn master_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#
    }

    fn theme_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Fiscalens"><a:themeElements><a:clrScheme name="Fiscalens"><a:dk1><a:srgbClr val="121212"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="2E2E2E"/></a:dk2><a:lt2><a:srgbClr val="EEEEEE"/></a:lt2><a:accent1><a:srgbClr val="FF0055"/></a:accent1><a:accent2><a:srgbClr val="00FF9F"/></a:accent2><a:accent3><a:srgbClr val="4A90E2"/></a:accent3><a:accent4><a:srgbClr val="FF7096"/></a:accent4><a:accent5><a:srgbClr val="FF9EB5"/></a:accent5><a:accent6><a:srgbClr val="FF4079"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Fiscalens"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#
    }

    fn core_props_xml(title: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>Fiscalens</dc:creator></cp:coreProperties>"#,
            xml_escape(title)
        )
    }

    fn app_props_xml(slide_count: usize) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>Fiscalens</Application><Slides>{}</Slides></Properties>"#,
            slide_count
        )
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// One JSON object per row, column name to value.
fn frame_records(df: &DataFrame) -> Vec<JsValue> {
    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let mut record = JsMap::new();
        for column in df.get_columns() {
            let value = match column.get(i) {
                Ok(av) => value_json(&av),
                Err(_) => JsValue::Null,
            };
            record.insert(column.name().to_string(), value);
        }
        records.push(JsValue::Object(record));
    }
    records
}

fn value_json(av: &AnyValue) -> JsValue {
    match av {
        AnyValue::Null => JsValue::Null,
        AnyValue::Boolean(v) => json!(v),
        AnyValue::Int8(v) => json!(v),
        AnyValue::Int16(v) => json!(v),
        AnyValue::Int32(v) => json!(v),
        AnyValue::Int64(v) => json!(v),
        AnyValue::UInt8(v) => json!(v),
        AnyValue::UInt16(v) => json!(v),
        AnyValue::UInt32(v) => json!(v),
        AnyValue::UInt64(v) => json!(v),
        AnyValue::Float32(v) => json!(v),
        AnyValue::Float64(v) => json!(v),
        AnyValue::String(v) => json!(v),
        AnyValue::StringOwned(v) => json!(v.as_str()),
        other => json!(other.to_string().trim_matches('"')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil;

    #[test]
    fn pptx_contains_expected_parts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laporan.pptx");
        let images = vec![
            ("Chart A".to_string(), vec![0u8; 16]),
            ("Chart B".to_string(), vec![1u8; 16]),
            ("Chart C".to_string(), vec![2u8; 16]),
        ];

        ReportGenerator::generate_pptx(&images, &path, "Laporan Fiskal").unwrap();

        let file = File::open(&path).unwrap();
        let mut archive = ::zip::ZipArchive::new(file).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();

        // Three images at two per slide means two slides.
        assert!(names.contains(&"ppt/slides/slide1.xml".to_string()));
        assert!(names.contains(&"ppt/slides/slide2.xml".to_string()));
        assert!(!names.contains(&"ppt/slides/slide3.xml".to_string()));
        assert!(names.contains(&"ppt/media/image3.png".to_string()));
        assert!(names.contains(&"[Content_Types].xml".to_string()));
    }

    #[test]
    fn empty_image_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laporan.pptx");
        assert!(ReportGenerator::generate_pptx(&[], &path, "Laporan").is_err());
    }

    #[test]
    fn json_export_round_trips_tables_and_meta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let bundle = testutil::bundle();
        let simulated = crate::data::apply_simulation(&bundle, 2.0).unwrap();
        let meta = ReportMeta {
            source: "Data Visualisasi UAS.xlsx".to_string(),
            multiplier: 2.0,
        };

        ReportGenerator::export_json(&bundle, &simulated, &meta, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let doc: JsValue = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["meta"]["multiplier"], json!(2.0));
        assert_eq!(doc["tables"]["projection"].as_array().unwrap().len(), 5);

        // Scaled projection rows: the 2023 row is historical, 2024 onward x2.
        let simulated_rows = doc["simulated"]["projection"].as_array().unwrap();
        assert_eq!(simulated_rows[0]["Proyeksi Gaji DPR (Juta)"], json!(500.0));
        assert_eq!(simulated_rows[1]["Proyeksi Gaji DPR (Juta)"], json!(1600.0));
    }

    #[test]
    fn unavailable_tables_export_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut bundle = testutil::bundle();
        bundle.roi = None;
        let simulated = crate::data::apply_simulation(&bundle, 1.0).unwrap();
        let meta = ReportMeta {
            source: "test.xlsx".to_string(),
            multiplier: 1.0,
        };

        ReportGenerator::export_json(&bundle, &simulated, &meta, &path).unwrap();

        let doc: JsValue =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(doc["tables"]["roi"].is_null());
        assert!(doc["simulated"]["roi"].is_null());
    }
}
