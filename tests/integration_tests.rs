use airq_processor::archive::{ArchiveExtractor, ExtractionOutcome};
use airq_processor::heatmap::{HeatmapRenderer, HeatmapVariant, RenderOptions};
use airq_processor::processors::{append_corrected_column, MergePipeline};
use airq_processor::readers::{SampleReader, TableReader};
use airq_processor::utils::frames::column_names;
use airq_processor::utils::{parse_date, Settings, ARCHIVE_DIR, ARCHIVE_FILE};
use airq_processor::Result;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const INDEX: &str = "Slug,latitude,longitude,name\n\
    a,46.80,-71.20,Limoilou\n\
    b,46.84,-71.25,Vanier\n\
    c,46.78,-71.28,Sainte-Foy\n\
    d,46.83,-71.18,Maizerets\n";

fn readings(day: &str, values: &[(f64, f64)], license: bool) -> String {
    let mut body = String::new();
    if license {
        body.push_str("Data licensed under ODbL\n");
    }
    body.push_str("Date (UTC),PM2.5,Humidity\n");
    for (i, (pm25, humidity)) in values.iter().enumerate() {
        body.push_str(&format!("{} 0{}:00:00,{},{}\n", day, i, pm25, humidity));
    }
    body
}

fn build_archive(dir: &Path) -> Result<()> {
    let file = std::fs::File::create(dir.join(ARCHIVE_FILE))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    let days: [(&str, usize); 2] = [("2022-05-01", 2), ("2022-05-02", 1)];
    for (day, count) in days {
        zip.start_file(format!("{}/{}/index.csv", ARCHIVE_DIR, day), options)?;
        zip.write_all(INDEX.as_bytes())?;

        for (n, slug) in ["a", "b", "c", "d", "zz"].iter().enumerate() {
            let values: Vec<(f64, f64)> = (0..count)
                .map(|i| (9.0 + n as f64 * 1.5 + i as f64, 40.0 + n as f64))
                .collect();
            // Station "c" dropped its licence line on the second day
            let license = !(day == "2022-05-02" && *slug == "c");
            zip.start_file(format!("{}/{}/{}_{}.csv", ARCHIVE_DIR, day, day, slug), options)?;
            zip.write_all(readings(day, &values, license).as_bytes())?;
        }
    }

    zip.finish()?;
    Ok(())
}

// Data lines with the leading row index removed
fn rows_without_index(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .skip(1)
        .map(|line| line.split_once(',').map(|(_, rest)| rest).unwrap_or(line).to_string())
        .collect())
}

#[test]
fn test_merge_correct_and_render() -> Result<()> {
    let data = TempDir::new()?;
    let out = TempDir::new()?;
    build_archive(data.path())?;

    // Extraction
    let root = data.path().join(ARCHIVE_DIR);
    let extractor = ArchiveExtractor::new(&data.path().join(ARCHIVE_FILE), data.path());
    assert!(matches!(
        extractor.extract_if_missing(&root)?,
        ExtractionOutcome::Extracted { files: 12, .. }
    ));
    assert!(matches!(
        extractor.extract_if_missing(&root)?,
        ExtractionOutcome::AlreadyExtracted(_)
    ));

    // Merge
    let pipeline = MergePipeline::new(
        &root,
        out.path(),
        parse_date("2022-05-01")?,
        parse_date("2022-05-03")?,
    )
    .with_max_workers(2);
    let summary = pipeline.run(None)?;
    assert_eq!(summary.stations, 4);
    assert_eq!(summary.full_rows, 12);
    assert_eq!(summary.days[0].rows, 8);
    assert_eq!(summary.days[1].rows, 4);

    let all_path = out.path().join("all.csv");
    let header = std::fs::read_to_string(&all_path)?
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();
    assert_eq!(
        header,
        ",Date (UTC),PM2.5,Humidity,Date,Slug,latitude,longitude,name"
    );
    let all = TableReader::new().read_table(&all_path)?;
    assert_eq!(all.height(), 12);
    assert!(all
        .column("Slug")?
        .str()?
        .into_iter()
        .all(|s| s.is_some_and(|s| s != "zz")));

    // Every full-dataset row appears in its day's file
    let mut daily_rows: HashSet<String> = HashSet::new();
    for day in ["2022-05-01", "2022-05-02"] {
        let path = out.path().join("par_date").join(format!("{}.csv", day));
        daily_rows.extend(rows_without_index(&path)?);
    }
    for row in rows_without_index(&all_path)? {
        assert!(daily_rows.contains(&row), "missing from daily output: {:?}", row);
    }

    // Correction
    let (corrected, filled) =
        append_corrected_column(all, "PM2.5", "Humidity", "PM2.5 corrected")?;
    assert_eq!(filled, 12);
    assert_eq!(column_names(&corrected).last().map(String::as_str), Some("PM2.5 corrected"));
    let first = corrected
        .column("PM2.5 corrected")?
        .f64()?
        .get(0)
        .unwrap_or(f64::NAN);
    assert!((first - (0.524 * 9.0 - 0.0862 * 40.0 + 5.75)).abs() < 1e-9);

    // Render
    let samples = SampleReader::new("PM2.5")
        .with_attribute_columns(vec!["name".to_string()])
        .read_samples(&all_path)?;
    assert_eq!(samples.len(), 12);

    let map_path = out.path().join("map.html");
    let options = RenderOptions::for_variant(HeatmapVariant::Contour, &Settings::default())
        .with_resolution(30)
        .with_sigma(1.0);
    let rendered = HeatmapRenderer::new(options).render_to_file(samples, &map_path, None)?;
    assert_eq!(rendered.samples, 12);
    assert!(rendered.bands > 0);

    let html = std::fs::read_to_string(&map_path)?;
    assert!(html.contains("MultiPolygon"));
    assert!(html.contains("cartodbpositron"));
    Ok(())
}

#[test]
fn test_points_render_from_csv() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("points.csv");
    std::fs::write(
        &input,
        "latitude,longitude,PM2.5,name\n\
         46.80,-71.20,10,a\n\
         46.84,-71.25,12,b\n\
         46.78,-71.28,,c\n\
         46.83,-71.18,14,d\n\
         46.81,-71.23,11,e\n\
         46.79,-71.21,90,f\n",
    )?;

    let samples = SampleReader::new("PM2.5")
        .with_attribute_columns(vec!["name".to_string()])
        .read_samples(&input)?;
    let options = RenderOptions::points(&Settings::default())
        .with_resolution(25)
        .with_sigma(0.5);
    let rendered = HeatmapRenderer::new(options).render(samples, None)?;

    // The empty value and the outlier are both gone
    assert_eq!(rendered.samples, 4);
    assert_eq!(rendered.scale, (10.0, 14.0));
    assert!(rendered.html.contains("\"layer_control\":true"));
    Ok(())
}
