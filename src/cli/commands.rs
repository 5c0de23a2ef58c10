use crate::archive::{ArchiveExtractor, ExtractionOutcome};
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::heatmap::{HeatmapRenderer, RenderOptions};
use crate::processors::{append_corrected_column, MergePipeline};
use crate::readers::{SampleReader, TableReader};
use crate::utils::constants::{ARCHIVE_DIR, ARCHIVE_FILE};
use crate::utils::dates::{date_range, parse_date};
use crate::utils::progress::ProgressReporter;
use crate::utils::Settings;
use crate::writers::DatasetWriter;
use tracing::{debug, info, warn};

pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("Settings: {:?}", settings);

    match cli.command {
        Commands::Merge {
            data_dir,
            archive,
            output_dir,
            start,
            end,
            max_workers,
            no_progress,
        } => {
            let start = parse_date(start.as_deref().unwrap_or(&settings.start_date))?;
            let end = parse_date(end.as_deref().unwrap_or(&settings.end_date))?;
            let data_root = data_dir.join(ARCHIVE_DIR);
            let archive = archive.unwrap_or_else(|| data_dir.join(ARCHIVE_FILE));

            println!("Merging station data...");
            println!("Data directory: {}", data_root.display());
            println!("Output directory: {}", output_dir.display());
            println!("Dates: {} .. {} (exclusive), workers: {}", start, end, max_workers);

            if archive.is_file() {
                match ArchiveExtractor::new(&archive, &data_dir).extract_if_missing(&data_root)? {
                    ExtractionOutcome::AlreadyExtracted(_) => {}
                    ExtractionOutcome::Extracted { files, .. } => {
                        println!("Extracted {} files from {}", files, archive.display())
                    }
                }
            } else if !data_root.is_dir() {
                warn!(
                    "Neither {} nor {} exists",
                    archive.display(),
                    data_root.display()
                );
            }

            let days = date_range(start, end).len() as u64;
            let progress = ProgressReporter::new(days, "Merging daily readings...", no_progress);

            let pipeline =
                MergePipeline::new(&data_root, &output_dir, start, end).with_max_workers(max_workers);
            let summary = pipeline.run(Some(&progress))?;

            println!("\n{}", summary.summary());
        }

        Commands::Correct {
            input,
            output,
            pm25_column,
            humidity_column,
            output_column,
        } => {
            println!("Correcting {} from {}", pm25_column, input.display());

            let readings = TableReader::new().read_table(&input)?;
            let (corrected, filled) =
                append_corrected_column(readings, &pm25_column, &humidity_column, &output_column)?;
            DatasetWriter::with_index(false).write_frame(&corrected, &output)?;

            let rows = corrected.height();
            if filled < rows {
                warn!(
                    "{} of {} rows lacked a numeric {} or {}",
                    rows - filled,
                    rows,
                    pm25_column,
                    humidity_column
                );
            }
            info!("Corrected {} rows into '{}'", filled, output_column);
            println!("Wrote {} rows to {}", rows, output.display());
        }

        Commands::Render {
            input,
            output,
            variant,
            value_column,
            latitude_column,
            longitude_column,
            caption,
            attributes,
            resolution,
            sigma,
        } => {
            println!("Rendering {:?} heatmap of {}", variant, value_column);

            let samples = SampleReader::new(&value_column)
                .with_coordinate_columns(&longitude_column, &latitude_column)
                .with_attribute_columns(attributes)
                .read_samples(&input)?;
            info!("Read {} samples from {}", samples.len(), input.display());

            let mut options = RenderOptions::for_variant(variant, &settings)
                .with_caption(caption.as_deref().unwrap_or(&value_column));
            if let Some(resolution) = resolution {
                options = options.with_resolution(resolution);
            }
            if let Some(sigma) = sigma {
                options = options.with_sigma(sigma);
            }

            let progress = ProgressReporter::new_spinner("Rendering heatmap...", false);
            let rendered =
                HeatmapRenderer::new(options).render_to_file(samples, &output, Some(&progress))?;

            println!("Map written to {}", output.display());
            println!("{}", rendered.summary());
        }
    }

    Ok(())
}
