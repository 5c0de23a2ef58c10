use crate::heatmap::HeatmapVariant;
use crate::utils::constants::{
    CORRECTED_COLUMN, DEFAULT_MAP_FILE, HUMIDITY_COLUMN, LATITUDE_COLUMN,
    LONGITUDE_COLUMN, PM25_COLUMN,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "airq-processor")]
#[command(about = "Air-quality sensor data merger, PM2.5 corrector and heatmap renderer")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "TOML settings file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge daily station exports into per-day and full CSV datasets
    Merge {
        #[arg(
            short,
            long,
            default_value = ".",
            help = "Directory holding the station archive or its extracted folder"
        )]
        data_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Station archive zip [default: <data-dir>/archive-stations-limoilair.zip]"
        )]
        archive: Option<PathBuf>,

        #[arg(short, long, default_value = ".", help = "Output directory")]
        output_dir: PathBuf,

        #[arg(long, help = "First date, YYYY-MM-DD [default: from settings]")]
        start: Option<String>,

        #[arg(long, help = "Date after the last one, YYYY-MM-DD [default: from settings]")]
        end: Option<String>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, default_value = "false")]
        no_progress: bool,
    },

    /// Append a humidity-corrected PM2.5 column to a CSV
    Correct {
        #[arg(short, long, help = "Input CSV file")]
        input: PathBuf,

        #[arg(short, long, help = "Output CSV file")]
        output: PathBuf,

        #[arg(long, default_value = PM25_COLUMN)]
        pm25_column: String,

        #[arg(long, default_value = HUMIDITY_COLUMN)]
        humidity_column: String,

        #[arg(long, default_value = CORRECTED_COLUMN)]
        output_column: String,
    },

    /// Render a contour heatmap of one column as an HTML map
    Render {
        #[arg(short, long, help = "Input CSV with coordinate and value columns")]
        input: PathBuf,

        #[arg(short, long, default_value = DEFAULT_MAP_FILE)]
        output: PathBuf,

        #[arg(long, value_enum, default_value = "contour")]
        variant: HeatmapVariant,

        #[arg(long, default_value = PM25_COLUMN)]
        value_column: String,

        #[arg(long, default_value = LATITUDE_COLUMN)]
        latitude_column: String,

        #[arg(long, default_value = LONGITUDE_COLUMN)]
        longitude_column: String,

        #[arg(long, help = "Legend caption [default: the value column]")]
        caption: Option<String>,

        #[arg(
            long,
            value_delimiter = ',',
            help = "Columns listed in marker popups (points variant)"
        )]
        attributes: Vec<String>,

        #[arg(long, help = "Grid nodes per axis [default: from settings]")]
        resolution: Option<usize>,

        #[arg(long, help = "Gaussian smoothing sigma in grid nodes [default: per variant]")]
        sigma: Option<f64>,
    },
}
