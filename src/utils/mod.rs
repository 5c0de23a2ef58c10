pub mod constants;
pub mod dates;
pub mod filename;
pub mod frames;
pub mod progress;
pub mod settings;

pub use constants::*;
pub use dates::{date_range, parse_date};
pub use filename::{daily_output_file_name, is_data_file, parse_data_file_name, DataFileName};
pub use progress::ProgressReporter;
pub use settings::Settings;
