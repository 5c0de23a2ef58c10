use crate::utils::constants::DATA_FILE_PREFIX;

/// Date and station slug encoded in a data file name such as
/// `2022-05-01_limoilou-1.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFileName {
    pub date: String,
    pub slug: String,
}

/// True for files the merge treats as readings.
pub fn is_data_file(file_name: &str) -> bool {
    file_name.starts_with(DATA_FILE_PREFIX)
}

/// Split a data file name into its leading 10-character date and the slug
/// between the separator after it and the 4-character extension.
///
/// Names too short to hold both parts give whatever fits, so a stray
/// `20*` file yields an empty slug that matches no station and is dropped
/// by the join rather than aborting the merge.
pub fn parse_data_file_name(file_name: &str) -> DataFileName {
    let chars: Vec<char> = file_name.chars().collect();
    let date_end = chars.len().min(10);
    let slug_end = chars.len().saturating_sub(4);
    let slug = if slug_end > 11 {
        chars[11..slug_end].iter().collect()
    } else {
        String::new()
    };

    DataFileName {
        date: chars[..date_end].iter().collect(),
        slug,
    }
}

/// Daily output file name for a date string.
pub fn daily_output_file_name(date: &str) -> String {
    format!("{}.csv", date)
}
