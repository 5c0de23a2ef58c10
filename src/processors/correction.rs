//! Linear humidity correction for low-cost PM2.5 sensors.

use crate::error::Result;
use crate::utils::constants::{
    CORRECTED_COLUMN, CORRECTION_INTERCEPT, HUMIDITY_COEFFICIENT, HUMIDITY_COLUMN,
    PM25_COEFFICIENT, PM25_COLUMN,
};
use crate::utils::frames::require_column;
use polars::prelude::*;

/// Corrected PM2.5 for one reading.
pub fn correct_pm25_value(pm25: f64, humidity: f64) -> f64 {
    PM25_COEFFICIENT * pm25 - HUMIDITY_COEFFICIENT * humidity + CORRECTION_INTERCEPT
}

/// Column expression for the corrected PM2.5 of two numeric or numeric-text
/// columns. Cells that do not parse as numbers give null.
pub fn corrected_pm25(pm25_column: &str, humidity_column: &str) -> Expr {
    lit(PM25_COEFFICIENT) * col(pm25_column).cast(DataType::Float64)
        - lit(HUMIDITY_COEFFICIENT) * col(humidity_column).cast(DataType::Float64)
        + lit(CORRECTION_INTERCEPT)
}

/// Element-wise correction of paired PM2.5 and relative-humidity readings.
///
/// The output is as long as the shorter input.
pub fn correct_pm25(pm25: &[f64], humidity: &[f64]) -> Result<Vec<f64>> {
    let len = pm25.len().min(humidity.len());
    let readings = df!(
        PM25_COLUMN => &pm25[..len],
        HUMIDITY_COLUMN => &humidity[..len]
    )?;

    let corrected = readings
        .lazy()
        .select([corrected_pm25(PM25_COLUMN, HUMIDITY_COLUMN).alias(CORRECTED_COLUMN)])
        .collect()?;
    let values = corrected
        .column(CORRECTED_COLUMN)?
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Append a corrected PM2.5 column computed from two existing columns and
/// return the frame with the number of rows that got a value.
pub fn append_corrected_column(
    df: DataFrame,
    pm25_column: &str,
    humidity_column: &str,
    output_column: &str,
) -> Result<(DataFrame, usize)> {
    require_column(&df, pm25_column, "correction input")?;
    require_column(&df, humidity_column, "correction input")?;

    let corrected = df
        .lazy()
        .with_column(corrected_pm25(pm25_column, humidity_column).alias(output_column))
        .collect()?;
    let filled = corrected.height() - corrected.column(output_column)?.null_count();

    Ok((corrected, filled))
}
