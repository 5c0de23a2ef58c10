//! Small helpers over polars frames shared by the readers and the merge.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;

const ROW_ORDER: &str = "__row_order";

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn require_column(df: &DataFrame, column: &str, context: &str) -> Result<()> {
    if df.column(column).is_ok() {
        Ok(())
    } else {
        Err(ProcessingError::MissingColumn {
            column: column.to_string(),
            context: context.to_string(),
        })
    }
}

/// Text of one cell, `None` for a null or an out-of-range row.
pub fn string_cell(df: &DataFrame, row: usize, column: &str) -> Result<Option<String>> {
    if row >= df.height() {
        return Ok(None);
    }
    let values = df.column(column)?.cast(&DataType::String)?;
    Ok(values.str()?.get(row).map(str::to_string))
}

/// Inner join on `key`, keeping the left frame's row order.
///
/// Non-key columns present on both sides come out suffixed `_x` (left)
/// and `_y` (right). A key value repeated on the right repeats the left row.
pub fn inner_join(left: &DataFrame, right: &DataFrame, key: &str) -> Result<DataFrame> {
    require_column(left, key, "left side of join")?;
    require_column(right, key, "right side of join")?;

    let left_names = column_names(left);
    let right_names = column_names(right);
    let shared = |name: &String| {
        name != key && left_names.contains(name) && right_names.contains(name)
    };
    let suffixed = |names: &[String], suffix: &str| -> Vec<Expr> {
        names
            .iter()
            .map(|name| {
                if shared(name) {
                    col(name.as_str()).alias(format!("{}{}", name, suffix))
                } else {
                    col(name.as_str())
                }
            })
            .collect()
    };

    let mut joined = left
        .clone()
        .lazy()
        .select(suffixed(&left_names, "_x"))
        .with_row_index(ROW_ORDER, None)
        .join(
            right.clone().lazy().select(suffixed(&right_names, "_y")),
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort_by_exprs(
            [col(ROW_ORDER)],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;
    joined.drop_in_place(ROW_ORDER)?;
    Ok(joined)
}

/// Stack frames by column name and keep the first copy of every exact
/// duplicate row. Columns missing from a frame are filled with nulls.
pub fn union_distinct(frames: &[DataFrame]) -> Result<DataFrame> {
    let lazy: Vec<LazyFrame> = frames
        .iter()
        .filter(|df| df.width() > 0)
        .map(|df| df.clone().lazy())
        .collect();
    if lazy.is_empty() {
        return Ok(DataFrame::empty());
    }

    let union = concat_lf_diagonal(lazy, UnionArgs::default())?
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    Ok(union)
}
