/// Sizing rules used by the dimension estimator.
#[derive(Clone, Debug, PartialEq)]
pub struct DimensionOptions {
    /// Narrowest column, in spreadsheet width units.
    pub min_column_width: f64,

    /// Widest column, in spreadsheet width units.
    pub max_column_width: f64,

    /// Factor applied to the measured width in default-character units.
    pub width_scale: f64,

    /// Units added after scaling.
    pub width_margin: f64,

    /// Height of a single-line row, in points.
    pub base_row_height: f64,

    /// Height added per line of multi-line content, in points.
    pub line_height: f64,
}

impl Default for DimensionOptions {
    fn default() -> Self {
        DimensionOptions {
            min_column_width: 10.0,
            max_column_width: 50.0,
            width_scale: 1.2,
            width_margin: 2.0,
            base_row_height: 18.0,
            line_height: 18.0,
        }
    }
}

/// Options controlling how HTML tables become a workbook.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Sheet `N` is named `"<prefix> N"`.
    pub sheet_name_prefix: String,

    /// Export tables hidden with `display: none` (revealed while measured).
    pub include_hidden_tables: bool,

    /// Turn cells made of `★`/`☆` into `"<filled>/<total> 星"`.
    pub convert_star_ratings: bool,

    pub dimensions: DimensionOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            sheet_name_prefix: "Table".to_owned(),
            include_hidden_tables: true,
            convert_star_ratings: false,
            dimensions: DimensionOptions::default(),
        }
    }
}
