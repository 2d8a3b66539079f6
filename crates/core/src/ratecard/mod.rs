pub mod nested;
pub mod registry;
pub mod sheet;
pub mod table;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use nested::NestedRateTable;
pub use registry::{sheet_names, spec_for, SheetSpec, SHEET_SPECS};
pub use sheet::{parse_factor_sheet, Sheet};
pub use table::RateTable;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RateCardError {
    #[error("could not find `{keyword}` in sheet `{sheet}`")]
    HeaderNotFound { sheet: String, keyword: String },
    #[error("no populated label column beneath the header in sheet `{sheet}`")]
    NoLabelColumn { sheet: String },
}

/// A factor's parsed value for one (pet type, scheme) column: either a
/// single rate (possibly unparseable, kept as `None`) or a label→rate map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorValue {
    Scalar(Option<f64>),
    Options(BTreeMap<String, f64>),
}

/// Flat parser output row, one per (pet type, scheme) column of a sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedRateRow {
    pub pet_type: String,
    pub scheme: String,
    pub value: FactorValue,
    pub limit: f64,
}
