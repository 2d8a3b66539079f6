//! Structural parser for one rate-card sheet: a labeled two-dimensional
//! grid with an "Animal" row, a "Cover Name" row, and one or two factor
//! header rows above the data. The file format that produced the grid is
//! someone else's problem; by the time a `Sheet` exists it is just cells.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::SchemeLimits;
use crate::domain::{Factor, DECLINE_RATE};

use super::registry::SheetSpec;
use super::{FactorValue, ParsedRateRow, RateCardError};

#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Option<String>>>,
}

impl Sheet {
    /// Cells are trimmed on the way in; whitespace-only cells become blank.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        cell.map(|value| value.trim().to_string())
                            .filter(|value| !value.is_empty())
                    })
                    .collect()
            })
            .collect();
        Self { name: name.into(), rows }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    fn row_is_blank(&self, row: usize) -> bool {
        match self.rows.get(row) {
            Some(cells) => cells.iter().all(Option::is_none),
            None => true,
        }
    }

    /// Index of the first row with any cell containing `keyword`
    /// (case-insensitive substring match).
    fn find_row(&self, keyword: &str) -> Result<usize, RateCardError> {
        let needle = keyword.to_ascii_lowercase();
        self.rows
            .iter()
            .position(|row| {
                row.iter().flatten().any(|cell| cell.to_ascii_lowercase().contains(&needle))
            })
            .ok_or_else(|| RateCardError::HeaderNotFound {
                sheet: self.name.clone(),
                keyword: keyword.to_string(),
            })
    }
}

/// Parse one factor out of a sheet into flat per-(pet type, scheme) rows.
pub fn parse_factor_sheet(
    sheet: &Sheet,
    spec: &SheetSpec,
    limits: &SchemeLimits,
) -> Result<Vec<ParsedRateRow>, RateCardError> {
    let animal_row = sheet.find_row("animal")?;
    let cover_row = sheet.find_row("cover name")?;
    let header_row = sheet.find_row(spec.keyword)?;

    // The second axis is optional: fall back to single-axis labels.
    let header_row2 = match spec.keyword2 {
        Some(keyword2) => match sheet.find_row(keyword2) {
            Ok(row) => Some(row),
            Err(_) => {
                warn!(
                    sheet = sheet.name(),
                    keyword = keyword2,
                    "second header keyword not found, using single-axis labels"
                );
                None
            }
        },
        None => None,
    };

    // Data columns span from just after the "Animal" label cell through the
    // last labeled column of that row.
    let labeled: Vec<usize> = (0..sheet.width())
        .filter(|&col| sheet.cell(animal_row, col).is_some())
        .collect();
    let (Some(&first), Some(&last)) = (labeled.first(), labeled.last()) else {
        return Ok(Vec::new());
    };
    let cols: Vec<usize> = (first + 1..=last).collect();

    let animals = forward_fill(sheet, animal_row, &cols);
    let covers = forward_fill(sheet, cover_row, &cols);

    // Option labels sit beneath the primary header, up to the first fully
    // blank row, in the first populated column of that slice.
    let label_start = header_row + 1;
    let mut label_end = label_start;
    while label_end < sheet.height() && !sheet.row_is_blank(label_end) {
        label_end += 1;
    }

    let label_col = (0..sheet.width())
        .find(|&col| (label_start..label_end).any(|row| sheet.cell(row, col).is_some()))
        .ok_or_else(|| RateCardError::NoLabelColumn { sheet: sheet.name().to_string() })?;

    let mut labels: Vec<String> = (label_start..label_end)
        .map(|row| sheet.cell(row, label_col).unwrap_or("").to_string())
        .collect();

    if let Some(header_row2) = header_row2 {
        // Second-axis labels pair up row-for-row and prefix the primary label.
        labels = labels
            .iter()
            .enumerate()
            .map(|(offset, primary)| {
                let secondary =
                    sheet.cell(header_row2 + 1 + offset, label_col + 1).unwrap_or("");
                format!("{secondary}: {primary}")
            })
            .collect();
    }

    let options: Vec<String> =
        labels.iter().map(|label| normalize_option_label(spec.factor, label)).collect();
    let multi_row = options.len() > 1;
    debug!(
        sheet = sheet.name(),
        factor = %spec.factor,
        labels = options.len(),
        multi_row,
        "parsed label column"
    );

    let mut rows_out = Vec::new();
    for (offset, &col) in cols.iter().enumerate() {
        let Some(pet_type) = animals[offset].as_deref() else {
            continue;
        };
        let Some(scheme) = covers[offset].as_deref() else {
            continue;
        };
        let pet_type = pet_type.to_lowercase();
        if let Some(filter) = spec.pet_type_filter {
            if pet_type != filter.as_str() {
                continue;
            }
        }

        let value = if multi_row {
            let mut rates = BTreeMap::new();
            for (row_offset, option) in options.iter().enumerate() {
                rates.insert(
                    option.clone(),
                    multi_row_cell(sheet.cell(header_row + 1 + row_offset, col)),
                );
            }
            FactorValue::Options(rates)
        } else {
            FactorValue::Scalar(
                sheet.cell(header_row + 1, col).and_then(|cell| cell.parse::<f64>().ok()),
            )
        };

        rows_out.push(ParsedRateRow {
            pet_type,
            scheme: scheme.to_string(),
            value,
            limit: limits.get(scheme),
        });
    }

    Ok(rows_out)
}

/// Multi-row cells: the decline marker maps to the sentinel, anything
/// unparseable (including blanks) maps to 0.
fn multi_row_cell(cell: Option<&str>) -> f64 {
    match cell {
        Some(text) if text.eq_ignore_ascii_case("decline") => DECLINE_RATE,
        Some(text) => text.parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    }
}

/// Option labels are lower-cased; breed labels additionally collapse internal
/// whitespace runs; the co-pay sheet's percentage labels map to yes/no.
fn normalize_option_label(factor: Factor, label: &str) -> String {
    let collapsed = if factor.is_breed() {
        label.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        label.trim().to_string()
    };

    if factor == Factor::Copay {
        match collapsed.as_str() {
            "0" | "0%" => return "no".to_string(),
            "0.2" | "20%" => return "yes".to_string(),
            _ => {}
        }
    }

    collapsed.to_lowercase()
}

fn forward_fill(sheet: &Sheet, row: usize, cols: &[usize]) -> Vec<Option<String>> {
    let mut filled = Vec::with_capacity(cols.len());
    let mut carried: Option<String> = None;
    for &col in cols {
        if let Some(value) = sheet.cell(row, col) {
            carried = Some(value.to_string());
        }
        filled.push(carried.clone());
    }
    filled
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::config::SchemeLimits;
    use crate::domain::{Factor, PetType, DECLINE_RATE};
    use crate::ratecard::registry::SheetSpec;
    use crate::ratecard::{FactorValue, RateCardError};

    use super::{parse_factor_sheet, Sheet};

    fn grid(rows: &[&[&str]]) -> Sheet {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| if cell.is_empty() { None } else { Some((*cell).to_string()) })
                    .collect()
            })
            .collect();
        Sheet::new("test", rows)
    }

    fn spec(factor: Factor, keyword: &'static str) -> SheetSpec {
        SheetSpec { factor, sheet: "test", keyword, keyword2: None, pet_type_filter: None }
    }

    fn limits() -> SchemeLimits {
        SchemeLimits::default()
    }

    #[test]
    fn single_row_factor_keeps_unparseable_cells_as_none() {
        let sheet = grid(&[
            &["Animal", "Dog", "", "Cat"],
            &["Cover Name", "Bronze", "Silver", "Bronze"],
            &["Base Rate", "", "", ""],
            &["", "1.25", "n/a", "0.95"],
        ]);
        let rows = parse_factor_sheet(&sheet, &spec(Factor::BaseRate, "base rate"), &limits())
            .expect("parse base rate");

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].pet_type, "dog");
        assert_eq!(rows[0].scheme, "Bronze");
        assert_eq!(rows[0].value, FactorValue::Scalar(Some(1.25)));
        // forward-filled pet type, unparseable rate stays distinguishable from 0
        assert_eq!(rows[1].pet_type, "dog");
        assert_eq!(rows[1].value, FactorValue::Scalar(None));
        assert_eq!(rows[2].pet_type, "cat");
        assert_eq!(rows[2].value, FactorValue::Scalar(Some(0.95)));
    }

    #[test]
    fn multi_row_factor_maps_decline_and_blank_cells() {
        let sheet = grid(&[
            &["Animal", "Dog", "Dog"],
            &["Cover Name", "Silver", "Gold"],
            &["Postcode Area", "", ""],
            &["AB", "1.1", "decline"],
            &["SW", "0.9", ""],
        ]);
        let rows = parse_factor_sheet(&sheet, &spec(Factor::Postcode, "postcode area"), &limits())
            .expect("parse postcode");

        assert_eq!(rows.len(), 2);
        let FactorValue::Options(silver) = &rows[0].value else {
            panic!("expected options for multi-row factor");
        };
        assert_eq!(silver.get("ab"), Some(&1.1));
        assert_eq!(silver.get("sw"), Some(&0.9));

        let FactorValue::Options(gold) = &rows[1].value else {
            panic!("expected options for multi-row factor");
        };
        assert_eq!(gold.get("ab"), Some(&DECLINE_RATE));
        assert_eq!(gold.get("sw"), Some(&0.0));
    }

    #[test]
    fn copay_percentage_labels_normalize_to_yes_no() {
        let sheet = grid(&[
            &["Animal", "Cat"],
            &["Cover Name", "Prime"],
            &["Co-Pay", ""],
            &["0%", "1.0"],
            &["20%", "0.8"],
        ]);
        let rows = parse_factor_sheet(&sheet, &spec(Factor::Copay, "co-pay"), &limits())
            .expect("parse copay");

        let FactorValue::Options(options) = &rows[0].value else {
            panic!("expected options");
        };
        assert_eq!(options, &BTreeMap::from([("no".to_string(), 1.0), ("yes".to_string(), 0.8)]));
    }

    #[test]
    fn copay_normalization_does_not_leak_into_other_factors() {
        let sheet = grid(&[
            &["Animal", "Cat"],
            &["Cover Name", "Prime"],
            &["Excess", ""],
            &["0%", "1.0"],
            &["20%", "0.8"],
        ]);
        let rows = parse_factor_sheet(&sheet, &spec(Factor::Multipet, "excess"), &limits())
            .expect("parse");

        let FactorValue::Options(options) = &rows[0].value else {
            panic!("expected options");
        };
        assert!(options.contains_key("0%"));
        assert!(options.contains_key("20%"));
    }

    #[test]
    fn dual_axis_labels_combine_secondary_first() {
        let sheet = grid(&[
            &["Animal", "Dog"],
            &["Cover Name", "Silver"],
            &["Animal Age", "", ""],
            &["1–50", "1.0"],
            &["51–100", "1.2"],
            &["101+", "1.5"],
            &["", "", ""],
            &["Animal Gender", "", ""],
            &["", "Female", ""],
            &["", "Female", ""],
            &["", "Female", ""],
        ]);
        let mut dual = spec(Factor::PetAgeGender, "animal age");
        dual.keyword2 = Some("animal gender");
        let rows = parse_factor_sheet(&sheet, &dual, &limits()).expect("parse dual axis");

        let FactorValue::Options(options) = &rows[0].value else {
            panic!("expected options");
        };
        assert!(options.contains_key("female: 1–50"));
        assert!(options.contains_key("female: 101+"));
    }

    #[test]
    fn absent_second_axis_falls_back_to_single_labels() {
        let sheet = grid(&[
            &["Animal", "Dog"],
            &["Cover Name", "Silver"],
            &["Animal Age", ""],
            &["1–50", "1.0"],
            &["51–100", "1.2"],
        ]);
        let mut dual = spec(Factor::PetAgeGender, "animal age");
        dual.keyword2 = Some("animal gender");
        let rows = parse_factor_sheet(&sheet, &dual, &limits()).expect("parse");

        let FactorValue::Options(options) = &rows[0].value else {
            panic!("expected options");
        };
        assert!(options.contains_key("1–50"));
    }

    #[test]
    fn missing_header_keyword_reports_sheet_and_keyword() {
        let sheet = grid(&[&["Animal", "Dog"], &["Cover Name", "Silver"]]);
        let error = parse_factor_sheet(&sheet, &spec(Factor::BaseRate, "base rate"), &limits())
            .expect_err("header should be missing");
        assert_eq!(
            error,
            RateCardError::HeaderNotFound {
                sheet: "test".to_string(),
                keyword: "base rate".to_string()
            }
        );
    }

    #[test]
    fn breed_labels_collapse_whitespace_and_honor_pet_type_filter() {
        let sheet = grid(&[
            &["Animal", "Dog", "Cat"],
            &["Cover Name", "Silver", "Silver"],
            &["Dog Breed", "", ""],
            &["Border   Collie", "1.3", "0.0"],
            &["Great  Dane", "1.6", "0.0"],
        ]);
        let mut dog = spec(Factor::DogBreed, "dog breed");
        dog.pet_type_filter = Some(PetType::Dog);
        let rows = parse_factor_sheet(&sheet, &dog, &limits()).expect("parse breed");

        assert_eq!(rows.len(), 1, "cat column filtered out");
        let FactorValue::Options(options) = &rows[0].value else {
            panic!("expected options");
        };
        assert_eq!(options.get("border collie"), Some(&1.3));
        assert_eq!(options.get("great dane"), Some(&1.6));
    }
}
