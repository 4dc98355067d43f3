use std::collections::BTreeSet;

use crate::config::{Indicator, N_INDICATORS};

// ---------------------------------------------------------------------------
// IndicatorRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single observation row: one municipality in one year, with one
/// value slot per catalog indicator. Missing values stay `None` and
/// are excluded from every aggregate, never treated as zero.
#[derive(Debug, Clone)]
pub struct IndicatorRecord {
    pub year: i32,
    pub macro_region: String,
    pub regional: String,
    pub municipality: String,
    /// Residence coordinates, used only by the map view.
    pub latitude: f64,
    pub longitude: f64,
    /// Indicator values in `Indicator::ALL` order.
    pub values: [Option<f64>; N_INDICATORS],
}

impl IndicatorRecord {
    /// Value of one indicator for this row, if observed.
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        self.values[indicator.index()]
    }
}

// ---------------------------------------------------------------------------
// HealthDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed distinct-value indexes.
/// Immutable after construction; filtered subsets are index views
/// with no identity of their own.
#[derive(Debug, Clone)]
pub struct HealthDataset {
    /// All observation rows.
    pub records: Vec<IndicatorRecord>,
    /// Sorted distinct years present in the table.
    pub years: Vec<i32>,
    /// Sorted distinct macro-regions.
    pub macro_regions: Vec<String>,
    /// Sorted distinct regional subdivisions.
    pub regionals: Vec<String>,
}

impl HealthDataset {
    /// Build the distinct-value indexes from the loaded rows.
    pub fn from_records(records: Vec<IndicatorRecord>) -> Self {
        let mut years: BTreeSet<i32> = BTreeSet::new();
        let mut macro_regions: BTreeSet<String> = BTreeSet::new();
        let mut regionals: BTreeSet<String> = BTreeSet::new();

        for rec in &records {
            years.insert(rec.year);
            macro_regions.insert(rec.macro_region.clone());
            regionals.insert(rec.regional.clone());
        }

        HealthDataset {
            records,
            years: years.into_iter().collect(),
            macro_regions: macro_regions.into_iter().collect(),
            regionals: regionals.into_iter().collect(),
        }
    }

    /// Observed `(min, max)` year span, if any rows exist.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        match (self.years.first(), self.years.last()) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, macro_region: &str, regional: &str) -> IndicatorRecord {
        IndicatorRecord {
            year,
            macro_region: macro_region.to_string(),
            regional: regional.to_string(),
            municipality: format!("{regional}-seat"),
            latitude: 0.0,
            longitude: 0.0,
            values: [None; N_INDICATORS],
        }
    }

    #[test]
    fn indexes_are_sorted_and_distinct() {
        let ds = HealthDataset::from_records(vec![
            row(2019, "Sul", "R2"),
            row(2018, "Norte", "R1"),
            row(2018, "Norte", "R1"),
        ]);
        assert_eq!(ds.years, vec![2018, 2019]);
        assert_eq!(ds.macro_regions, vec!["Norte", "Sul"]);
        assert_eq!(ds.regionals, vec!["R1", "R2"]);
        assert_eq!(ds.year_range(), Some((2018, 2019)));
    }

    #[test]
    fn empty_dataset_has_no_year_range() {
        let ds = HealthDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.year_range(), None);
    }
}
