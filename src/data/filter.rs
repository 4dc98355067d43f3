use super::model::HealthDataset;

// ---------------------------------------------------------------------------
// Filter criteria: year range plus optional region restrictions
// ---------------------------------------------------------------------------

/// The four sidebar filter inputs. `None` for a region field means
/// "no restriction" (the UI's "All" sentinel never reaches this layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Inclusive lower year bound.
    pub year_start: i32,
    /// Inclusive upper year bound.
    pub year_end: i32,
    /// Exact macro-region match, or no restriction.
    pub macro_region: Option<String>,
    /// Exact regional-subdivision match, or no restriction.
    pub regional: Option<String>,
}

impl FilterCriteria {
    /// Criteria spanning the dataset's full observed year range with
    /// no region restrictions, i.e. "show everything".
    pub fn all_of(dataset: &HealthDataset) -> Self {
        let (year_start, year_end) = dataset.year_range().unwrap_or((0, 0));
        FilterCriteria {
            year_start,
            year_end,
            macro_region: None,
            regional: None,
        }
    }

    fn matches(&self, year: i32, macro_region: &str, regional: &str) -> bool {
        if year < self.year_start || year > self.year_end {
            return false;
        }
        if let Some(m) = &self.macro_region {
            if m != macro_region {
                return false;
            }
        }
        if let Some(r) = &self.regional {
            if r != regional {
                return false;
            }
        }
        true
    }
}

/// Return indices of rows that satisfy all active criteria (logical
/// AND; the three checks commute, so application order is irrelevant).
///
/// An empty result is a valid outcome, not an error: callers check
/// for it and short-circuit presentation with a "no data" notice.
/// The dataset is never mutated.
pub fn filtered_indices(dataset: &HealthDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec.year, &rec.macro_region, &rec.regional))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Indicator, N_INDICATORS};
    use crate::data::model::IndicatorRecord;

    fn row(
        year: i32,
        macro_region: &str,
        regional: &str,
        value: Option<f64>,
    ) -> IndicatorRecord {
        let mut values = [None; N_INDICATORS];
        values[Indicator::PrenatalVisits.index()] = value;
        IndicatorRecord {
            year,
            macro_region: macro_region.to_string(),
            regional: regional.to_string(),
            municipality: format!("{regional}-seat"),
            latitude: -7.0,
            longitude: -42.0,
            values,
        }
    }

    /// Three-row table shared by several scenarios below.
    fn sample() -> HealthDataset {
        HealthDataset::from_records(vec![
            row(2018, "Norte", "R1", Some(10.0)),
            row(2019, "Norte", "R1", Some(20.0)),
            row(2018, "Sul", "R2", None),
        ])
    }

    fn unrestricted(year_start: i32, year_end: i32) -> FilterCriteria {
        FilterCriteria {
            year_start,
            year_end,
            macro_region: None,
            regional: None,
        }
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let ds = sample();
        let idx = filtered_indices(&ds, &unrestricted(2018, 2019));
        assert_eq!(idx, vec![0, 1, 2]);

        for &i in &idx {
            let y = ds.records[i].year;
            assert!((2018..=2019).contains(&y));
        }

        let only_2019 = filtered_indices(&ds, &unrestricted(2019, 2019));
        assert_eq!(only_2019, vec![1]);
    }

    #[test]
    fn macro_restriction_matches_exactly() {
        let ds = sample();
        let criteria = FilterCriteria {
            macro_region: Some("Sul".to_string()),
            ..unrestricted(2018, 2019)
        };
        let idx = filtered_indices(&ds, &criteria);
        assert_eq!(idx, vec![2]);
        assert_eq!(ds.records[2].value(Indicator::PrenatalVisits), None);
    }

    #[test]
    fn no_matching_rows_yields_empty_not_error() {
        let ds = sample();
        assert!(filtered_indices(&ds, &unrestricted(2025, 2025)).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = sample();
        let criteria = FilterCriteria {
            macro_region: Some("Norte".to_string()),
            ..unrestricted(2018, 2018)
        };
        let once = filtered_indices(&ds, &criteria);

        // Refilter the already-filtered subset.
        let narrowed =
            HealthDataset::from_records(once.iter().map(|&i| ds.records[i].clone()).collect());
        let twice = filtered_indices(&narrowed, &criteria);
        assert_eq!(twice.len(), once.len());
        for (&a, &b) in once.iter().zip(&twice) {
            assert_eq!(ds.records[a].year, narrowed.records[b].year);
            assert_eq!(ds.records[a].regional, narrowed.records[b].regional);
        }
    }

    #[test]
    fn criteria_commute() {
        let ds = sample();

        // Apply year-range, macro, regional one at a time in both orders
        // and compare against the combined criteria.
        let combined = FilterCriteria {
            macro_region: Some("Norte".to_string()),
            regional: Some("R1".to_string()),
            ..unrestricted(2019, 2019)
        };
        let all_at_once = filtered_indices(&ds, &combined);

        let step = |ds: &HealthDataset, c: &FilterCriteria| -> HealthDataset {
            let idx = filtered_indices(ds, c);
            HealthDataset::from_records(idx.iter().map(|&i| ds.records[i].clone()).collect())
        };

        let year_only = unrestricted(2019, 2019);
        let macro_only = FilterCriteria {
            macro_region: Some("Norte".to_string()),
            ..unrestricted(i32::MIN, i32::MAX)
        };
        let regional_only = FilterCriteria {
            regional: Some("R1".to_string()),
            ..unrestricted(i32::MIN, i32::MAX)
        };

        let forward = step(&step(&step(&ds, &year_only), &macro_only), &regional_only);
        let backward = step(&step(&step(&ds, &regional_only), &macro_only), &year_only);

        assert_eq!(forward.len(), all_at_once.len());
        assert_eq!(backward.len(), all_at_once.len());
        for rec in &forward.records {
            assert_eq!(rec.year, 2019);
            assert_eq!(rec.macro_region, "Norte");
            assert_eq!(rec.regional, "R1");
        }
    }
}
