use std::collections::BTreeMap;

use crate::config::Indicator;

use super::model::HealthDataset;

// ---------------------------------------------------------------------------
// Summary views over a filtered subset
// ---------------------------------------------------------------------------
//
// Every function here is pure: it reads `(dataset, filtered indices,
// indicator)` and produces a derived summary. Missing indicator values
// are excluded from the arithmetic, never counted as zero, and a
// subset with zero non-missing values yields an explicit empty/`None`
// result instead of an error — the caller renders "no data" for that
// visual alone.

/// Mean, median and sample standard deviation of one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub mean: f64,
    pub median: f64,
    /// Sample (n-1) standard deviation; `None` with fewer than two
    /// non-missing observations.
    pub std_dev: Option<f64>,
    /// Number of non-missing observations.
    pub count: usize,
}

/// Mean of the indicator per (regional, year) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    /// Row labels, sorted.
    pub regionals: Vec<String>,
    /// Column labels, ascending.
    pub years: Vec<i32>,
    /// `cells[row][col]`; `None` where the pair has no observations.
    pub cells: Vec<Vec<Option<f64>>>,
}

/// Equal-width binned counts of raw per-row values.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }
}

fn observed_values(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
) -> Vec<f64> {
    indices
        .iter()
        .filter_map(|&i| dataset.records[i].value(indicator))
        .collect()
}

/// Descriptive statistics over all filtered rows, or `None` when the
/// indicator has no non-missing values in scope.
pub fn descriptive_stats(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
) -> Option<DescriptiveStats> {
    let mut values = observed_values(dataset, indices, indicator);
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;

    values.sort_by(|a, b| a.total_cmp(b));
    let median = if count % 2 == 1 {
        values[count / 2]
    } else {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    };

    let std_dev = if count >= 2 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(var.sqrt())
    } else {
        None
    };

    Some(DescriptiveStats {
        mean,
        median,
        std_dev,
        count,
    })
}

/// Group rows by a string key and fold the indicator's non-missing
/// values into `(sum, count)` per group. Groups where every value is
/// missing never get an entry.
fn group_fold<K: Ord, F: Fn(&super::model::IndicatorRecord) -> K>(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
    key: F,
) -> BTreeMap<K, (f64, usize)> {
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for &i in indices {
        let rec = &dataset.records[i];
        if let Some(v) = rec.value(indicator) {
            let entry = groups.entry(key(rec)).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    groups
}

/// Mean of the indicator per macro-region present in the subset.
/// Regions whose values are all missing are omitted, not zero-filled.
pub fn macro_distribution(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
) -> BTreeMap<String, f64> {
    group_fold(dataset, indices, indicator, |r| r.macro_region.clone())
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

/// Mean of the indicator per distinct year, ascending.
pub fn time_series(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
) -> Vec<(i32, f64)> {
    group_fold(dataset, indices, indicator, |r| r.year)
        .into_iter()
        .map(|(year, (sum, n))| (year, sum / n as f64))
        .collect()
}

/// Sum of the indicator per regional, for part-to-whole views of
/// additive (count-like) indicators.
pub fn regional_sums(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
) -> BTreeMap<String, f64> {
    group_fold(dataset, indices, indicator, |r| r.regional.clone())
        .into_iter()
        .map(|(k, (sum, _))| (k, sum))
        .collect()
}

/// Mean of the indicator per regional, for part-to-whole views of
/// averaged (rate-like) indicators. Which of the two applies is the
/// caller's choice via `Indicator::proportion_aggregate`; this module
/// only performs the arithmetic.
pub fn regional_means(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
) -> BTreeMap<String, f64> {
    group_fold(dataset, indices, indicator, |r| r.regional.clone())
        .into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

/// Mean of the indicator per (regional, year) pair, as a table with
/// one row per regional and one column per year. Pairs with no
/// observations stay `None` so the heatmap renders them as gaps.
pub fn regional_year_pivot(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
) -> PivotTable {
    let groups = group_fold(dataset, indices, indicator, |r| {
        (r.regional.clone(), r.year)
    });

    let mut regionals: Vec<String> = groups.keys().map(|(r, _)| r.clone()).collect();
    regionals.dedup();
    let mut years: Vec<i32> = groups.keys().map(|&(_, y)| y).collect();
    years.sort_unstable();
    years.dedup();

    let cells = regionals
        .iter()
        .map(|reg| {
            years
                .iter()
                .map(|&year| {
                    groups
                        .get(&(reg.clone(), year))
                        .map(|&(sum, n)| sum / n as f64)
                })
                .collect()
        })
        .collect();

    PivotTable {
        regionals,
        years,
        cells,
    }
}

/// Bin the raw per-row values into `bins` equal-width buckets spanning
/// the observed min/max. Returns `None` when no values are observed.
/// A degenerate span (all values equal) collapses into the first bin.
pub fn histogram(
    dataset: &HealthDataset,
    indices: &[usize],
    indicator: Indicator,
    bins: usize,
) -> Option<Histogram> {
    let values = observed_values(dataset, indices, indicator);
    if values.is_empty() || bins == 0 {
        return None;
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let bin = if span <= f64::EPSILON {
            0
        } else {
            // The max value lands in the last bin, not one past it.
            (((v - min) / span * bins as f64) as usize).min(bins - 1)
        };
        counts[bin] += 1;
    }

    Some(Histogram { min, max, counts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Indicator, N_INDICATORS};
    use crate::data::filter::{filtered_indices, FilterCriteria};
    use crate::data::model::{HealthDataset, IndicatorRecord};

    const IND: Indicator = Indicator::PrenatalVisits;

    fn row(
        year: i32,
        macro_region: &str,
        regional: &str,
        value: Option<f64>,
    ) -> IndicatorRecord {
        let mut values = [None; N_INDICATORS];
        values[IND.index()] = value;
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

    fn sample() -> HealthDataset {
        HealthDataset::from_records(vec![
            row(2018, "Norte", "R1", Some(10.0)),
            row(2019, "Norte", "R1", Some(20.0)),
            row(2018, "Sul", "R2", None),
        ])
    }

    fn all_indices(ds: &HealthDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn stats_exclude_missing_values() {
        let ds = sample();
        let stats = descriptive_stats(&ds, &all_indices(&ds), IND).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 15.0);
        assert_eq!(stats.median, 15.0);
        // Sample std over {10, 20}: sqrt(50)
        let std = stats.std_dev.unwrap();
        assert!((std - 50.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn std_dev_undefined_below_two_observations() {
        let ds = HealthDataset::from_records(vec![row(2018, "Norte", "R1", Some(10.0))]);
        let stats = descriptive_stats(&ds, &[0], IND).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std_dev, None);
    }

    #[test]
    fn stats_none_when_all_values_missing() {
        let ds = sample();
        let criteria = FilterCriteria {
            year_start: 2018,
            year_end: 2019,
            macro_region: Some("Sul".to_string()),
            regional: None,
        };
        let idx = filtered_indices(&ds, &criteria);
        assert_eq!(idx.len(), 1);
        assert_eq!(descriptive_stats(&ds, &idx, IND), None);
        assert!(macro_distribution(&ds, &idx, IND).is_empty());
        assert_eq!(histogram(&ds, &idx, IND, 20), None);
    }

    #[test]
    fn macro_distribution_omits_all_missing_regions() {
        let ds = sample();
        let dist = macro_distribution(&ds, &all_indices(&ds), IND);
        // "Sul" has only a missing value and must not appear at all.
        assert_eq!(dist.len(), 1);
        assert_eq!(dist.get("Norte"), Some(&15.0));
    }

    #[test]
    fn macro_distribution_keys_match_observed_regions() {
        let ds = HealthDataset::from_records(vec![
            row(2018, "Norte", "R1", Some(1.0)),
            row(2018, "Sul", "R2", Some(2.0)),
            row(2018, "Leste", "R3", None),
        ]);
        let dist = macro_distribution(&ds, &all_indices(&ds), IND);
        let keys: Vec<&String> = dist.keys().collect();
        assert_eq!(keys, vec!["Norte", "Sul"]);
    }

    #[test]
    fn time_series_is_ascending() {
        let ds = HealthDataset::from_records(vec![
            row(2020, "Norte", "R1", Some(30.0)),
            row(2018, "Norte", "R1", Some(10.0)),
            row(2018, "Norte", "R1", Some(20.0)),
        ]);
        let series = time_series(&ds, &all_indices(&ds), IND);
        assert_eq!(series, vec![(2018, 15.0), (2020, 30.0)]);
    }

    #[test]
    fn regional_sums_conserve_the_total() {
        let ds = HealthDataset::from_records(vec![
            row(2018, "Norte", "R1", Some(10.0)),
            row(2019, "Norte", "R1", Some(20.0)),
            row(2018, "Sul", "R2", Some(5.0)),
            row(2019, "Sul", "R2", None),
        ]);
        let idx = all_indices(&ds);
        let sums = regional_sums(&ds, &idx, IND);
        let total: f64 = sums.values().sum();
        let direct: f64 = idx
            .iter()
            .filter_map(|&i| ds.records[i].value(IND))
            .sum();
        assert!((total - direct).abs() < 1e-9);
        assert_eq!(sums.get("R1"), Some(&30.0));
        assert_eq!(sums.get("R2"), Some(&5.0));
    }

    #[test]
    fn pivot_has_gaps_for_unobserved_pairs() {
        let ds = sample();
        let pivot = regional_year_pivot(&ds, &all_indices(&ds), IND);
        assert_eq!(pivot.regionals, vec!["R1"]);
        assert_eq!(pivot.years, vec![2018, 2019]);
        assert_eq!(pivot.cells, vec![vec![Some(10.0), Some(20.0)]]);
    }

    #[test]
    fn pivot_mixes_regionals_and_years() {
        let ds = HealthDataset::from_records(vec![
            row(2018, "Norte", "R1", Some(10.0)),
            row(2019, "Sul", "R2", Some(40.0)),
        ]);
        let pivot = regional_year_pivot(&ds, &all_indices(&ds), IND);
        assert_eq!(pivot.regionals, vec!["R1", "R2"]);
        assert_eq!(pivot.years, vec![2018, 2019]);
        assert_eq!(pivot.cells[0], vec![Some(10.0), None]);
        assert_eq!(pivot.cells[1], vec![None, Some(40.0)]);
    }

    #[test]
    fn histogram_spans_observed_min_max() {
        let ds = HealthDataset::from_records(vec![
            row(2018, "Norte", "R1", Some(0.0)),
            row(2018, "Norte", "R1", Some(5.0)),
            row(2018, "Norte", "R1", Some(10.0)),
        ]);
        let h = histogram(&ds, &all_indices(&ds), IND, 2).unwrap();
        assert_eq!(h.min, 0.0);
        assert_eq!(h.max, 10.0);
        // 0.0 and 5.0 fall in [0,5), 10.0 lands in the last bin.
        assert_eq!(h.counts, vec![2, 1]);
        assert_eq!(h.counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn histogram_handles_constant_values() {
        let ds = HealthDataset::from_records(vec![
            row(2018, "Norte", "R1", Some(7.0)),
            row(2019, "Norte", "R1", Some(7.0)),
        ]);
        let h = histogram(&ds, &all_indices(&ds), IND, 20).unwrap();
        assert_eq!(h.counts[0], 2);
        assert_eq!(h.counts.iter().sum::<usize>(), 2);
    }

    #[test]
    fn empty_subset_short_circuits_every_aggregate() {
        let ds = sample();
        let criteria = FilterCriteria {
            year_start: 2025,
            year_end: 2025,
            macro_region: None,
            regional: None,
        };
        let idx = filtered_indices(&ds, &criteria);
        assert!(idx.is_empty());
        assert_eq!(descriptive_stats(&ds, &idx, IND), None);
        assert!(macro_distribution(&ds, &idx, IND).is_empty());
        assert!(time_series(&ds, &idx, IND).is_empty());
        assert!(regional_sums(&ds, &idx, IND).is_empty());
        assert!(regional_means(&ds, &idx, IND).is_empty());
        let pivot = regional_year_pivot(&ds, &idx, IND);
        assert!(pivot.regionals.is_empty() && pivot.years.is_empty());
        assert_eq!(histogram(&ds, &idx, IND, 20), None);
    }
}
