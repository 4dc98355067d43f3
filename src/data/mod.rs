/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → HealthDataset (memoized in DatasetCache)
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ HealthDataset  │  Vec<IndicatorRecord>, distinct-value indexes
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range + region criteria → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ aggregate   │  stats / group means / pivot / histogram
///   └────────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
