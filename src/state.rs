use std::path::Path;
use std::sync::Arc;

use crate::color::RegionColors;
use crate::config::{DEFAULT_DATA_PATH, DEFAULT_HISTOGRAM_BINS, Indicator};
use crate::data::filter::{FilterCriteria, filtered_indices};
use crate::data::loader::DatasetCache;
use crate::data::model::HealthDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
pub struct AppState {
    /// Memoized access to the configured source file.
    pub cache: DatasetCache,

    /// Loaded table (None until a load succeeds).
    pub dataset: Option<Arc<HealthDataset>>,

    /// Current sidebar filter selection.
    pub criteria: FilterCriteria,

    /// Indicator chosen for every visual on the page.
    pub indicator: Indicator,

    /// Histogram bin count (user adjustable).
    pub histogram_bins: usize,

    /// Indices of rows passing the current criteria (cached per change).
    pub visible_indices: Vec<usize>,

    /// Stable macro-region colours for the map.
    pub region_colors: RegionColors,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: DatasetCache::new(DEFAULT_DATA_PATH),
            dataset: None,
            criteria: FilterCriteria {
                year_start: 0,
                year_end: 0,
                macro_region: None,
                regional: None,
            },
            indicator: Indicator::PrenatalVisits,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            visible_indices: Vec::new(),
            region_colors: RegionColors::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Build the initial state and attempt the configured load once.
    /// A failed load leaves the dashboard empty with a banner message.
    pub fn startup() -> Self {
        let mut state = Self::default();
        state.load_from_cache();
        state
    }

    /// Load (or reuse) the memoized table and reset the derived view.
    pub fn load_from_cache(&mut self) {
        match self.cache.load() {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", self.cache.path().display());
                self.status_message = Some(format!("Error loading data: {e}"));
                self.dataset = None;
                self.visible_indices.clear();
            }
        }
    }

    /// Retarget the cache at a user-picked file and load it.
    pub fn open_path(&mut self, path: &Path) {
        self.cache.swap_path(path);
        self.load_from_cache();
    }

    /// Force a re-read of the current source on the next load.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.load_from_cache();
    }

    /// Ingest a loaded dataset: widen criteria to the full year span,
    /// clear restrictions, rebuild colours and the visible view.
    pub fn set_dataset(&mut self, dataset: Arc<HealthDataset>) {
        self.criteria = FilterCriteria::all_of(&dataset);
        self.region_colors = RegionColors::new(&dataset.macro_regions);
        self.visible_indices = (0..dataset.len()).collect();
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a criteria change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            // Keep the pair ordered even mid-drag on the year sliders.
            if self.criteria.year_start > self.criteria.year_end {
                std::mem::swap(&mut self.criteria.year_start, &mut self.criteria.year_end);
            }
            self.visible_indices = filtered_indices(ds, &self.criteria);
        }
    }

    /// Whether the current selection matched no rows at all.
    pub fn selection_is_empty(&self) -> bool {
        self.dataset.is_some() && self.visible_indices.is_empty()
    }
}
