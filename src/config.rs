/// Static configuration: the indicator catalog and dashboard constants.
///
/// The catalog is fixed at compile time and shared read-only by every
/// component; nothing here is user-editable at runtime.

/// How a per-regional proportion view should combine row values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Additive indicator (a count): regional slices are sums.
    Sum,
    /// Averaged indicator (a rate or ratio): regional slices are means.
    Mean,
}

/// One maternal-health surveillance indicator column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    PrenatalVisits,
    HivSyphilisTesting,
    LiveBirthsSixVisits,
    CesareanDeliveries,
    MaternalMortality,
}

pub const N_INDICATORS: usize = 5;

impl Indicator {
    /// All indicators, in catalog order.
    pub const ALL: [Indicator; N_INDICATORS] = [
        Indicator::PrenatalVisits,
        Indicator::HivSyphilisTesting,
        Indicator::LiveBirthsSixVisits,
        Indicator::CesareanDeliveries,
        Indicator::MaternalMortality,
    ];

    /// Position of this indicator inside a record's value array.
    pub fn index(self) -> usize {
        match self {
            Indicator::PrenatalVisits => 0,
            Indicator::HivSyphilisTesting => 1,
            Indicator::LiveBirthsSixVisits => 2,
            Indicator::CesareanDeliveries => 3,
            Indicator::MaternalMortality => 4,
        }
    }

    /// Column header as it appears in the consolidated source file.
    pub fn code(self) -> &'static str {
        match self {
            Indicator::PrenatalVisits => "IN1(6 CONSULTAS)",
            Indicator::HivSyphilisTesting => "IN2 (HIV/SÍFILIS)",
            Indicator::LiveBirthsSixVisits => "IN3 (NV 6 CON)",
            Indicator::CesareanDeliveries => "IN4(PARTOS_CES)",
            Indicator::MaternalMortality => "IN5Q1 (RMM)",
        }
    }

    /// snake_case column alias accepted on load.
    pub fn alias(self) -> &'static str {
        match self {
            Indicator::PrenatalVisits => "prenatal_visits",
            Indicator::HivSyphilisTesting => "hiv_syphilis_testing",
            Indicator::LiveBirthsSixVisits => "live_births_six_visits",
            Indicator::CesareanDeliveries => "cesarean_deliveries",
            Indicator::MaternalMortality => "maternal_mortality_ratio",
        }
    }

    /// Human-readable label shown in selectors and chart titles.
    pub fn label(self) -> &'static str {
        match self {
            Indicator::PrenatalVisits => "Prenatal visit coverage",
            Indicator::HivSyphilisTesting => "HIV/Syphilis testing",
            Indicator::LiveBirthsSixVisits => "Live births with 6+ visits",
            Indicator::CesareanDeliveries => "Cesarean deliveries",
            Indicator::MaternalMortality => "Maternal mortality ratio",
        }
    }

    /// Which arithmetic the part-to-whole regional view uses.
    ///
    /// Live-birth counts add up across rows; the remaining indicators
    /// are rates or ratios and are averaged instead.
    pub fn proportion_aggregate(self) -> Aggregate {
        match self {
            Indicator::LiveBirthsSixVisits => Aggregate::Sum,
            _ => Aggregate::Mean,
        }
    }
}

/// Default location of the consolidated indicator table.
pub const DEFAULT_DATA_PATH: &str = "data/maternal_health_indicators.parquet";

/// Default number of equal-width histogram bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Height in points of each chart in the central panel.
pub const CHART_HEIGHT: f32 = 280.0;
