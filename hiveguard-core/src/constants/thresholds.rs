//! Decision Thresholds
//!
//! Three families of bands are defined here:
//!
//! 1. **Fallback flags** used by the rule-based detector when no trained
//!    model is available. These are deliberately wide: only readings that
//!    are implausible for a living colony are flagged.
//! 2. **Narrative bands** used to explain an anomaly. These are narrower,
//!    so an anomalous reading usually gets at least one concrete hint.
//! 3. **Forecast alert limits** used by the overall analysis.
//!
//! ```text
//! temperature  5 ──10──────────────────35── 40   (°C)
//!              │   └ narrative: low     └ narrative: high
//!              └ fallback flag band ──────────┘
//! ```

// ===== FALLBACK FLAG BANDS =====

/// Below this the rule-based detector flags `extreme_temperature` (°C).
pub const FLAG_TEMP_MIN_C: f64 = 5.0;

/// Above this the rule-based detector flags `extreme_temperature` (°C).
pub const FLAG_TEMP_MAX_C: f64 = 40.0;

/// Below this the rule-based detector flags `extreme_humidity` (%).
pub const FLAG_HUMIDITY_MIN_PCT: f64 = 10.0;

/// Above this the rule-based detector flags `extreme_humidity` (%).
pub const FLAG_HUMIDITY_MAX_PCT: f64 = 90.0;

/// Below this the rule-based detector flags `extreme_weight` (kg).
///
/// A negative mass is a load-cell fault, never a hive state.
pub const FLAG_WEIGHT_MIN_KG: f64 = 0.0;

/// Above this the rule-based detector flags `extreme_weight` (kg).
pub const FLAG_WEIGHT_MAX_KG: f64 = 100.0;

/// Confidence reported by the rule-based detector for a flagged reading.
pub const FALLBACK_ANOMALY_CONFIDENCE: f64 = 0.8;

/// Confidence reported by the rule-based detector for a clean reading.
pub const FALLBACK_NORMAL_CONFIDENCE: f64 = 0.2;

/// Score reported by the rule-based detector for a flagged reading.
pub const FALLBACK_ANOMALY_SCORE: f64 = -0.5;

/// Score reported by the rule-based detector for a clean reading.
pub const FALLBACK_NORMAL_SCORE: f64 = 0.1;

// ===== NARRATIVE BANDS =====

/// Temperature above which an anomaly narrative suggests ventilation (°C).
pub const NARRATIVE_TEMP_HIGH_C: f64 = 35.0;

/// Temperature below which an anomaly narrative suggests insulation (°C).
pub const NARRATIVE_TEMP_LOW_C: f64 = 10.0;

/// Humidity above which an anomaly narrative suggests ventilation (%).
pub const NARRATIVE_HUMIDITY_HIGH_PCT: f64 = 80.0;

/// Humidity below which an anomaly narrative points at water sources (%).
pub const NARRATIVE_HUMIDITY_LOW_PCT: f64 = 20.0;

/// Weight below which an anomaly narrative points at population/food (kg).
pub const NARRATIVE_WEIGHT_LOW_KG: f64 = 5.0;

// ===== FEATURE IMPORTANCE REFERENCES =====

/// Reference midpoint and scale for temperature importance (°C).
pub const IMPORTANCE_TEMP_REF: f64 = 25.0;

/// Reference midpoint and scale for humidity importance (%).
pub const IMPORTANCE_HUMIDITY_REF: f64 = 50.0;

/// Reference midpoint and scale for weight importance (kg).
pub const IMPORTANCE_WEIGHT_REF: f64 = 15.0;

/// Reference midpoint and scale for gas level importance.
pub const IMPORTANCE_GAS_REF: f64 = 0.5;

// ===== TREND CLASSIFICATION =====

/// Slopes with magnitude below this are classified as stable (units/point).
pub const STABLE_SLOPE: f64 = 0.01;

/// Predicted weight changes within ±this are classified as stable (kg).
pub const STABLE_WEIGHT_CHANGE_KG: f64 = 0.5;

// ===== FORECAST ALERT LIMITS =====

/// Predicted weight change below this raises a weight-loss alert (kg).
pub const ALERT_WEIGHT_LOSS_KG: f64 = -2.0;

/// Predicted weight change above this raises a weight-gain alert (kg).
pub const ALERT_WEIGHT_GAIN_KG: f64 = 5.0;

/// Battery level treated as critical (%).
pub const BATTERY_CRITICAL_PCT: f64 = 20.0;

/// Cap on the reported days until the battery is critical.
pub const BATTERY_HORIZON_CAP_DAYS: f64 = 365.0;

/// Days-until-critical below this raises a battery alert.
pub const ALERT_BATTERY_DAYS: f64 = 30.0;

// ===== FORECAST CONFIDENCE =====

/// Lower bound applied to the weight regressor's goodness-of-fit.
pub const WEIGHT_CONFIDENCE_MIN: f64 = 0.3;

/// Upper bound applied to the weight regressor's goodness-of-fit.
pub const WEIGHT_CONFIDENCE_MAX: f64 = 0.95;

/// Weight confidence when the fit has too few rows to be scored.
pub const WEIGHT_CONFIDENCE_DEFAULT: f64 = 0.6;

/// Fixed confidence of the temperature forecast.
pub const TEMPERATURE_CONFIDENCE: f64 = 0.7;

/// Fixed confidence of the humidity forecast.
pub const HUMIDITY_CONFIDENCE: f64 = 0.6;
