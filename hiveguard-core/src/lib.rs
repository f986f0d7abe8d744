//! Core data model for HiveGuard
//!
//! Turns raw hive telemetry into the numeric inputs of the analytics engine:
//! sensor readings with explicit missing metrics, timestamp normalization,
//! fixed-shape feature vectors and least-squares trend summaries.
//!
//! Everything here is a pure function of its inputs. Model fitting and
//! scoring live in `hiveguard-ml`.
//!
//! ```
//! use hiveguard_core::{FeatureExtractor, SensorReading};
//!
//! let extractor = FeatureExtractor::new();
//! let reading = SensorReading::new().with_temperature(34.0).with_weight(41.5);
//!
//! let features = extractor.extract(&reading, None);
//! assert_eq!(features.as_slice(), &[34.0, 50.0, 41.5, 0.5]);
//! ```

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod features;
pub mod reading;
pub mod stats;
pub mod time;

// Public API
pub use errors::{DataError, DataResult};
pub use features::{FeatureExtractor, FeatureVector, FEATURE_NAMES};
pub use reading::{Metric, SensorReading};
pub use stats::{StatisticsSummary, TrendDirection, TrendSummary};
pub use time::Timestamp;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
