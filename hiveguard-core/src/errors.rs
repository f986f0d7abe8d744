//! Error Types for Sensor Data Handling
//!
//! ## Design Philosophy
//!
//! Most defects in hive telemetry are not errors at all. A reading without a
//! `gasLevel` is simply a reading with the neutral gas value, and a series
//! that is too short for a regression is simply a series that gets the
//! cheaper statistical treatment. Errors in this module are therefore
//! reserved for the cases where a computation genuinely cannot proceed and
//! the caller has to choose a different path:
//!
//! - `InsufficientData`: fewer points than a method needs
//! - `MissingTimestamp`: a time-aware computation met an undated reading
//! - `NonFinite`: NaN or infinity reached a numeric routine
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use hiveguard_core::{stats::linear_fit, DataError};
//!
//! match linear_fit(&[1.0]) {
//!     Ok(fit) => println!("slope {}", fit.slope),
//!     Err(DataError::InsufficientData { required, available }) => {
//!         // fall back to a neutral trend
//!         assert_eq!((required, available), (2, 1));
//!     }
//!     Err(_) => {}
//! }
//! ```

use thiserror::Error;

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;

/// Data errors raised by the core numeric routines
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DataError {
    /// Not enough points for the requested computation
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Minimum number of points needed
        required: usize,
        /// Actual number of points available
        available: usize,
    },

    /// A reading without a timestamp reached a time-aware computation
    #[error("Reading at position {index} has no timestamp")]
    MissingTimestamp {
        /// Position of the undated reading in the sorted series
        index: usize,
    },

    /// Value makes no numeric sense (NaN, infinity)
    #[error("Invalid value: not a finite number")]
    NonFinite,
}
