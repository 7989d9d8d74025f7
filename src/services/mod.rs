//! Services module - the computation and its input validation.
//!
//! Nothing in here knows about threads, queues or the GUI. Every execution
//! strategy calls the same kernel, so the result never depends on where it ran.
//!
//! # Components
//!
//! - [`cube_by_counting`]: the Compute Kernel, `n³` via a triple-nested counting loop
//! - [`cube_by_counting_with_progress`]: the same count with percent callbacks
//! - [`InputCollector`]: trims, validates and parses the raw text of the input field
//! - [`InputError`]: why an input was refused
//!
//! # Usage Example
//!
//! ```
//! use longcalc::services::{InputCollector, cube_by_counting};
//!
//! let collector = InputCollector::new(1000);
//! let n = collector.parse(" 3 ").unwrap();
//! assert_eq!(cube_by_counting(n), 27);
//! ```

pub mod compute;
pub mod input;

pub use compute::{MAX_SAFE_INPUT, cube_by_counting, cube_by_counting_with_progress};
pub use input::{InputCollector, InputError};
