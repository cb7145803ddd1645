//! Shared test utilities for the mapml workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A published-layer catalog fixture resembling a typical demo setup
//! - Common bounding boxes in the registered TCRSs
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, assert_approx_eq};
//! ```

pub mod fixtures;

// Re-export commonly used items at the crate root
pub use fixtures::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of two bounding boxes, corner by corner.
///
/// ```ignore
/// use test_utils::assert_bbox_approx_eq;
///
/// assert_bbox_approx_eq!(actual, (-180.0, -90.0, 180.0, 90.0), 1e-6);
/// ```
#[macro_export]
macro_rules! assert_bbox_approx_eq {
    ($bbox:expr, ($min_x:expr, $min_y:expr, $max_x:expr, $max_y:expr), $epsilon:expr) => {{
        let bbox = $bbox;
        $crate::assert_approx_eq!(bbox.min_x, $min_x, $epsilon);
        $crate::assert_approx_eq!(bbox.min_y, $min_y, $epsilon);
        $crate::assert_approx_eq!(bbox.max_x, $max_x, $epsilon);
        $crate::assert_approx_eq!(bbox.max_y, $max_y, $epsilon);
    }};
}
