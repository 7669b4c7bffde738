//! hdrgrid-test - Regression test framework for hdrgrid
//!
//! This crate provides a small regression test harness supporting two modes:
//!
//! - **Compare**: Check computed values against expectations (default)
//! - **Display**: Additionally write intermediate images to `tests/regout`
//!   for visual inspection
//!
//! # Usage
//!
//! ```ignore
//! use hdrgrid_test::RegParams;
//!
//! let mut rp = RegParams::new("bilateral_grid");
//! rp.compare_values(1.0, output.get_pixel(3, 3)? as f64, 1e-5);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
mod params;
pub mod synthetic;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // hdrgrid-test is at crates/hdrgrid-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
