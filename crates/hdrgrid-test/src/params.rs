//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use hdrgrid_core::{FPix, FPixRgb};
use std::fs;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare computed values against expectations (default)
    #[default]
    Compare,
    /// Compare, and also write intermediate images for inspection
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "bilateral_grid")
    pub test_name: String,
    /// Current test index (incremented before each check)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        // NaN never compares <= delta, so a NaN on either side fails
        if diff <= delta {
            return true;
        }

        let msg = format!(
            "Failure in {}_reg: value comparison for index {}\n\
             difference = {} but allowed delta = {}\n\
             expected = {}, actual = {}",
            self.test_name, self.index, diff, delta, expected, actual
        );
        self.record_failure(msg);
        false
    }

    /// Record a boolean condition as a check
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.index += 1;
        if !condition {
            let msg = format!(
                "Failure in {}_reg: check for index {} failed: {}",
                self.test_name, self.index, what
            );
            self.record_failure(msg);
        }
        condition
    }

    /// Compare two slices element by element
    ///
    /// Two NaN entries at the same position are treated as equal.
    pub fn compare_slices(&mut self, expected: &[f64], actual: &[f64], delta: f64) -> bool {
        self.index += 1;

        if expected.len() != actual.len() {
            let msg = format!(
                "Failure in {}_reg: slice comparison for index {} - length {} vs {}",
                self.test_name,
                self.index,
                expected.len(),
                actual.len()
            );
            self.record_failure(msg);
            return false;
        }

        for (i, (&e, &a)) in expected.iter().zip(actual).enumerate() {
            if e.is_nan() && a.is_nan() {
                continue;
            }
            let diff = (e - a).abs();
            if !(diff <= delta) {
                let msg = format!(
                    "Failure in {}_reg: slice comparison for index {} - element {}: \
                     expected {}, actual {}, allowed delta {}",
                    self.test_name, self.index, i, e, a, delta
                );
                self.record_failure(msg);
                return false;
            }
        }

        true
    }

    /// Compare two FPix images pixel by pixel within `delta`
    ///
    /// Two NaN pixels at the same position are treated as equal.
    pub fn compare_fpix(&mut self, expected: &FPix, actual: &FPix, delta: f32) -> bool {
        self.index += 1;

        if expected.dimensions() != actual.dimensions() {
            let msg = format!(
                "Failure in {}_reg: fpix comparison for index {} - dimension mismatch \
                 {:?} vs {:?}",
                self.test_name,
                self.index,
                expected.dimensions(),
                actual.dimensions()
            );
            self.record_failure(msg);
            return false;
        }

        let width = expected.width();
        for (i, (&e, &a)) in expected.data().iter().zip(actual.data()).enumerate() {
            if e.is_nan() && a.is_nan() {
                continue;
            }
            if !((e - a).abs() <= delta) {
                let msg = format!(
                    "Failure in {}_reg: fpix comparison for index {} - pixel mismatch at \
                     ({}, {}): expected {}, actual {}",
                    self.test_name,
                    self.index,
                    i as u32 % width,
                    i as u32 / width,
                    e,
                    a
                );
                self.record_failure(msg);
                return false;
            }
        }

        true
    }

    /// Write a grayscale image to the regout directory (display mode only)
    ///
    /// Values are clamped to [0, 1] and stored as 8-bit PNG.
    pub fn write_fpix(&mut self, fpix: &FPix, label: &str) -> TestResult<()> {
        if !self.display() {
            return Ok(());
        }
        let path = self.output_path(label)?;
        hdrgrid_io::write_gray(fpix, &path).map_err(|e| TestError::ImageWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        eprintln!("Wrote: {}", path);
        Ok(())
    }

    /// Write a color image to the regout directory (display mode only)
    pub fn write_rgb(&mut self, rgb: &FPixRgb, label: &str) -> TestResult<()> {
        if !self.display() {
            return Ok(());
        }
        let path = self.output_path(label)?;
        hdrgrid_io::write_image(rgb, &path).map_err(|e| TestError::ImageWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        eprintln!("Wrote: {}", path);
        Ok(())
    }

    fn output_path(&self, label: &str) -> TestResult<String> {
        let dir = regout_dir();
        fs::create_dir_all(&dir).map_err(|e| TestError::DirectoryCreate {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        Ok(format!("{}/{}.{}.png", dir, self.test_name, label))
    }

    fn record_failure(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all checks passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all checks have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
