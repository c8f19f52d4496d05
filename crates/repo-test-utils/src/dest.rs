//! [`Destination`] scratch area for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary parent directory with a checkout location inside it.
///
/// The checkout directory does not exist until something creates it.
///
/// # Example
///
/// ```rust,no_run
/// use repo_test_utils::dest::Destination;
///
/// let dest = Destination::new();
/// assert!(!dest.path().exists());
/// ```
pub struct Destination {
    temp_dir: TempDir,
    checkout: PathBuf,
}

impl Default for Destination {
    fn default() -> Self {
        Self::new()
    }
}

impl Destination {
    pub fn new() -> Self {
        Self::nested(&["checkout"])
    }

    /// Checkout location several directories below the temporary root.
    pub fn nested(segments: &[&str]) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let checkout = segments
            .iter()
            .fold(temp_dir.path().to_path_buf(), |acc, s| acc.join(s));
        Self { temp_dir, checkout }
    }

    /// Absolute path of the checkout.
    pub fn path(&self) -> &Path {
        &self.checkout
    }

    /// The temporary root holding the checkout.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `rel` inside the checkout, creating parents.
    pub fn write(&self, rel: &str, content: &str) {
        let full_path = self.checkout.join(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }

    /// Assert that `rel` exists inside the checkout.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, rel: &str) {
        let full_path = self.checkout.join(rel);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist inside the checkout.
    pub fn assert_missing(&self, rel: &str) {
        let full_path = self.checkout.join(rel);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` has exactly `content`.
    pub fn assert_content(&self, rel: &str, content: &str) {
        let full_path = self.checkout.join(rel);
        let actual = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert_eq!(
            actual,
            content,
            "Unexpected content in {}",
            full_path.display()
        );
    }
}
