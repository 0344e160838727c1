use crate::shared::Result;

/// OutputPresenter port for delivering a finished artifact
///
/// This port abstracts the destination (a file, stdout) of each output
/// stage: the CSV table, the DOT graph and the vulnerability report.
pub trait OutputPresenter {
    /// Delivers the formatted artifact
    ///
    /// # Arguments
    /// * `content` - The formatted artifact
    ///
    /// # Errors
    /// Returns an error if:
    /// - The destination directory does not exist
    /// - The destination is a symbolic link
    /// - Writing fails (permissions, disk space)
    fn present(&self, content: &str) -> Result<()>;

    /// Human-readable destination, used in progress messages
    fn destination(&self) -> String;
}
