use crate::adapters::outbound::filesystem::{FileSystemWriter, StdoutPresenter};
use crate::application::dto::STDOUT_FILE_NAME;
use crate::ports::outbound::OutputPresenter;
use std::path::{Path, PathBuf};

/// Presenter type enumeration for factory pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterType {
    Stdout,
    File(PathBuf),
}

impl PresenterType {
    /// Resolves an artifact file name against the output directory
    ///
    /// `-` selects stdout; anything else becomes `output_dir/file_name`.
    pub fn for_file(output_dir: &Path, file_name: &str) -> Self {
        if file_name == STDOUT_FILE_NAME {
            PresenterType::Stdout
        } else {
            PresenterType::File(output_dir.join(file_name))
        }
    }
}

/// Factory for creating output presenters
///
/// This factory encapsulates the creation logic for different presenter implementations,
/// following the Factory Pattern. It belongs in the application layer as it orchestrates
/// the selection of infrastructure adapters based on application needs.
pub struct PresenterFactory;

impl PresenterFactory {
    /// Creates a presenter instance for the specified type
    ///
    /// # Examples
    /// ```
    /// use sbom_visor::application::factories::{PresenterFactory, PresenterType};
    ///
    /// let presenter = PresenterFactory::create(PresenterType::Stdout);
    /// assert_eq!(presenter.destination(), "stdout");
    /// ```
    pub fn create(presenter_type: PresenterType) -> Box<dyn OutputPresenter> {
        match presenter_type {
            PresenterType::Stdout => Box::new(StdoutPresenter::new()),
            PresenterType::File(path) => Box::new(FileSystemWriter::new(path)),
        }
    }
}
