//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::ExportService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, MultiSelector, RealFileSystem, SkimSelector};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Interactive picker abstraction
    pub selector: Arc<dyn MultiSelector>,

    pub export_service: ExportService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(SkimSelector))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        selector: Arc<dyn MultiSelector>,
    ) -> Self {
        let settings = Arc::new(settings);
        let export_service = ExportService::new(Arc::clone(&settings));

        Self {
            settings,
            fs,
            selector,
            export_service,
        }
    }
}
