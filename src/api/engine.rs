//! Main extraction engine implementation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::analysis::loader::ConstantIndex;
use crate::analysis::report::Report;
use crate::analysis::session::{ExtractionSession, SessionSummary};
use crate::core::config::ExtractionConfig;
use crate::core::errors::{LiteralistError, Result};
use crate::core::file_discovery::discover_files;
use crate::core::file_utils::FileReader;
use crate::lang::common::SourceAnalyzer;
use crate::lang::registry::adapter_for_language;
use crate::refactor::{process_report, RefactorMode, RefactorOutcome};

/// Main literalist engine
pub struct LiteralistEngine {
    config: ExtractionConfig,
    analyzer: Box<dyn SourceAnalyzer>,
}

impl LiteralistEngine {
    /// Create an engine. The configuration is validated and the scan root
    /// resolved to an absolute path before anything is scanned.
    pub fn new(mut config: ExtractionConfig) -> Result<Self> {
        info!("Initializing literalist engine");
        config.validate()?;

        if !config.root.is_dir() {
            return Err(LiteralistError::config_field(
                format!("Scan root is not a directory: {}", config.root.display()),
                "root",
            ));
        }
        config.root = canonical(&config.root)?;
        config.extra_constants = config
            .extra_constants
            .iter()
            .map(|path| canonical(path).unwrap_or_else(|_| path.clone()))
            .collect();

        let analyzer = adapter_for_language("py")?;
        Ok(Self { config, analyzer })
    }

    /// Effective configuration, with the root made absolute.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Discover, scan and deduplicate literals into a report.
    pub fn analyze(&mut self) -> Result<Report> {
        self.analyze_with_summary().map(|(report, _)| report)
    }

    /// Like [`LiteralistEngine::analyze`], also returning the session counters.
    pub fn analyze_with_summary(&mut self) -> Result<(Report, SessionSummary)> {
        info!("Starting analysis of {}", self.config.root.display());
        let files = discover_files(&self.config);
        let existing = ConstantIndex::load(
            self.analyzer.as_mut(),
            &self.config.constants_path(),
            &self.config.extra_constants,
        );

        let mut session = ExtractionSession::new(self.config.clone(), existing);
        for path in &files {
            let source = match FileReader::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let file_label = path.to_string_lossy();
            match self.analyzer.scan_source(&source, &file_label, &self.config) {
                Ok(scanned) => {
                    debug!("{}: {} literals", path.display(), scanned.literals.len());
                    session.add_file(scanned);
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        Ok(session.finish())
    }

    /// Apply or preview the edits described by `report`.
    pub fn refactor(&mut self, report: &Report, mode: RefactorMode) -> Result<RefactorOutcome> {
        info!("Processing report with {} constants ({:?})", report.len(), mode);
        process_report(&self.config, self.analyzer.as_mut(), report, mode)
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        LiteralistError::io(format!("Failed to resolve {}", path.display()), e)
    })
}
