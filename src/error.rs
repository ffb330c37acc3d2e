use std::fmt;
use std::time::Duration;

/// Top-level application error type
#[derive(Debug)]
pub enum AppError {
    /// Batch validation errors (client fault)
    Validation(ValidationError),
    /// Logo/asset fetch errors (non-fatal for the batch)
    Asset(AssetError),
    /// Rendering-engine lifecycle errors (fatal for the batch)
    Engine(EngineError),
    /// Per-item render errors (batch continues)
    Render(RenderError),
    /// Archive assembly errors
    Archive(ArchiveError),
    /// Other errors (wrapping third-party errors without a better home)
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "validation error: {}", e),
            AppError::Asset(e) => write!(f, "asset error: {}", e),
            AppError::Engine(e) => write!(f, "engine error: {}", e),
            AppError::Render(e) => write!(f, "render error: {}", e),
            AppError::Archive(e) => write!(f, "archive error: {}", e),
            AppError::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(e) => Some(e),
            AppError::Asset(e) => Some(e),
            AppError::Engine(e) => Some(e),
            AppError::Render(e) => Some(e),
            AppError::Archive(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// Batch validation errors
#[derive(Debug)]
pub enum ValidationError {
    /// The request carried no items at all
    EmptyBatch,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyBatch => {
                write!(f, "no items were provided for rendering")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Shared-asset (logo) fetch errors
#[derive(Debug)]
pub enum AssetError {
    /// The HTTP request itself failed (DNS, connect, TLS, ...)
    RequestFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The server answered with a non-success status
    BadStatus { url: String, status: u16 },
    /// The fetch exceeded its bounded duration
    Timeout { url: String, limit: Duration },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::RequestFailed { url, source } => {
                write!(f, "asset fetch failed ({}): {}", url, source)
            }
            AssetError::BadStatus { url, status } => {
                write!(f, "asset fetch returned status {} ({})", status, url)
            }
            AssetError::Timeout { url, limit } => {
                write!(f, "asset fetch timed out after {:?} ({})", limit, url)
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// Rendering-engine lifecycle errors
#[derive(Debug)]
pub enum EngineError {
    /// The launch configuration was rejected
    InvalidConfig { message: String },
    /// The browser process could not be launched
    StartFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The browser did not become ready within the startup timeout
    StartTimeout { limit: Duration },
    /// A page context could not be created
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The browser process exited underneath us
    Terminated,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidConfig { message } => {
                write!(f, "invalid engine configuration: {}", message)
            }
            EngineError::StartFailed { source } => {
                write!(f, "failed to launch the rendering engine: {}", source)
            }
            EngineError::StartTimeout { limit } => {
                write!(f, "rendering engine not ready within {:?}", limit)
            }
            EngineError::PageCreationFailed { source } => {
                write!(f, "failed to create a page: {}", source)
            }
            EngineError::Terminated => {
                write!(f, "the rendering engine process terminated unexpectedly")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::StartFailed { source } | EngineError::PageCreationFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// Per-item render errors; `item_index` is the item's position in the batch
#[derive(Debug)]
pub enum RenderError {
    /// Loading the document into the page failed
    ContentLoadFailed {
        item_index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Loading the document exceeded its bounded duration
    ContentLoadTimeout { item_index: usize, limit: Duration },
    /// PDF export raised an exception
    ExportFailed {
        item_index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// PDF export exceeded its bounded duration
    ExportTimeout { item_index: usize, limit: Duration },
    /// The overall batch deadline elapsed before this item started
    DeadlineExceeded { item_index: usize },
    /// The item carried no HTML to render
    BlankDocument { item_index: usize },
}

impl RenderError {
    pub fn item_index(&self) -> usize {
        match self {
            RenderError::ContentLoadFailed { item_index, .. }
            | RenderError::ContentLoadTimeout { item_index, .. }
            | RenderError::ExportFailed { item_index, .. }
            | RenderError::ExportTimeout { item_index, .. }
            | RenderError::DeadlineExceeded { item_index }
            | RenderError::BlankDocument { item_index } => *item_index,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ContentLoadFailed { item_index, source } => {
                write!(f, "item {}: failed to load content: {}", item_index, source)
            }
            RenderError::ContentLoadTimeout { item_index, limit } => {
                write!(
                    f,
                    "item {}: content load timed out after {:?}",
                    item_index, limit
                )
            }
            RenderError::ExportFailed { item_index, source } => {
                write!(f, "item {}: PDF export failed: {}", item_index, source)
            }
            RenderError::ExportTimeout { item_index, limit } => {
                write!(
                    f,
                    "item {}: PDF export timed out after {:?}",
                    item_index, limit
                )
            }
            RenderError::DeadlineExceeded { item_index } => {
                write!(
                    f,
                    "item {}: batch deadline reached before render started",
                    item_index
                )
            }
            RenderError::BlankDocument { item_index } => {
                write!(f, "item {}: no HTML content provided", item_index)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ContentLoadFailed { source, .. }
            | RenderError::ExportFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// Archive assembly errors
#[derive(Debug)]
pub enum ArchiveError {
    /// Writing one entry into the archive failed
    EntryWriteFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Serializing the final archive failed
    FinalizeFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::EntryWriteFailed { name, source } => {
                write!(f, "failed to write archive entry '{}': {}", name, source)
            }
            ArchiveError::FinalizeFailed { source } => {
                write!(f, "failed to finalize archive: {}", source)
            }
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::EntryWriteFailed { source, .. }
            | ArchiveError::FinalizeFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== Conversions from common error types ==========
// Note: no manual From<AppError> for anyhow::Error is needed; anyhow
// already covers every std::error::Error implementor.

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AssetError> for AppError {
    fn from(err: AssetError) -> Self {
        AppError::Asset(err)
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}

impl From<ArchiveError> for AppError {
    fn from(err: ArchiveError) -> Self {
        AppError::Archive(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON parse failed: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(format!("I/O error: {}", err))
    }
}

// ========== Convenience constructors ==========

impl AppError {
    /// Per-item content-load failure
    pub fn content_load_failed(
        item_index: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Render(RenderError::ContentLoadFailed {
            item_index,
            source: Box::new(source),
        })
    }

    /// Per-item export failure
    pub fn export_failed(
        item_index: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Render(RenderError::ExportFailed {
            item_index,
            source: Box::new(source),
        })
    }

    /// True when the error is scoped to a single item and the batch
    /// should keep going
    pub fn is_item_scoped(&self) -> bool {
        matches!(self, AppError::Render(_))
    }
}

// ========== Result type alias ==========

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
