use std::time::Duration;

/// Program configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Path to the Chrome/Chromium executable; `None` lets
    /// chromiumoxide auto-detect one
    pub chrome_executable: Option<String>,
    /// Number of pages rendering concurrently within one batch
    pub max_concurrent_pages: usize,
    /// Source URL of the shared logo asset
    pub logo_url: String,
    /// `alt` text that marks an `<img>` as the logo slot
    pub logo_marker_alt: String,
    /// Remove external font-stylesheet links before rendering
    pub strip_external_fonts: bool,
    /// How long a fetched logo stays valid
    pub asset_ttl: Duration,
    /// Ceiling for the logo HTTP fetch
    pub asset_fetch_timeout: Duration,
    /// Ceiling for engine startup
    pub engine_start_timeout: Duration,
    /// Ceiling for loading one document into a page
    pub content_load_timeout: Duration,
    /// Font/image readiness ceiling on a reused (warm) page
    pub warm_resource_wait: Duration,
    /// Font/image readiness ceiling on a freshly created page
    pub cold_resource_wait: Duration,
    /// Ceiling for one PDF export
    pub pdf_export_timeout: Duration,
    /// Overall budget for the whole batch; items whose turn comes
    /// after this are failed, not started
    pub batch_deadline: Duration,
    /// Suggested filename for the produced archive
    pub archive_name: String,
    /// Show verbose logs
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            max_concurrent_pages: 1,
            logo_url: "https://images.seeklogo.com/logo-png/62/2/edp-logo-png_seeklogo-621425.png"
                .to_string(),
            logo_marker_alt: "logo".to_string(),
            strip_external_fonts: false,
            asset_ttl: Duration::from_secs(6 * 60 * 60),
            asset_fetch_timeout: Duration::from_secs(10),
            engine_start_timeout: Duration::from_secs(30),
            content_load_timeout: Duration::from_secs(15),
            warm_resource_wait: Duration::from_millis(1500),
            cold_resource_wait: Duration::from_secs(8),
            pdf_export_timeout: Duration::from_secs(30),
            batch_deadline: Duration::from_secs(55),
            archive_name: "notificacoes.zip".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok(),
            max_concurrent_pages: std::env::var("MAX_CONCURRENT_PAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_pages),
            logo_url: std::env::var("LOGO_URL").unwrap_or(default.logo_url),
            logo_marker_alt: std::env::var("LOGO_MARKER_ALT").unwrap_or(default.logo_marker_alt),
            strip_external_fonts: std::env::var("STRIP_EXTERNAL_FONTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.strip_external_fonts),
            asset_ttl: env_secs("ASSET_TTL_SECS").unwrap_or(default.asset_ttl),
            asset_fetch_timeout: env_secs("ASSET_FETCH_TIMEOUT_SECS").unwrap_or(default.asset_fetch_timeout),
            engine_start_timeout: env_secs("ENGINE_START_TIMEOUT_SECS").unwrap_or(default.engine_start_timeout),
            content_load_timeout: env_secs("CONTENT_LOAD_TIMEOUT_SECS").unwrap_or(default.content_load_timeout),
            warm_resource_wait: env_millis("WARM_RESOURCE_WAIT_MS").unwrap_or(default.warm_resource_wait),
            cold_resource_wait: env_millis("COLD_RESOURCE_WAIT_MS").unwrap_or(default.cold_resource_wait),
            pdf_export_timeout: env_secs("PDF_EXPORT_TIMEOUT_SECS").unwrap_or(default.pdf_export_timeout),
            batch_deadline: env_secs("BATCH_DEADLINE_SECS").unwrap_or(default.batch_deadline),
            archive_name: std::env::var("ARCHIVE_NAME").unwrap_or(default.archive_name),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).map(Duration::from_secs)
}

fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).map(Duration::from_millis)
}
