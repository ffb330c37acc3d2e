use serde::Deserialize;

/// One incoming batch request
///
/// Wire shape: `{ "items": [{ "html": "...", "filename": "..." }], "logoUrl": "..." }`
#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    pub items: Vec<RenderItem>,
    /// Overrides the configured logo source for this batch
    #[serde(rename = "logoUrl", default)]
    pub logo_url: Option<String>,
}

/// One document within a batch, as received
#[derive(Debug, Clone, Deserialize)]
pub struct RenderItem {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub filename: Option<String>,
}

impl RenderItem {
    pub fn new(html: impl Into<String>, filename: Option<&str>) -> Self {
        Self {
            html: html.into(),
            filename: filename.map(str::to_string),
        }
    }

    /// Resolve the output name for this item: trimmed requested name or
    /// a generic default, always ending in `.pdf`, with path
    /// separators flattened so the name is safe inside an archive
    pub fn output_name(&self) -> String {
        let base = self
            .filename
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("documento");
        let base = base.replace(['/', '\\'], "_");
        if base.to_lowercase().ends_with(".pdf") {
            base
        } else {
            format!("{}.pdf", base)
        }
    }
}

/// A render item after preprocessing, ready for the engine
#[derive(Debug, Clone)]
pub struct NormalizedItem {
    /// Position in the original batch; fixes archive enumeration order
    pub index: usize,
    pub final_html: String,
    pub output_name: String,
}

/// Outcome of rendering one item; exactly one variant per item
#[derive(Debug)]
pub enum RenderOutcome {
    Success { pdf: Vec<u8> },
    Failure { reason: String },
}

impl RenderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_appends_pdf_extension() {
        let item = RenderItem::new("<html/>", Some("notificacao-01"));
        assert_eq!(item.output_name(), "notificacao-01.pdf");
    }

    #[test]
    fn output_name_keeps_existing_extension_case_insensitively() {
        assert_eq!(
            RenderItem::new("", Some("aviso.PDF")).output_name(),
            "aviso.PDF"
        );
        assert_eq!(
            RenderItem::new("", Some("aviso.pdf")).output_name(),
            "aviso.pdf"
        );
    }

    #[test]
    fn output_name_defaults_when_missing_or_blank() {
        assert_eq!(RenderItem::new("", None).output_name(), "documento.pdf");
        assert_eq!(
            RenderItem::new("", Some("   ")).output_name(),
            "documento.pdf"
        );
    }

    #[test]
    fn output_name_trims_whitespace() {
        assert_eq!(
            RenderItem::new("", Some("  cliente 42  ")).output_name(),
            "cliente 42.pdf"
        );
    }

    #[test]
    fn output_name_flattens_path_separators() {
        assert_eq!(
            RenderItem::new("", Some("../etc/passwd")).output_name(),
            ".._etc_passwd.pdf"
        );
    }

    #[test]
    fn request_deserializes_with_optional_fields() {
        let request: RenderRequest = serde_json::from_str(
            r#"{"items":[{"html":"<p>oi</p>"},{"html":"<p>tchau</p>","filename":"f2"}],"logoUrl":"https://example.com/logo.png"}"#,
        )
        .unwrap();
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0].filename, None);
        assert_eq!(request.logo_url.as_deref(), Some("https://example.com/logo.png"));
    }
}
