//! Document preprocessing
//!
//! Rewrites each incoming HTML document before it reaches the engine:
//!
//! 1. every literal occurrence of the logo source URL becomes the
//!    cached data URI (also covering the entity-escaped variant);
//! 2. any `<img>` whose `alt` equals the configured marker text gets
//!    its `src` pointed at the data URI, inserting the attribute when
//!    the tag has none;
//! 3. optionally, external font-stylesheet links are stripped so slow
//!    font hosts cannot eat into the render budget.
//!
//! When no logo is available the document passes through unmodified;
//! rendering then proceeds with whatever the document referenced.

use regex::{NoExpand, Regex};
use tracing::warn;

/// The cached logo, ready to be substituted into documents
#[derive(Debug, Clone)]
pub struct LogoSubstitution {
    /// URL the documents are expected to reference
    pub source_url: String,
    /// Self-contained replacement (`data:image/...;base64,...`)
    pub data_uri: String,
    /// `alt` text that marks an `<img>` as the logo slot
    pub marker_alt: String,
}

/// Policy knobs for [`normalize`]
#[derive(Debug, Clone, Default)]
pub struct PreprocessOptions {
    pub strip_external_fonts: bool,
}

/// External hosts whose stylesheet links get stripped under
/// `strip_external_fonts`
const FONT_HOSTS: [&str; 4] = [
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    "use.typekit.net",
    "fonts.bunny.net",
];

/// Produce the final HTML for one item
pub fn normalize(html: &str, logo: Option<&LogoSubstitution>, options: &PreprocessOptions) -> String {
    let mut out = match logo {
        Some(logo) => {
            let substituted = substitute_literal(html, &logo.source_url, &logo.data_uri);
            substitute_marker_imgs(&substituted, &logo.marker_alt, &logo.data_uri)
        }
        None => html.to_string(),
    };

    if options.strip_external_fonts {
        out = strip_font_links(&out);
    }

    out
}

/// Rule 1 and 2: exact literal match, plus the same URL with
/// HTML-entity-escaped ampersands
fn substitute_literal(html: &str, source_url: &str, data_uri: &str) -> String {
    let mut out = html.replace(source_url, data_uri);
    if source_url.contains('&') {
        let escaped = source_url.replace('&', "&amp;");
        out = out.replace(&escaped, data_uri);
    }
    out
}

/// Rule 3: attribute-targeted match on marker `<img>` tags
fn substitute_marker_imgs(html: &str, marker_alt: &str, data_uri: &str) -> String {
    let (img_re, alt_re, src_re) = match (
        Regex::new(r"(?is)<img\b[^>]*>"),
        Regex::new(r#"(?is)\balt\s*=\s*(?:"([^"]*)"|'([^']*)')"#),
        Regex::new(r#"(?is)\bsrc\s*=\s*(?:"[^"]*"|'[^']*')"#),
    ) {
        (Ok(a), Ok(b), Ok(c)) => (a, b, c),
        _ => {
            warn!("logo marker regex failed to compile, skipping marker substitution");
            return html.to_string();
        }
    };

    img_re
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            let alt = alt_re
                .captures(tag)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str().trim().to_string());

            match alt {
                Some(alt) if alt.eq_ignore_ascii_case(marker_alt) => {
                    let replacement = format!(r#"src="{}""#, data_uri);
                    if src_re.is_match(tag) {
                        src_re.replace(tag, NoExpand(&replacement)).into_owned()
                    } else {
                        // no src attribute yet; give the tag one
                        tag.replacen("<img", &format!("<img {}", replacement), 1)
                    }
                }
                _ => tag.to_string(),
            }
        })
        .into_owned()
}

/// Remove `<link>` tags pointing at known external font hosts
fn strip_font_links(html: &str) -> String {
    let link_re = match Regex::new(r"(?is)<link\b[^>]*>") {
        Ok(re) => re,
        Err(_) => {
            warn!("font link regex failed to compile, keeping links");
            return html.to_string();
        }
    };

    link_re
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            if FONT_HOSTS.iter().any(|host| tag.contains(host)) {
                String::new()
            } else {
                tag.to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGO_URL: &str = "https://images.example.com/edp-logo.png?size=full&v=2";
    const DATA_URI: &str = "data:image/png;base64,iVBORw==";

    fn logo() -> LogoSubstitution {
        LogoSubstitution {
            source_url: LOGO_URL.to_string(),
            data_uri: DATA_URI.to_string(),
            marker_alt: "logo".to_string(),
        }
    }

    fn default_options() -> PreprocessOptions {
        PreprocessOptions::default()
    }

    #[test]
    fn replaces_every_literal_occurrence() {
        let html = format!(
            r#"<img src="{u}"><div style="background:url({u})"></div>"#,
            u = LOGO_URL
        );
        let out = normalize(&html, Some(&logo()), &default_options());
        assert!(!out.contains(LOGO_URL));
        assert_eq!(out.matches(DATA_URI).count(), 2);
    }

    #[test]
    fn replaces_entity_escaped_variant() {
        let html = r#"<img src="https://images.example.com/edp-logo.png?size=full&amp;v=2">"#;
        let out = normalize(html, Some(&logo()), &default_options());
        assert!(out.contains(DATA_URI));
        assert!(!out.contains("&amp;v=2"));
    }

    #[test]
    fn rewrites_src_of_marker_img() {
        let html = r#"<img alt="logo" src="https://cdn.other.com/old.png" width="120">"#;
        let out = normalize(html, Some(&logo()), &default_options());
        assert_eq!(
            out,
            format!(r#"<img alt="logo" src="{}" width="120">"#, DATA_URI)
        );
    }

    #[test]
    fn marker_match_is_case_insensitive() {
        let html = r#"<IMG ALT='Logo' SRC='x.png'>"#;
        let out = normalize(html, Some(&logo()), &default_options());
        assert!(out.contains(DATA_URI));
    }

    #[test]
    fn inserts_src_when_marker_img_has_none() {
        let html = r#"<img alt="logo" class="header-logo">"#;
        let out = normalize(html, Some(&logo()), &default_options());
        assert_eq!(
            out,
            format!(r#"<img src="{}" alt="logo" class="header-logo">"#, DATA_URI)
        );
    }

    #[test]
    fn leaves_non_marker_imgs_alone() {
        let html = r#"<img alt="foto do cliente" src="cliente.jpg">"#;
        let out = normalize(html, Some(&logo()), &default_options());
        assert_eq!(out, html);
    }

    #[test]
    fn absent_logo_passes_through_unmodified() {
        let html = format!(r#"<html><img src="{}"></html>"#, LOGO_URL);
        let out = normalize(&html, None, &default_options());
        assert_eq!(out, html);
    }

    #[test]
    fn substitution_is_idempotent() {
        let html = format!(
            r#"<img alt="logo"><p><img src="{}"></p>"#,
            LOGO_URL
        );
        let once = normalize(&html, Some(&logo()), &default_options());
        let twice = normalize(&once, Some(&logo()), &default_options());
        assert_eq!(once, twice);
    }

    #[test]
    fn strips_external_font_links_when_enabled() {
        let html = concat!(
            r#"<link rel="preconnect" href="https://fonts.gstatic.com">"#,
            r#"<link href="https://fonts.googleapis.com/css2?family=Roboto" rel="stylesheet">"#,
            r#"<link rel="stylesheet" href="/local/styles.css">"#,
        );
        let options = PreprocessOptions {
            strip_external_fonts: true,
        };
        let out = normalize(html, None, &options);
        assert!(!out.contains("fonts.googleapis.com"));
        assert!(!out.contains("fonts.gstatic.com"));
        assert!(out.contains("/local/styles.css"));
    }

    #[test]
    fn keeps_font_links_by_default() {
        let html = r#"<link href="https://fonts.googleapis.com/css2?family=Roboto" rel="stylesheet">"#;
        let out = normalize(html, None, &default_options());
        assert_eq!(out, html);
    }
}
