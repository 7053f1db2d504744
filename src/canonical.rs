//! URL canonicalization for consistent dedup behavior across modules.

use std::fmt;
use thiserror::Error;
use url::Url;

/// A normalized absolute URL. Equality on this type defines "same page"
/// for deduplication purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a raw link string was refused admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("malformed URL: {0}")]
    Malformed(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("fragment-only reference to the same document")]
    FragmentOnly,

    #[error("relative reference without a base URL")]
    NoBase,
}

/// Normalize a raw link string into a comparable absolute URL.
///
/// Relative references are resolved against `base` (the page the link was
/// found on). Accepts only http/https. The fragment is stripped, default
/// ports are dropped, scheme and host are lower-cased, an empty path
/// collapses to `/`, and a trailing slash on a non-root path is removed so
/// `/about/` and `/about` compare equal.
pub fn canonicalize(raw: &str, base: Option<&CanonicalUrl>) -> Result<CanonicalUrl, RejectReason> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(RejectReason::Malformed("empty link".to_string()));
    }

    // A bare fragment always resolves to the page it was found on.
    if trimmed.starts_with('#') {
        return Err(RejectReason::FragmentOnly);
    }

    let parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or(RejectReason::NoBase)?;
            let base_url =
                Url::parse(base.as_str()).map_err(|e| RejectReason::Malformed(e.to_string()))?;
            base_url
                .join(trimmed)
                .map_err(|e| RejectReason::Malformed(e.to_string()))?
        }
        Err(e) => return Err(RejectReason::Malformed(e.to_string())),
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RejectReason::UnsupportedScheme(parsed.scheme().to_string()));
    }

    // The url crate already lower-cases scheme/host and drops known default
    // ports during parsing; fragment and trailing-slash handling is ours.
    let mut normalized = parsed;
    normalized.set_fragment(None);

    let path = normalized.path();
    if path.len() > 1 && path.ends_with('/') {
        let stripped = path.trim_end_matches('/').to_string();
        if stripped.is_empty() {
            normalized.set_path("/");
        } else {
            normalized.set_path(&stripped);
        }
    }

    Ok(CanonicalUrl(normalized.into()))
}
