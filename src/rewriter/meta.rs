//! Per-frame addressing context.

use url::Url;

use super::error::TransformError;

/// Where a frame really lives. Built once when the frame is hooked and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlMeta {
    origin: Url,
    base: Url,
    top_frame_name: Option<String>,
    parent_frame_name: Option<String>,
}

impl UrlMeta {
    pub fn new(origin: Url, base: Url) -> Self {
        UrlMeta {
            origin,
            base,
            top_frame_name: None,
            parent_frame_name: None,
        }
    }

    /// Meta for a frame at `base` whose origin is derived from it.
    pub fn for_document(base: &str) -> Result<Self, TransformError> {
        let base = parse_absolute(base)?;
        Ok(UrlMeta::new(base.clone(), base))
    }

    pub fn parse(origin: &str, base: &str) -> Result<Self, TransformError> {
        Ok(UrlMeta::new(parse_absolute(origin)?, parse_absolute(base)?))
    }

    pub fn with_top_frame_name(mut self, name: impl Into<String>) -> Self {
        self.top_frame_name = Some(name.into());
        self
    }

    pub fn with_parent_frame_name(mut self, name: impl Into<String>) -> Self {
        self.parent_frame_name = Some(name.into());
        self
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn top_frame_name(&self) -> Option<&str> {
        self.top_frame_name.as_deref()
    }

    pub fn parent_frame_name(&self) -> Option<&str> {
        self.parent_frame_name.as_deref()
    }
}

pub(crate) fn parse_absolute(input: &str) -> Result<Url, TransformError> {
    Url::parse(input).map_err(|e| TransformError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// The proxy side of transcoding: where proxied addresses are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEnvironment {
    /// Proxy origin without a trailing slash, e.g. `https://proxy.test`.
    pub origin: String,
    /// Path segment marking proxied addresses, e.g. `/service/`.
    pub prefix: String,
    /// The frame's current (proxied) location, if known.
    pub location: Option<String>,
}

impl ProxyEnvironment {
    pub fn new(origin: impl Into<String>, prefix: impl Into<String>) -> Self {
        let origin = origin.into();
        ProxyEnvironment {
            origin: origin.trim_end_matches('/').to_string(),
            prefix: prefix.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// `origin + prefix`, the head of every proxied address.
    pub fn prefixed(&self) -> String {
        format!("{}{}", self.origin, self.prefix)
    }
}
