//! Mapping between real addresses and proxy addresses.

use tracing::debug;
use url::Url;

use super::codec::Codec;
use super::meta::{parse_absolute, ProxyEnvironment, UrlMeta};
use super::scheme::{classify, Scheme};
use super::script::{PassthroughScriptRewriter, ScriptRewriter, JAVASCRIPT_URL_SOURCE};

const BLOB_PREFIX: &str = "blob:";
const JAVASCRIPT_PREFIX: &str = "javascript:";

/// Rewrites addresses into the proxy origin and back.
///
/// Both directions are total: anything that cannot be transcoded is
/// returned as given.
pub struct UrlRewriter {
    env: ProxyEnvironment,
    codec: Box<dyn Codec>,
    script: Box<dyn ScriptRewriter>,
}

impl UrlRewriter {
    pub fn new(env: ProxyEnvironment, codec: Box<dyn Codec>) -> Self {
        UrlRewriter {
            env,
            codec,
            script: Box::new(PassthroughScriptRewriter),
        }
    }

    pub fn with_script_rewriter(mut self, script: Box<dyn ScriptRewriter>) -> Self {
        self.script = script;
        self
    }

    pub fn environment(&self) -> &ProxyEnvironment {
        &self.env
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// `origin + prefix` of the proxy.
    pub fn proxy_prefix(&self) -> String {
        self.env.prefixed()
    }

    /// Real address to proxy address.
    pub fn rewrite(&self, url: &str, meta: &UrlMeta) -> String {
        let scheme = classify(url);
        if scheme.is_identity() {
            return url.to_string();
        }
        if scheme.is_passthrough_embedded() {
            return format!("{}{}", self.proxy_prefix(), url);
        }
        match scheme {
            Scheme::JavaScript => {
                let body = &url[JAVASCRIPT_PREFIX.len()..];
                format!(
                    "{}{}",
                    JAVASCRIPT_PREFIX,
                    self.script.rewrite(body, JAVASCRIPT_URL_SOURCE, meta)
                )
            }
            _ => self.rewrite_network(url, meta),
        }
    }

    pub fn rewrite_parsed(&self, url: &Url, meta: &UrlMeta) -> String {
        self.rewrite(url.as_str(), meta)
    }

    fn rewrite_network(&self, url: &str, meta: &UrlMeta) -> String {
        let base = if meta.base().scheme() == "about" {
            // about:blank and friends resolve against the real top-level location.
            match &self.env.location {
                Some(location) => self.unrewrite(location),
                None => meta.base().to_string(),
            }
        } else {
            meta.base().to_string()
        };

        let mut real = match Url::parse(&base).and_then(|base| base.join(url)) {
            Ok(real) => real,
            Err(e) => {
                debug!(url = %url, base = %base, reason = %e, "cannot resolve address, leaving it as is");
                return url.to_string();
            }
        };

        let encoded_hash = self.codec.encode(real.fragment().unwrap_or_default());
        real.set_fragment(None);

        let mut rewritten = self.proxy_prefix();
        rewritten.push_str(&self.codec.encode(real.as_str()));
        if !encoded_hash.is_empty() {
            rewritten.push('#');
            rewritten.push_str(&encoded_hash);
        }
        rewritten
    }

    /// Proxy address to real address.
    pub fn unrewrite(&self, url: &str) -> String {
        let prefixed = self.proxy_prefix();
        let scheme = classify(url);
        // Reversing a rewritten script body is not supported. A real blob
        // address here means the page never saw a proxied one.
        if scheme.is_identity() || scheme == Scheme::JavaScript || scheme == Scheme::Blob {
            return url.to_string();
        }

        if let Some(embedded) = url.strip_prefix(prefixed.as_str()) {
            if classify(embedded).is_passthrough_embedded() {
                return embedded.to_string();
            }
        }
        self.unrewrite_network(url, prefixed.len())
    }

    pub fn unrewrite_parsed(&self, url: &Url) -> String {
        self.unrewrite(url.as_str())
    }

    /// Decodes the part of `url` after the first `prefix_len` bytes of the
    /// raw input. Only correct when `url` literally starts with
    /// `origin + prefix`; a proxied address written with a different but
    /// equivalent spelling (explicit default port, upper-case host) is cut
    /// at the wrong place.
    fn unrewrite_network(&self, url: &str, prefix_len: usize) -> String {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(url = %url, reason = %e, "not an absolute address, leaving it as is");
                return url.to_string();
            }
        };

        let hash = match self.codec.decode(parsed.fragment().unwrap_or_default()) {
            Ok(hash) => hash,
            Err(e) => {
                debug!(url = %url, reason = %e, "cannot decode fragment, leaving address as is");
                return url.to_string();
            }
        };

        let encoded = match url.get(prefix_len..) {
            Some(rest) => rest.split('#').next().unwrap_or_default(),
            None => {
                debug!(url = %url, prefix_len, "address is shorter than the proxy prefix, leaving it as is");
                return url.to_string();
            }
        };

        match self.codec.decode(encoded) {
            Ok(mut real) => {
                if !hash.is_empty() {
                    real.push('#');
                    real.push_str(&hash);
                }
                real
            }
            Err(e) => {
                debug!(url = %url, reason = %e, "cannot decode address, leaving it as is");
                url.to_string()
            }
        }
    }

    /// Moves a page-created `blob:` address into the real origin.
    pub fn rewrite_blob(&self, url: &str, meta: &UrlMeta) -> String {
        match self.blob_path(url) {
            Some(path) => format!("{}{}{}", BLOB_PREFIX, meta.origin().origin().ascii_serialization(), path),
            None => url.to_string(),
        }
    }

    /// Moves a `blob:` address back into the proxy origin.
    pub fn unrewrite_blob(&self, url: &str) -> String {
        match self.blob_path(url) {
            Some(path) => format!("{}{}{}", BLOB_PREFIX, self.env.origin, path),
            None => url.to_string(),
        }
    }

    fn blob_path(&self, url: &str) -> Option<String> {
        let inner = url.strip_prefix(BLOB_PREFIX)?;
        match parse_absolute(inner) {
            Ok(inner) => Some(inner.path().to_string()),
            Err(e) => {
                debug!(url = %url, reason = %e, "malformed blob address, leaving it as is");
                None
            }
        }
    }
}
