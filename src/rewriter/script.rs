//! Hand-off point for `javascript:` address bodies.

use super::meta::UrlMeta;

/// Label given to script found in `javascript:` addresses.
pub const JAVASCRIPT_URL_SOURCE: &str = "(javascript: url)";

/// Rewrites script source. Implemented outside this crate by the script
/// rewriter; `source_name` labels where the code came from.
pub trait ScriptRewriter {
    fn rewrite(&self, code: &str, source_name: &str, meta: &UrlMeta) -> String;
}

/// Returns script unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughScriptRewriter;

impl ScriptRewriter for PassthroughScriptRewriter {
    fn rewrite(&self, code: &str, _source_name: &str, _meta: &UrlMeta) -> String {
        code.to_string()
    }
}
