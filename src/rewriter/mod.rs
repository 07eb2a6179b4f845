//! URL transcoding between a page's real addresses and the proxy origin.
//!
//! A proxied address has the layout
//! `<proxy origin><prefix><encode(address without fragment)>[#<encode(fragment)>]`.
//! `blob:` and `data:` addresses are embedded verbatim after the prefix,
//! `mailto:` and `about:` are left alone and `javascript:` bodies are handed
//! to a [`ScriptRewriter`].

mod codec;
mod error;
mod meta;
mod scheme;
mod script;
mod transcoder;

pub use codec::{Base64Codec, Codec, CodecKind, IdentityCodec, PlainCodec, XorCodec};
pub use error::TransformError;
pub use meta::{ProxyEnvironment, UrlMeta};
pub use scheme::{classify, Scheme, SCHEME_TABLE};
pub use script::{PassthroughScriptRewriter, ScriptRewriter, JAVASCRIPT_URL_SOURCE};
pub use transcoder::UrlRewriter;
