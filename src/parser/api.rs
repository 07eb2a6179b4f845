use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "parser/target_path.pest"] // relative to src
pub struct TargetPathParser;

const PROTOTYPE_SEGMENT: &str = "prototype";

/// A parsed override target such as `"Element.prototype.getAttribute"` or
/// `"Audio"`. The last segment names the member; the ones before it are
/// walked from the realm's global object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetPath {
    segments: Vec<String>,
}

impl TargetPath {
    pub fn parse(path: &str) -> Result<Self, String> {
        let pairs = TargetPathParser::parse(Rule::target_path, path)
            .map_err(|e| format!("not a dotted identifier path (at {:?})", e.line_col))?;
        let mut segments = vec![];
        for pair in pairs.flatten() {
            if pair.as_rule() == Rule::identifier {
                segments.push(pair.as_str().to_string());
            }
        }
        Ok(TargetPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn member(&self) -> &str {
        // The grammar guarantees at least one identifier.
        self.segments.last().map(|s| s.as_str()).unwrap_or_default()
    }

    /// Segments leading to the object that holds the member. Empty for a
    /// global binding.
    pub fn holder_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn is_global(&self) -> bool {
        self.segments.len() == 1
    }

    /// `true` for the `"<Interface>.prototype.<member>"` shape.
    pub fn is_prototype_member(&self) -> bool {
        self.segments.len() == 3 && self.segments[1] == PROTOTYPE_SEGMENT
    }
}

impl FromStr for TargetPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetPath::parse(s)
    }
}

impl Display for TargetPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
