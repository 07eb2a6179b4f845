mod api;

pub use api::{Rule, TargetPath, TargetPathParser};
