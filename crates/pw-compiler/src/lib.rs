//! PureWeb Static Ruleset Compiler
//!
//! This crate compiles ABP-style block lists into the evaluator's static
//! ruleset format, one ruleset per category. Rule ids are allocated inside the
//! category's id range so that match events can be attributed to the right
//! statistics bucket.

pub mod builder;
pub mod optimizer;
pub mod parser;

pub use builder::{build_ruleset, CompileError};
pub use optimizer::{optimize_rules, OptimizeStats};
pub use parser::{parse_rule_list, ParsedRule};
