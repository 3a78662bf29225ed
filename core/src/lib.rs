//! Declarative argument specs and a schema-driven parser for CLI commands.
//!
//! A command declares the arguments it accepts as [`ArgSpec`] values in a
//! [`CommandSpec`] registry, then hands raw tokens to
//! [`parse`](CommandSpec::parse). The parser resolves long and short
//! forms, coerces values by declared kind, accumulates repeats, captures
//! everything after `--` for a rest collector, and fills in static
//! defaults. [`format_usage`] renders one declaration as a usage string.
//!
//! # Examples
//!
//! ```
//! use command_args_core::{ArgSpec, CommandSpec, ParseOptions, Value};
//!
//! let spec = CommandSpec::from_specs([
//!     ArgSpec::flag("verbose").with_alias('v'),
//!     ArgSpec::number("jobs").with_alias('j').with_default(1),
//!     ArgSpec::new("files").allow_multiple().fallback(),
//!     ArgSpec::rest("passthrough"),
//! ])?;
//!
//! let args = spec.parse(
//!     ["-v", "-j", "4", "a.txt", "b.txt", "--", "--raw"],
//!     ParseOptions::sparse(),
//! )?;
//!
//! assert!(args.is_set("verbose"));
//! assert_eq!(args.get_number("jobs"), Some(4.0));
//! assert_eq!(
//!     args.get_all("files"),
//!     Some(&[Value::from("a.txt"), Value::from("b.txt")][..])
//! );
//! assert_eq!(args.get_all("passthrough"), Some(&[Value::from("--raw")][..]));
//! # Ok::<(), command_args_core::Error>(())
//! ```
//!
//! # Errors
//!
//! Failures split into two classes: [`ConfigError`] for defects in the
//! declarations or options (a caller bug), and [`ParseError`] for anything
//! the supplied tokens can get wrong (a user mistake). [`Error`] joins
//! them where an operation can raise either.

mod parse;
mod registry;
mod types;
mod usage;

pub use parse::{ArgValue, ParseError, ParsedArgs};
pub use registry::{CommandSpec, ConfigError};
pub use types::{ArgKind, ArgSpec, CoerceFn, CustomKind, ParseOptions, Value};
pub use usage::format_usage;

use thiserror::Error as ThisError;

/// Any failure from this crate.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Defect in the declarations or parse options.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Input-dependent parse failure.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Convenience alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
