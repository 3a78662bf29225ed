//! Token scanning and value assignment.
//!
//! [`CommandSpec::parse`] consumes a raw token list and produces a
//! [`ParsedArgs`] mapping, or fails with the first error it encounters.
//! The scan threads a single mutable cursor through the token loop: the
//! "active target", the declaration (if any) expecting the next bare
//! value. It starts out as the registry's default fallback, is pointed at
//! whichever value-taking option was seen last, and is cleared (or, under
//! `sparse`, reset to the fallback) after each scalar assignment.
//!
//! # Examples
//!
//! ```
//! use command_args_core::{ArgSpec, CommandSpec, ParseOptions, Value};
//!
//! let spec = CommandSpec::from_specs([
//!     ArgSpec::flag("verbose").with_alias('v'),
//!     ArgSpec::new("files").allow_multiple().fallback(),
//! ])?;
//!
//! let args = spec.parse(["a.txt", "-v", "b.txt"], ParseOptions::default())?;
//! assert!(args.is_set("verbose"));
//! assert_eq!(
//!     args.get_all("files"),
//!     Some(&[Value::from("a.txt"), Value::from("b.txt")][..])
//! );
//! # Ok::<(), command_args_core::Error>(())
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::usage::format_usage;
use crate::{ArgKind, ArgSpec, CommandSpec, ConfigError, Error, ParseOptions, Value};

/// Input-dependent parse failures.
///
/// Raised from [`CommandSpec::parse`] for anything the supplied token
/// list can get wrong. Messages embed the formatted usage of the
/// offending declaration where one is known, so a CLI shell can print
/// them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Option token whose name or alias is not registered.
    #[error("unknown argument: {0:?}")]
    UnknownArgument(String),
    /// Bare token with no active target to receive it.
    #[error("unexpected argument: {0:?}")]
    UnexpectedArgument(String),
    /// `--` separator with no rest collector registered.
    #[error("unexpected rest arguments")]
    UnexpectedRest,
    /// Scalar argument supplied more than once.
    #[error("duplicate argument: {usage}")]
    DuplicateArgument {
        /// Formatted usage of the offending declaration.
        usage: String,
    },
    /// Flag supplied more than once.
    #[error("duplicate flag: {usage}")]
    DuplicateFlag {
        /// Formatted usage of the offending declaration.
        usage: String,
    },
    /// Long-form flag given an inline `=value`.
    #[error("flags must not have a value: {usage}")]
    FlagWithValue {
        /// Formatted usage of the offending declaration.
        usage: String,
    },
    /// Short-form option given an inline `=value`.
    #[error("short options must not have an inline value: {token:?}")]
    InlineValueNotAllowed {
        /// The offending token.
        token: String,
    },
    /// Multi-alias run containing a non-flag declaration.
    #[error("only flag aliases can be combined: {token:?}")]
    AliasRunNotFlags {
        /// The offending token.
        token: String,
    },
    /// Option named at end of input without a following value.
    #[error("missing value: {usage}")]
    MissingValue {
        /// Formatted usage of the offending declaration.
        usage: String,
    },
    /// Token is not a valid numeric literal.
    #[error("invalid number {value:?}: {usage}")]
    InvalidNumber {
        /// The raw token.
        value: String,
        /// Formatted usage of the offending declaration.
        usage: String,
    },
    /// Custom coercion rejected the token.
    #[error("invalid value {value:?} for {usage}: {message}")]
    InvalidValue {
        /// The raw token.
        value: String,
        /// Formatted usage of the offending declaration.
        usage: String,
        /// Reason supplied by the coercion.
        message: String,
    },
}

/// A parsed value in the result mapping.
///
/// `Single` for scalar assignments (including flags), `Many` for
/// `multiple` declarations and the rest collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// One scalar value.
    Single(Value),
    /// Ordered sequence of values.
    Many(Vec<Value>),
}

impl ArgValue {
    /// Returns the scalar if this is a [`ArgValue::Single`].
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Self::Single(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the sequence if this is a [`ArgValue::Many`].
    pub fn as_many(&self) -> Option<&[Value]> {
        match self {
            Self::Many(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

/// Result of a successful parse: declaration name to value.
///
/// A key is present when the argument was supplied or carries a static
/// default. Each call to [`CommandSpec::parse`] produces a fresh mapping
/// owned by the caller.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgSpec, CommandSpec, ParseOptions};
///
/// let spec = CommandSpec::from_specs([ArgSpec::number("jobs")])?;
/// let args = spec.parse(["--jobs=4"], ParseOptions::default())?;
///
/// assert!(args.contains("jobs"));
/// assert_eq!(args.get_number("jobs"), Some(4.0));
/// assert_eq!(args.len(), 1);
/// # Ok::<(), command_args_core::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedArgs {
    values: HashMap<String, ArgValue>,
}

impl ParsedArgs {
    /// Whether the argument was supplied or defaulted.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The value for an argument, if present.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Scalar string value for an argument.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_single()?.as_str()
    }

    /// Scalar numeric value for an argument.
    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_single()?.as_number()
    }

    /// Whether a flag was set.
    pub fn is_set(&self, name: &str) -> bool {
        matches!(
            self.get(name),
            Some(ArgValue::Single(Value::Bool(true)))
        )
    }

    /// The accumulated sequence for a `multiple` or rest argument.
    pub fn get_all(&self, name: &str) -> Option<&[Value]> {
        self.get(name)?.as_many()
    }

    /// Number of populated arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no argument was populated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over populated `(name, value)` pairs in no defined order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), ArgValue::Single(value));
    }

    fn set_many(&mut self, name: &str, values: Vec<Value>) {
        self.values.insert(name.to_string(), ArgValue::Many(values));
    }

    fn append(&mut self, name: &str, value: Value) {
        // A key is only ever written by the one spec that owns it, so an
        // existing entry here is always Many.
        if let ArgValue::Many(values) = self
            .values
            .entry(name.to_string())
            .or_insert_with(|| ArgValue::Many(Vec::new()))
        {
            values.push(value);
        }
    }
}

impl CommandSpec {
    /// Parses a raw token list against this registry.
    ///
    /// Scanning stops at the first error; under `partial`, unknown and
    /// unexpected tokens are skipped instead of failing. After the scan,
    /// declarations with a static default that never appeared are filled
    /// in.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when `sparse` and `partial` are both requested
    /// (raised before any token is read); [`Error::Parse`] for any
    /// input-dependent failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::{ArgSpec, CommandSpec, Error, ParseError, ParseOptions};
    ///
    /// let spec = CommandSpec::from_specs([ArgSpec::number("jobs")])?;
    ///
    /// let args = spec.parse(["--jobs", "4"], ParseOptions::default())?;
    /// assert_eq!(args.get_number("jobs"), Some(4.0));
    ///
    /// let err = spec.parse(["--jobs", "x"], ParseOptions::default()).unwrap_err();
    /// assert!(matches!(err, Error::Parse(ParseError::InvalidNumber { .. })));
    /// # Ok::<(), command_args_core::Error>(())
    /// ```
    pub fn parse<I, S>(&self, argv: I, options: ParseOptions) -> Result<ParsedArgs, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if options.sparse && options.partial {
            return Err(ConfigError::SparseWithPartial.into());
        }

        let mut args = ParsedArgs::default();
        let mut target = self.fallback_spec();
        let mut tokens = argv.into_iter();

        while let Some(token) = tokens.next() {
            let token = token.as_ref();
            trace!(token, "scanning token");

            // Literal separator: hand the remainder to the rest collector.
            if token == "--" {
                target = None;
                match self.rest_spec() {
                    Some(rest) => {
                        let remainder: Vec<Value> = tokens
                            .by_ref()
                            .map(|token| Value::String(token.as_ref().to_string()))
                            .collect();
                        args.set_many(&rest.name, remainder);
                        break;
                    }
                    None if options.partial => break,
                    None => return Err(ParseError::UnexpectedRest.into()),
                }
            }

            // Long form: --name or --name=value. An empty name (`--=x`)
            // falls outside the grammar and scans as a bare value.
            if let Some(body) = token.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (body, None),
                };
                if !name.is_empty() {
                    // The rest collector is only reachable via the separator.
                    let known = self.get(name).filter(|spec| !spec.kind.is_rest());
                    let Some(spec) = known else {
                        if options.partial {
                            continue;
                        }
                        return Err(ParseError::UnknownArgument(token.to_string()).into());
                    };
                    if spec.kind.is_flag() {
                        if inline.is_some() {
                            return Err(ParseError::FlagWithValue {
                                usage: format_usage(spec),
                            }
                            .into());
                        }
                        self.set_flag(spec, &mut args)?;
                    } else {
                        target = Some(spec);
                        if let Some(value) = inline {
                            self.assign(spec, value, options, &mut args, &mut target)?;
                        }
                    }
                    continue;
                }
            }

            // Short form: -a, -abc.
            if let Some((run, inline)) = short_token(token) {
                let mut resolved: Vec<&ArgSpec> = Vec::new();
                for alias in run.chars() {
                    match self.get_alias(alias).filter(|spec| !spec.kind.is_rest()) {
                        Some(spec) => resolved.push(spec),
                        None if options.partial => {}
                        None => {
                            return Err(ParseError::UnknownArgument(token.to_string()).into());
                        }
                    }
                }
                if resolved.is_empty() {
                    // Only reachable under partial: the whole run was unknown.
                    continue;
                }
                let combined = run.chars().count() > 1;
                if combined && resolved.iter().any(|spec| !spec.kind.is_flag()) {
                    return Err(ParseError::AliasRunNotFlags {
                        token: token.to_string(),
                    }
                    .into());
                }
                if inline.is_some() {
                    return Err(ParseError::InlineValueNotAllowed {
                        token: token.to_string(),
                    }
                    .into());
                }
                if combined || resolved[0].kind.is_flag() {
                    for spec in resolved {
                        self.set_flag(spec, &mut args)?;
                    }
                } else {
                    target = Some(resolved[0]);
                }
                continue;
            }

            // Bare value.
            match target {
                Some(spec) => self.assign(spec, token, options, &mut args, &mut target)?,
                None if options.partial => {}
                None => return Err(ParseError::UnexpectedArgument(token.to_string()).into()),
            }
        }

        // A pending non-fallback scalar target means an option was named
        // without ever receiving its value.
        if let Some(spec) = target {
            if !spec.default_fallback && !spec.multiple && !args.contains(&spec.name) {
                return Err(ParseError::MissingValue {
                    usage: format_usage(spec),
                }
                .into());
            }
        }

        for spec in &self.specs {
            let Some(default) = &spec.default_value else {
                continue;
            };
            if args.contains(&spec.name) {
                continue;
            }
            if spec.multiple {
                args.set_many(&spec.name, vec![default.clone()]);
            } else {
                args.set(&spec.name, default.clone());
            }
        }

        debug!(populated = args.len(), "parse complete");
        Ok(args)
    }

    fn set_flag(&self, spec: &ArgSpec, args: &mut ParsedArgs) -> Result<(), Error> {
        if args.contains(&spec.name) {
            return Err(ParseError::DuplicateFlag {
                usage: format_usage(spec),
            }
            .into());
        }
        args.set(&spec.name, Value::Bool(true));
        Ok(())
    }

    fn assign<'s>(
        &'s self,
        spec: &'s ArgSpec,
        raw: &str,
        options: ParseOptions,
        args: &mut ParsedArgs,
        target: &mut Option<&'s ArgSpec>,
    ) -> Result<(), Error> {
        if spec.multiple {
            args.append(&spec.name, coerce(spec, raw, options)?);
        } else if args.contains(&spec.name) {
            return Err(ParseError::DuplicateArgument {
                usage: format_usage(spec),
            }
            .into());
        } else {
            args.set(&spec.name, coerce(spec, raw, options)?);
            *target = if options.sparse {
                self.fallback_spec()
            } else {
                None
            };
        }
        Ok(())
    }
}

/// Splits a short-form token into its alias run and optional inline value.
///
/// Returns `None` for tokens that do not match the short-form grammar
/// (bare `-`, or a run containing `-`), which then scan as bare values.
fn short_token(token: &str) -> Option<(&str, Option<&str>)> {
    let body = token.strip_prefix('-')?;
    let (run, inline) = match body.split_once('=') {
        Some((run, value)) => (run, Some(value)),
        None => (body, None),
    };
    if run.is_empty() || run.contains('-') {
        return None;
    }
    Some((run, inline))
}

fn coerce(spec: &ArgSpec, raw: &str, options: ParseOptions) -> Result<Value, ParseError> {
    match &spec.kind {
        ArgKind::Number => raw.parse::<f64>().map(Value::Number).map_err(|_| {
            ParseError::InvalidNumber {
                value: raw.to_string(),
                usage: format_usage(spec),
            }
        }),
        ArgKind::Custom(custom) => custom.apply(raw, spec, options),
        // Flags and rest never reach coercion; everything else is a string.
        _ => Ok(Value::String(raw.to_string())),
    }
}
