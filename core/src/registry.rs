//! Spec registry: validated argument declarations indexed for parsing.
//!
//! [`CommandSpec`] holds the declarations a command accepts. Each
//! [`add`](CommandSpec::add) validates the incoming [`ArgSpec`] against
//! the registry-wide invariants (unique names and aliases, at most one
//! default fallback, at most one rest collector) before indexing it.
//! Violations are [`ConfigError`]s: they indicate a defect in the calling
//! code, never bad user input.
//!
//! # Examples
//!
//! ```
//! use command_args_core::{ArgSpec, CommandSpec, ConfigError};
//!
//! let mut spec = CommandSpec::new();
//! spec.add(ArgSpec::new("output").with_alias('o'))?
//!     .add(ArgSpec::flag("verbose").with_alias('v'))?;
//!
//! assert_eq!(spec.len(), 2);
//! assert!(spec.get("output").is_some());
//! assert!(spec.get_alias('v').is_some());
//! # Ok::<(), ConfigError>(())
//! ```

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::ArgSpec;

/// Declaration registration errors.
///
/// Raised only from [`CommandSpec::add`] or from passing an incompatible
/// option pair to [`parse`](CommandSpec::parse). Always a programming
/// error in the caller, as opposed to the input-dependent
/// [`ParseError`](crate::ParseError).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Declaration name is empty.
    #[error("spec name must have at least one character")]
    EmptyName,
    /// Alias is the option prefix character itself.
    #[error("spec alias must not be \"-\"")]
    ReservedAlias,
    /// `multiple` or `default_fallback` combined with a flag or rest kind.
    #[error("multiple and default_fallback cannot be used with kind \"{kind}\": {name:?}")]
    IncompatibleKind {
        /// Name of the offending declaration.
        name: String,
        /// Kind name of the offending declaration.
        kind: String,
    },
    /// Declaration name is already registered to a different spec.
    #[error("spec name is already used: {0:?}")]
    DuplicateName(String),
    /// Alias is already registered to another spec.
    #[error("spec alias is already used: {0:?}")]
    DuplicateAlias(char),
    /// A default fallback declaration is already registered.
    #[error("default_fallback can only be used by one spec: {0:?}")]
    DuplicateFallback(String),
    /// A rest collector is already registered.
    #[error("kind \"rest\" can only be used by one spec: {0:?}")]
    DuplicateRest(String),
    /// `sparse` and `partial` requested together.
    #[error("options sparse and partial cannot be combined")]
    SparseWithPartial,
}

/// Registry of argument declarations for one command.
///
/// Built once, typically at process start, then shared read-only across
/// any number of [`parse`](CommandSpec::parse) calls; parsing never
/// mutates the registry, so `&CommandSpec` is safe to share across
/// threads.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgSpec, CommandSpec, ParseOptions};
///
/// let spec = CommandSpec::from_specs([
///     ArgSpec::new("output").with_alias('o'),
///     ArgSpec::flag("verbose").with_alias('v'),
///     ArgSpec::number("jobs").with_default(1),
/// ])?;
///
/// let args = spec.parse(["-v", "--output", "out.txt"], ParseOptions::default())?;
/// assert!(args.is_set("verbose"));
/// assert_eq!(args.get_str("output"), Some("out.txt"));
/// assert_eq!(args.get_number("jobs"), Some(1.0));
/// # Ok::<(), command_args_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub(crate) specs: Vec<ArgSpec>,
    names: HashMap<String, usize>,
    aliases: HashMap<char, usize>,
    fallback: Option<usize>,
    rest: Option<usize>,
}

impl CommandSpec {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a declaration list.
    ///
    /// The list is added in order, so iteration order matches. This is the
    /// natural entry point for declarations loaded from config:
    ///
    /// ```
    /// use command_args_core::{ArgSpec, CommandSpec};
    ///
    /// let specs: Vec<ArgSpec> = serde_json::from_str(
    ///     r#"[
    ///         {"name": "jobs", "kind": "number", "default_value": 2},
    ///         {"name": "files", "multiple": true, "default_fallback": true}
    ///     ]"#,
    /// ).unwrap();
    /// let spec = CommandSpec::from_specs(specs)?;
    /// assert_eq!(spec.len(), 2);
    /// # Ok::<(), command_args_core::ConfigError>(())
    /// ```
    pub fn from_specs<I>(specs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ArgSpec>,
    {
        let mut registry = Self::new();
        for spec in specs {
            registry.add(spec)?;
        }
        Ok(registry)
    }

    /// Registers a declaration.
    ///
    /// Returns `&mut Self` so calls can be chained. Re-adding a spec that
    /// is operationally identical to the one already registered under the
    /// same name succeeds silently; registering a different spec under an
    /// existing name fails.
    ///
    /// # Errors
    ///
    /// A [`ConfigError`] naming the violated invariant.
    pub fn add(&mut self, spec: ArgSpec) -> Result<&mut Self, ConfigError> {
        if spec.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if spec.alias == Some('-') {
            return Err(ConfigError::ReservedAlias);
        }
        if (spec.kind.is_flag() || spec.kind.is_rest()) && (spec.multiple || spec.default_fallback)
        {
            return Err(ConfigError::IncompatibleKind {
                name: spec.name.clone(),
                kind: spec.kind.name().to_string(),
            });
        }

        if let Some(&existing) = self.names.get(&spec.name) {
            if self.specs[existing] == spec {
                return Ok(self);
            }
            return Err(ConfigError::DuplicateName(spec.name));
        }
        if let Some(alias) = spec.alias {
            if self.aliases.contains_key(&alias) {
                return Err(ConfigError::DuplicateAlias(alias));
            }
        }
        if spec.default_fallback && self.fallback.is_some() {
            return Err(ConfigError::DuplicateFallback(spec.name));
        }
        if spec.kind.is_rest() && self.rest.is_some() {
            return Err(ConfigError::DuplicateRest(spec.name));
        }

        let index = self.specs.len();
        self.names.insert(spec.name.clone(), index);
        if let Some(alias) = spec.alias {
            self.aliases.insert(alias, index);
        }
        if spec.default_fallback {
            self.fallback = Some(index);
        }
        if spec.kind.is_rest() {
            self.rest = Some(index);
        }
        debug!(name = %spec.name, kind = spec.kind.name(), "registered argument spec");
        self.specs.push(spec);
        Ok(self)
    }

    /// Looks up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&ArgSpec> {
        self.names.get(name).map(|&index| &self.specs[index])
    }

    /// Looks up a declaration by alias.
    pub fn get_alias(&self, alias: char) -> Option<&ArgSpec> {
        self.aliases.get(&alias).map(|&index| &self.specs[index])
    }

    /// The declaration receiving unlabelled bare tokens, if any.
    pub fn fallback_spec(&self) -> Option<&ArgSpec> {
        self.fallback.map(|index| &self.specs[index])
    }

    /// The rest collector declaration, if any.
    pub fn rest_spec(&self) -> Option<&ArgSpec> {
        self.rest.map(|index| &self.specs[index])
    }

    /// Number of registered declarations.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry has no declarations.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterates over declarations in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ArgSpec> {
        self.specs.iter()
    }
}

impl<'a> IntoIterator for &'a CommandSpec {
    type Item = &'a ArgSpec;
    type IntoIter = std::slice::Iter<'a, ArgSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}
