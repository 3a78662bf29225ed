//! Argument spec type definitions.
//!
//! This module defines the data model for declaring arguments: [`ArgSpec`]
//! (one declaration), [`ArgKind`] (what kind of value it accepts),
//! [`Value`] (a pre-typed scalar), and [`ParseOptions`] (per-call parse
//! behavior). The built-in types are designed for serialization with
//! [`serde`] so a declaration list can be loaded from static config.

use std::fmt;
use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ParseError;

/// A pre-typed scalar value.
///
/// Used for static defaults on an [`ArgSpec`] and for the values produced
/// by parsing. Serializes untagged, so JSON `true`, `42` and `"x"` map to
/// the matching variant.
///
/// # Examples
///
/// ```
/// use command_args_core::Value;
///
/// let v: Value = serde_json::from_str("42").unwrap();
/// assert_eq!(v, Value::Number(42.0));
/// assert_eq!(v.as_number(), Some(42.0));
/// assert_eq!(Value::from("x").as_str(), Some("x"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean, produced by flags.
    Bool(bool),
    /// Numeric value, produced by `number` and custom coercions.
    Number(f64),
    /// Plain string, the default for bare values.
    String(String),
}

impl Value {
    /// Returns the boolean if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if this is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Signature of a custom coercion function.
pub type CoerceFn = dyn Fn(&str, &ArgSpec, ParseOptions) -> Result<Value, ParseError> + Send + Sync;

/// A custom value coercion with a display name.
///
/// The coercion receives the raw token, the declaration it is being
/// assigned to, and the active [`ParseOptions`], and either produces a
/// [`Value`] or fails with a [`ParseError`]. The display name is what the
/// usage formatter renders as the value placeholder.
#[derive(Clone)]
pub struct CustomKind {
    name: String,
    coerce: Arc<CoerceFn>,
}

impl CustomKind {
    /// Creates a custom kind from a display name and a coercion function.
    pub fn new<F>(name: &str, coerce: F) -> Self
    where
        F: Fn(&str, &ArgSpec, ParseOptions) -> Result<Value, ParseError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            coerce: Arc::new(coerce),
        }
    }

    /// The display name used in usage strings.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn apply(
        &self,
        raw: &str,
        spec: &ArgSpec,
        options: ParseOptions,
    ) -> Result<Value, ParseError> {
        (self.coerce)(raw, spec, options)
    }
}

impl fmt::Debug for CustomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomKind").field("name", &self.name).finish()
    }
}

impl PartialEq for CustomKind {
    fn eq(&self, other: &Self) -> bool {
        // Same display name is not enough; the coercion function itself
        // must be shared.
        self.name == other.name && Arc::ptr_eq(&self.coerce, &other.coerce)
    }
}

/// Kind of value an argument accepts.
///
/// Serializes as its kind name. Only the built-in kinds deserialize;
/// custom coercions can only be attached programmatically.
///
/// # Examples
///
/// ```
/// use command_args_core::ArgKind;
///
/// let kind: ArgKind = serde_json::from_str("\"number\"").unwrap();
/// assert_eq!(kind, ArgKind::Number);
/// assert_eq!(kind.name(), "number");
/// assert!(serde_json::from_str::<ArgKind>("\"color\"").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ArgKind {
    /// Plain string value (the default).
    #[default]
    String,
    /// Numeric value; tokens that are not valid numbers fail the parse.
    Number,
    /// Boolean presence, never carries a value.
    Flag,
    /// Collects every token after the literal `--` separator.
    Rest,
    /// Custom coercion with a display name.
    Custom(CustomKind),
}

impl ArgKind {
    /// The kind name as rendered in usage strings.
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Flag => "flag",
            Self::Rest => "rest",
            Self::Custom(custom) => custom.name(),
        }
    }

    /// Whether this is the boolean-presence kind.
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag)
    }

    /// Whether this is the rest collector kind.
    pub fn is_rest(&self) -> bool {
        matches!(self, Self::Rest)
    }
}

impl Serialize for ArgKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ArgKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "flag" => Ok(Self::Flag),
            "rest" => Ok(Self::Rest),
            other => Err(D::Error::unknown_variant(
                other,
                &["string", "number", "flag", "rest"],
            )),
        }
    }
}

/// One argument declaration.
///
/// The name doubles as the long-form token (`--name`) and as the result
/// key. The optional alias is the short form (`-a`); being a `char`, it is
/// always exactly one character. Use the constructors
/// ([`new`](ArgSpec::new), [`number`](ArgSpec::number),
/// [`flag`](ArgSpec::flag), [`rest`](ArgSpec::rest),
/// [`custom`](ArgSpec::custom)) and chain the builder methods.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgKind, ArgSpec};
///
/// let output = ArgSpec::new("output").with_alias('o');
/// assert_eq!(output.kind, ArgKind::String);
/// assert_eq!(output.alias, Some('o'));
///
/// let files = ArgSpec::new("files").allow_multiple().fallback();
/// assert!(files.multiple);
/// assert!(files.default_fallback);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    /// Argument name; must have at least one character.
    pub name: String,
    /// Single-character short form, combinable with other flag aliases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<char>,
    /// Kind of value this argument accepts.
    #[serde(default)]
    pub kind: ArgKind,
    /// Fallback used only when the argument never appears.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Whether repeated occurrences accumulate into a sequence.
    #[serde(default)]
    pub multiple: bool,
    /// Whether unlabelled bare tokens are attributed to this argument.
    #[serde(default)]
    pub default_fallback: bool,
}

impl ArgSpec {
    /// Creates a string argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::{ArgKind, ArgSpec};
    ///
    /// let spec = ArgSpec::new("output");
    /// assert_eq!(spec.name, "output");
    /// assert_eq!(spec.kind, ArgKind::String);
    /// assert!(!spec.multiple);
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            kind: ArgKind::String,
            default_value: None,
            multiple: false,
            default_fallback: false,
        }
    }

    /// Creates a number argument.
    pub fn number(name: &str) -> Self {
        Self {
            kind: ArgKind::Number,
            ..Self::new(name)
        }
    }

    /// Creates a boolean flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::ArgSpec;
    ///
    /// let spec = ArgSpec::flag("verbose").with_alias('v');
    /// assert!(spec.kind.is_flag());
    /// ```
    pub fn flag(name: &str) -> Self {
        Self {
            kind: ArgKind::Flag,
            ..Self::new(name)
        }
    }

    /// Creates a rest collector, capturing everything after `--`.
    pub fn rest(name: &str) -> Self {
        Self {
            kind: ArgKind::Rest,
            ..Self::new(name)
        }
    }

    /// Creates an argument with a custom coercion.
    ///
    /// `kind` is the display name used in usage strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::{ArgSpec, ParseError, Value, format_usage};
    ///
    /// let spec = ArgSpec::custom("port", "port", |raw, spec, _options| {
    ///     raw.parse::<u16>()
    ///         .map(|port| Value::Number(f64::from(port)))
    ///         .map_err(|_| ParseError::InvalidValue {
    ///             value: raw.to_string(),
    ///             usage: format_usage(spec),
    ///             message: "expected a port number".to_string(),
    ///         })
    /// });
    /// assert_eq!(format_usage(&spec), "--port <port>");
    /// ```
    pub fn custom<F>(name: &str, kind: &str, coerce: F) -> Self
    where
        F: Fn(&str, &ArgSpec, ParseOptions) -> Result<Value, ParseError> + Send + Sync + 'static,
    {
        Self {
            kind: ArgKind::Custom(CustomKind::new(kind, coerce)),
            ..Self::new(name)
        }
    }

    /// Sets the single-character short form.
    pub fn with_alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Sets the static default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Marks as accumulating repeated occurrences in order.
    pub fn allow_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Marks as the target for unlabelled bare tokens.
    pub fn fallback(mut self) -> Self {
        self.default_fallback = true;
        self
    }
}

/// Per-call parse behavior.
///
/// `sparse` reinstates the default fallback as the active target after
/// every scalar assignment; `partial` skips unknown and unexpected tokens
/// instead of failing. The two are mutually exclusive; requesting both is
/// a configuration error.
///
/// # Examples
///
/// ```
/// use command_args_core::ParseOptions;
///
/// assert_eq!(ParseOptions::default(), ParseOptions { sparse: false, partial: false });
/// assert!(ParseOptions::sparse().sparse);
/// assert!(ParseOptions::partial().partial);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Reinstate the default fallback after each scalar assignment.
    pub sparse: bool,
    /// Skip unknown/unexpected tokens instead of failing.
    pub partial: bool,
}

impl ParseOptions {
    /// Options with `sparse` set.
    pub fn sparse() -> Self {
        Self {
            sparse: true,
            ..Self::default()
        }
    }

    /// Options with `partial` set.
    pub fn partial() -> Self {
        Self {
            partial: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(2), Value::Number(2.0));
        assert_eq!(Value::from(2.5), Value::Number(2.5));
        assert_eq!(Value::from("x"), Value::String("x".to_string()));
        assert_eq!(Value::from(42.0).as_number(), Some(42.0));
        assert_eq!(Value::from("x").as_number(), None);
        assert_eq!(Value::from(true).as_bool(), Some(true));
    }

    #[test]
    fn test_value_serde_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[true, 42, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Bool(true), Value::Number(42.0), Value::from("x")]
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ArgKind::String.name(), "string");
        assert_eq!(ArgKind::Number.name(), "number");
        assert_eq!(ArgKind::Flag.name(), "flag");
        assert_eq!(ArgKind::Rest.name(), "rest");

        let custom = ArgKind::Custom(CustomKind::new("port", |raw, _, _| Ok(Value::from(raw))));
        assert_eq!(custom.name(), "port");
    }

    #[test]
    fn test_kind_serde_builtin_only() {
        assert_eq!(
            serde_json::to_string(&ArgKind::Number).unwrap(),
            "\"number\""
        );
        assert_eq!(
            serde_json::from_str::<ArgKind>("\"rest\"").unwrap(),
            ArgKind::Rest
        );
        assert!(serde_json::from_str::<ArgKind>("\"color\"").is_err());
    }

    #[test]
    fn test_custom_kind_equality_is_by_function() {
        let a = CustomKind::new("port", |raw, _, _| Ok(Value::from(raw)));
        let b = CustomKind::new("port", |raw, _, _| Ok(Value::from(raw)));
        assert_ne!(ArgKind::Custom(a.clone()), ArgKind::Custom(b));
        assert_eq!(ArgKind::Custom(a.clone()), ArgKind::Custom(a));
    }

    #[test]
    fn test_spec_builders() {
        let spec = ArgSpec::number("jobs").with_alias('j').with_default(1);
        assert_eq!(spec.kind, ArgKind::Number);
        assert_eq!(spec.alias, Some('j'));
        assert_eq!(spec.default_value, Some(Value::Number(1.0)));

        let files = ArgSpec::new("files").allow_multiple().fallback();
        assert!(files.multiple);
        assert!(files.default_fallback);
    }

    #[test]
    fn test_spec_deserializes_from_config() {
        let json = r#"{
            "name": "jobs",
            "alias": "j",
            "kind": "number",
            "default_value": 2
        }"#;
        let spec: ArgSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, ArgSpec::number("jobs").with_alias('j').with_default(2));
    }

    #[test]
    fn test_options_serde_defaults() {
        let options: ParseOptions = serde_json::from_str(r#"{"sparse": true}"#).unwrap();
        assert_eq!(options, ParseOptions::sparse());
    }
}
