//! Usage string rendering.

use crate::{ArgKind, ArgSpec};

/// Renders the usage string for one declaration.
///
/// The same rendering is embedded in parse error messages, so a failed
/// parse already names the argument the way help output would.
///
/// # Examples
///
/// ```
/// use command_args_core::{ArgSpec, format_usage};
///
/// assert_eq!(format_usage(&ArgSpec::new("output")), "--output <string>");
/// assert_eq!(
///     format_usage(&ArgSpec::new("files").with_alias('f').allow_multiple().fallback()),
///     "[--files | -f] <...string>"
/// );
/// assert_eq!(format_usage(&ArgSpec::rest("passthrough")), "-- <...>");
/// ```
pub fn format_usage(spec: &ArgSpec) -> String {
    if spec.kind.is_rest() {
        return "-- <...>".to_string();
    }

    let mut forms = format!("--{}", spec.name);
    if let Some(alias) = spec.alias {
        forms.push_str(&format!(" | -{alias}"));
    }
    // Optional forms read as bracketed since bare tokens reach them too.
    if spec.default_fallback {
        forms = format!("[{forms}]");
    }

    match &spec.kind {
        ArgKind::Flag => forms,
        kind if spec.multiple => format!("{forms} <...{}>", kind.name()),
        kind => format!("{forms} <{}>", kind.name()),
    }
}
