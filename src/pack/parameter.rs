//! Packer parameters forwarded verbatim to the external tool.
//!
//! A [`Parameter`] is one `--name arg1 arg2 ...` flag group. A
//! [`ParameterSet`] keeps them in registration order, which is also the
//! order they appear on the generated command line.

/// Flag names the engine always emits itself.
pub const RESERVED_NAMES: &[&str] = &["sheet", "data"];

/// One named flag group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    args: Vec<String>,
}

impl Parameter {
    /// Create a parameter with already-normalized name and args.
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self { name: name.into(), args }
    }

    /// Flag name without the leading `--`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments emitted after the flag, in declared order.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Ordered, append-only collection of parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter.
    ///
    /// Underscores in `name` are rewritten to dashes, so `trim_mode` becomes
    /// `--trim-mode`. Names that are empty or that resolve to `sheet` or
    /// `data` are silently ignored: those flags are generated per directory
    /// by the engine. Returns whether the parameter was added.
    ///
    /// Arguments of any `Display` type are converted to strings here, once.
    pub fn add<I>(&mut self, name: &str, args: I) -> bool
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let name = normalize_name(name);
        if !is_accepted_name(&name) {
            return false;
        }
        let args = args.into_iter().map(|a| a.to_string()).collect();
        self.parameters.push(Parameter::new(name, args));
        true
    }

    /// Append every parameter of `other`, keeping its order.
    pub fn extend_from(&mut self, other: &ParameterSet) {
        self.parameters.extend(other.parameters.iter().cloned());
    }

    /// Iterate parameters in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether no parameters are registered.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Rewrite an identifier-style name into the tool's flag spelling.
pub fn normalize_name(name: &str) -> String {
    name.trim().replace('_', "-")
}

/// Whether a normalized name may be registered.
pub fn is_accepted_name(name: &str) -> bool {
    !name.is_empty() && !RESERVED_NAMES.contains(&name)
}
