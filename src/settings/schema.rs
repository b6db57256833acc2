use std::collections::BTreeMap;
use std::fmt;

use crate::foundation::error::{PeakformError, PeakformResult};

/// A raw settings value as it arrives from a caller (typically JSON).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for SettingValue {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Declared element kind of a settings field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Text => "text",
        }
    }
}

/// Closed set of legal values for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Allowed {
    Integers(&'static [i64]),
    Texts(&'static [&'static str]),
}

impl Allowed {
    fn contains(self, value: &SettingValue) -> bool {
        match (self, value) {
            (Self::Integers(list), SettingValue::Integer(v)) => list.contains(v),
            (Self::Texts(list), SettingValue::Text(s)) => list.contains(&s.as_str()),
            _ => false,
        }
    }

    fn describe(self) -> String {
        match self {
            Self::Integers(list) => list
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            Self::Texts(list) => list.join(", "),
        }
    }
}

/// Validation rule for one settings field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub required: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub allowed: Option<Allowed>,
}

impl FieldRule {
    pub const fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub const fn text() -> Self {
        Self::of(FieldKind::Text)
    }

    const fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            min: None,
            max: None,
            allowed: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub const fn allowed_integers(mut self, values: &'static [i64]) -> Self {
        self.allowed = Some(Allowed::Integers(values));
        self
    }

    pub const fn allowed_texts(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = Some(Allowed::Texts(values));
        self
    }

    /// Coerce `value` to this rule's kind and check min, max and allowed, in that order.
    pub fn check(&self, field: &str, value: &SettingValue) -> PeakformResult<SettingValue> {
        let value = self.coerce(field, value)?;

        if let (Some(min), SettingValue::Integer(v)) = (self.min, &value)
            && *v < min
        {
            return Err(PeakformError::BelowMinimum {
                field: field.to_string(),
                value: *v,
                min,
            });
        }
        if let (Some(max), SettingValue::Integer(v)) = (self.max, &value)
            && *v > max
        {
            return Err(PeakformError::AboveMaximum {
                field: field.to_string(),
                value: *v,
                max,
            });
        }
        if let Some(allowed) = self.allowed
            && !allowed.contains(&value)
        {
            return Err(PeakformError::NotAllowed {
                field: field.to_string(),
                value: value.to_string(),
                allowed: allowed.describe(),
            });
        }
        Ok(value)
    }

    fn coerce(&self, field: &str, value: &SettingValue) -> PeakformResult<SettingValue> {
        let coerced = match (self.kind, value) {
            (FieldKind::Integer, SettingValue::Integer(v)) => Some(*v),
            (FieldKind::Integer, SettingValue::Float(f))
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 =>
            {
                Some(*f as i64)
            }
            (FieldKind::Integer, SettingValue::Text(s)) => s.trim().parse::<i64>().ok(),
            (FieldKind::Text, SettingValue::Text(s)) => {
                return Ok(SettingValue::Text(s.clone()));
            }
            (FieldKind::Text, SettingValue::Integer(v)) => {
                return Ok(SettingValue::Text(v.to_string()));
            }
            _ => None,
        };
        coerced
            .map(SettingValue::Integer)
            .ok_or_else(|| PeakformError::TypeMismatch {
                field: field.to_string(),
                expected: self.kind.name(),
                value: value.to_string(),
            })
    }
}

/// A settings instance: field name to raw value.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, SettingValue>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Integer value of `key`, if present and already an integer.
    pub fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(SettingValue::as_integer)
    }

    /// Text value of `key`, if present and already text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SettingValue::as_text)
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Statically declared table of settings fields for one endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schema {
    name: &'static str,
    fields: &'static [(&'static str, FieldRule)],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [(&'static str, FieldRule)]) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &'static FieldRule)> {
        self.fields.iter().map(|(name, rule)| (*name, rule))
    }

    pub fn rule(&self, field: &str) -> Option<&'static FieldRule> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, rule)| rule)
    }

    /// Validate `settings` against this schema.
    pub fn validate(&self, settings: &Settings) -> PeakformResult<()> {
        self.coerce(settings).map(|_| ())
    }

    /// Validate `settings` and return a copy holding the coerced values.
    pub fn coerce(&self, settings: &Settings) -> PeakformResult<Settings> {
        // Unknown keys are reported before any value is looked at.
        if let Some((key, _)) = settings.iter().find(|(k, _)| self.rule(k).is_none()) {
            return Err(PeakformError::UnknownField {
                schema: self.name,
                field: key.to_string(),
            });
        }

        let mut out = Settings::new();
        for (key, value) in settings.iter() {
            if let Some(rule) = self.rule(key) {
                out.insert(key, rule.check(key, value)?);
            }
        }

        if let Some((name, _)) = self
            .fields
            .iter()
            .find(|(name, rule)| rule.required && !out.contains_key(name))
        {
            return Err(PeakformError::MissingRequired {
                schema: self.name,
                field: name.to_string(),
            });
        }
        Ok(out)
    }

    /// Build a settings instance from pairs and validate it in one step.
    pub fn create<I, K, V>(&self, pairs: I) -> PeakformResult<Settings>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SettingValue>,
    {
        self.coerce(&pairs.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/settings/schema.rs"]
mod tests;
