//! Normalized metric identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label key under which the unit/type of a series is exposed.
pub const TYPE_LABEL: &str = "type";

/// A flat metric name plus an ordered tag set and an optional unit.
///
/// Two identifiers with equal base name, tags and unit denote the same
/// logical series. Tag keys are unique: setting a key twice replaces the
/// earlier value in place, keeping its position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricIdentifier {
    base_name: String,
    tags: Vec<(String, String)>,
    unit: Option<String>,
}

impl MetricIdentifier {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            tags: Vec::new(),
            unit: None,
        }
    }

    /// Add (or replace) a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.tags.push((key, value)),
        }
        self
    }

    /// Set the unit/type of the series (`used`, `count`, `peakCount`, ...).
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// All exposition labels: the tags in order, then `type=<unit>`.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(self.unit.as_deref().map(|u| (TYPE_LABEL, u)))
    }
}

impl fmt::Display for MetricIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_name)?;
        let mut labels = self.labels().peekable();
        if labels.peek().is_none() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, (k, v)) in labels.enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}
