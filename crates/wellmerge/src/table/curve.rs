//! A single named curve: values along depth plus unit metadata.

/// A named series of measurements aligned to a table's depth index.
///
/// Values are `Some(finite)` or `None` (the null marker). Non-finite inputs
/// are normalized to `None` when the curve is built, so a `Curve` never holds
/// NaN or infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    name: String,
    unit: String,
    description: Option<String>,
    values: Vec<Option<f64>>,
}

impl Curve {
    /// Create a curve from optional values.
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values.into_iter().map(|v| v.filter(|x| x.is_finite())).collect();
        Self {
            name: name.into(),
            unit: String::new(),
            description: None,
            values,
        }
    }

    /// Create a curve from raw readings, where NaN and infinities are null.
    pub fn from_readings(name: impl Into<String>, readings: &[f64]) -> Self {
        Self::new(name, readings.iter().map(|&v| Some(v)).collect())
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Values aligned to the owning table's depth index.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of non-null values.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}
