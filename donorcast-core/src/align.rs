//! Alignment of raw records onto the fixed feature schema
//!
//! A raw record is the sparse, human-readable form of one individual
//! (14 named fields). Alignment produces the dense 123-slot vector the
//! classifier expects: direct slots carry the numeric value, one-hot slots
//! carry 1 for the matching category. Slots never shrink or reorder, so the
//! output always lines up with the training columns.

use crate::error::{DonorcastError, Result};
use crate::schema::Schema;
use ndarray::Array2;
use serde_json::Value;
use tracing::{debug, warn};

/// A single field value from a raw record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view, for direct slots
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// Category key used for one-hot matching. Integer-valued numbers use
    /// their canonical integer form ("13", never "13.0"), matching how the
    /// training-time dummy columns were named.
    pub fn category_key(&self) -> String {
        match self {
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    format!("{}", *v as i64)
                } else {
                    format!("{}", v)
                }
            }
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// Sparse representation of one individual: field name -> value.
///
/// Parsed from a JSON object; extra fields (including the `income` label)
/// are carried along and ignored at alignment time.
#[derive(Debug, Clone)]
pub struct RawRecord {
    fields: Vec<(String, FieldValue)>,
}

impl RawRecord {
    /// Build a record from field/value pairs
    pub fn new(fields: Vec<(String, FieldValue)>) -> Self {
        Self { fields }
    }

    /// Parse a record from a JSON object string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Build a record from a parsed JSON value
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            DonorcastError::DataError("expected a JSON object describing one individual".to_string())
        })?;

        let mut fields = Vec::with_capacity(obj.len());
        for (name, v) in obj {
            let field_value = match v {
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        FieldValue::Int(i)
                    } else if let Some(f) = n.as_f64() {
                        FieldValue::Float(f)
                    } else {
                        return Err(DonorcastError::DataError(format!(
                            "field '{}' has an unrepresentable number",
                            name
                        )));
                    }
                }
                Value::String(s) => FieldValue::Text(s.clone()),
                other => {
                    return Err(DonorcastError::DataError(format!(
                        "field '{}' has unsupported value {}",
                        name, other
                    )));
                }
            };
            fields.push((name.clone(), field_value));
        }

        Ok(Self { fields })
    }

    /// Value of a field by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// All field/value pairs in record order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Dense feature vector aligned to a schema.
///
/// Holds exactly one value per slot, in slot order, zero unless set.
#[derive(Debug, Clone)]
pub struct FeatureVector<'s> {
    schema: &'s Schema,
    values: Vec<f64>,
}

impl<'s> FeatureVector<'s> {
    fn zeros(schema: &'s Schema) -> Self {
        Self {
            schema,
            values: vec![0.0; schema.len()],
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a slot by its full name
    pub fn get(&self, slot_name: &str) -> Option<f64> {
        self.schema.index_of(slot_name).map(|i| self.values[i])
    }

    /// All values in slot order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The vector as a 1-row matrix for the classifier
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_vec((1, self.values.len()), self.values.clone())
            .expect("vector length matches its own shape")
    }
}

/// Converts raw records into schema-aligned feature vectors.
///
/// Pure transformation: the schema is read-only and every call starts from
/// a fresh zeroed vector, so aligning the same record twice yields identical
/// output.
#[derive(Debug, Clone)]
pub struct FeatureAligner {
    schema: Schema,
}

impl FeatureAligner {
    /// Create an aligner over a schema
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Aligner over the census-income schema
    pub fn adult() -> Self {
        Self::new(Schema::adult())
    }

    /// The underlying schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Align a raw record onto the schema.
    ///
    /// Every schema field must be present in the record; a missing field
    /// would leave its slots silently at 0 and corrupt the prediction, so
    /// it fails fast instead. An unseen category for a known field is
    /// logged and leaves that field's slots at 0.
    pub fn align<'s>(&'s self, record: &RawRecord) -> Result<FeatureVector<'s>> {
        for field in self.schema.field_names() {
            if record.get(field).is_none() {
                return Err(DonorcastError::MissingRequiredField(field.clone()));
            }
        }

        let mut vector = FeatureVector::zeros(&self.schema);

        for (field, value) in record.fields() {
            if let Some(idx) = self.schema.direct_slot(field) {
                let numeric = value.as_f64().ok_or_else(|| {
                    DonorcastError::DataError(format!(
                        "field '{}' must be numeric, got '{}'",
                        field,
                        value.category_key()
                    ))
                })?;
                vector.values[idx] = numeric;
            } else if let Some(idx) = self.schema.one_hot_slot(field, &value.category_key()) {
                vector.values[idx] = 1.0;
            } else if self.schema.is_categorical_field(field) {
                warn!(
                    field,
                    category = %value.category_key(),
                    "unknown category, leaving indicator slots at 0"
                );
            } else {
                // Label or stray field: not part of the feature layout.
                debug!(field, "ignoring field with no slot");
            }
        }

        Ok(vector)
    }
}
