//! Fixed feature schema for the census-income classifier
//!
//! The classifier was trained on a one-hot expansion of the census columns,
//! so inference inputs must reproduce that exact column set and ordering.
//! The slot table below is that training-time layout: five numeric columns
//! copied verbatim, followed by one 0/1 column per (field, category) pair.

use std::collections::HashMap;

/// Numeric fields whose values are copied into the vector unchanged.
const DIRECT_FIELDS: &[&str] = &["age", "fnlwgt", "capital-gain", "capital-loss", "hours-per-week"];

const WORKCLASS: &[&str] = &[
    "?",
    "Federal-gov",
    "Local-gov",
    "Never-worked",
    "Private",
    "Self-emp-inc",
    "Self-emp-not-inc",
    "State-gov",
    "Without-pay",
];

const EDUCATION: &[&str] = &[
    "10th",
    "11th",
    "12th",
    "1st-4th",
    "5th-6th",
    "7th-8th",
    "9th",
    "Assoc-acdm",
    "Assoc-voc",
    "Bachelors",
    "Doctorate",
    "HS-grad",
    "Masters",
    "Preschool",
    "Prof-school",
    "Some-college",
];

// education-num is categorical in the trained layout: one column per level,
// named by the integer value, in numeric order.
const EDUCATION_NUM: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16",
];

const MARITAL_STATUS: &[&str] = &[
    "Divorced",
    "Married-AF-spouse",
    "Married-civ-spouse",
    "Married-spouse-absent",
    "Never-married",
    "Separated",
    "Widowed",
];

const OCCUPATION: &[&str] = &[
    "?",
    "Adm-clerical",
    "Armed-Forces",
    "Craft-repair",
    "Exec-managerial",
    "Farming-fishing",
    "Handlers-cleaners",
    "Machine-op-inspct",
    "Other-service",
    "Priv-house-serv",
    "Prof-specialty",
    "Protective-serv",
    "Sales",
    "Tech-support",
    "Transport-moving",
];

const RELATIONSHIP: &[&str] = &[
    "Husband",
    "Not-in-family",
    "Other-relative",
    "Own-child",
    "Unmarried",
    "Wife",
];

const RACE: &[&str] = &[
    "Amer-Indian-Eskimo",
    "Asian-Pac-Islander",
    "Black",
    "Other",
    "White",
];

const SEX: &[&str] = &["Female", "Male"];

const NATIVE_COUNTRY: &[&str] = &[
    "?",
    "Cambodia",
    "Canada",
    "China",
    "Columbia",
    "Cuba",
    "Dominican-Republic",
    "Ecuador",
    "El-Salvador",
    "England",
    "France",
    "Germany",
    "Greece",
    "Guatemala",
    "Haiti",
    "Holand-Netherlands",
    "Honduras",
    "Hong",
    "Hungary",
    "India",
    "Iran",
    "Ireland",
    "Italy",
    "Jamaica",
    "Japan",
    "Laos",
    "Mexico",
    "Nicaragua",
    "Outlying-US(Guam-USVI-etc)",
    "Peru",
    "Philippines",
    "Poland",
    "Portugal",
    "Puerto-Rico",
    "Scotland",
    "South",
    "Taiwan",
    "Thailand",
    "Trinadad&Tobago",
    "United-States",
    "Vietnam",
    "Yugoslavia",
];

/// Categorical fields in schema order, each with its trained category set.
const CATEGORICAL_FIELDS: &[(&str, &[&str])] = &[
    ("workclass", WORKCLASS),
    ("education", EDUCATION),
    ("education-num", EDUCATION_NUM),
    ("marital-status", MARITAL_STATUS),
    ("occupation", OCCUPATION),
    ("relationship", RELATIONSHIP),
    ("race", RACE),
    ("sex", SEX),
    ("native-country", NATIVE_COUNTRY),
];

/// Kind of a feature slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotKind {
    /// Numeric field copied verbatim
    Direct { field: String },
    /// 0/1 indicator for one category of one field
    OneHot { field: String, category: String },
}

/// One named slot of the feature vector
#[derive(Debug, Clone)]
pub struct Slot {
    pub name: String,
    pub kind: SlotKind,
}

/// The ordered slot set expected by the trained classifier.
///
/// Built once; lookups go through precomputed maps so that an unseen
/// category is an explicit miss rather than a failed string comparison.
#[derive(Debug, Clone)]
pub struct Schema {
    slots: Vec<Slot>,
    direct_index: HashMap<String, usize>,
    one_hot_index: HashMap<(String, String), usize>,
    field_names: Vec<String>,
    categorical_fields: Vec<String>,
}

impl Schema {
    /// The census-income schema: 5 direct slots followed by 118 one-hot
    /// slots, in training order.
    pub fn adult() -> Self {
        let mut slots = Vec::new();
        let mut direct_index = HashMap::new();
        let mut one_hot_index = HashMap::new();
        let mut field_names = Vec::new();

        for &field in DIRECT_FIELDS {
            direct_index.insert(field.to_string(), slots.len());
            field_names.push(field.to_string());
            slots.push(Slot {
                name: field.to_string(),
                kind: SlotKind::Direct {
                    field: field.to_string(),
                },
            });
        }

        let mut categorical_fields = Vec::new();
        for &(field, categories) in CATEGORICAL_FIELDS {
            field_names.push(field.to_string());
            categorical_fields.push(field.to_string());
            for &category in categories {
                one_hot_index.insert(
                    (field.to_string(), category.to_string()),
                    slots.len(),
                );
                slots.push(Slot {
                    name: format!("{}_{}", field, category),
                    kind: SlotKind::OneHot {
                        field: field.to_string(),
                        category: category.to_string(),
                    },
                });
            }
        }

        Self {
            slots,
            direct_index,
            one_hot_index,
            field_names,
            categorical_fields,
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the schema is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot names in order
    pub fn slot_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }

    /// Index of a slot by its full name
    pub fn index_of(&self, slot_name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == slot_name)
    }

    /// Index of the direct slot for a numeric field, if any
    pub fn direct_slot(&self, field: &str) -> Option<usize> {
        self.direct_index.get(field).copied()
    }

    /// Index of the one-hot slot for a (field, category) pair, if any
    pub fn one_hot_slot(&self, field: &str, category: &str) -> Option<usize> {
        self.one_hot_index
            .get(&(field.to_string(), category.to_string()))
            .copied()
    }

    /// Distinct raw-record field names the schema draws from, in order
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Whether a field is a known categorical field
    pub fn is_categorical_field(&self, field: &str) -> bool {
        self.categorical_fields.iter().any(|f| f == field)
    }
}
