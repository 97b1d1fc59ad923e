//! Integration test: raw-record alignment against the full schema

use donorcast_core::align::{FeatureAligner, FieldValue, RawRecord};
use donorcast_core::error::DonorcastError;

fn donor_json() -> String {
    serde_json::json!({
        "age": 43,
        "workclass": "Never-worked",
        "fnlwgt": 70800,
        "education": "Bachelors",
        "education-num": 13,
        "marital-status": "Never-married",
        "occupation": "?",
        "relationship": "Unmarried",
        "race": "Black",
        "sex": "Male",
        "capital-gain": 0,
        "capital-loss": 0,
        "hours-per-week": 40,
        "native-country": "United-States",
        "income": 0
    })
    .to_string()
}

#[test]
fn test_vector_width_and_value_domain() {
    let aligner = FeatureAligner::adult();
    let record = RawRecord::from_json_str(&donor_json()).unwrap();
    let vector = aligner.align(&record).unwrap();

    assert_eq!(vector.len(), aligner.schema().len());
    for slot in aligner.schema().slots() {
        let value = vector.get(&slot.name).unwrap();
        let direct = matches!(
            slot.name.as_str(),
            "age" | "fnlwgt" | "capital-gain" | "capital-loss" | "hours-per-week"
        );
        if !direct {
            assert!(
                value == 0.0 || value == 1.0,
                "indicator slot {} must be 0/1, got {}",
                slot.name,
                value
            );
        }
    }
}

#[test]
fn test_expected_slot_assignments() {
    let aligner = FeatureAligner::adult();
    let record = RawRecord::from_json_str(&donor_json()).unwrap();
    let vector = aligner.align(&record).unwrap();

    let expected: &[(&str, f64)] = &[
        ("age", 43.0),
        ("fnlwgt", 70800.0),
        ("capital-gain", 0.0),
        ("capital-loss", 0.0),
        ("hours-per-week", 40.0),
        ("workclass_Never-worked", 1.0),
        ("education_Bachelors", 1.0),
        ("education-num_13", 1.0),
        ("marital-status_Never-married", 1.0),
        ("occupation_?", 1.0),
        ("relationship_Unmarried", 1.0),
        ("race_Black", 1.0),
        ("sex_Male", 1.0),
        ("native-country_United-States", 1.0),
    ];

    for (slot, value) in expected {
        assert_eq!(vector.get(slot), Some(*value), "slot {}", slot);
    }

    let assigned: Vec<&str> = expected.iter().map(|(name, _)| *name).collect();
    for slot in aligner.schema().slots() {
        if !assigned.contains(&slot.name.as_str()) {
            assert_eq!(vector.get(&slot.name), Some(0.0), "slot {}", slot.name);
        }
    }
}

#[test]
fn test_alignment_is_pure() {
    let aligner = FeatureAligner::adult();
    let record = RawRecord::from_json_str(&donor_json()).unwrap();

    let first = aligner.align(&record).unwrap();
    let second = aligner.align(&record).unwrap();
    assert_eq!(first.values(), second.values());
}

#[test]
fn test_unseen_category_is_dropped_silently() {
    let aligner = FeatureAligner::adult();
    let json = donor_json().replace("Never-worked", "Freelance");
    let record = RawRecord::from_json_str(&json).unwrap();

    // No error: the unseen value just leaves every workclass indicator at 0.
    let vector = aligner.align(&record).unwrap();
    for slot in aligner.schema().slots() {
        if slot.name.starts_with("workclass_") {
            assert_eq!(vector.get(&slot.name), Some(0.0), "slot {}", slot.name);
        }
    }
}

#[test]
fn test_missing_direct_field_fails_fast() {
    let aligner = FeatureAligner::adult();
    let value: serde_json::Value = serde_json::from_str(&donor_json()).unwrap();
    let mut obj = value.as_object().unwrap().clone();
    obj.remove("hours-per-week");

    let record = RawRecord::from_json_value(&serde_json::Value::Object(obj)).unwrap();
    let err = aligner.align(&record).unwrap_err();
    match err {
        DonorcastError::MissingRequiredField(field) => assert_eq!(field, "hours-per-week"),
        other => panic!("expected MissingRequiredField, got {:?}", other),
    }
}

#[test]
fn test_record_built_by_hand() {
    let aligner = FeatureAligner::adult();
    let fields: Vec<(String, FieldValue)> = vec![
        ("age".to_string(), FieldValue::Int(28)),
        ("workclass".to_string(), FieldValue::Text("Private".to_string())),
        ("fnlwgt".to_string(), FieldValue::Int(120000)),
        ("education".to_string(), FieldValue::Text("Masters".to_string())),
        ("education-num".to_string(), FieldValue::Int(14)),
        (
            "marital-status".to_string(),
            FieldValue::Text("Divorced".to_string()),
        ),
        ("occupation".to_string(), FieldValue::Text("Sales".to_string())),
        (
            "relationship".to_string(),
            FieldValue::Text("Not-in-family".to_string()),
        ),
        ("race".to_string(), FieldValue::Text("White".to_string())),
        ("sex".to_string(), FieldValue::Text("Female".to_string())),
        ("capital-gain".to_string(), FieldValue::Int(1500)),
        ("capital-loss".to_string(), FieldValue::Int(0)),
        ("hours-per-week".to_string(), FieldValue::Float(37.5)),
        (
            "native-country".to_string(),
            FieldValue::Text("Ireland".to_string()),
        ),
    ];

    let record = RawRecord::new(fields);
    let vector = aligner.align(&record).unwrap();

    assert_eq!(vector.get("hours-per-week"), Some(37.5));
    assert_eq!(vector.get("sex_Female"), Some(1.0));
    assert_eq!(vector.get("sex_Male"), Some(0.0));
    assert_eq!(vector.get("education-num_14"), Some(1.0));
    assert_eq!(vector.get("native-country_Ireland"), Some(1.0));
}
