use std::fs;
use std::path::{Path, PathBuf};

use apartment_ai::valuation::{ArtifactError, ModelStore, PredictionError, PriceFeatures};
use serde_json::Value;

fn sample_models() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models")
}

/// Copy of the sample artifacts that a test may corrupt.
fn scratch_models() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for entry in fs::read_dir(sample_models()).expect("sample models present") {
        let entry = entry.expect("dir entry");
        fs::copy(entry.path(), dir.path().join(entry.file_name())).expect("copy artifact");
    }
    dir
}

fn edit_json(path: &Path, edit: impl FnOnce(&mut Value)) {
    let mut value: Value =
        serde_json::from_slice(&fs::read(path).expect("read artifact")).expect("artifact json");
    edit(&mut value);
    fs::write(path, serde_json::to_vec_pretty(&value).expect("serialize")).expect("write artifact");
}

#[test]
fn sample_artifacts_load_and_agree() {
    let store = ModelStore::load(sample_models()).expect("sample artifacts load");

    assert!(store.price.choices("district").contains(&"Eixample".to_string()));
    assert_eq!(
        store.rent.choices("room_type"),
        vec!["entire home", "private room", "shared room"]
    );
    assert!(store
        .price
        .choices("neighborhood")
        .contains(&"Dreta de l'Eixample".to_string()));
}

#[test]
fn missing_artifact_reports_path() {
    let dir = scratch_models();
    fs::remove_file(dir.path().join("rent_model.json")).expect("remove artifact");

    let err = ModelStore::load(dir.path()).expect_err("rent model missing");
    match err {
        ArtifactError::Io { path, .. } => assert!(path.ends_with("rent_model.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_json_is_rejected() {
    let dir = scratch_models();
    fs::write(dir.path().join("house_price_encoder.json"), "{ \"columns\": [").expect("truncate");

    let err = ModelStore::load(dir.path()).expect_err("truncated encoder");
    assert!(matches!(err, ArtifactError::Malformed { .. }));
}

#[test]
fn encoder_columns_must_follow_schema_order() {
    let dir = scratch_models();
    edit_json(&dir.path().join("rent_encoder.json"), |value| {
        value["columns"]
            .as_array_mut()
            .expect("columns array")
            .reverse();
    });

    let err = ModelStore::load(dir.path()).expect_err("columns out of order");
    assert!(matches!(
        err,
        ArtifactError::SchemaMismatch { domain: "rent", .. }
    ));
}

#[test]
fn vocabulary_must_be_known_to_encoder() {
    let dir = scratch_models();
    edit_json(&dir.path().join("house_price_categories.json"), |value| {
        value["district"]
            .as_array_mut()
            .expect("district list")
            .push(Value::from("Atlantis"));
    });

    let err = ModelStore::load(dir.path()).expect_err("vocabulary exceeds encoder");
    match err {
        ArtifactError::VocabularyMismatch { feature, value, .. } => {
            assert_eq!(feature, "district");
            assert_eq!(value, "Atlantis");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tree_referencing_missing_node_is_invalid() {
    let dir = scratch_models();
    edit_json(&dir.path().join("rent_model.json"), |value| {
        value["trees"][0]["nodes"][0]["right"] = Value::from(42);
    });

    let err = ModelStore::load(dir.path()).expect_err("dangling node");
    assert!(matches!(err, ArtifactError::Invalid { .. }));
}

#[test]
fn reordered_model_columns_fail_at_prediction() {
    let dir = scratch_models();
    edit_json(&dir.path().join("house_price_model.json"), |value| {
        value["feature_names"]
            .as_array_mut()
            .expect("feature names")
            .swap(0, 1);
    });
    let store = ModelStore::load(dir.path()).expect("shape is only checked per prediction");

    let err = store
        .price_predictor()
        .predict(&PriceFeatures {
            district: "Eixample".to_string(),
            neighborhood: "Dreta de l'Eixample".to_string(),
            condition: "good".to_string(),
            apartment_type: "flat".to_string(),
            rooms: 3,
            area_m2: 80,
            lift: "yes".to_string(),
            views: "yes".to_string(),
            floor: "2".to_string(),
        })
        .expect_err("columns disagree");
    assert!(matches!(err, PredictionError::ShapeMismatch { .. }));
}
