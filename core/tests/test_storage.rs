use std::path::PathBuf;

use cycledata_core::{load_profile, save_profile, CycleDataError, CyclistProfile};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cycledata_{}_{}.json", name, std::process::id()))
}

#[test]
fn test_profile_roundtrip() {
    let path = temp_path("roundtrip");
    let profile = CyclistProfile::new(68.5, 1.72).unwrap().with_bike_mass(8.2);

    save_profile(&profile, &path).expect("lagring");
    let loaded = load_profile(&path).expect("lesing");
    assert_eq!(loaded, profile);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_size_in_centimeters_rejected_on_load() {
    let path = temp_path("centimeters");
    std::fs::write(&path, r#"{"mass": 70.0, "size": 180.0, "bike_mass": 9.0}"#).unwrap();

    let err = load_profile(&path).unwrap_err();
    assert!(matches!(err, CycleDataError::Precondition(_)), "{err:?}");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_file_gives_default() {
    let path = temp_path("does_not_exist");
    let _ = std::fs::remove_file(&path);
    assert_eq!(load_profile(&path).unwrap(), CyclistProfile::default());
}

#[test]
fn test_malformed_profile_reports_field() {
    let path = temp_path("malformed");
    std::fs::write(&path, r#"{"mass": "heavy", "size": 1.8, "bike_mass": 9.0}"#).unwrap();

    match load_profile(&path) {
        Err(CycleDataError::Format(msg)) => assert!(msg.contains("mass"), "{msg}"),
        other => panic!("forventet Format, fikk {other:?}"),
    }

    let _ = std::fs::remove_file(&path);
}
