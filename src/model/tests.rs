use super::*;

#[test]
fn test_display_name_prefers_primary_synonym() {
    let synonyms = vec![Synonym::new("benzol", 2), Synonym::new("benzene", 0)];
    assert_eq!(display_name("benzene-ring", &synonyms), "benzene");
}

#[test]
fn test_display_name_falls_back_to_shortest_synonym() {
    let synonyms = vec![
        Synonym::new("cyclohexatriene", 1),
        Synonym::new("phene", 3),
        Synonym::new("pyrobenzol", 2),
    ];
    assert_eq!(display_name("benzene", &synonyms), "phene");
}

#[test]
fn test_display_name_ties_use_first_in_order() {
    let synonyms = vec![Synonym::new("bbb", 5), Synonym::new("aaa", 2)];
    assert_eq!(display_name("x", &synonyms), "aaa");
}

#[test]
fn test_display_name_without_synonyms() {
    assert_eq!(display_name("ethanol", &[]), "ethanol");
}

#[test]
fn test_experiment_type_parsing() {
    assert_eq!(
        "tey".parse::<ExperimentType>().unwrap(),
        ExperimentType::TotalElectronYield
    );
    assert_eq!(
        "FLUORESCENCE_YIELD".parse::<ExperimentType>().unwrap(),
        ExperimentType::FluorescenceYield
    );
    assert_eq!(
        "partial-electron-yield".parse::<ExperimentType>().unwrap(),
        ExperimentType::PartialElectronYield
    );
    assert!("xps".parse::<ExperimentType>().is_err());

    let t = ExperimentType::Transmission;
    assert_eq!(t.as_str().parse::<ExperimentType>().unwrap(), t);
}

#[test]
fn test_edge_display() {
    let edge = Edge {
        id: uuid::Uuid::new_v4(),
        target_atom: "C".to_string(),
        core_state: "K".to_string(),
    };
    assert_eq!(edge.to_string(), "C-K");
}
