use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;

use super::*;
use crate::caller::Caller;
use crate::catalog::{self, NewMolecule};
use crate::error::ErrorKind;
use crate::model::{ExperimentType, Peak};
use crate::store::{Repository, Store, Table};
use proptest::prelude::*;
use uuid::Uuid;

struct Fixture {
    store: Store,
    caller: Caller,
    benzene: Uuid,
    pyridine: Uuid,
    instrument: Uuid,
    edge: Uuid,
}

fn new_molecule(name: &str, formula: &str) -> NewMolecule {
    NewMolecule {
        iupac_name: name.to_string(),
        chemical_formula: formula.to_string(),
        smiles: "c1ccccc1".to_string(),
        inchi: "InChI=1S/test".to_string(),
        ..Default::default()
    }
}

fn fixture() -> Fixture {
    let mut store = Store::open_in_memory().unwrap();
    let caller = Caller::user("alice");
    let benzene = catalog::register_molecule(&mut store, &caller, new_molecule("benzene", "C6H6"))
        .unwrap()
        .molecule
        .id;
    let pyridine =
        catalog::register_molecule(&mut store, &caller, new_molecule("pyridine", "C5H5N"))
            .unwrap()
            .molecule
            .id;
    let instrument = catalog::ensure_instrument(&mut store, &caller, "SST-1", Some("NSLS-II"))
        .unwrap()
        .id;
    let edge = catalog::ensure_edge(&mut store, &caller, "C", "K").unwrap().id;

    Fixture {
        store,
        caller,
        benzene,
        pyridine,
        instrument,
        edge,
    }
}

fn request(f: &Fixture, geometry: GeometrySpec, rows: Vec<SpectrumRow>) -> IngestRequest {
    IngestRequest {
        sample: SampleDescriptor {
            molecule_id: f.benzene,
            identifier: None,
            preparation: Default::default(),
            vendor: VendorRef::New {
                name: "Sigma".to_string(),
                url: None,
            },
        },
        experiment: ExperimentDescriptor {
            instrument_id: f.instrument,
            edge_id: f.edge,
            experiment_type: ExperimentType::TotalElectronYield,
            calibration_id: None,
            measured_at: None,
        },
        geometry,
        rows,
        peaks: Vec::new(),
    }
}

fn plain_rows(n: usize) -> Vec<SpectrumRow> {
    (0..n)
        .map(|i| SpectrumRow::new(280.0 + i as f64, 0.1 * i as f64))
        .collect()
}

fn per_row_rows() -> Vec<SpectrumRow> {
    vec![
        SpectrumRow::with_geometry(285.0, 0.1, 0.0, 0.0),
        SpectrumRow::with_geometry(286.0, 0.2, 0.0, 0.0),
        SpectrumRow::with_geometry(285.0, 0.3, 90.0, 0.0),
        SpectrumRow::with_geometry(286.0, 0.4, 90.0, 0.0),
    ]
}

fn count(f: &Fixture, table: Table) -> u64 {
    f.store.repository().count(table).unwrap()
}

/// Generator replaying a fixed script, then empty strings
fn scripted(ids: &[&str]) -> impl Fn() -> String {
    let queue: RefCell<VecDeque<String>> =
        RefCell::new(ids.iter().map(|s| s.to_string()).collect());
    move || queue.borrow_mut().pop_front().unwrap_or_default()
}

// ==================== Geometry Tests ====================

#[test]
fn test_fixed_geometry_single_group() {
    let groups = group_rows(&GeometrySpec::Fixed(Geometry::new(10.0, 20.0)), &plain_rows(5)).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].geometry, Geometry::new(10.0, 20.0));
    assert_eq!(groups[0].points.len(), 5);
}

#[test]
fn test_per_row_groups_in_first_seen_order() {
    let rows = vec![
        SpectrumRow::with_geometry(1.0, 1.0, 90.0, 0.0),
        SpectrumRow::with_geometry(2.0, 2.0, 0.0, 0.0),
        SpectrumRow::with_geometry(3.0, 3.0, 90.0, 0.0),
    ];
    let groups = group_rows(&GeometrySpec::PerRow, &rows).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].geometry.theta, 90.0);
    assert_eq!(groups[0].points.len(), 2);
    assert_eq!(groups[1].geometry.theta, 0.0);
}

#[test]
fn test_negative_zero_shares_group() {
    let rows = vec![
        SpectrumRow::with_geometry(1.0, 1.0, 0.0, 0.0),
        SpectrumRow::with_geometry(2.0, 2.0, -0.0, 0.0),
    ];
    assert_eq!(group_rows(&GeometrySpec::PerRow, &rows).unwrap().len(), 1);
}

#[test]
fn test_per_row_requires_angles() {
    let rows = vec![
        SpectrumRow::with_geometry(1.0, 1.0, 0.0, 0.0),
        SpectrumRow {
            energy: 2.0,
            absorption: 2.0,
            theta: Some(0.0),
            phi: None,
        },
    ];
    let error = group_rows(&GeometrySpec::PerRow, &rows).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(error.to_string().contains("row 2"));
}

#[test]
fn test_empty_rows_rejected() {
    let error = group_rows(&GeometrySpec::PerRow, &[]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
}

// ==================== Validation Tests ====================

#[test]
fn test_vendor_ref_from_parts() {
    let id = Uuid::new_v4();
    assert_eq!(
        VendorRef::from_parts(Some(id), Some("ignored"), None).unwrap(),
        VendorRef::Existing(id)
    );
    assert_eq!(
        VendorRef::from_parts(None, Some(" Sigma "), Some("")).unwrap(),
        VendorRef::New {
            name: "Sigma".to_string(),
            url: None
        }
    );
    let error = VendorRef::from_parts(None, Some("  "), None).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
}

#[test]
fn test_parse_measurement_date() {
    let date = parse_measurement_date("2024-03-01").unwrap();
    assert_eq!(date.to_rfc3339(), "2024-03-01T00:00:00+00:00");

    let timestamp = parse_measurement_date("2024-03-01T12:30:00+02:00").unwrap();
    assert_eq!(timestamp.to_rfc3339(), "2024-03-01T10:30:00+00:00");

    let error = parse_measurement_date("March 1st").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
}

#[test]
fn test_validate_rejects_non_finite_values() {
    let f = fixture();
    let mut rows = plain_rows(2);
    rows[1].absorption = f64::NAN;
    let error = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), rows)
        .validate()
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
}

#[test]
fn test_validate_blank_identifier_is_generated() {
    let f = fixture();
    let mut req = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    req.sample.identifier = Some("   ".to_string());
    assert!(req.validate().unwrap().identifier.is_none());
}

// ==================== Ingest Tests ====================

#[test]
fn test_ingest_fixed_geometry() {
    let mut f = fixture();
    let req = request(&f, GeometrySpec::Fixed(Geometry::new(10.0, 20.0)), plain_rows(5));

    let outcome = ExperimentIngestor::default()
        .ingest(&mut f.store, &f.caller, req)
        .unwrap();

    assert_eq!(outcome.experiments.len(), 1);
    assert_eq!(outcome.experiments[0].points_written, 5);
    assert_eq!(outcome.experiments[0].polarization.polar_angle, 10.0);
    assert_eq!(outcome.experiments[0].polarization.azimuthal_angle, 20.0);
    assert_eq!(outcome.experiments[0].experiment.created_by, "alice");
    assert_eq!(count(&f, Table::Experiments), 1);
    assert_eq!(count(&f, Table::SpectrumPoints), 5);
    assert_eq!(count(&f, Table::Polarizations), 1);
}

#[test]
fn test_ingest_per_row_geometry() {
    let mut f = fixture();
    let req = request(&f, GeometrySpec::PerRow, per_row_rows());

    let outcome = ExperimentIngestor::default()
        .ingest(&mut f.store, &f.caller, req)
        .unwrap();

    assert_eq!(outcome.experiments.len(), 2);
    for created in &outcome.experiments {
        assert_eq!(created.points_written, 2);
        let stored = f
            .store
            .repository()
            .spectrum_points(created.experiment.id)
            .unwrap();
        assert_eq!(stored.len(), 2);
    }
    assert_eq!(count(&f, Table::Experiments), 2);
    assert_eq!(count(&f, Table::Polarizations), 2);
    assert_eq!(count(&f, Table::Samples), 1);
}

#[test]
fn test_ingest_reuses_polarizations() {
    let mut f = fixture();
    let ingestor = ExperimentIngestor::default();
    for _ in 0..2 {
        let req = request(&f, GeometrySpec::PerRow, per_row_rows());
        ingestor.ingest(&mut f.store, &f.caller, req).unwrap();
    }
    assert_eq!(count(&f, Table::Experiments), 4);
    assert_eq!(count(&f, Table::Polarizations), 2);
}

#[test]
fn test_ingest_peaks_attach_to_every_experiment() {
    let mut f = fixture();
    let mut req = request(&f, GeometrySpec::PerRow, per_row_rows());
    req.peaks = vec![
        Peak {
            energy: 285.1,
            intensity: Some(1.0),
            label: Some("C 1s -> pi*".to_string()),
        },
        Peak {
            energy: 293.0,
            intensity: None,
            label: None,
        },
    ];

    let outcome = ExperimentIngestor::default()
        .ingest(&mut f.store, &f.caller, req)
        .unwrap();
    assert!(outcome.experiments.iter().all(|e| e.peaks_written == 2));
    assert_eq!(count(&f, Table::Peaks), 4);
}

#[test]
fn test_ingest_atomic_on_validation_failure() {
    let mut f = fixture();
    let mut rows = per_row_rows();
    rows[3].phi = None;
    let req = request(&f, GeometrySpec::PerRow, rows);

    let error = ExperimentIngestor::default()
        .ingest(&mut f.store, &f.caller, req)
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    for table in [
        Table::Samples,
        Table::Vendors,
        Table::Experiments,
        Table::Polarizations,
        Table::SpectrumPoints,
    ] {
        assert_eq!(count(&f, table), 0, "{} has rows", table.name());
    }
}

#[test]
fn test_ingest_conflict_rolls_back_and_keeps_sample() {
    let mut f = fixture();
    let ingestor = ExperimentIngestor::default();

    let mut first = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(3));
    first.sample.identifier = Some("S-shared".to_string());
    ingestor.ingest(&mut f.store, &f.caller, first).unwrap();

    let mut second = request(&f, GeometrySpec::Fixed(Geometry::new(45.0, 0.0)), plain_rows(3));
    second.sample.identifier = Some("S-shared".to_string());
    second.sample.molecule_id = f.pyridine;
    second.sample.vendor = VendorRef::New {
        name: "Fresh Vendor".to_string(),
        url: None,
    };

    let error = ingestor.ingest(&mut f.store, &f.caller, second).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Conflict);

    let repo = f.store.repository();
    let sample = repo.sample_by_identifier("S-shared").unwrap().unwrap();
    assert_eq!(sample.molecule_id, f.benzene);
    // the vendor created before the conflict was rolled back
    assert!(repo.vendor_by_name("Fresh Vendor").unwrap().is_none());
    assert_eq!(repo.count(Table::Experiments).unwrap(), 1);
    assert_eq!(repo.count(Table::Polarizations).unwrap(), 1);
}

#[test]
fn test_ingest_reuses_sample_for_same_molecule() {
    let mut f = fixture();
    let ingestor = ExperimentIngestor::default();
    for theta in [0.0, 90.0] {
        let mut req = request(&f, GeometrySpec::Fixed(Geometry::new(theta, 0.0)), plain_rows(2));
        req.sample.identifier = Some("S-film".to_string());
        ingestor.ingest(&mut f.store, &f.caller, req).unwrap();
    }
    assert_eq!(count(&f, Table::Samples), 1);
    assert_eq!(count(&f, Table::Experiments), 2);
}

#[test]
fn test_ingest_vendor_resolution() {
    let mut f = fixture();
    let ingestor = ExperimentIngestor::default();

    let first = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    let vendor = ingestor.ingest(&mut f.store, &f.caller, first).unwrap().vendor;

    let by_name = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    let reused = ingestor.ingest(&mut f.store, &f.caller, by_name).unwrap().vendor;
    assert_eq!(reused.id, vendor.id);

    let mut by_id = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    by_id.sample.vendor = VendorRef::Existing(vendor.id);
    assert_eq!(
        ingestor.ingest(&mut f.store, &f.caller, by_id).unwrap().vendor.id,
        vendor.id
    );
    assert_eq!(count(&f, Table::Vendors), 1);

    let mut missing = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    missing.sample.vendor = VendorRef::Existing(Uuid::new_v4());
    let error = ingestor.ingest(&mut f.store, &f.caller, missing).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[test]
fn test_ingest_reused_sample_reports_its_own_vendor() {
    let mut f = fixture();
    let ingestor = ExperimentIngestor::default();

    let mut first = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(2));
    first.sample.identifier = Some("S-film".to_string());
    let original = ingestor.ingest(&mut f.store, &f.caller, first).unwrap();
    assert_eq!(original.vendor.name, "Sigma");

    let mut second = request(&f, GeometrySpec::Fixed(Geometry::new(90.0, 0.0)), plain_rows(2));
    second.sample.identifier = Some("S-film".to_string());
    second.sample.vendor = VendorRef::New {
        name: "Other Supplier".to_string(),
        url: None,
    };
    let reused = ingestor.ingest(&mut f.store, &f.caller, second).unwrap();

    assert_eq!(reused.sample.id, original.sample.id);
    assert_eq!(reused.sample.vendor_id, Some(original.vendor.id));
    assert_eq!(reused.vendor, original.vendor);
}

#[test]
fn test_ingest_missing_references() {
    let mut f = fixture();
    let ingestor = ExperimentIngestor::default();

    let mut no_instrument = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    no_instrument.experiment.instrument_id = Uuid::new_v4();
    let error = ingestor.ingest(&mut f.store, &f.caller, no_instrument).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);

    let mut no_calibration = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    no_calibration.experiment.calibration_id = Some(Uuid::new_v4());
    let error = ingestor.ingest(&mut f.store, &f.caller, no_calibration).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);

    assert_eq!(count(&f, Table::Samples), 0);
    assert_eq!(count(&f, Table::Vendors), 0);
}

#[test]
fn test_ingest_requires_user() {
    let mut f = fixture();
    let req = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    let error = ExperimentIngestor::default()
        .ingest(&mut f.store, &Caller::anonymous(), req)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unauthorized);
    assert_eq!(count(&f, Table::Samples), 0);
}

#[test]
fn test_ingest_measurement_date() {
    let mut f = fixture();
    let mut req = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    req.experiment.measured_at = Some("2023-11-20".to_string());
    let outcome = ExperimentIngestor::default()
        .ingest(&mut f.store, &f.caller, req)
        .unwrap();
    assert_eq!(
        outcome.experiments[0].experiment.measured_at.to_rfc3339(),
        "2023-11-20T00:00:00+00:00"
    );
}

// ==================== Identifier Tests ====================

#[test]
fn test_generated_identifiers_are_distinct() {
    let mut f = fixture();
    let ingestor = ExperimentIngestor::default();

    let a = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    let b = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    let first = ingestor.ingest(&mut f.store, &f.caller, a).unwrap().sample;
    let second = ingestor.ingest(&mut f.store, &f.caller, b).unwrap().sample;

    assert_ne!(first.identifier, second.identifier);
    assert!(first.identifier.starts_with("S-"));
    assert_eq!(count(&f, Table::Samples), 2);
}

#[test]
fn test_timestamp_generator_format() {
    let id = TimestampIdGenerator.next_identifier();
    let parts: Vec<&str> = id.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "S");
    assert!(parts[1].ends_with('Z'));
    assert_eq!(parts[2].len(), 8);
}

#[test]
fn test_identifier_collision_retries() {
    let mut f = fixture();
    let mut taken = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    taken.sample.identifier = Some("S-taken".to_string());
    ExperimentIngestor::default()
        .ingest(&mut f.store, &f.caller, taken)
        .unwrap();

    let ingestor = ExperimentIngestor::default()
        .with_id_generator(scripted(&["S-taken", "S-taken", "S-free"]));
    let mut req = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    req.sample.molecule_id = f.pyridine;

    let outcome = ingestor.ingest(&mut f.store, &f.caller, req).unwrap();
    assert_eq!(outcome.sample.identifier, "S-free");
}

#[test]
fn test_identifier_exhaustion_keeps_last_candidate() {
    let mut f = fixture();
    let mut taken = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    taken.sample.identifier = Some("S-taken".to_string());
    ExperimentIngestor::default()
        .ingest(&mut f.store, &f.caller, taken)
        .unwrap();

    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = calls.clone();
    let ingestor = ExperimentIngestor::new(IngestConfig {
        identifier_attempts: 3,
    })
    .with_id_generator(move || {
        counter.set(counter.get() + 1);
        "S-taken".to_string()
    });

    // same molecule, so the colliding sample is reused
    let req = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    let outcome = ingestor.ingest(&mut f.store, &f.caller, req).unwrap();
    assert_eq!(outcome.sample.identifier, "S-taken");
    assert_eq!(calls.get(), 3);
    assert_eq!(count(&f, Table::Samples), 1);

    // a different molecule turns the accepted collision into a conflict
    let mut other = request(&f, GeometrySpec::Fixed(Geometry::new(0.0, 0.0)), plain_rows(1));
    other.sample.molecule_id = f.pyridine;
    let error = ingestor.ingest(&mut f.store, &f.caller, other).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Conflict);
}

// ==================== Spectrum File Tests ====================

#[test]
fn test_parse_csv_with_aliases() {
    let text = "Energy,mu,theta,phi\n285.0,0.1,55,0\n286.0,0.2,55,0\n";
    let rows = parse_delimited(Cursor::new(text), b',').unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], SpectrumRow::with_geometry(285.0, 0.1, 55.0, 0.0));
}

#[test]
fn test_parse_tsv_without_geometry() {
    let text = "energy\tabsorption\n# comment\n285.0\t0.1\n";
    let rows = parse_delimited(Cursor::new(text), b'\t').unwrap();
    assert_eq!(rows, vec![SpectrumRow::new(285.0, 0.1)]);
}

#[test]
fn test_parse_csv_missing_column() {
    let error = parse_delimited(Cursor::new("energy,theta\n1,2\n"), b',').unwrap_err();
    assert!(matches!(error, SpectrumFileError::MissingColumn("absorption")));
}

#[test]
fn test_parse_csv_reports_line() {
    let text = "energy,abs\n285.0,0.1\n286.0,oops\n";
    match parse_delimited(Cursor::new(text), b',').unwrap_err() {
        SpectrumFileError::InvalidValue { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_parse_columns() {
    let text = "# beamline export\nEnergy Abs\n\n285.0  0.1\n286.0\t0.2\n";
    let rows = parse_columns(Cursor::new(text)).unwrap();
    assert_eq!(rows, vec![SpectrumRow::new(285.0, 0.1), SpectrumRow::new(286.0, 0.2)]);

    let with_angles = parse_columns(Cursor::new("285 0.1 55 0\n")).unwrap();
    assert_eq!(with_angles[0].theta, Some(55.0));
}

#[test]
fn test_parse_columns_errors() {
    let error = parse_columns(Cursor::new("285 0.1\n286 0.2 55\n")).unwrap_err();
    assert!(matches!(error, SpectrumFileError::InvalidValue { line: 2, .. }));

    let error = parse_columns(Cursor::new("285 0.1\nfoo bar\n")).unwrap_err();
    assert!(matches!(error, SpectrumFileError::InvalidValue { line: 2, .. }));
}

#[test]
fn test_spectrum_format_from_path() {
    use std::path::Path;
    assert_eq!(SpectrumFormat::from_path(Path::new("a.CSV")).unwrap(), SpectrumFormat::Csv);
    assert_eq!(SpectrumFormat::from_path(Path::new("a.tsv")).unwrap(), SpectrumFormat::Tsv);
    assert_eq!(SpectrumFormat::from_path(Path::new("a.dat")).unwrap(), SpectrumFormat::Columns);
    assert!(SpectrumFormat::from_path(Path::new("a.xlsx")).is_err());
}

// ==================== Bulk Tests ====================

#[test]
fn test_angle_from_stem() {
    assert_eq!(angle_from_stem("benzene_55deg"), Some(55.0));
    assert_eq!(angle_from_stem("film_20deg_2"), Some(20.0));
    assert_eq!(angle_from_stem("x_5deg"), Some(5.0));
    assert_eq!(angle_from_stem("nodegree"), None);
    assert_eq!(angle_from_stem("deg"), None);
}

fn write_bulk_tree(root: &std::path::Path) {
    use std::fs;
    let spectrum = "285.0 0.1\n286.0 0.2\n287.0 0.3\n";
    for (molecule, edge, file) in [
        ("benzene", "carbon", "benzene_20deg.txt"),
        ("benzene", "carbon", "benzene_55deg.txt"),
        ("benzene", "nitrogen", "benzene_90deg.txt"),
        ("unknown", "carbon", "unknown_55deg.txt"),
        ("Energy Calibration", "carbon", "ref_55deg.txt"),
    ] {
        let dir = root.join(molecule).join(edge);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), spectrum).unwrap();
    }
    fs::write(root.join("benzene").join("carbon").join("notes.md"), "ignored").unwrap();
}

#[test]
fn test_discover_bulk_files() {
    let dir = tempfile::tempdir().unwrap();
    write_bulk_tree(dir.path());

    let entries = discover_bulk_files(dir.path()).unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e.molecule != "Energy Calibration"));

    let first = &entries[0];
    assert_eq!(first.molecule, "benzene");
    assert_eq!(first.target_atom, "C");
    assert_eq!(first.core_state, "K");
    assert_eq!(first.theta, 20.0);
    assert_eq!(entries[2].target_atom, "N");
}

#[test]
fn test_load_bulk_skips_unregistered_molecules() {
    let dir = tempfile::tempdir().unwrap();
    write_bulk_tree(dir.path());
    let mut f = fixture();

    let entries = discover_bulk_files(dir.path()).unwrap();
    let options = BulkLoadOptions {
        instrument_id: f.instrument,
        vendor: VendorRef::New {
            name: "Sigma".to_string(),
            url: None,
        },
        experiment_type: ExperimentType::TotalElectronYield,
        calibration_id: None,
        measured_at: Some("2022-06-01".to_string()),
    };

    let summary = load_bulk(
        &mut f.store,
        &ExperimentIngestor::default(),
        &f.caller,
        &entries,
        &options,
    )
    .unwrap();

    assert_eq!(summary.files_seen, 4);
    assert_eq!(summary.files_loaded, 3);
    assert_eq!(summary.experiments_created, 3);
    assert_eq!(summary.points_written, 9);
    assert_eq!(summary.skipped.len(), 1);
    // one sample for all benzene spectra, and the N-K edge was created
    assert_eq!(count(&f, Table::Samples), 1);
    assert_eq!(count(&f, Table::Edges), 2);
    assert_eq!(count(&f, Table::Polarizations), 3);
}

// ==================== Property Tests ====================

fn arb_rows() -> impl Strategy<Value = Vec<SpectrumRow>> {
    prop::collection::vec(
        (250.0f64..350.0, 0.0f64..1.0, 0u8..4, 0u8..3).prop_map(|(e, a, t, p)| {
            SpectrumRow::with_geometry(e, a, f64::from(t) * 30.0, f64::from(p) * 45.0)
        }),
        1..60,
    )
}

proptest! {
    #[test]
    fn prop_grouping_partitions_rows(rows in arb_rows()) {
        let groups = group_rows(&GeometrySpec::PerRow, &rows).unwrap();

        let total: usize = groups.iter().map(|g| g.points.len()).sum();
        prop_assert_eq!(total, rows.len());

        let mut distinct: Vec<(u64, u64)> = rows
            .iter()
            .map(|r| (r.theta.unwrap().to_bits(), r.phi.unwrap().to_bits()))
            .collect();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(groups.len(), distinct.len());

        for group in &groups {
            prop_assert!(!group.points.is_empty());
        }
    }

    #[test]
    fn prop_fixed_geometry_is_one_group(rows in arb_rows(), theta in 0.0f64..90.0) {
        let groups = group_rows(&GeometrySpec::Fixed(Geometry::new(theta, 0.0)), &rows).unwrap();
        prop_assert_eq!(groups.len(), 1);
        prop_assert_eq!(groups[0].points.len(), rows.len());
    }
}
