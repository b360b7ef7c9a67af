mod common;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use common::{ScriptedConnector, fast_policy};
use replica_registrar::attacher::DatasetAttacher;
use replica_registrar::domain::{ProducerKind, SourceRef};
use replica_registrar::error::RegError;
use replica_registrar::identifier::IdentifierBuilder;
use replica_registrar::orchestrator::RegistrationOrchestrator;
use replica_registrar::submitter::ReplicaSubmitter;

struct Fixture {
    connector: ScriptedConnector,
    orchestrator: RegistrationOrchestrator<ScriptedConnector>,
    storage_root: Utf8PathBuf,
    _tempdir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let tempdir = tempfile::tempdir().unwrap();
    let storage_root = Utf8PathBuf::from_path_buf(tempdir.path().to_path_buf()).unwrap();

    let connector = ScriptedConnector::default();
    let builder = IdentifierBuilder::new(
        "test",
        storage_root.as_str(),
        "root://xrd1:1094//rucio",
        ProducerKind::DataProduct,
    );
    let submitter = ReplicaSubmitter::new(connector.clone(), "STORE_1", fast_policy(5)).unwrap();
    let attacher =
        DatasetAttacher::new(connector.clone(), "test", "STORE_1", fast_policy(5)).unwrap();

    Fixture {
        connector,
        orchestrator: RegistrationOrchestrator::new(builder, submitter, attacher),
        storage_root,
        _tempdir: tempdir,
    }
}

fn write_file(fixture: &Fixture, relative: &str) -> String {
    let path = fixture.storage_root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap().as_std_path()).unwrap();
    std::fs::write(path.as_std_path(), relative.as_bytes()).unwrap();
    path.to_string()
}

#[test]
fn empty_batch_short_circuits_without_catalog_calls() {
    let mut fixture = fixture();

    let count = fixture.orchestrator.register("ds1", &[]).unwrap();

    assert_eq!(count, 0);
    assert!(fixture.connector.state.calls().is_empty());
}

#[test]
fn submits_all_replicas_before_any_attach() {
    let mut fixture = fixture();
    let refs = vec![
        SourceRef::from_path(write_file(&fixture, "test/a.fits")),
        SourceRef::from_path(write_file(&fixture, "test/b.fits")),
    ];

    let count = fixture.orchestrator.register("ds1", &refs).unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        fixture.connector.state.calls(),
        vec!["replicas:STORE_1:2", "attach:ds1:2"]
    );
}

#[test]
fn groups_bundles_by_target_dataset() {
    let mut fixture = fixture();
    let mut refs = vec![
        SourceRef::from_path(write_file(&fixture, "test/a.fits")),
        SourceRef::from_path(write_file(&fixture, "test/b.fits")),
        SourceRef::from_path(write_file(&fixture, "test/c.fits")),
    ];
    refs[1].dataset = Some("ds2".to_string());

    let count = fixture.orchestrator.register("ds1", &refs).unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        fixture.connector.state.calls(),
        vec!["replicas:STORE_1:3", "attach:ds1:2", "attach:ds2:1"]
    );
}

#[test]
fn sidecar_metadata_travels_with_the_ref() {
    let mut fixture = fixture();
    let mut refs = vec![SourceRef::from_path(write_file(&fixture, "test/a.fits"))];
    refs[0].sidecar = Some("{\"exposure\": 318}".to_string());

    fixture.orchestrator.register("ds1", &refs).unwrap();

    assert_eq!(
        fixture.connector.state.calls(),
        vec!["replicas:STORE_1:1", "attach:ds1:1"]
    );
}

#[test]
fn path_outside_storage_root_fails_before_any_catalog_call() {
    let mut fixture = fixture();
    let stray = tempfile::tempdir().unwrap();
    let stray_file = stray.path().join("stray.fits");
    std::fs::write(&stray_file, b"data").unwrap();

    let refs = vec![SourceRef::from_path(stray_file.to_str().unwrap())];
    let err = fixture.orchestrator.register("ds1", &refs).unwrap_err();

    assert_matches!(err, RegError::PathOutsideRoot(_));
    assert!(fixture.connector.state.calls().is_empty());
}
