//! Snapshot cache behaviour across operations.

use std::fs::File;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use pretty_assertions::assert_eq;

use e2e_tests::{sample_corpus, Playbook, TestCorpus};
use playbook_service::ListOptions;

fn touch_future(path: &std::path::Path) {
    File::open(path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(600))
        .unwrap();
}

#[test]
fn test_second_call_reuses_snapshot() {
    let corpus = sample_corpus();
    let service = corpus.service();
    let first = service.snapshot().unwrap();
    service.search("logo", &Default::default()).unwrap();
    let second = service.snapshot().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_touching_domains_forces_rebuild() {
    let corpus = sample_corpus();
    let service = corpus.service();
    let first = service.snapshot().unwrap();

    // A new file under an existing domain does not change domains/ itself
    corpus.add_playbook("domains/x/brand.md", &Playbook::new("x", "Brand Voice"));
    touch_future(&corpus.path().join("domains"));

    let second = service.snapshot().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.documents().len(), first.documents().len() + 1);
}

#[test]
fn test_editing_index_forces_rebuild() {
    let corpus = sample_corpus();
    let service = corpus.service();
    let first = service.snapshot().unwrap();

    corpus.write_index(&[("brand voice", "domains/x/brand.md")]);
    touch_future(&corpus.path().join("INDEX.md"));

    let second = service.snapshot().unwrap();
    assert_eq!(second.routes().len(), 1);
    assert_eq!(first.routes().len(), 4);
}

#[test]
fn test_expired_ttl_forces_rebuild() {
    let corpus = TestCorpus::with_ttl(Duration::from_millis(20));
    corpus.add_playbook("domains/x/logo.md", &Playbook::new("x", "Logo"));
    let service = corpus.service();
    let first = service.snapshot().unwrap();
    std::thread::sleep(Duration::from_millis(40));
    let second = service.snapshot().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_roots_do_not_share_results() {
    let a = sample_corpus();
    let b = TestCorpus::new();
    b.add_playbook("domains/ops/runbook.md", &Playbook::new("ops", "Runbook"));

    // Same store, two roots
    let service_a = a.service();
    let service_b = playbook_service::KnowledgeService::new(Arc::clone(&a.store), b.path());

    assert_eq!(service_a.list(&ListOptions::new()).unwrap().total, 5);
    assert_eq!(service_b.list(&ListOptions::new()).unwrap().total, 1);
    assert_eq!(a.store.len(), 2);
    assert_eq!(service_b.domains().unwrap(), vec!["ops"]);
}

#[test]
fn test_diagnose_reports_cache() {
    let corpus = sample_corpus();
    let service = corpus.service();
    assert!(!service.cache_stats().is_cached);
    let diagnosis = service.diagnose().unwrap();
    assert!(diagnosis.cache.is_cached);
    assert!(diagnosis.cache.age_ms.is_some());
}
