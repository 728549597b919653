mod common;

use card_scan::export::tabular::{self, TabularOptions};
use card_scan::{ContactRecord, Field, InvocationStrategy, ScanError, Session};
use common::{models, Reply, ScriptedBackend};

const FENCED_SINGLE: &str = "```json\n[{\"Firma\":\"Acme\",\"Name\":\"Doe\"}]\n```";
const TWO_CARDS: &str = r#"[
  {"Firma":"Acme","Name":"Doe","Vorname":"Jane","Telefon":"+49 30 1"},
  {"Firma":"Initech","Name":"Roe","Vorname":"Rich","Fax":"+49 30 9"}
]"#;

fn session(backend: std::sync::Arc<ScriptedBackend>, candidates: &[&str]) -> Session {
    Session::new(InvocationStrategy::new(backend, models(candidates)))
}

#[tokio::test]
async fn test_fenced_answer_becomes_one_contact() {
    let backend = ScriptedBackend::new(vec![("a", Reply::Text(FENCED_SINGLE, 90))]);
    let mut session = session(backend, &["a"]);

    session.extract(b"card", "image/jpeg").await.unwrap();

    assert_eq!(session.records().len(), 1);
    assert_eq!(
        session.records()[0].values().to_vec(),
        vec!["Acme", "Doe", "", "", "", "", "", "", ""]
    );
    assert_eq!(session.tokens_used(), 90);
}

#[tokio::test]
async fn test_quota_fallback_credits_only_successful_model() {
    let backend = ScriptedBackend::new(vec![
        ("a", Reply::Quota),
        ("b", Reply::Text(TWO_CARDS, 250)),
    ]);
    let mut session = session(backend.clone(), &["a", "b"]);
    session.extract(b"first", "image/png").await.unwrap();
    let before = session.records().len();

    let extraction = session.extract(b"second", "image/png").await.unwrap();

    assert_eq!(extraction.model, "b");
    assert_eq!(session.records().len(), before + 2);
    assert_eq!(session.tokens_used(), 500);
    assert_eq!(backend.calls(), vec!["a", "b", "a", "b"]);
    assert_eq!(session.records()[1].get(Field::LastName), "Roe");
}

#[tokio::test]
async fn test_non_quota_failure_propagates_and_leaves_session_unchanged() {
    let backend = ScriptedBackend::new(vec![("a", Reply::ServerError)]);
    let mut session = session(backend.clone(), &["a"]);
    session.replace_all(vec![ContactRecord::default().with(Field::Company, "Kept")]);

    let err = session.extract(b"card", "image/png").await.unwrap_err();

    assert!(matches!(err, ScanError::BackendFailure { .. }));
    assert!(!matches!(err, ScanError::AllBackendsExhausted { .. }));
    assert_eq!(session.records().len(), 1);
    assert_eq!(session.tokens_used(), 0);
    assert_eq!(backend.calls(), vec!["a"]);
}

#[tokio::test]
async fn test_exhausted_candidates_commit_nothing() {
    let backend = ScriptedBackend::new(vec![
        ("ok", Reply::Text(FENCED_SINGLE, 10)),
        ("a", Reply::Quota),
        ("b", Reply::Quota),
    ]);
    let mut warm = session(backend.clone(), &["ok"]);
    warm.extract(b"card", "image/png").await.unwrap();

    let mut session = session(backend, &["a", "b"]);
    session.replace_all(warm.records().to_vec());

    let err = session.extract(b"card", "image/png").await.unwrap_err();

    assert!(matches!(err, ScanError::AllBackendsExhausted { .. }));
    assert_eq!(session.records(), warm.records());
    assert_eq!(session.summary().tokens_used, 0);
}

#[tokio::test]
async fn test_malformed_answer_surfaces_raw_text() {
    let backend = ScriptedBackend::new(vec![(
        "a",
        Reply::Text("Das Bild enthält keine Visitenkarte.", 30),
    )]);
    let mut session = session(backend, &["a"]);

    let err = session.extract(b"card", "image/png").await.unwrap_err();

    assert_eq!(err.raw_response(), Some("Das Bild enthält keine Visitenkarte."));
    assert!(session.records().is_empty());
    assert_eq!(session.tokens_used(), 0);
}

#[tokio::test]
async fn test_empty_list_is_a_successful_scan() {
    let backend = ScriptedBackend::new(vec![("a", Reply::Text("```json\n[]\n```", 15))]);
    let mut session = session(backend, &["a"]);

    let extraction = session.extract(b"blank", "image/png").await.unwrap();

    assert!(extraction.records.is_empty());
    assert_eq!(session.tokens_used(), 15);
}

#[tokio::test]
async fn test_delete_uses_current_positions() {
    let backend = ScriptedBackend::new(vec![("a", Reply::Text(TWO_CARDS, 1))]);
    let mut session = session(backend, &["a"]);

    session.extract(b"card", "image/png").await.unwrap();
    let removed = session.remove_at(0).unwrap();
    session.extract(b"card", "image/png").await.unwrap();

    assert_eq!(removed.get(Field::LastName), "Doe");
    let surnames: Vec<&str> = session
        .records()
        .iter()
        .map(|record| record.get(Field::LastName))
        .collect();
    assert_eq!(surnames, vec!["Roe", "Doe", "Roe"]);

    assert!(matches!(
        session.remove_at(3),
        Err(ScanError::IndexOutOfRange { index: 3, len: 3 })
    ));
}

#[tokio::test]
async fn test_edit_through_table_round_trip() {
    let backend = ScriptedBackend::new(vec![("a", Reply::Text(TWO_CARDS, 1))]);
    let mut session = session(backend, &["a"]);
    session.extract(b"card", "image/png").await.unwrap();

    let options = TabularOptions::csv(true);
    let table = tabular::export(session.records(), &options).unwrap();
    let edited = String::from_utf8(table)
        .unwrap()
        .replace("Initech", "Initech AG");
    let records = tabular::import(edited.as_bytes(), &options).unwrap();
    session.replace_all(records);

    assert_eq!(session.records().len(), 2);
    assert_eq!(session.records()[1].get(Field::Company), "Initech AG");
    assert_eq!(session.records()[0].get(Field::Phone), "+49 30 1");
}

#[tokio::test]
async fn test_clear_and_reset_are_independent() {
    let backend = ScriptedBackend::new(vec![("a", Reply::Text(TWO_CARDS, 40))]);
    let mut session = session(backend, &["a"]);
    session.extract(b"card", "image/png").await.unwrap();

    session.clear();
    assert_eq!(session.summary().contacts, 0);
    assert_eq!(session.summary().tokens_used, 40);

    session.reset_usage();
    assert_eq!(session.tokens_used(), 0);
}
