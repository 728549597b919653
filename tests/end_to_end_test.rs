mod common;

use anyhow::Result;
use card_scan::utils::validation::Validate;
use card_scan::{GeminiBackend, LocalStorage, ScanConfig, ScanEngine};
use common::{gemini_quota_error, gemini_reply};
use httpmock::prelude::*;
use std::io::Read;
use std::sync::Arc;
use tempfile::TempDir;

const TWO_CARDS: &str = "```json\n[\
{\"Firma\":\"Acme GmbH\",\"Name\":\"Doe\",\"Vorname\":\"Jane\",\"Abteilung\":\"Vertrieb\",\"Email\":\"jane@acme.test\"},\
{\"Firma\":null,\"Name\":\"\",\"Vorname\":\"Anon\"}\
]\n```";

fn config(endpoint: &str, output_path: &str, formats: &str) -> Result<ScanConfig> {
    let content = format!(
        r#"
[inference]
endpoint = "{}"
api_key = "test-key"
models = ["model-a", "model-b"]
timeout_seconds = 5

[export]
output_path = "{}"
formats = {}
file_stem = "kontakte"
"#,
        endpoint,
        output_path.replace('\\', "/"),
        formats
    );
    let config = ScanConfig::from_toml_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[tokio::test]
async fn test_batch_scan_writes_all_formats() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    std::fs::write(input_dir.path().join("front.jpg"), b"jpeg bytes")?;

    let server = MockServer::start();
    let throttled = server.mock(|when, then| {
        when.method(POST).path("/models/model-a:generateContent");
        then.status(429).json_body(gemini_quota_error());
    });
    let answering = server.mock(|when, then| {
        when.method(POST)
            .path("/models/model-b:generateContent")
            .body_contains("image/jpeg");
        then.status(200).json_body(gemini_reply(TWO_CARDS, 600));
    });

    let output_path = output_dir.path().to_str().unwrap().to_string();
    let config = config(
        &server.url(""),
        &output_path,
        r#"["csv", "vcf", "vcf-zip"]"#,
    )?;
    let backend = Arc::new(GeminiBackend::new(server.url(""), "test-key"));
    let mut engine = ScanEngine::from_config(
        backend,
        LocalStorage::new(input_dir.path().to_str().unwrap()),
        LocalStorage::new(output_path.clone()),
        config,
    );

    let report = engine.run(&["front.jpg".to_string()]).await?;

    throttled.assert();
    answering.assert();
    assert_eq!(report.processed, vec!["front.jpg"]);
    assert!(report.failures.is_empty());
    assert_eq!(report.summary.contacts, 2);
    assert_eq!(report.summary.tokens_used, 600);
    assert_eq!(report.outputs.len(), 3);

    let csv = std::fs::read_to_string(output_dir.path().join("kontakte.csv"))?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Firma,Name,Vorname,Abteilung,Adresse,Telefon,Mobil,Email,URL");
    assert_eq!(lines[1], "Acme GmbH,Doe,Jane,Vertrieb,,,,jane@acme.test,");
    assert_eq!(lines[2], ",,Anon,,,,,,");

    // the nameless second card is not addressable and is left out of vCards
    let vcf = std::fs::read_to_string(output_dir.path().join("kontakte.vcf"))?;
    assert_eq!(vcf.matches("BEGIN:VCARD").count(), 1);
    assert!(vcf.contains("ORG:Acme GmbH;Vertrieb\r\n"));

    let zip_data = std::fs::read(output_dir.path().join("kontakte_vcards.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 1);
    let mut entry = archive.by_name("01_Doe.vcf")?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    assert_eq!(content, vcf);

    Ok(())
}

#[tokio::test]
async fn test_failed_image_does_not_stop_the_batch() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    std::fs::write(input_dir.path().join("good.png"), b"good")?;
    std::fs::write(input_dir.path().join("bad.png"), b"bad")?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/models/model-a:generateContent")
            .body_contains("Z29vZA=="); // base64("good")
        then.status(200).json_body(gemini_reply(
            "[{\"Firma\":\"Acme\",\"Name\":\"Doe\"}]",
            100,
        ));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/models/model-a:generateContent")
            .body_contains("YmFk"); // base64("bad")
        then.status(200)
            .json_body(gemini_reply("Ich kann keine Visitenkarte erkennen.", 50));
    });

    let output_path = output_dir.path().to_str().unwrap().to_string();
    let config = config(&server.url(""), &output_path, r#"["tsv"]"#)?;
    let backend = Arc::new(GeminiBackend::new(server.url(""), "test-key"));
    let mut engine = ScanEngine::from_config(
        backend,
        LocalStorage::new(input_dir.path().to_str().unwrap()),
        LocalStorage::new(output_path.clone()),
        config,
    );

    let images = vec![
        "bad.png".to_string(),
        "missing.png".to_string(),
        "notes.txt".to_string(),
        "good.png".to_string(),
    ];
    let report = engine.run(&images).await?;

    assert_eq!(report.processed, vec!["good.png"]);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(failed, vec!["bad.png", "missing.png", "notes.txt"]);
    assert!(report.failures[0]
        .message
        .contains("Ich kann keine Visitenkarte erkennen."));
    assert_eq!(report.summary.contacts, 1);
    assert_eq!(report.summary.tokens_used, 100);

    let tsv = std::fs::read_to_string(output_dir.path().join("kontakte.tsv"))?;
    assert_eq!(
        tsv,
        "Firma\tName\tVorname\tAbteilung\tAdresse\tTelefon\tMobil\tEmail\tURL\r\nAcme\tDoe\t\t\t\t\t\t\t\r\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_session_edits_are_reflected_in_later_exports() -> Result<()> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    std::fs::write(input_dir.path().join("card.jpeg"), b"card")?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/models/model-a:generateContent");
        then.status(200).json_body(gemini_reply(
            "[{\"Name\":\"Doe\"},{\"Name\":\"Roe\"}]",
            10,
        ));
    });

    let output_path = output_dir.path().to_str().unwrap().to_string();
    let config = config(&server.url(""), &output_path, r#"["csv"]"#)?;
    let backend = Arc::new(GeminiBackend::new(server.url(""), "test-key"));
    let mut engine = ScanEngine::from_config(
        backend,
        LocalStorage::new(input_dir.path().to_str().unwrap()),
        LocalStorage::new(output_path.clone()),
        config,
    );

    engine.run(&["card.jpeg".to_string()]).await?;
    engine.session_mut().remove_at(0)?;
    engine.export(chrono::Utc::now()).await?;

    let csv = std::fs::read_to_string(output_dir.path().join("kontakte.csv"))?;
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains(",Roe,"));
    assert!(!csv.contains(",Doe,"));
    // exporting leaves the session untouched
    assert_eq!(engine.session().records().len(), 1);

    Ok(())
}
