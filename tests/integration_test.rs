use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

const POINTS: &str = r#"[{"lat": 40.60, "lng": -73.95}, {"lat": 40.65, "lng": -73.90}]"#;

fn arrival_body() -> &'static str {
    r#"{
        "status": "OK",
        "origin_addresses": ["Sheepshead Bay, Brooklyn, NY, USA", "Flatbush, Brooklyn, NY, USA"],
        "destination_addresses": ["City Hall Park, New York, NY 10007, USA"],
        "rows": [
            {"elements": [{"status": "OK", "distance": {"text": "19.5 km", "value": 19512}, "duration": {"text": "35 mins", "value": 2101}}]},
            {"elements": [{"status": "ZERO_RESULTS"}]}
        ]
    }"#
}

fn departure_body() -> &'static str {
    r#"{
        "status": "OK",
        "origin_addresses": ["City Hall Park, New York, NY 10007, USA"],
        "destination_addresses": ["Sheepshead Bay, Brooklyn, NY, USA", "Flatbush, Brooklyn, NY, USA"],
        "rows": [{"elements": [
            {"status": "OK", "distance": {"text": "20.1 km", "value": 20140}, "duration": {"text": "41 mins", "value": 2480}},
            {"status": "OK", "distance": {"text": "12.0 km", "value": 12003}, "duration": {"text": "30 mins", "value": 1800}}
        ]}]
    }"#
}

fn write_inputs(dir: &Path, key: Option<&str>) {
    std::fs::write(dir.join("points-new-york-city.json"), POINTS).unwrap();
    let config = match key {
        Some(key) => format!("# Distance Matrix credentials\nDISTANCE_MATRIX_API_KEY={}\n", key),
        None => "# no key yet\n".to_string(),
    };
    std::fs::write(dir.join("config.env"), config).unwrap();
}

fn commute_grid(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("commute-grid"));
    cmd.env_remove("DISTANCE_MATRIX_API_KEY")
        .env_remove("COMMUTE_GRID_DATA_DIR")
        .env_remove("COMMUTE_GRID_CONFIG")
        .arg("--data-dir")
        .arg(dir)
        .arg("--config")
        .arg(dir.join("config.env"));
    cmd
}

#[test]
fn test_end_to_end_collect_and_assemble() {
    let mut server = Server::new();
    let api_url = format!("{}/distancematrix/json", server.url());

    let arrival = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("arrival_time".into(), "1606917600".into()),
            Matcher::UrlEncoded("mode".into(), "driving".into()),
            Matcher::UrlEncoded("key".into(), "integration-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(arrival_body())
        .expect(1)
        .create();
    let departure = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::UrlEncoded(
            "departure_time".into(),
            "1606946400".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(departure_body())
        .expect(1)
        .create();

    let data_dir = tempdir().unwrap();
    let dir = data_dir.path();
    write_inputs(dir, Some("integration-key"));

    commute_grid(dir)
        .arg("collect")
        .arg("--city")
        .arg("New York City")
        .arg("--mode")
        .arg("driving")
        .arg("--api-url")
        .arg(&api_url)
        .assert()
        .success()
        .stdout(predicate::str::contains("Collected 2 payload(s)"));

    arrival.assert();
    departure.assert();
    assert!(
        dir.join("distances-new-york-city-driving-arrival-0-1.json")
            .exists()
    );
    assert!(
        dir.join("distances-new-york-city-driving-departure-0-1.json")
            .exists()
    );

    // A second run finds every payload on disk and does not query again
    commute_grid(dir)
        .arg("collect")
        .arg("--city")
        .arg("new-york-city")
        .arg("--mode")
        .arg("driving")
        .arg("--api-url")
        .arg(&api_url)
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 already present)"));
    arrival.assert();

    commute_grid(dir)
        .arg("assemble")
        .arg("--city")
        .arg("New York City")
        .arg("--mode")
        .arg("driving")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 rows"));

    let results = std::fs::read_to_string(dir.join("results-new-york-city.json")).unwrap();
    let results: serde_json::Value = serde_json::from_str(&results).unwrap();
    let rows = results.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0]["lat"], 40.6);
    assert_eq!(
        rows[0]["legs"]["driving-arrival"]["address"],
        "Sheepshead Bay, Brooklyn, NY, USA"
    );
    assert_eq!(rows[0]["legs"]["driving-arrival"]["distance"], 19512);
    assert_eq!(rows[0]["legs"]["driving-departure"]["duration"], 2480);

    assert!(rows[1]["legs"]["driving-arrival"]["distance"].is_null());
    assert_eq!(rows[1]["legs"]["driving-departure"]["distance"], 12003);
}

#[test]
fn test_collect_refetches_truncated_payload() {
    let mut server = Server::new();
    let arrival = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::UrlEncoded(
            "arrival_time".into(),
            "1606917600".into(),
        ))
        .with_status(200)
        .with_body(arrival_body())
        .expect(1)
        .create();
    let departure = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::UrlEncoded(
            "departure_time".into(),
            "1606946400".into(),
        ))
        .with_status(200)
        .with_body(departure_body())
        .expect(0)
        .create();

    let data_dir = tempdir().unwrap();
    let dir = data_dir.path();
    write_inputs(dir, Some("integration-key"));
    let arrival_file = dir.join("distances-new-york-city-driving-arrival-0-1.json");
    std::fs::write(&arrival_file, r#"{"status": "OK", "rows": [{"elem"#).unwrap();
    std::fs::write(
        dir.join("distances-new-york-city-driving-departure-0-1.json"),
        departure_body(),
    )
    .unwrap();

    commute_grid(dir)
        .arg("collect")
        .arg("--city")
        .arg("New York City")
        .arg("--mode")
        .arg("driving")
        .arg("--api-url")
        .arg(format!("{}/distancematrix/json", server.url()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Collected 1 payload(s)"))
        .stdout(predicate::str::contains("(1 already present)"));

    arrival.assert();
    departure.assert();
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&arrival_file).unwrap()).unwrap();
    assert_eq!(saved["status"], "OK");
    assert!(
        !dir.join("distances-new-york-city-driving-arrival-0-1.json.tmp")
            .exists()
    );

    commute_grid(dir)
        .arg("assemble")
        .arg("--city")
        .arg("New York City")
        .arg("--mode")
        .arg("driving")
        .assert()
        .success();
}

#[test]
fn test_collect_without_api_key_fails() {
    let data_dir = tempdir().unwrap();
    let dir = data_dir.path();
    write_inputs(dir, None);

    commute_grid(dir)
        .arg("collect")
        .arg("--city")
        .arg("New York City")
        .arg("--api-url")
        .arg("http://127.0.0.1:9/distancematrix/json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DISTANCE_MATRIX_API_KEY"));
}

#[test]
fn test_collect_reports_permanent_api_error() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#)
        .expect(1)
        .create();

    let data_dir = tempdir().unwrap();
    let dir = data_dir.path();
    write_inputs(dir, Some("bad-key"));

    commute_grid(dir)
        .arg("collect")
        .arg("--city")
        .arg("New York City")
        .arg("--api-url")
        .arg(format!("{}/distancematrix/json", server.url()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("The provided API key is invalid."));

    mock.assert();
    assert!(
        !dir.join("distances-new-york-city-driving-arrival-0-1.json")
            .exists()
    );
}

#[test]
fn test_assemble_before_collect_fails() {
    let data_dir = tempdir().unwrap();
    let dir = data_dir.path();
    write_inputs(dir, Some("integration-key"));

    commute_grid(dir)
        .arg("assemble")
        .arg("--city")
        .arg("New York City")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run collect first"));
}

#[test]
fn test_unknown_city_fails() {
    let data_dir = tempdir().unwrap();
    let dir = data_dir.path();
    write_inputs(dir, Some("integration-key"));

    commute_grid(dir)
        .arg("collect")
        .arg("--city")
        .arg("Atlantis")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown city 'Atlantis'"));
}
