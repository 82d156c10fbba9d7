use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use comext::{
    AttemptError, BODY_EXCERPT_CHARS, ClientConfig, Extractor, HttpRequest, HttpResponse,
    ResponseFormat, Stage, Transport, TransportError,
    core::{DecodeError, DecodeOptions, Dialect, OBS_VALUE},
};
use indexmap::IndexMap;
use serde_json::json;

/// Replays queued responses and records every request it receives.
#[derive(Clone, Default)]
struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request")
    }
}

fn ok(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(status, body))
}

fn json_stat_body() -> String {
    json!({
        "id": ["freq", "indic_et", "partner"],
        "value": {"0:1:2": 1234.5, "0:0:0": 7},
        "dimension": {
            "freq": {"category": {"index": {"A": 0}}},
            "indic_et": {"category": {"index": {"IMP": 0, "EXP": 1}}},
            "partner": {"category": {"index": {"US": 0, "JP": 1, "CN": 2}}}
        }
    })
    .to_string()
}

const CSV_BODY: &str = "freq, reporter ,OBS_VALUE\nA,DE,10.5\nA,FR,3\n";

fn filters() -> IndexMap<String, String> {
    IndexMap::from([
        ("geo".to_string(), "DE".to_string()),
        ("time".to_string(), "2024".to_string()),
    ])
}

fn extractor(transport: &ScriptedTransport) -> Extractor {
    Extractor::builder()
        .with_config(
            ClientConfig::default()
                .with_primary_base_url("https://primary.test/data/")
                .with_secondary_base_url("https://secondary.test/sdmx/")
                .with_timeout(Duration::from_secs(5)),
        )
        .build(transport.clone())
}

#[test]
fn primary_success_decodes_without_touching_secondary() {
    let transport = ScriptedTransport::new(vec![ok(200, &json_stat_body())]);
    let table = extractor(&transport).fetch("DS-057009", &filters()).unwrap();

    assert_eq!(table.num_rows(), 2);
    let first = &table.rows()[0];
    assert_eq!(first.get("FREQ"), Some(&json!("A")));
    assert_eq!(first.get("INDIC_ET"), Some(&json!("EXP")));
    assert_eq!(first.get("PARTNER"), Some(&json!("CN")));
    assert_eq!(first.get(OBS_VALUE), Some(&json!(1234.5)));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://primary.test/data/DS-057009");
    assert_eq!(requests[0].format, ResponseFormat::Json);
    assert_eq!(requests[0].header("accept"), Some("application/json"));
    assert_eq!(requests[0].timeout, Duration::from_secs(5));
}

#[test]
fn filters_are_forwarded_verbatim_in_order() {
    let transport = ScriptedTransport::new(vec![ok(404, "not found"), ok(200, CSV_BODY)]);
    extractor(&transport).fetch("DS-057009", &filters()).unwrap();

    for request in transport.requests() {
        assert_eq!(
            request.query,
            [
                ("geo".to_string(), "DE".to_string()),
                ("time".to_string(), "2024".to_string())
            ]
        );
    }
}

#[test]
fn primary_404_falls_back_to_secondary_csv() {
    let transport = ScriptedTransport::new(vec![ok(404, "not found"), ok(200, CSV_BODY)]);
    let table = extractor(&transport).fetch("DS-057009", &filters()).unwrap();

    assert_eq!(table.columns(), ["FREQ", "REPORTER", "OBS_VALUE"]);
    assert_eq!(table.rows()[1].get("REPORTER"), Some(&json!("FR")));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url, "https://secondary.test/sdmx/DS-057009/");
    assert_eq!(requests[1].format, ResponseFormat::DelimitedText);
    assert_eq!(requests[1].header("Accept"), Some("text/csv"));
}

#[test]
fn primary_406_falls_back_to_secondary() {
    let transport = ScriptedTransport::new(vec![ok(406, ""), ok(200, CSV_BODY)]);
    let table = extractor(&transport).fetch("DS-057009", &filters()).unwrap();
    assert_eq!(table.num_rows(), 2);
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn primary_500_fails_without_secondary_request() {
    let transport = ScriptedTransport::new(vec![ok(500, "internal error")]);
    let err = extractor(&transport).fetch("DS-057009", &filters()).unwrap_err();

    assert_eq!(err.stage, Stage::Primary);
    assert_eq!(err.status, Some(500));
    assert_eq!(err.body_excerpt.as_deref(), Some("internal error"));
    assert!(matches!(
        err.source,
        AttemptError::UpstreamRejected { status: 500 }
    ));
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn primary_429_is_terminal() {
    let transport = ScriptedTransport::new(vec![ok(429, "slow down")]);
    let err = extractor(&transport).fetch("DS-057009", &filters()).unwrap_err();
    assert_eq!(err.status, Some(429));
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn empty_observation_map_falls_back() {
    let body = json!({
        "id": ["geo"],
        "value": {},
        "dimension": {"geo": {"category": {"index": {"DE": 0}}}}
    })
    .to_string();
    let transport = ScriptedTransport::new(vec![ok(200, &body), ok(200, CSV_BODY)]);
    let table = extractor(&transport).fetch("DS-057009", &filters()).unwrap();

    assert_eq!(table.num_rows(), 2);
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn unrecognized_dialect_and_invalid_json_fall_back() {
    for body in [r#"{"error": "dataset too large"}"#, "<html>maintenance</html>"] {
        let transport = ScriptedTransport::new(vec![ok(200, body), ok(200, CSV_BODY)]);
        let table = extractor(&transport).fetch("DS-057009", &filters()).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(transport.requests().len(), 2);
    }
}

#[test]
fn secondary_failure_reports_last_status_and_excerpt() {
    let long_body = "x".repeat(BODY_EXCERPT_CHARS + 50);
    let transport = ScriptedTransport::new(vec![ok(404, "missing"), ok(503, &long_body)]);
    let err = extractor(&transport).fetch("DS-057009", &filters()).unwrap_err();

    assert_eq!(err.stage, Stage::Secondary);
    assert_eq!(err.status, Some(503));
    assert_eq!(err.dataset, "DS-057009");
    assert_eq!(
        err.body_excerpt.as_deref().map(|b| b.chars().count()),
        Some(BODY_EXCERPT_CHARS)
    );
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn secondary_unparsable_csv_fails() {
    let transport = ScriptedTransport::new(vec![ok(404, ""), ok(200, "  ")]);
    let err = extractor(&transport).fetch("DS-057009", &filters()).unwrap_err();

    assert_eq!(err.stage, Stage::Secondary);
    assert!(matches!(err.source, AttemptError::InvalidCsv(_)));
    assert_eq!(err.body_excerpt, None);
}

#[test]
fn transport_error_on_primary_is_terminal() {
    let transport = ScriptedTransport::new(vec![Err(TransportError::Request {
        url: "https://primary.test/data/DS-057009".to_string(),
        message: "connection refused".to_string(),
    })]);
    let err = extractor(&transport).fetch("DS-057009", &filters()).unwrap_err();

    assert_eq!(err.stage, Stage::Primary);
    assert_eq!(err.status, None);
    assert!(matches!(err.source, AttemptError::Transport(_)));
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn custom_headers_override_defaults() {
    let transport = ScriptedTransport::new(vec![ok(200, &json_stat_body())]);
    let extractor = Extractor::builder()
        .with_config(
            ClientConfig::default()
                .with_user_agent("test-agent/1.0")
                .with_header("user-agent", "override/2.0")
                .with_header("X-Trace", "abc"),
        )
        .build(transport.clone());
    extractor.fetch("DS-057009", &IndexMap::new()).unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.header("User-Agent"), Some("override/2.0"));
    assert_eq!(request.header("x-trace"), Some("abc"));
    assert_eq!(
        request
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
            .count(),
        1
    );
    assert!(request.url.starts_with(comext::DEFAULT_PRIMARY_BASE_URL));
}

#[test]
fn decode_options_are_applied() {
    let body = json!({
        "id": ["geo", "time"],
        "value": {"1|0": 2.5},
        "dimension": {
            "geo": {"category": {"index": {"DE": 0, "FR": 1}, "label": {"DE": "Germany", "FR": "France"}}},
            "time": {"category": {"index": {"2024": 0}}}
        }
    })
    .to_string();
    let transport = ScriptedTransport::new(vec![ok(200, &body)]);
    let extractor = Extractor::builder()
        .with_decode_options(DecodeOptions::default().with_key_delimiter("|"))
        .build(transport.clone());

    let table = extractor.fetch("DS-1", &IndexMap::new()).unwrap();
    assert_eq!(table.rows()[0].get("GEO"), Some(&json!("France")));
    assert_eq!(table.rows()[0].get("TIME"), Some(&json!("2024")));
}

#[test]
fn dimensions_reads_catalogs_and_metadata_from_primary() {
    let body = json!({
        "label": "EU trade since 2002",
        "source": "ESTAT",
        "id": ["freq", "geo"],
        "value": {},
        "dimension": {
            "freq": {"label": "Frequency", "category": {"index": {"A": 0}}},
            "geo": {"category": {"index": {"DE": 0, "FR": 1}}}
        }
    })
    .to_string();
    let transport = ScriptedTransport::new(vec![ok(200, &body)]);
    let dims = extractor(&transport)
        .dimensions("DS-057009", &IndexMap::new())
        .unwrap();

    assert_eq!(dims.dialect, Dialect::CategoryIndex);
    assert_eq!(dims.metadata.label.as_deref(), Some("EU trade since 2002"));
    assert_eq!(dims.metadata.source.as_deref(), Some("ESTAT"));
    let ids: Vec<&str> = dims.catalogs.iter().map(|c| c.id()).collect();
    assert_eq!(ids, ["freq", "geo"]);
    assert_eq!(dims.catalogs[1].len(), 2);
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn dimensions_rejects_unrecognized_body() {
    let transport = ScriptedTransport::new(vec![ok(200, "{}")]);
    let err = extractor(&transport)
        .dimensions("DS-057009", &IndexMap::new())
        .unwrap_err();

    assert_eq!(err.stage, Stage::Primary);
    assert!(matches!(
        err.source,
        AttemptError::Decode(DecodeError::UnrecognizedDialect { .. })
    ));
}

#[test]
fn extractor_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Extractor>();
}
