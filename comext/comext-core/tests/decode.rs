use std::path::PathBuf;

use comext_core::{
    DecodeError, DecodeOptions, Dialect, LabelStyle, OBS_VALUE, Payload, decode,
};
use serde_json::{Value, json};

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn trade_body(values: Value) -> Value {
    json!({
        "id": ["freq", "indic_et", "partner"],
        "value": values,
        "dimension": {
            "freq": {"category": {"index": {"A": 0}}},
            "indic_et": {"category": {"index": {"IMP": 0, "EXP": 1}}},
            "partner": {"category": {"index": {"US": 0, "JP": 1, "CN": 2}}}
        }
    })
}

#[test]
fn decode_resolves_every_dimension_of_a_compound_key() {
    let body = trade_body(json!({"0:1:2": 1234.5}));
    let table = decode(&body, &DecodeOptions::default()).unwrap();

    assert_eq!(table.num_rows(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.get("FREQ"), Some(&json!("A")));
    assert_eq!(row.get("INDIC_ET"), Some(&json!("EXP")));
    assert_eq!(row.get("PARTNER"), Some(&json!("CN")));
    assert_eq!(row.obs_value(), Some(&json!(1234.5)));
    assert_eq!(row.len(), 4);
    assert_eq!(table.columns(), ["FREQ", "INDIC_ET", "PARTNER", OBS_VALUE]);
}

#[test]
fn decode_produces_one_row_per_unique_key_in_declared_order() {
    let body = trade_body(json!({
        "0:1:2": 1.0,
        "0:0:0": 2.0,
        "0:1:1": 3.0,
        "0:0:2": 4.0
    }));
    let table = decode(&body, &DecodeOptions::default()).unwrap();

    assert_eq!(table.num_rows(), 4);
    let values: Vec<_> = table
        .column_values(OBS_VALUE)
        .map(|v| v.unwrap().as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn decode_drops_only_malformed_keys() {
    let body = trade_body(json!({
        "0:1:2": 1.0,
        "0:one:2": 2.0,
        "0:0:0": 3.0,
        "-1:0:0": 4.0,
        "": 5.0
    }));
    let table = decode(&body, &DecodeOptions::default()).unwrap();

    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.rows()[1].get("PARTNER"), Some(&json!("US")));
}

#[test]
fn decode_all_malformed_keys_is_no_observations() {
    let body = trade_body(json!({"a:b:c": 1.0}));
    let err = decode(&body, &DecodeOptions::default()).unwrap_err();
    assert_eq!(err, DecodeError::NoObservations);
}

#[test]
fn decode_empty_observation_map_is_no_observations() {
    let body = trade_body(json!({}));
    let err = decode(&body, &DecodeOptions::default()).unwrap_err();
    assert_eq!(err, DecodeError::NoObservations);
    assert!(err.is_fallback_signal());
}

#[test]
fn decode_uses_raw_index_outside_catalog_and_for_missing_catalog() {
    let body = json!({
        "id": ["partner", "product"],
        "value": {"9:4": 7},
        "dimension": {
            "partner": {"category": {"index": {"US": 0}}}
        }
    });
    let table = decode(&body, &DecodeOptions::default()).unwrap();

    let row = &table.rows()[0];
    assert_eq!(row.get("PARTNER"), Some(&json!("9")));
    assert_eq!(row.get("PRODUCT"), Some(&json!("4")));
}

#[test]
fn decode_short_keys_omit_trailing_dimensions() {
    let body = trade_body(json!({"0:1": 5, "0": 6}));
    let table = decode(&body, &DecodeOptions::default()).unwrap();

    assert_eq!(table.columns(), ["FREQ", "INDIC_ET", OBS_VALUE]);
    assert!(!table.rows()[0].contains("PARTNER"));
    assert!(!table.rows()[1].contains("INDIC_ET"));
}

#[test]
fn decode_ignores_positions_beyond_dimension_order() {
    let body = trade_body(json!({"0:1:2:5": 5}));
    let table = decode(&body, &DecodeOptions::default()).unwrap();
    assert_eq!(table.rows()[0].len(), 4);
}

#[test]
fn decode_prefers_category_labels_unless_codes_are_requested() {
    let body = json!({
        "id": ["geo"],
        "value": {"0": 1},
        "dimension": {"geo": {"category": {
            "index": {"DE": 0},
            "label": {"DE": "Germany"}
        }}}
    });

    let labelled = decode(&body, &DecodeOptions::default()).unwrap();
    assert_eq!(labelled.rows()[0].get("GEO"), Some(&json!("Germany")));

    let coded = decode(
        &body,
        &DecodeOptions::default().with_label_style(LabelStyle::Code),
    )
    .unwrap();
    assert_eq!(coded.rows()[0].get("GEO"), Some(&json!("DE")));
}

#[test]
fn decode_honors_configured_key_delimiter() {
    let body = trade_body(json!({"0|1|2": 1.5}));
    let options = DecodeOptions::default().with_key_delimiter("|");
    let table = decode(&body, &options).unwrap();
    assert_eq!(table.rows()[0].get("PARTNER"), Some(&json!("CN")));

    let err = decode(&body, &DecodeOptions::default()).unwrap_err();
    assert_eq!(err, DecodeError::NoObservations);
}

#[test]
fn decode_passes_non_numeric_values_through() {
    let body = trade_body(json!({"0:0:0": ":", "0:0:1": null}));
    let table = decode(&body, &DecodeOptions::default()).unwrap();
    assert_eq!(table.rows()[0].obs_value(), Some(&json!(":")));
    assert_eq!(table.rows()[1].obs_value(), Some(&Value::Null));
}

#[test]
fn decode_unravels_linear_keys_of_eurostat_fixture() {
    let body = fixture("ext_lt_intratrd.json");
    let options = DecodeOptions::default().with_label_style(LabelStyle::Code);
    let table = decode(&body, &options).unwrap();

    assert_eq!(table.num_rows(), 5);
    assert_eq!(
        table.columns(),
        ["FREQ", "INDIC_ET", "SITC06", "PARTNER", "GEO", "TIME", OBS_VALUE]
    );

    let row = &table.rows()[3];
    assert_eq!(row.get("INDIC_ET"), Some(&json!("MIO_IMP_VAL")));
    assert_eq!(row.get("SITC06"), Some(&json!("TOTAL")));
    assert_eq!(row.get("PARTNER"), Some(&json!("INT_EU27_2020")));
    assert_eq!(row.get("TIME"), Some(&json!("2020")));
    assert_eq!(row.obs_value(), Some(&json!(-87.25)));
}

#[test]
fn decode_fixture_with_labels() {
    let body = fixture("ext_lt_intratrd.json");
    let table = decode(&body, &DecodeOptions::default()).unwrap();

    let row = &table.rows()[2];
    assert_eq!(row.get("SITC06"), Some(&json!("Food, drinks and tobacco")));
    assert_eq!(row.get("FREQ"), Some(&json!("Annual")));
}

#[test]
fn fixture_metadata_is_exposed() {
    let body = fixture("ext_lt_intratrd.json");
    let payload = Payload::parse(&body).unwrap();

    assert_eq!(payload.dialect(), Dialect::CategoryIndex);
    let metadata = payload.metadata();
    assert_eq!(metadata.source.as_deref(), Some("ESTAT"));
    assert_eq!(metadata.updated.as_deref(), Some("2024-03-15T11:00:00+0100"));
    assert_eq!(payload.extents(), Some(&[1, 2, 2, 2, 1, 1][..]));
}

#[test]
fn decode_dense_value_array_skips_null_cells() {
    let body = json!({
        "id": ["geo", "time"],
        "size": [2, 2],
        "value": [1.0, null, 3.0, 4.0],
        "dimension": {
            "geo": {"category": {"index": {"DE": 0, "FR": 1}}},
            "time": {"category": {"index": {"2020": 0, "2021": 1}}}
        }
    });
    let table = decode(&body, &DecodeOptions::default()).unwrap();

    assert_eq!(table.num_rows(), 3);
    let row = &table.rows()[1];
    assert_eq!(row.get("GEO"), Some(&json!("FR")));
    assert_eq!(row.get("TIME"), Some(&json!("2020")));
    assert_eq!(row.obs_value(), Some(&json!(3.0)));
}

#[test]
fn decode_linear_key_outside_cube_keeps_the_row() {
    let body = json!({
        "id": ["freq", "geo"],
        "size": [1, 2],
        "value": {"0:1": 1.0, "7": 2.0},
        "dimension": {
            "freq": {"category": {"index": {"A": 0}}},
            "geo": {"category": {"index": {"DE": 0, "FR": 1}}}
        }
    });
    let table = decode(&body, &DecodeOptions::default()).unwrap();

    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.rows()[0].get("GEO"), Some(&json!("FR")));
    let row = &table.rows()[1];
    assert_eq!(row.get("FREQ"), Some(&json!("7")));
    assert!(!row.contains("GEO"));
    assert_eq!(row.obs_value(), Some(&json!(2.0)));
    assert_eq!(table.columns(), ["FREQ", "GEO", OBS_VALUE]);
}

#[test]
fn decode_rejects_bodies_of_neither_dialect() {
    for body in [
        json!({"error": {"status": 404, "label": "not found"}}),
        json!({"value": {"0": 1}, "dimension": {}}),
        json!([1, 2, 3]),
        json!({"value": 3, "dimension": {}, "id": ["geo"]}),
        json!({"value": {}, "dimension": {}, "id": []}),
        json!({"value": {}, "dimension": {}, "id": [1]}),
    ] {
        let err = decode(&body, &DecodeOptions::default()).unwrap_err();
        assert!(
            matches!(err, DecodeError::UnrecognizedDialect { .. }),
            "{body} -> {err:?}"
        );
    }
}

#[test]
fn category_index_dialect_wins_over_data_sets() {
    let mut body = trade_body(json!({"0:0:0": 1}));
    body["dataSets"] = json!([]);
    let payload = Payload::parse(&body).unwrap();
    assert_eq!(payload.dialect(), Dialect::CategoryIndex);
}
