use std::collections::BTreeMap;

use serde_json::json;
use sluice_core::path::segment_count;
use sluice_core::{
    analyze_array_crossings, navigate, navigate_indexed, render_indexed_path, ArrayCrossing,
    IndexedPath, PathError,
};

#[test]
fn crossings_report_array_levels() {
    let sample = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
    let crossings = analyze_array_crossings("a.b.c", &sample);
    assert_eq!(
        crossings,
        vec![ArrayCrossing {
            level: 1,
            field_name: "b".to_string(),
            array_length: 2,
            full_path: "a.b".to_string(),
        }]
    );
    assert_eq!(
        serde_json::to_value(&crossings).unwrap(),
        json!([{"level": 1, "fieldName": "b", "arrayLength": 2, "fullPath": "a.b"}])
    );
}

#[test]
fn crossings_follow_first_element_through_nested_arrays() {
    let sample = json!({"orders": [{"lines": [{"sku": "x"}], "id": 1}, {"lines": []}]});
    let crossings = analyze_array_crossings("orders.lines.sku", &sample);
    let prefixes: Vec<&str> = crossings.iter().map(|c| c.full_path.as_str()).collect();
    assert_eq!(prefixes, vec!["orders", "orders.lines"]);
    assert_eq!(crossings[0].array_length, 2);
    assert_eq!(crossings[1].level, 1);
}

#[test]
fn crossings_stop_on_empty_array_or_missing_key() {
    let sample = json!({"a": [], "b": {"c": 1}});
    let stopped = analyze_array_crossings("a.x.y", &sample);
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0].array_length, 0);

    assert!(analyze_array_crossings("b.missing.deeper", &sample).is_empty());
    assert!(analyze_array_crossings("", &sample).is_empty());
    assert!(analyze_array_crossings("a", &json!(null)).is_empty());
}

#[test]
fn renders_selected_prefixes() {
    let mut selections = BTreeMap::new();
    selections.insert("a.b".to_string(), 3);
    selections.insert("a.b.c.d".to_string(), 0);
    assert_eq!(render_indexed_path("a.b.c.d.e", &selections), "a.b[3].c.d[0].e");
    assert_eq!(render_indexed_path("", &selections), "");
    assert_eq!(render_indexed_path("x.y", &BTreeMap::new()), "x.y");
}

#[test]
fn rendering_with_default_indices_preserves_segment_count() {
    let samples = [
        ("a.b.c", json!({"a": {"b": [{"c": [1]}]}})),
        ("x", json!({"x": [1, 2, 3]})),
        ("p.q.r.s", json!({"p": [{"q": [{"r": [{"s": 1}]}]}]})),
        ("m.n", json!({"m": {"n": 1}})),
    ];
    for (path, sample) in samples {
        let crossings = analyze_array_crossings(path, &sample);
        let indexed = IndexedPath::from_crossings(path, &crossings);
        let rendered = indexed.render();
        assert_eq!(segment_count(&rendered), segment_count(path), "{rendered}");
        assert_eq!(rendered.matches("[0]").count(), crossings.len());
    }
}

#[test]
fn indexed_path_resolves_selection() {
    let data = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
    let path = IndexedPath::new("a.b.c").select("a.b", 1);
    assert_eq!(path.to_string(), "a.b[1].c");
    assert_eq!(path.resolve(&data).unwrap(), Some(&json!(2)));
}

#[test]
fn navigate_is_silent_on_missing_segments() {
    let data = json!({"a": {"b": [{"x": 1}, {"x": 2}]}});
    assert_eq!(navigate(&data, "a.b"), Some(&json!([{"x": 1}, {"x": 2}])));
    assert_eq!(navigate(&data, "a.b.1.x"), Some(&json!(2)));
    assert_eq!(navigate(&data, "a.missing.x"), None);
    assert_eq!(navigate(&data, "a.b.x"), None);
    assert_eq!(navigate(&data, ""), Some(&data));
}

#[test]
fn navigate_indexed_distinguishes_absence_from_mismatch() {
    let data = json!({"a": {"b": [{"x": 1}], "s": "text"}});
    assert_eq!(navigate_indexed(&data, "a.b[0].x").unwrap(), Some(&json!(1)));
    assert_eq!(navigate_indexed(&data, "a.b[5].x").unwrap(), None);
    assert_eq!(navigate_indexed(&data, "a.nope[0]").unwrap(), None);
    assert_eq!(
        navigate_indexed(&data, "a.s[0]").unwrap_err(),
        PathError::NotAnArray {
            prefix: "a.s".to_string()
        }
    );
    assert!(matches!(
        navigate_indexed(&data, "a.b[x]").unwrap_err(),
        PathError::Malformed { .. }
    ));
}
