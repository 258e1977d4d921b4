//! End-to-end conversion tests over the memory and `GeoJSON` stores.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use marsconv_core::error::{FormatError, MarsconvError};
use marsconv_core::geometry::{GeometryKind, GeometryShape, Part};
use marsconv_core::pipeline::{convert_dataset, convert_dataset_files};
use marsconv_core::schema::{FeatureRecord, FieldDescriptor, FieldType, Schema};
use marsconv_core::store::FeatureSource;
use marsconv_core::store::geojson::GeoJsonSource;
use marsconv_core::store::memory::{MemorySink, MemorySource};
use marsconv_core::transform::{Direction, GeoPoint};

fn point_record(id: i64, lng: f64, lat: f64) -> FeatureRecord {
    FeatureRecord {
        values: vec![serde_json::json!(id), serde_json::json!(format!("site-{id}"))],
        geometry: GeometryShape::Point(GeoPoint::new(lng, lat)),
    }
}

fn test_schema() -> Schema {
    Schema::new(vec![
        FieldDescriptor::new("id", FieldType::Integer),
        FieldDescriptor::new("name", FieldType::Text),
    ])
    .unwrap()
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn one_bad_record_never_aborts_the_batch() {
    let records = vec![
        Ok(point_record(1, 116.0, 39.0)),
        Ok(point_record(2, 116.1, 39.1)),
        Err(MarsconvError::Format(FormatError::UnsupportedGeometryType {
            geometry_type: "GeometryCollection".to_string(),
        })),
        Ok(point_record(4, 116.2, 39.2)),
        Ok(point_record(5, 116.3, 39.3)),
    ];
    let mut source = MemorySource::new(test_schema(), GeometryKind::Point, records);
    let mut sink = MemorySink::new();

    let report = convert_dataset(&mut source, &mut sink, Direction::Wgs84ToGcj02).unwrap();

    assert_eq!(report.read, 5);
    assert_eq!(report.written, 4);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("record #3"));
    assert!(report.warnings[0].contains("GeometryCollection"));

    // Sink holds exactly records 1, 2, 4, 5 in order, attributes unchanged.
    let ids: Vec<i64> = sink
        .records()
        .iter()
        .map(|r| r.values[0].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 4, 5]);
    assert_eq!(sink.records()[2].values[1], serde_json::json!("site-4"));
}

#[test]
fn non_finite_vertex_is_skipped_not_fatal() {
    let records = vec![
        Ok(point_record(1, 116.0, 39.0)),
        Ok(FeatureRecord {
            values: vec![serde_json::json!(2), serde_json::json!("broken")],
            geometry: GeometryShape::Point(GeoPoint::new(f64::NAN, 39.0)),
        }),
        Ok(point_record(3, 116.2, 39.2)),
    ];
    let mut source = MemorySource::new(test_schema(), GeometryKind::Point, records);
    let mut sink = MemorySink::new();

    let report = convert_dataset(&mut source, &mut sink, Direction::Wgs84ToGcj02).unwrap();
    assert_eq!((report.read, report.written, report.skipped), (3, 2, 1));
    assert!(report.warnings[0].contains("record #2"));
}

#[test]
fn attributes_pass_through_verbatim() {
    let schema = Schema::new(vec![
        FieldDescriptor::new("id", FieldType::Integer),
        FieldDescriptor::new("note", FieldType::Text),
        FieldDescriptor::new("surveyed", FieldType::Date),
    ])
    .unwrap();
    let values = vec![
        serde_json::json!(42),
        serde_json::Value::Null,
        serde_json::json!("2019-07-01"),
    ];
    let records = vec![Ok(FeatureRecord {
        values: values.clone(),
        geometry: GeometryShape::Polyline(vec![Part::from_points([
            GeoPoint::new(116.0, 39.0),
            GeoPoint::new(116.5, 39.5),
        ])]),
    })];
    let mut source = MemorySource::new(schema, GeometryKind::Polyline, records);
    let mut sink = MemorySink::new();

    convert_dataset(&mut source, &mut sink, Direction::Gcj02ToWgs84).unwrap();
    assert_eq!(sink.records()[0].values, values);
}

#[test]
fn invalid_direction_fails_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("never-created.geojson");
    let output = dir.path().join("out.geojson");

    let err = convert_dataset_files(&input, &output, "UP_AND_TO_THE_LEFT").unwrap_err();
    assert!(err.to_string().contains("not a conversion direction"));
    // Fatal before dataset creation: the missing input was never even probed
    // and no output file exists.
    assert!(!output.exists());
}

#[test]
fn missing_source_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert_dataset_files(
        dir.path().join("absent.geojson"),
        dir.path().join("out.geojson"),
        "WGS84_TO_GCJ02",
    )
    .unwrap_err();
    assert!(err.user_message().contains("not found"));
}

#[test]
fn geojson_end_to_end_shifts_and_preserves() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        &dir,
        "beijing.geojson",
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[116.3975,39.9087]},
             "properties":{"id":1,"name":"gulou"}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[-0.1278,51.5074]},
             "properties":{"id":2,"name":"london"}}
        ]}"#,
    );
    let output = dir.path().join("out.geojson");

    let report = convert_dataset_files(&input, &output, "WGS84_TO_GCJ02").unwrap();
    assert_eq!((report.read, report.written, report.skipped), (2, 2, 0));

    let mut reread = GeoJsonSource::open(&output).unwrap();
    let first = reread.next_record().unwrap().unwrap();
    let GeometryShape::Point(beijing) = first.geometry else {
        panic!("expected point");
    };
    let dlng = beijing.lng - 116.3975;
    let dlat = beijing.lat - 39.9087;
    assert!((0.0054..=0.0060).contains(&dlng), "dlng = {dlng}");
    assert!((0.0016..=0.0022).contains(&dlat), "dlat = {dlat}");
    assert!(first.values.contains(&serde_json::json!("gulou")));

    // Outside the correction region the transform is the identity, exactly.
    let second = reread.next_record().unwrap().unwrap();
    assert_eq!(
        second.geometry,
        GeometryShape::Point(GeoPoint::new(-0.1278, 51.5074))
    );
}

#[test]
fn geojson_batch_isolation_with_unsupported_variant() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        &dir,
        "mixed.geojson",
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[116.0,39.0]},"properties":{"id":1}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[116.1,39.1]},"properties":{"id":2}},
            {"type":"Feature","geometry":{"type":"MultiPolygon","coordinates":[[[[0,0],[1,0],[1,1],[0,0]]]]},"properties":{"id":3}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[116.2,39.2]},"properties":{"id":4}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[116.3,39.3]},"properties":{"id":5}}
        ]}"#,
    );
    let output = dir.path().join("out.geojson");

    let report = convert_dataset_files(&input, &output, "GCJ02_TO_WGS84").unwrap();
    assert_eq!((report.read, report.written, report.skipped), (5, 4, 1));
    assert!(report.warnings[0].contains("record #3"));

    let mut reread = GeoJsonSource::open(&output).unwrap();
    let mut ids = Vec::new();
    while let Some(record) = reread.next_record() {
        let record = record.unwrap();
        let id = record.values[0].as_i64().unwrap();
        ids.push(id);
    }
    assert_eq!(ids, vec![1, 2, 4, 5]);
}

#[test]
fn output_schema_matches_input_schema() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        &dir,
        "schema.geojson",
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[100.0,30.0]},
             "properties":{"count":3,"label":"alpha","ratio":0.5,"when":"2020-01-02"}}
        ]}"#,
    );
    let output = dir.path().join("out.geojson");
    convert_dataset_files(&input, &output, "WGS84_TO_GCJ02").unwrap();

    let input_schema = GeoJsonSource::open(&input).unwrap().schema().clone();
    let output_schema = GeoJsonSource::open(&output).unwrap().schema().clone();
    assert_eq!(output_schema, input_schema);
    assert!(!input_schema.is_empty());
}

#[test]
fn output_is_declared_wgs84_regardless_of_direction() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        &dir,
        "one.geojson",
        r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[116.0,39.0]},"properties":{}}"#,
    );
    for direction in ["WGS84_TO_GCJ02", "GCJ02_TO_WGS84"] {
        let output = dir.path().join(format!("{direction}.geojson"));
        convert_dataset_files(&input, &output, direction).unwrap();
        let body = std::fs::read_to_string(&output).unwrap();
        assert!(body.contains("urn:ogc:def:crs:EPSG::4326"));
    }
}
