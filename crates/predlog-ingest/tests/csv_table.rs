use std::fs;

use proptest::prelude::*;

use predlog_ingest::{parse_json_object, read_csv_table, write_csv_table};

#[test]
fn reads_and_writes_prediction_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("prediction_details.csv");
    fs::write(
        &path,
        "record_id,timestamp,features,payload,is_missing_required_data\n\
         p1,2024-01-15 10:00:00,\"{\"\"a\"\": 1, \"\"b\"\": null}\",\"{\"\"predictionValue\"\": 0.8}\",False\n\
         p2,2024-01-15 11:00:00,,,True\n",
    )
    .expect("write file");

    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(table.name(), "prediction_details");
    assert_eq!(table.height(), 2);
    assert_eq!(table.width(), 5);

    let features = table.column_index("features").expect("features column");
    let record = parse_json_object(table.value(0, features).as_str());
    assert_eq!(record.len(), 2);
    assert!(table.value(1, features).is_null());

    let out = dir.path().join("nested/out.csv");
    write_csv_table(&table, &out).expect("write csv");
    let reread = read_csv_table(&out).expect("reread csv");
    assert_eq!(reread.height(), 2);
    assert_eq!(
        reread.column_names().collect::<Vec<_>>(),
        table.column_names().collect::<Vec<_>>()
    );
    assert_eq!(reread.value(0, features), table.value(0, features));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = read_csv_table(&dir.path().join("absent.csv")).unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
}

proptest! {
    #[test]
    fn record_parser_never_panics(raw in ".*") {
        let _ = parse_json_object(Some(&raw));
    }
}
