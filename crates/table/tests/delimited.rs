//! Comma-delimited import/export tests

mod common;

use common::{TableBuilder, people, row};
use proven_table::types::{Column, DataType};
use proven_table::{Error, ImportSummary, TableConfig};

#[test]
fn test_round_trip_through_file() {
    let source = people();
    source.insert_row(["6", "Quote \"Q\", Jr.", "50", "R&D"]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");
    source.export_delimited_file(&path).unwrap();

    let target = TableBuilder::new("Copy").column(Column::string("Placeholder")).build();
    let summary = target.import_delimited_file(&path, true).unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            imported: 6,
            skipped: 0
        }
    );
    assert_eq!(target.schema(), source.schema());
    assert_eq!(target.rows(), source.rows());
}

#[test]
fn test_export_layout() {
    let table = TableBuilder::new("T")
        .column(Column::integer("ID"))
        .column(Column::string("Note"))
        .row(&["1", "plain"])
        .row(&["2", "a,b"])
        .build();

    let mut out = Vec::new();
    table.export_delimited(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "ID:Integer,Note:String\n1,plain\n2,\"a,b\"\n"
    );

    let untyped = TableBuilder::new("T")
        .column(Column::integer("ID"))
        .config(TableConfig::default().with_typed_headers(false).with_delimiter(';'))
        .row(&["1"])
        .build();
    let mut out = Vec::new();
    untyped.export_delimited(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "ID\n1\n");
}

#[test]
fn test_import_skips_bad_rows() {
    let table = people();
    let input = "ID,Name,Age,Dept\n6,Frank,50,Eng\n7,Gina\n8,Hal,old,Ops\n9,Ivy,22,Ops\n";

    let summary = table.import_delimited(input.as_bytes(), false).unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            imported: 2,
            skipped: 2
        }
    );
    assert_eq!(table.count_rows(), 7);
    assert_eq!(table.rows().last().unwrap(), &row(&["9", "Ivy", "22", "Ops"]));
}

#[test]
fn test_append_requires_matching_header() {
    let table = people();
    let err = table
        .import_delimited("ID,Name\n6,Frank\n".as_bytes(), false)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSchema(_)));
    assert_eq!(table.count_rows(), 5);
}

#[test]
fn test_replace_infers_column_types() {
    let table = people();
    let input = "ID,Nickname,Joined:Date\n1,Al,2020-05-01\nx,Bo,2021-01-01\n";

    let summary = table.import_delimited(input.as_bytes(), true).unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 1);

    let schema = table.schema();
    let types: Vec<DataType> = schema.columns().iter().map(|c| c.datatype).collect();
    assert_eq!(types, vec![DataType::Integer, DataType::String, DataType::Date]);
    assert_eq!(table.find_by_id("1").unwrap(), row(&["1", "Al", "2020-05-01"]));
}

#[test]
fn test_import_missing_file() {
    let table = people();
    let dir = tempfile::tempdir().unwrap();
    let err = table
        .import_delimited_file(dir.path().join("absent.csv"), true)
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_round_trip_single_empty_cell() {
    let source = TableBuilder::new("Notes")
        .column(Column::string("Note"))
        .row(&["a"])
        .row(&[""])
        .row(&["b"])
        .build();

    let mut exported = Vec::new();
    source.export_delimited(&mut exported).unwrap();

    let target = TableBuilder::new("Copy").column(Column::string("Note")).build();
    let summary = target.import_delimited(exported.as_slice(), true).unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            imported: 3,
            skipped: 0
        }
    );
    assert_eq!(target.rows(), vec![row(&["a"]), row(&[""]), row(&["b"])]);
}

#[test]
fn test_untyped_header_with_colon() {
    let source = TableBuilder::new("Clocks")
        .column(Column::integer("ID"))
        .column(Column::string("Time:Zone"))
        .config(TableConfig::default().with_typed_headers(false))
        .row(&["1", "UTC"])
        .build();

    let mut exported = Vec::new();
    source.export_delimited(&mut exported).unwrap();
    assert!(exported.starts_with(b"ID,Time:Zone\n"));

    let summary = source.import_delimited(exported.as_slice(), false).unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(source.select("Time:Zone", "UTC").unwrap().len(), 2);
}
