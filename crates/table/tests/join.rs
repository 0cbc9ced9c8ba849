//! Join tests

mod common;

use common::{TableBuilder, people, row};
use proven_table::Error;
use proven_table::types::Column;

fn students() -> proven_table::Table {
    TableBuilder::new("Students")
        .column(Column::integer("ID"))
        .column(Column::string("Name"))
        .row(&["1", "A"])
        .row(&["2", "B"])
        .build()
}

fn grades() -> proven_table::Table {
    TableBuilder::new("Grades")
        .column(Column::integer("ID"))
        .column(Column::string("Grade"))
        .row(&["1", "X"])
        .build()
}

#[test]
fn test_join_matches_on_column() {
    let result = students().join(&grades(), "ID").unwrap();

    assert_eq!(result.columns, vec!["ID", "Name", "Grade"]);
    assert_eq!(result.rows, vec![row(&["1", "A", "X"])]);
    assert_eq!(result.get(0, "Grade"), Some("X"));
}

#[test]
fn test_join_keeps_right_order_and_qualifies_names() {
    let left = people();
    let right = TableBuilder::new("Reviews")
        .column(Column::string("Name"))
        .column(Column::integer("ID"))
        .row(&["r1", "2"])
        .row(&["r2", "9"])
        .row(&["r3", "2"])
        .row(&["r4", "1"])
        .build();

    let result = left.join(&right, "ID").unwrap();
    assert_eq!(result.columns, vec!["ID", "Name", "Age", "Dept", "Reviews.Name"]);

    let pairs: Vec<(String, String)> = result
        .rows
        .iter()
        .map(|r| (r[0].clone(), r[4].clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("1".to_string(), "r4".to_string()),
            ("2".to_string(), "r1".to_string()),
            ("2".to_string(), "r3".to_string()),
        ]
    );
}

#[test]
fn test_join_unknown_column() {
    let result = students().join(&grades(), "Name");
    assert_eq!(result, Err(Error::ColumnNotFound("Name".into())));
}

#[test]
fn test_join_compares_text() {
    let left = TableBuilder::new("L")
        .column(Column::string("K"))
        .row(&["01"])
        .build();
    let right = TableBuilder::new("R")
        .column(Column::string("K"))
        .column(Column::string("V"))
        .row(&["1", "one"])
        .build();
    assert!(left.join(&right, "K").unwrap().is_empty());
}
