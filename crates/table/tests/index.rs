//! Index tests

mod common;

use common::{assert_lookup_matches_scan, ids, people, people_with, row};
use proven_table::{Error, IndexMaintenance, TableConfig};

#[test]
fn test_create_index_twice_matches_scan() {
    let table = people();
    table.create_index("Age").unwrap();
    table.create_index("Age").unwrap();

    assert_eq!(table.indexed_columns(), vec!["Age".to_string()]);
    for value in ["25", "30", "35", "41", "99"] {
        assert_lookup_matches_scan(&table, "Age", value);
    }
    assert_eq!(table.lookup_equality("Age", "25").unwrap(), vec![1, 3]);
}

#[test]
fn test_index_on_unknown_column() {
    let table = people();
    assert_eq!(
        table.create_index("Salary"),
        Err(Error::ColumnNotFound("Salary".into()))
    );
    assert_eq!(
        table.drop_index("Age"),
        Err(Error::IndexNotFound("Age".into()))
    );
}

#[test]
fn test_drop_index_falls_back_to_scan() {
    let table = people();
    table.create_index("Dept").unwrap();
    assert!(table.has_index("Dept"));

    table.drop_index("Dept").unwrap();
    assert!(!table.has_index("Dept"));
    assert_eq!(table.lookup_equality("Dept", "Eng").unwrap(), vec![0, 2]);
}

fn mutate_and_check(config: TableConfig) {
    let table = people_with(config);
    table.create_index("Dept").unwrap();
    table.create_index("Age").unwrap();
    table.create_composite_index("Dept", "Age").unwrap();

    table.insert_row(["6", "Frank", "25", "Eng"]).unwrap();
    table.update_row(0, ["1", "Alice", "31", "Ops"]).unwrap();
    table.update_rows_where("Name", "Dave", "Dept", "Eng").unwrap();
    table.delete_row(1).unwrap();
    table.sort_by(&["Age"], &[false]).unwrap();
    table.delete_rows_where("Dept", "Sales").unwrap();
    table.insert_row(["7", "Gina", "25", "Eng"]).unwrap();

    for value in ["Eng", "Ops", "Sales"] {
        assert_lookup_matches_scan(&table, "Dept", value);
    }
    for value in ["25", "31", "35", "41"] {
        assert_lookup_matches_scan(&table, "Age", value);
    }
    assert_lookup_matches_scan(&table, "ID", "7");

    let engineers_25 = table.lookup_pair("Dept", "Age", "Eng", "25").unwrap();
    assert_eq!(ids(&engineers_25), vec!["4", "6", "7"]);
}

#[test]
fn test_indexes_follow_mutations_eager() {
    mutate_and_check(TableConfig::default());
}

#[test]
fn test_indexes_follow_mutations_lazy() {
    mutate_and_check(TableConfig::default().with_index_maintenance(IndexMaintenance::Lazy));
}

#[test]
fn test_composite_indexes_listed() {
    let table = people();
    assert!(table.composite_indexes().is_empty());

    table.create_composite_index("Dept", "Age").unwrap();
    table.create_composite_index("Name", "ID").unwrap();
    table.create_composite_index("Dept", "Age").unwrap();

    assert_eq!(
        table.composite_indexes(),
        vec![
            ("Name".to_string(), "ID".to_string()),
            ("Dept".to_string(), "Age".to_string()),
        ]
    );
    assert_eq!(
        table.create_composite_index("Dept", "Salary"),
        Err(Error::ColumnNotFound("Salary".into()))
    );
    assert_eq!(table.composite_indexes().len(), 2);
}

#[test]
fn test_identifier_index() {
    let table = people();
    assert_eq!(table.lookup_identifier("3", "").unwrap(), vec![2]);
    assert!(table.lookup_identifier("3", "other").unwrap().is_empty());

    table.delete_row(0).unwrap();
    assert_eq!(table.lookup_identifier("3", "").unwrap(), vec![1]);
    assert_eq!(table.find_by_id("3").unwrap(), row(&["3", "Carol", "35", "Eng"]));
}

#[test]
fn test_custom_identifier_column() {
    let table = people_with(TableConfig::default().with_id_column("Name"));
    assert_eq!(table.find_by_id("Erin").unwrap()[0], "5");
    assert!(matches!(
        table.find_by_id("Zed"),
        Err(Error::NoMatchingRow { .. })
    ));
}

#[test]
fn test_select_uses_exact_text() {
    let table = people();
    table.create_index("Age").unwrap();
    assert_eq!(ids(&table.select("Age", "25").unwrap()), vec!["2", "4"]);
    assert!(table.select("Age", "25.0").unwrap().is_empty());
}
