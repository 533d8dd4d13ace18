//! Engine-level scenarios through the public `Table` API: ordering,
//! duplicates, boundary values, and behavior across leaf splits.

use rookdb::btree::InsertOutcome;
use rookdb::{Row, Table};
use tempfile::tempdir;

fn open_table() -> (Table, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let table = Table::open(dir.path().join("test.db")).unwrap();
    (table, dir)
}

fn row(id: u32) -> Row {
    Row::new(id, format!("user{}", id), format!("person{}@example.com", id)).unwrap()
}

#[test]
fn select_on_a_fresh_table_is_empty() {
    let (mut table, _dir) = open_table();

    assert!(table.select().unwrap().is_empty());
}

#[test]
fn inserts_come_back_sorted_by_id() {
    let (mut table, _dir) = open_table();

    for id in [5u32, 1, 9, 3, 7] {
        table.insert(&row(id)).unwrap();
    }

    let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 5, 7, 9]);
}

#[test]
fn duplicate_insert_is_rejected_without_mutation() {
    let (mut table, _dir) = open_table();

    table.insert(&row(1)).unwrap();
    let outcome = table
        .insert(&Row::new(1, "impostor", "x@y").unwrap())
        .unwrap();

    assert_eq!(outcome, InsertOutcome::DuplicateKey);

    let rows = table.select().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "user1");
}

#[test]
fn id_zero_is_a_legal_primary_key() {
    let (mut table, _dir) = open_table();

    table.insert(&row(0)).unwrap();
    table.insert(&row(1)).unwrap();

    let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn boundary_length_strings_round_trip() {
    let (mut table, _dir) = open_table();
    let username = "u".repeat(32);
    let email = "e".repeat(255);

    table
        .insert(&Row::new(3, username.clone(), email.clone()).unwrap())
        .unwrap();

    let rows = table.select().unwrap();
    assert_eq!(rows[0].username, username);
    assert_eq!(rows[0].email, email);
}

#[test]
fn fourteen_rows_build_a_two_level_tree() {
    let (mut table, _dir) = open_table();

    for id in 1..=14u32 {
        table.insert(&row(id)).unwrap();
    }

    let rendered = table.render_tree().unwrap();
    let mut expected = String::from("- internal (size 1)\n - leaf (size 7)\n");
    for key in 1..=7 {
        expected.push_str(&format!("  - {}\n", key));
    }
    expected.push_str(" - key 7\n - leaf (size 7)\n");
    for key in 8..=14 {
        expected.push_str(&format!("  - {}\n", key));
    }
    expected.pop();

    assert_eq!(rendered, expected);
}

#[test]
fn select_spans_multiple_leaves() {
    let (mut table, _dir) = open_table();

    for id in 1..=50u32 {
        table.insert(&row(id)).unwrap();
    }

    let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=50).collect::<Vec<_>>());
}

#[test]
fn find_works_on_both_sides_of_a_split() {
    let (mut table, _dir) = open_table();

    for id in 1..=30u32 {
        table.insert(&row(id)).unwrap();
    }

    for id in [1u32, 7, 8, 14, 15, 30] {
        assert_eq!(table.find(id).unwrap(), Some(row(id)), "id {}", id);
    }
    assert_eq!(table.find(31).unwrap(), None);
}

#[test]
fn descending_inserts_produce_the_same_table_as_ascending() {
    let (mut table, _dir) = open_table();

    for id in (1..=25u32).rev() {
        table.insert(&row(id)).unwrap();
    }

    let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=25).collect::<Vec<_>>());
}

#[cfg(not(feature = "interior-split"))]
#[test]
fn overflowing_the_interior_root_is_an_error() {
    let (mut table, _dir) = open_table();

    let mut error = None;
    for id in 1..=1000u32 {
        if let Err(e) = table.insert(&row(id)) {
            error = Some(e);
            break;
        }
    }

    let error = error.expect("the interior root must eventually overflow");
    assert!(error.to_string().contains("splitting interior nodes"));
}

#[cfg(feature = "interior-split")]
#[test]
fn interior_splits_carry_the_table_past_four_leaves() {
    let (mut table, _dir) = open_table();

    for id in 1..=500u32 {
        table.insert(&row(id)).unwrap();
    }

    let ids: Vec<u32> = table.select().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=500).collect::<Vec<_>>());
    assert_eq!(table.find(333).unwrap(), Some(row(333)));
}
