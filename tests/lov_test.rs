use choirdinated::models::list_of_value::{self, NewListOfValue};

mod common;
use common::{insert_voice_group, setup_test_db};

#[test]
fn test_resolve_matches_value_and_display_name_case_insensitively() {
    let (_dir, conn, choir_id) = setup_test_db();
    list_of_value::create(
        &conn,
        choir_id,
        &NewListOfValue {
            category: "voice_group".to_string(),
            value: "sopran".to_string(),
            display_name: "Sopran".to_string(),
            parent_id: None,
            sort_order: 0,
        },
    )
    .expect("create");

    for raw in ["sopran", "SOPRAN", "Sopran", " sopran "] {
        let found = list_of_value::resolve(&conn, choir_id, "voice_group", raw)
            .expect("query")
            .unwrap_or_else(|| panic!("'{raw}' should resolve"));
        assert_eq!(found.display_name, "Sopran");
    }

    assert!(
        list_of_value::resolve(&conn, choir_id, "voice_group", "Tenor")
            .expect("query")
            .is_none()
    );
}

#[test]
fn test_resolve_or_create_reuses_then_creates() {
    let (_dir, conn, choir_id) = setup_test_db();
    let first = list_of_value::resolve_or_create(&conn, choir_id, "voice_group", "Alt", None)
        .expect("create");
    let second = list_of_value::resolve_or_create(&conn, choir_id, "voice_group", "ALT", None)
        .expect("resolve");
    assert_eq!(first, second);

    let third = list_of_value::resolve_or_create(&conn, choir_id, "voice_group", "Bass", None)
        .expect("create");
    assert_ne!(first, third);
}

#[test]
fn test_resolution_is_tenant_scoped() {
    let (_dir, conn, choir_id) = setup_test_db();
    let other_choir = choirdinated::models::choir::create(&conn, "Annet kor", "opt_in", "NO")
        .expect("create choir");

    insert_voice_group(&conn, choir_id, "Sopran");

    assert!(
        list_of_value::resolve(&conn, other_choir, "voice_group", "Sopran")
            .expect("query")
            .is_none(),
        "taxonomy must not leak across tenants"
    );
}

#[test]
fn test_orphan_voice_types_are_flagged() {
    let (_dir, conn, choir_id) = setup_test_db();
    let group_id = insert_voice_group(&conn, choir_id, "Sopran");

    list_of_value::create(
        &conn,
        choir_id,
        &NewListOfValue {
            category: "voice_type".to_string(),
            value: "1. sopran".to_string(),
            display_name: "1. Sopran".to_string(),
            parent_id: Some(group_id),
            sort_order: 0,
        },
    )
    .expect("create parented type");
    list_of_value::create(
        &conn,
        choir_id,
        &NewListOfValue {
            category: "voice_type".to_string(),
            value: "2. sopran".to_string(),
            display_name: "2. Sopran".to_string(),
            parent_id: None,
            sort_order: 0,
        },
    )
    .expect("create orphan type");

    let orphans = list_of_value::find_orphan_voice_types(&conn, choir_id).expect("query");
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].display_name, "2. Sopran");
}

#[test]
fn test_deactivated_values_drop_out_of_listings() {
    let (_dir, conn, choir_id) = setup_test_db();
    let id = insert_voice_group(&conn, choir_id, "Sopran");
    insert_voice_group(&conn, choir_id, "Alt");

    list_of_value::deactivate(&conn, choir_id, id).expect("deactivate");

    let groups = list_of_value::find_by_category(&conn, choir_id, "voice_group").expect("query");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].display_name, "Alt");
}
