use rusqlite::{params, Connection};
use staffing_core::db::open_db_in_memory;
use staffing_core::{
    ConfigService, ConfigType, ConfigValue, ConfigWrite, ServiceError, SqliteConfigRepository,
    DEFAULT_MAX_RESOURCE_HOURS,
};

fn insert_entry(conn: &Connection, key: &str, team: Option<&str>, value: &str, kind: &str) {
    conn.execute(
        "INSERT INTO config_entries (config_key, team, config_value, config_type)
         VALUES (?1, ?2, ?3, ?4);",
        params![key, team, value, kind],
    )
    .unwrap();
}

#[test]
fn missing_max_resource_hours_falls_back_to_default() {
    let conn = open_db_in_memory().unwrap();
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    assert_eq!(service.max_resource_hours(), DEFAULT_MAX_RESOURCE_HOURS);
    assert_eq!(service.max_resource_hours(), 180.0);
}

#[test]
fn max_resource_hours_reads_global_entry_typed_or_untyped() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "max_resource_hours", None, "200", "string");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));
    assert_eq!(service.max_resource_hours(), 200.0);

    conn.execute(
        "UPDATE config_entries SET config_value = '150', config_type = 'number';",
        [],
    )
    .unwrap();
    assert_eq!(service.max_resource_hours(), 150.0);
}

#[test]
fn unusable_max_resource_hours_falls_back_to_default() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "max_resource_hours", None, "lots", "number");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    assert_eq!(service.max_resource_hours(), 180.0);
}

#[test]
fn team_scoped_max_resource_hours_does_not_affect_global_lookup() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "max_resource_hours", Some("SAP"), "100", "number");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    assert_eq!(service.max_resource_hours(), 180.0);
}

#[test]
fn team_lookup_falls_back_to_case_insensitive_match() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "jira_projects", Some("SAP"), r#"["SAPX","ERP"]"#, "json");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    let resolved = service.resolve("jira_projects", Some("sap")).unwrap();
    assert_eq!(resolved.config_type, ConfigType::Json);
    assert_eq!(
        resolved.value,
        ConfigValue::Json(serde_json::json!(["SAPX", "ERP"]))
    );
}

#[test]
fn exact_team_match_wins_over_case_insensitive_match() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "region", Some("SAP"), "upper", "string");
    insert_entry(&conn, "region", Some("sap"), "lower", "string");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    let resolved = service.resolve("region", Some("sap")).unwrap();
    assert_eq!(resolved.value, ConfigValue::Text("lower".to_string()));
    let resolved = service.resolve("region", Some("SAP")).unwrap();
    assert_eq!(resolved.value, ConfigValue::Text("upper".to_string()));
}

#[test]
fn team_lookup_does_not_fall_back_to_global_entry() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "jira_projects", None, "[]", "json");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    let err = service.resolve("jira_projects", Some("SAP")).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
    assert!(service.resolve("jira_projects", None).is_ok());
}

#[test]
fn global_lookup_ignores_team_entries_and_inactive_rows() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "feature_x", Some("SAP"), "true", "boolean");
    insert_entry(&conn, "feature_y", None, "true", "boolean");
    conn.execute(
        "UPDATE config_entries SET is_active = 0 WHERE config_key = 'feature_y';",
        [],
    )
    .unwrap();
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    assert!(matches!(
        service.resolve("feature_x", None).unwrap_err(),
        ServiceError::NotFound { .. }
    ));
    assert!(matches!(
        service.resolve("feature_y", None).unwrap_err(),
        ServiceError::NotFound { .. }
    ));
}

#[test]
fn malformed_json_is_returned_as_raw_text() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "broken", None, "{not json", "json");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    let resolved = service.resolve("broken", None).unwrap();
    assert_eq!(resolved.value, ConfigValue::Text("{not json".to_string()));
    assert_eq!(resolved.config_type, ConfigType::Json);
}

#[test]
fn upsert_replaces_value_and_reactivates_entry() {
    let conn = open_db_in_memory().unwrap();
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    let write = ConfigWrite {
        value: "160".to_string(),
        config_type: ConfigType::Number,
        description: Some("monthly ceiling".to_string()),
    };
    let created = service.upsert("max_resource_hours", None, &write).unwrap();
    assert_eq!(created.config_value, "160");
    assert_eq!(service.max_resource_hours(), 160.0);

    service.deactivate("max_resource_hours", None).unwrap();
    assert_eq!(service.max_resource_hours(), 180.0);

    let rewrite = ConfigWrite {
        value: "170".to_string(),
        config_type: ConfigType::Number,
        description: None,
    };
    let updated = service.upsert("max_resource_hours", None, &rewrite).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.description.as_deref(), Some("monthly ceiling"));
    assert_eq!(service.max_resource_hours(), 170.0);
}

#[test]
fn upsert_rejects_values_that_do_not_match_type() {
    let conn = open_db_in_memory().unwrap();
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    for (value, config_type) in [
        ("abc", ConfigType::Number),
        ("yes", ConfigType::Boolean),
        ("{", ConfigType::Json),
    ] {
        let write = ConfigWrite {
            value: value.to_string(),
            config_type,
            description: None,
        };
        let err = service.upsert("k", None, &write).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation {
                field: Some("value"),
                ..
            }
        ));
    }
}

#[test]
fn list_returns_global_and_team_entries() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "a", None, "1", "number");
    insert_entry(&conn, "b", Some("SAP"), "2", "number");
    insert_entry(&conn, "c", Some("OTHER"), "3", "number");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    let global = service.list(None).unwrap();
    assert_eq!(
        global.iter().map(|e| e.config_key.as_str()).collect::<Vec<_>>(),
        vec!["a"]
    );

    let scoped = service.list(Some("sap")).unwrap();
    assert_eq!(
        scoped.iter().map(|e| e.config_key.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[test]
fn deactivate_missing_entry_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    assert!(matches!(
        service.deactivate("nope", Some("SAP")).unwrap_err(),
        ServiceError::NotFound { .. }
    ));
}

#[test]
fn team_writes_address_the_case_insensitive_match() {
    let conn = open_db_in_memory().unwrap();
    insert_entry(&conn, "jira_projects", Some("SAP"), r#"["SAPX"]"#, "json");
    let service = ConfigService::new(SqliteConfigRepository::new(&conn));

    let write = ConfigWrite {
        value: r#"["SAPX","ERP"]"#.to_string(),
        config_type: ConfigType::Json,
        description: None,
    };
    let updated = service.upsert("jira_projects", Some("sap"), &write).unwrap();
    assert_eq!(updated.team.as_deref(), Some("SAP"));

    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM config_entries WHERE config_key = 'jira_projects';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(
        service.resolve("jira_projects", Some("SAP")).unwrap().value,
        ConfigValue::Json(serde_json::json!(["SAPX", "ERP"]))
    );

    service.deactivate("jira_projects", Some("sap")).unwrap();
    assert!(matches!(
        service.resolve("jira_projects", Some("SAP")).unwrap_err(),
        ServiceError::NotFound { .. }
    ));

    let reactivated = service.upsert("jira_projects", Some("Sap"), &write).unwrap();
    assert_eq!(reactivated.team.as_deref(), Some("SAP"));
    assert!(reactivated.is_active);
}
