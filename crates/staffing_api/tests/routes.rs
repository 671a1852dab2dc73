use serde_json::{json, Value};
use staffing_api::{ApiRequest, AppContext, AppSettings};

fn call(ctx: &AppContext, request: ApiRequest) -> (u16, Value) {
    let response = ctx.handle(&request);
    let body = response.body.unwrap_or(Value::Null);
    (response.status_code, body)
}

fn post(path: &str, body: Value) -> ApiRequest {
    ApiRequest::new("POST", path).with_body(body.to_string())
}

fn create_id(ctx: &AppContext, request: ApiRequest) -> String {
    let (status, body) = call(ctx, request);
    assert_eq!(status, 201, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

fn seed_project(ctx: &AppContext, code: &str) -> String {
    create_id(ctx, post("/projects", json!({ "code": code, "title": "Rollout" })))
}

fn seed_resource(ctx: &AppContext, body: Value) -> String {
    create_id(ctx, post("/resources", body))
}

fn assignment_rows(ctx: &AppContext) -> i64 {
    ctx.connection()
        .query_row("SELECT COUNT(*) FROM assignments;", [], |row| row.get(0))
        .unwrap()
}

fn assignment(project_id: &str, resource_id: &str, hours: f64) -> ApiRequest {
    post(
        "/assignments",
        json!({
            "projectId": project_id,
            "resourceId": resource_id,
            "title": "Interfaces",
            "hours": hours,
            "date": "2026-03-05",
        }),
    )
}

#[test]
fn daily_capacity_rejection_maps_to_conflict() {
    let ctx = AppContext::in_memory().unwrap();
    let other = seed_project(&ctx, "OPS");
    let project = seed_project(&ctx, "SAP");
    let resource = seed_resource(&ctx, json!({ "name": "Ada", "defaultCapacity": 160 }));

    let (status, _) = call(&ctx, assignment(&other, &resource, 5.0));
    assert_eq!(status, 201);

    let (status, body) = call(&ctx, assignment(&project, &resource, 4.0));
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "DAILY_CAPACITY_EXCEEDED");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("Available: 3 hours"), "{message}");
    assert_eq!(body["error"]["details"]["availableHours"], 3.0);
    assert_eq!(assignment_rows(&ctx), 1);

    let (status, body) = call(&ctx, assignment(&project, &resource, 3.0));
    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["date"], "2026-03-05");
    assert_eq!(body["data"]["month"], 3);
    assert_eq!(body["data"]["project"]["code"], "SAP");
    assert_eq!(body["data"]["resource"]["name"], "Ada");

    let (status, body) = call(
        &ctx,
        ApiRequest::new("GET", format!("/resources/{resource}/capacity"))
            .with_query("date", "2026-03-05"),
    );
    assert_eq!(status, 200);
    assert_eq!(body["data"]["dailyCapacity"], 8.0);
    assert_eq!(body["data"]["assignedHours"], 8.0);
    assert_eq!(body["data"]["availableHours"], 0.0);
}

#[test]
fn validation_and_lookup_failures_map_to_client_errors() {
    let ctx = AppContext::in_memory().unwrap();

    let (status, body) = call(&ctx, post("/assignments", json!({ "title": "x", "hours": 1 })));
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], "projectId");

    let (status, body) = call(
        &ctx,
        post(
            "/assignments",
            json!({
                "projectId": "9b2f3c56-8d1e-4a57-9e11-1c2d3e4f5a6b",
                "title": "x",
                "hours": 1,
                "month": 3,
                "year": 2026,
            }),
        ),
    );
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = call(&ctx, ApiRequest::new("POST", "/projects").with_body("{oops"));
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = call(&ctx, ApiRequest::new("GET", "/projects/not-a-uuid"));
    assert_eq!(status, 400);
}

#[test]
fn inactive_resource_and_capacity_limit_are_bad_requests() {
    let ctx = AppContext::in_memory().unwrap();
    let project = seed_project(&ctx, "SAP");
    let resource = seed_resource(&ctx, json!({ "name": "Bob", "active": false }));

    let (status, body) = call(&ctx, assignment(&project, &resource, 1.0));
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INACTIVE_RESOURCE");

    let (status, body) = call(
        &ctx,
        post("/resources", json!({ "name": "Cyd", "defaultCapacity": 500 })),
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "CAPACITY_LIMIT_EXCEEDED");
    assert_eq!(body["error"]["details"]["maxResourceHours"], 180.0);
}

#[test]
fn duplicate_project_code_is_a_conflict() {
    let ctx = AppContext::in_memory().unwrap();
    let request = || {
        post("/projects", json!({ "code": "ERP-1", "title": "ERP" })).with_header("X-Team", "SAP")
    };
    assert_eq!(call(&ctx, request()).0, 201);

    let (status, body) = call(&ctx, request());
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "DUPLICATE_PROJECT_CODE");
}

#[test]
fn unknown_routes_methods_and_preflight() {
    let ctx = AppContext::in_memory().unwrap();

    let (status, body) = call(&ctx, ApiRequest::new("GET", "/absences"));
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "ROUTE_NOT_FOUND");

    let (status, body) = call(&ctx, ApiRequest::new("PUT", "/resources"));
    assert_eq!(status, 405);
    assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");

    let response = ctx.handle(&ApiRequest::new("options", "/anything"));
    assert_eq!(response.status_code, 204);
    assert_eq!(response.body, None);
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
}

#[test]
fn team_header_scopes_lists_and_creation() {
    let ctx = AppContext::in_memory().unwrap();
    seed_resource(&ctx, json!({ "name": "Ada", "team": "SAP" }));
    create_id(
        &ctx,
        post("/resources", json!({ "name": "Bob" })).with_header("x-team", "ERP"),
    );

    let (_, body) = call(
        &ctx,
        ApiRequest::new("GET", "/resources").with_header("X-TEAM", "sap"),
    );
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Ada"]);

    let (_, body) = call(&ctx, ApiRequest::new("GET", "/resources"));
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[test]
fn config_round_trip_through_routes() {
    let ctx = AppContext::in_memory().unwrap();

    let (status, body) = call(
        &ctx,
        ApiRequest::new("PUT", "/config/jira_projects")
            .with_header("x-team", "SAP")
            .with_body(json!({ "value": ["SAPX", "ERP"] }).to_string()),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["configType"], "json");
    assert_eq!(body["data"]["team"], "SAP");

    let (status, body) = call(
        &ctx,
        ApiRequest::new("GET", "/config/jira_projects").with_header("x-team", "sap"),
    );
    assert_eq!(status, 200);
    assert_eq!(body["data"]["type"], "json");
    assert_eq!(body["data"]["value"], json!(["SAPX", "ERP"]));

    let (status, _) = call(&ctx, ApiRequest::new("GET", "/config/jira_projects"));
    assert_eq!(status, 404);

    let (status, _) = call(
        &ctx,
        ApiRequest::new("DELETE", "/config/jira_projects").with_header("x-team", "SAP"),
    );
    assert_eq!(status, 200);
    let (status, _) = call(
        &ctx,
        ApiRequest::new("GET", "/config/jira_projects").with_header("x-team", "SAP"),
    );
    assert_eq!(status, 404);
}

#[test]
fn assignment_crud_through_routes() {
    let ctx = AppContext::in_memory().unwrap();
    let project = seed_project(&ctx, "SAP");
    let resource = seed_resource(&ctx, json!({ "name": "Ada", "defaultCapacity": 160 }));
    let id = create_id(&ctx, assignment(&project, &resource, 2.0));

    let (status, body) = call(
        &ctx,
        ApiRequest::new("PATCH", format!("/assignments/{id}"))
            .with_body(json!({ "hours": 6, "resourceId": null }).to_string()),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["hours"], 6.0);
    assert_eq!(body["data"]["resourceId"], Value::Null);

    let (_, body) = call(
        &ctx,
        ApiRequest::new("GET", "/assignments").with_query("projectId", project.as_str()),
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = call(&ctx, ApiRequest::new("DELETE", format!("/assignments/{id}")));
    assert_eq!(status, 200);
    assert_eq!(body["data"]["deleted"], true);

    let (status, _) = call(&ctx, ApiRequest::new("GET", format!("/assignments/{id}")));
    assert_eq!(status, 404);
}

#[test]
fn on_disk_database_persists_between_contexts() {
    let dir = tempfile::tempdir().unwrap();
    let settings = AppSettings {
        staffing_db_path: dir.path().join("staffing.sqlite3"),
        ..AppSettings::default()
    };

    let project = {
        let ctx = AppContext::open(&settings).unwrap();
        seed_project(&ctx, "SAP")
    };

    let ctx = AppContext::open(&settings).unwrap();
    let (status, body) = call(&ctx, ApiRequest::new("GET", format!("/projects/{project}")));
    assert_eq!(status, 200);
    assert_eq!(body["data"]["code"], "SAP");
}
