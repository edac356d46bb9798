use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use testresult::TestResult;
use tower::ServiceExt;
use uuid::Uuid;

use leadflow_backend::app::{create_app, AppState};
use leadflow_backend::config::Settings;
use leadflow_backend::{Engine, EngineOptions};

fn app() -> Router {
    let engine = Engine::in_memory(EngineOptions::default());
    create_app(AppState::new(engine, Settings::default()))
}

fn request(method: Method, uri: &str, actor: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-actor-id", actor.to_string());
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}

async fn send(app: &Router, req: Request<Body>) -> TestResult<(StatusCode, Value)> {
    let response = app.clone().oneshot(req).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

async fn create_lead(app: &Router, actor: Uuid, body: Value) -> TestResult<Uuid> {
    let (status, value) = send(app, request(Method::POST, "/leads", Some(actor), Some(body))).await?;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    Ok(serde_json::from_value(value["data"]["id"].clone())?)
}

#[tokio::test]
async fn health_reports_record_counts() -> TestResult {
    let app = app();

    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["records"]["leads"], 0);

    Ok(())
}

#[tokio::test]
async fn responses_carry_request_id() -> TestResult {
    let app = app();

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/health", None, None))
        .await?;

    assert!(response.headers().contains_key("x-request-id"));

    Ok(())
}

#[tokio::test]
async fn mutations_require_actor() -> TestResult {
    let app = app();

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/leads",
            None,
            Some(json!({ "last_name": "Doe", "company": "Globex" })),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    Ok(())
}

#[tokio::test]
async fn create_validates_required_fields() -> TestResult {
    let app = app();

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/leads",
            Some(Uuid::now_v7()),
            Some(json!({ "first_name": "Jane", "last_name": "Doe" })),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    Ok(())
}

#[tokio::test]
async fn convert_then_edit_conflicts() -> TestResult {
    let app = app();
    let actor = Uuid::now_v7();
    let id = create_lead(&app, actor, json!({ "last_name": "Doe", "company": "Globex" })).await?;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/leads/{id}/convert"),
            Some(actor),
            Some(json!({ "create_deal": true, "deal_value": -50 })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["notice"]["success"], true);
    let account_id = body["data"]["account_id"].as_str().unwrap_or_default().to_string();

    let (status, deals) = send(&app, request(Method::GET, "/deals", None, None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deals["data"][0]["value"], 0.0);
    assert_eq!(deals["data"][0]["stage"], "qualification");

    let (status, account) = send(
        &app,
        request(Method::GET, &format!("/accounts/{account_id}"), None, None),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["data"]["name"], "Globex");
    assert_eq!(account["data"]["contact_count"], 1);

    let (status, body) = send(
        &app,
        request(
            Method::PATCH,
            &format!("/leads/{id}"),
            Some(actor),
            Some(json!({ "first_name": "Janet" })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "LEAD_LOCKED");

    let (status, body) = send(
        &app,
        request(Method::POST, &format!("/leads/{id}/convert"), Some(actor), None),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_CONVERTED");

    let (status, audit) = send(
        &app,
        request(Method::GET, &format!("/leads/{id}/conversion"), None, None),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit["data"]["converted_by"], actor.to_string());

    Ok(())
}

#[tokio::test]
async fn bulk_reports_partial_success() -> TestResult {
    let app = app();
    let actor = Uuid::now_v7();
    let a = create_lead(&app, actor, json!({ "last_name": "A", "company": "Acme" })).await?;
    let b = create_lead(&app, actor, json!({ "last_name": "B", "company": "Acme" })).await?;
    let missing = Uuid::now_v7();

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/leads/bulk",
            Some(actor),
            Some(json!({ "ids": [a, missing, b], "operation": { "type": "delete" } })),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["succeeded"], json!([a, b]));
    assert_eq!(body["data"]["failed"][0]["code"], "NOT_FOUND");
    assert_eq!(body["notice"]["title"], "Partial Success");
    assert_eq!(body["notice"]["total"], 3);

    Ok(())
}

#[tokio::test]
async fn view_query_filters_worklist() -> TestResult {
    let app = app();
    let actor = Uuid::now_v7();
    let open = create_lead(&app, actor, json!({ "last_name": "Open", "company": "Acme" })).await?;
    create_lead(
        &app,
        actor,
        json!({ "last_name": "Closed", "company": "Acme", "lead_status": "unqualified" }),
    )
    .await?;

    let (status, body) = send(&app, request(Method::GET, "/leads?view=open", None, None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total_items"], 1);
    assert_eq!(body["data"][0]["id"], open.to_string());

    Ok(())
}

#[tokio::test]
async fn tags_and_duplicates_round_trip() -> TestResult {
    let app = app();
    let actor = Uuid::now_v7();
    let first = create_lead(
        &app,
        actor,
        json!({ "last_name": "One", "company": "Hooli", "email": "dup@hooli.test" }),
    )
    .await?;
    create_lead(
        &app,
        actor,
        json!({ "last_name": "Two", "company": "Hooli", "email": "DUP@hooli.test" }),
    )
    .await?;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/leads/tags",
            Some(actor),
            Some(json!({ "ids": [first], "add": ["hot"], "remove": ["hot"] })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 1);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/leads/duplicates/merge",
            Some(actor),
            Some(json!({ "criteria": [] })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_CRITERIA_SELECTED");

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/leads/duplicates/merge",
            Some(actor),
            Some(json!({ "criteria": ["email"] })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duplicates_found"], 1);

    let (_, lead) = send(&app, request(Method::GET, &format!("/leads/{first}"), None, None)).await?;
    assert_eq!(lead["data"]["tags"], json!(["hot"]));
    assert_eq!(lead["data"]["is_unread"], false);

    Ok(())
}

#[tokio::test]
async fn export_is_quoted_csv() -> TestResult {
    let app = app();
    let actor = Uuid::now_v7();
    create_lead(
        &app,
        actor,
        json!({ "first_name": "Grace", "last_name": "Hopper", "company": "Navy, Inc" }),
    )
    .await?;

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/leads/export", None, None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let csv = String::from_utf8(bytes.to_vec())?;
    let mut lines = csv.lines();

    assert_eq!(
        lines.next(),
        Some("First Name,Last Name,Company,Email,Phone,Status,Source,Industry")
    );
    assert_eq!(lines.next(), Some("Grace,Hopper,\"Navy, Inc\",,,New,,"));

    Ok(())
}
