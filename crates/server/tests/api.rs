use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        ["admin".into(), "secret".into()],
    ))
    .await
    .unwrap();

    let engine = engine::Engine::builder().database(db.clone()).build();
    server::app(engine, db)
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let creds = BASE64.encode("admin:secret");
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Basic {creds}"));

    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_bank(app: &Router, bank_name: &str, account_number: &str) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/banks",
            Some(json!({
                "bank_name": bank_name,
                "account_name": "Main",
                "account_number": account_number,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_donor(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        request(Method::POST, "/donors", Some(json!({ "name": name }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn donation_body(donor_id: &str, amount_minor: i64, bank_id: Option<&str>) -> Value {
    json!({
        "donor_id": donor_id,
        "date": "2026-03-01",
        "category": "zakat",
        "amount_minor": amount_minor,
        "payment_method": "bank_transfer",
        "bank_id": bank_id,
    })
}

#[tokio::test]
async fn rejects_missing_or_bad_credentials() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/banks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let creds = BASE64.encode("admin:wrong");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/banks")
                .header(header::AUTHORIZATION, format!("Basic {creds}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bank_accounts_roundtrip() {
    let app = test_app().await;

    let id = create_bank(&app, "HBL", "001").await;

    let (status, body) = send(&app, request(Method::GET, &format!("/banks/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bank_name"], "HBL");
    assert_eq!(body["balance_minor"], 0);
    assert_eq!(body["active"], true);

    let (status, body) = send(&app, request(Method::GET, "/banks", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["banks"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        request(
            Method::PATCH,
            &format!("/banks/{id}"),
            Some(json!({ "account_name": "Operations" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account_name"], "Operations");
    assert_eq!(body["account_number"], "001");

    let (status, _) = send(
        &app,
        request(Method::POST, &format!("/banks/{id}/deactivate"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, request(Method::GET, &format!("/banks/{id}"), None)).await;
    assert_eq!(body["active"], false);

    // The listing only carries active accounts.
    let (_, body) = send(&app, request(Method::GET, "/banks", None)).await;
    assert!(body["banks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_account_returns_conflict() {
    let app = test_app().await;
    create_bank(&app, "HBL", "001").await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/banks",
            Some(json!({
                "bank_name": "HBL",
                "account_name": "Secondary",
                "account_number": "001",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ACCOUNT_EXISTS");
}

#[tokio::test]
async fn blank_bank_fields_are_rejected() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/banks",
            Some(json!({
                "bank_name": "  ",
                "account_name": "Main",
                "account_number": "001",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn banked_donation_flows_into_ledger_and_donor_stats() {
    let app = test_app().await;
    let bank_id = create_bank(&app, "HBL", "001").await;
    let donor_id = create_donor(&app, "Ahmed").await;

    let (status, donation) = send(
        &app,
        request(
            Method::POST,
            "/donations",
            Some(donation_body(&donor_id, 50_000, Some(&bank_id))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let receipt_no = donation["receipt_no"].as_str().unwrap();
    assert!(receipt_no.starts_with("DON-"));
    assert!(receipt_no.ends_with("-001"));

    let (_, bank) = send(&app, request(Method::GET, &format!("/banks/{bank_id}"), None)).await;
    assert_eq!(bank["balance_minor"], 50_000);

    let (status, statement) = send(
        &app,
        request(
            Method::GET,
            &format!("/banks/{bank_id}/transactions?limit=10"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let transactions = statement["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["direction"], "credit");
    assert_eq!(transactions[0]["amount_minor"], 50_000);
    assert_eq!(transactions[0]["origin_kind"], "donation");
    assert_eq!(transactions[0]["origin_id"], donation["id"]);

    let (_, donor) = send(&app, request(Method::GET, &format!("/donors/{donor_id}"), None)).await;
    assert_eq!(donor["total_donations_minor"], 50_000);
    assert_eq!(donor["last_donation_date"], "2026-03-01");
}

#[tokio::test]
async fn unbanking_a_donation_reverses_the_credit() {
    let app = test_app().await;
    let bank_id = create_bank(&app, "HBL", "001").await;
    let donor_id = create_donor(&app, "Ahmed").await;

    let (_, donation) = send(
        &app,
        request(
            Method::POST,
            "/donations",
            Some(donation_body(&donor_id, 20_000, Some(&bank_id))),
        ),
    )
    .await;
    let donation_id = donation["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        request(
            Method::PATCH,
            &format!("/donations/{donation_id}"),
            Some(json!({ "bank_id": null })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["bank_id"].is_null());

    let (_, bank) = send(&app, request(Method::GET, &format!("/banks/{bank_id}"), None)).await;
    assert_eq!(bank["balance_minor"], 0);
}

#[tokio::test]
async fn deleting_a_donation_reverses_the_credit_and_stats() {
    let app = test_app().await;
    let bank_id = create_bank(&app, "HBL", "001").await;
    let donor_id = create_donor(&app, "Ahmed").await;

    let (_, donation) = send(
        &app,
        request(
            Method::POST,
            "/donations",
            Some(donation_body(&donor_id, 20_000, Some(&bank_id))),
        ),
    )
    .await;
    let donation_id = donation["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/donations/{donation_id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        request(Method::GET, &format!("/donations/{donation_id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, bank) = send(&app, request(Method::GET, &format!("/banks/{bank_id}"), None)).await;
    assert_eq!(bank["balance_minor"], 0);
    let (_, donor) = send(&app, request(Method::GET, &format!("/donors/{donor_id}"), None)).await;
    assert_eq!(donor["total_donations_minor"], 0);
}

#[tokio::test]
async fn expense_on_empty_account_maps_to_422() {
    let app = test_app().await;
    let bank_id = create_bank(&app, "HBL", "001").await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/expenses",
            Some(json!({
                "date": "2026-03-05",
                "category": "utilities",
                "amount_minor": 10_000,
                "paid_from": bank_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INSUFFICIENT_BALANCE");
}

#[tokio::test]
async fn expense_against_unknown_account_maps_to_404() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/expenses",
            Some(json!({
                "date": "2026-03-05",
                "category": "utilities",
                "amount_minor": 10_000,
                "paid_from": "00000000-0000-0000-0000-000000000000",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BANK_NOT_FOUND");
}

#[tokio::test]
async fn funded_expense_debits_the_account() {
    let app = test_app().await;
    let bank_id = create_bank(&app, "HBL", "001").await;
    let donor_id = create_donor(&app, "Ahmed").await;

    send(
        &app,
        request(
            Method::POST,
            "/donations",
            Some(donation_body(&donor_id, 100_000, Some(&bank_id))),
        ),
    )
    .await;

    let (status, expense) = send(
        &app,
        request(
            Method::POST,
            "/expenses",
            Some(json!({
                "date": "2026-03-05",
                "category": "utilities",
                "description": "electricity bill",
                "amount_minor": 30_000,
                "paid_from": bank_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, bank) = send(&app, request(Method::GET, &format!("/banks/{bank_id}"), None)).await;
    assert_eq!(bank["balance_minor"], 70_000);

    let expense_id = expense["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/expenses/{expense_id}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, bank) = send(&app, request(Method::GET, &format!("/banks/{bank_id}"), None)).await;
    assert_eq!(bank["balance_minor"], 100_000);
}

#[tokio::test]
async fn deactivating_a_funded_account_maps_to_422() {
    let app = test_app().await;
    let bank_id = create_bank(&app, "HBL", "001").await;
    let donor_id = create_donor(&app, "Ahmed").await;

    send(
        &app,
        request(
            Method::POST,
            "/donations",
            Some(donation_body(&donor_id, 10_000, Some(&bank_id))),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        request(Method::POST, &format!("/banks/{bank_id}/deactivate"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BALANCE_NOT_ZERO");
}

#[tokio::test]
async fn donation_for_unknown_donor_maps_to_404() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/donations",
            Some(donation_body(
                "00000000-0000-0000-0000-000000000000",
                10_000,
                None,
            )),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "DONOR_NOT_FOUND");
}
