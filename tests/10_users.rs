mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_returns_token_then_rejects_duplicate_email() -> Result<()> {
    let server = common::spawn_app().await?;

    let token = server.register("ada@example.com", "analytical").await?;
    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3, "expected a JWT, got {token}");

    let res = server
        .client
        .post(server.api("/register"))
        .json(&json!({ "email": "ada@example.com", "password": "engine" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "email not unique" }));

    Ok(())
}

#[tokio::test]
async fn login_with_valid_and_invalid_credentials() -> Result<()> {
    let server = common::spawn_app().await?;
    server.register("linus@example.com", "kernel").await?;

    let ok = server
        .client
        .post(server.api("/login"))
        .json(&json!({ "email": "linus@example.com", "password": "kernel" }))
        .send()
        .await?;
    assert_eq!(ok.status(), StatusCode::OK);
    let token = ok.json::<String>().await?;

    let list = server
        .client
        .get(server.api("/newsletters"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(list.status(), StatusCode::OK);

    let wrong = server
        .client
        .post(server.api("/login"))
        .json(&json!({ "email": "linus@example.com", "password": "minix" }))
        .send()
        .await?;
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
    assert_eq!(wrong.json::<Value>().await?, json!({ "error": "authentication failure" }));

    let unknown = server
        .client
        .post(server.api("/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "x" }))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown.json::<Value>().await?, json!({ "error": "resource not found" }));

    Ok(())
}

#[tokio::test]
async fn missing_required_field_reports_wire_name() -> Result<()> {
    let server = common::spawn_app().await?;

    let res = server
        .client
        .post(server.api("/register"))
        .json(&json!({ "firstname": "Ada", "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "errors": ["email is a required field"] })
    );

    Ok(())
}

#[tokio::test]
async fn one_error_per_violated_field() -> Result<()> {
    let server = common::spawn_app().await?;
    let long = "a".repeat(256);

    let res = server
        .client
        .post(server.api("/register"))
        .json(&json!({
            "firstname": long,
            "lastname": "Lovelace",
            "email": "not-an-email",
            "password": long,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "errors": [
            "firstname must be a maximum of 255 in length",
            "email must be a valid Email",
            "password must be a maximum of 255 in length",
        ] })
    );

    Ok(())
}

#[tokio::test]
async fn malformed_json_is_decoding_failure() -> Result<()> {
    let server = common::spawn_app().await?;

    let res = server
        .client
        .post(server.api("/login"))
        .header("content-type", "application/json")
        .body("{\"email\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "json decoding failure" }));

    Ok(())
}
