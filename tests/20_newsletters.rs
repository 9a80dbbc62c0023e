mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn list_without_newsletters_is_empty_array() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("empty@example.com", "pw").await?;

    let res = server
        .client
        .get(server.api("/newsletters"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "[]");

    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let server = common::spawn_app().await?;

    let res = server.client.get(server.api("/newsletters")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "unauthorized access" }));

    let res = server
        .client
        .get(server.api("/newsletters"))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn token_accepted_from_query_parameter() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("query@example.com", "pw").await?;

    let res = server
        .client
        .get(format!("{}?token={}", server.api("/newsletters"), token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn crud_round_trip_for_owner() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("editor@example.com", "pw").await?;

    let created = server.create_newsletter(&token, "Rust Weekly").await?;
    assert_eq!(created["name"], "Rust Weekly");
    let id = created["id"].as_i64().expect("numeric id");
    let url = server.api(&format!("/newsletters/{id}"));

    let read = server.client.get(&url).bearer_auth(&token).send().await?;
    assert_eq!(read.status(), StatusCode::OK);
    assert_eq!(read.json::<Value>().await?, created);

    let updated = server
        .client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({ "name": "Rust Daily", "description": "more often" }))
        .send()
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = updated.json::<Value>().await?;
    assert_eq!(updated["name"], "Rust Daily");
    assert_eq!(updated["editor_id"], created["editor_id"]);

    let list = server
        .client
        .get(server.api("/newsletters"))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?;
    assert_eq!(list.len(), 1);

    let deleted = server.client.delete(&url).bearer_auth(&token).send().await?;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = server.client.get(&url).bearer_auth(&token).send().await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn foreign_newsletter_is_not_found() -> Result<()> {
    let server = common::spawn_app().await?;
    let owner = server.register("owner@example.com", "pw").await?;
    let other = server.register("other@example.com", "pw").await?;

    let created = server.create_newsletter(&owner, "Private").await?;
    let url = server.api(&format!("/newsletters/{}", created["id"]));

    for res in [
        server.client.get(&url).bearer_auth(&other).send().await?,
        server
            .client
            .put(&url)
            .bearer_auth(&other)
            .json(&json!({ "name": "Hijacked" }))
            .send()
            .await?,
        server.client.delete(&url).bearer_auth(&other).send().await?,
    ] {
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.json::<Value>().await?, json!({ "error": "resource not found" }));
    }

    let still_there = server.client.get(&url).bearer_auth(&owner).send().await?;
    assert_eq!(still_there.json::<Value>().await?["name"], "Private");

    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("ids@example.com", "pw").await?;

    let res = server
        .client
        .get(server.api("/newsletters/abc"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "invalid id in url param" }));

    Ok(())
}

#[tokio::test]
async fn create_requires_name() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("names@example.com", "pw").await?;

    let res = server
        .client
        .post(server.api("/newsletters"))
        .bearer_auth(&token)
        .json(&json!({ "description": "nameless" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json::<Value>().await?, json!({ "errors": ["name is a required field"] }));

    Ok(())
}
