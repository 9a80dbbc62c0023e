mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use newsletter_api::database::models::Subscription;
use newsletter_api::database::SubscriptionStore;

#[tokio::test]
async fn subscribe_stores_record_and_mails_unsubscribe_link() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("editor@example.com", "pw").await?;
    let newsletter = server.create_newsletter(&token, "Gardening").await?;

    let res = server
        .client
        .post(server.api("/subscriptions"))
        .json(&json!({ "email": "reader@example.com", "newsletter_id": newsletter["id"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let key = res.json::<String>().await?;

    let stored = server.subscriptions.get(&key).await?.expect("stored subscription");
    assert_eq!(stored.email, "reader@example.com");

    let sent = server.mailer.sent.lock().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_address, "reader@example.com");
    assert_eq!(sent[0].to_name, "reader");
    let link = format!(
        "http://127.0.0.1:{}/api/v1/subscriptions?id={}",
        server.port, key
    );
    assert!(sent[0].html.contains(&link), "{} missing from {}", link, sent[0].html);

    Ok(())
}

#[tokio::test]
async fn newsletter_id_may_be_a_string() -> Result<()> {
    let server = common::spawn_app().await?;
    let token = server.register("editor@example.com", "pw").await?;
    let newsletter = server.create_newsletter(&token, "Birds").await?;

    let res = server
        .client
        .post(server.api("/subscriptions"))
        .json(&json!({
            "email": "reader@example.com",
            "newsletter_id": newsletter["id"].to_string(),
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn subscribe_to_missing_newsletter_sends_nothing() -> Result<()> {
    let server = common::spawn_app().await?;

    let res = server
        .client
        .post(server.api("/subscriptions"))
        .json(&json!({ "email": "reader@example.com", "newsletter_id": 4242 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "resource not found" }));
    assert!(server.mailer.sent.lock().is_empty());
    assert!(server.subscriptions.is_empty());

    Ok(())
}

#[tokio::test]
async fn subscribe_validation() -> Result<()> {
    let server = common::spawn_app().await?;

    let res = server
        .client
        .post(server.api("/subscriptions"))
        .json(&json!({ "email": "not-an-email" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "errors": ["email must be a valid Email", "newsletter_id is a required field"] })
    );

    Ok(())
}

#[tokio::test]
async fn unsubscribe_deletes_exactly_that_record() -> Result<()> {
    let server = common::spawn_app().await?;
    let subscription = Subscription {
        email: "reader@example.com".into(),
        newsletter_id: 1,
    };
    let keep = server.subscriptions.push(&subscription).await?;
    let remove = server.subscriptions.push(&subscription).await?;

    let res = server
        .client
        .get(format!("{}?id={}", server.api("/subscriptions"), remove))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.text().await?.is_empty());

    assert!(server.subscriptions.get(&remove).await?.is_none());
    assert_eq!(server.subscriptions.get(&keep).await?, Some(subscription));
    assert_eq!(server.subscriptions.len(), 1);

    Ok(())
}

#[tokio::test]
async fn unsubscribe_unknown_id_is_not_found() -> Result<()> {
    let server = common::spawn_app().await?;

    let res = server
        .client
        .delete(format!("{}?id=-missing", server.api("/subscriptions")))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "resource not found" }));

    Ok(())
}
