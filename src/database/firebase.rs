use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::FirebaseConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::Subscription;
use crate::database::repository::SubscriptionStore;

const COLLECTION: &str = "subscriptions";

/// Subscription documents in a Firebase Realtime Database, over its REST API
pub struct FirebaseSubscriptionStore {
    client: Client,
    base: Url,
    auth_token: Option<String>,
}

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

impl FirebaseSubscriptionStore {
    pub fn new(client: Client, config: &FirebaseConfig) -> Result<Self, DatabaseError> {
        let mut base = Url::parse(&config.location)
            .map_err(|e| DatabaseError::Remote(format!("invalid database location: {e}")))?;

        let root = config.ref_entry_point.trim_matches('/');
        {
            let mut segments = base
                .path_segments_mut()
                .map_err(|_| DatabaseError::Remote("database location cannot be a base".into()))?;
            segments.pop_if_empty();
            segments.extend(root.split('/').filter(|s| !s.is_empty()));
        }

        Ok(Self {
            client,
            base,
            auth_token: config.auth_token.clone(),
        })
    }

    /// `<location>/<ref>/subscriptions[/<key>].json`
    fn url(&self, key: Option<&str>) -> Result<Url, DatabaseError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DatabaseError::Remote("database location cannot be a base".into()))?;
            segments.pop_if_empty();
            match key {
                Some(key) => segments.push(COLLECTION).push(&format!("{key}.json")),
                None => segments.push(&format!("{COLLECTION}.json")),
            };
        }
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    fn check(status: StatusCode, action: &str) -> Result<(), DatabaseError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(DatabaseError::Remote(format!("{action} returned {status}")))
        }
    }
}

#[async_trait]
impl SubscriptionStore for FirebaseSubscriptionStore {
    async fn push(&self, subscription: &Subscription) -> Result<String, DatabaseError> {
        let response = self
            .client
            .post(self.url(None)?)
            .json(subscription)
            .send()
            .await?;
        Self::check(response.status(), "push")?;

        let PushResponse { name } = response.json::<PushResponse>().await?;
        debug!("pushed subscription {}", name);
        Ok(name)
    }

    async fn get(&self, key: &str) -> Result<Option<Subscription>, DatabaseError> {
        let response = self.client.get(self.url(Some(key))?).send().await?;
        Self::check(response.status(), "get")?;

        // a missing path reads as JSON null
        Ok(response.json::<Option<Subscription>>().await?)
    }

    async fn delete(&self, key: &str) -> Result<(), DatabaseError> {
        let response = self.client.delete(self.url(Some(key))?).send().await?;
        Self::check(response.status(), "delete")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(location: &str, token: Option<&str>) -> FirebaseSubscriptionStore {
        FirebaseSubscriptionStore::new(
            Client::new(),
            &FirebaseConfig {
                location: location.to_string(),
                ref_entry_point: "newsletter/prod".to_string(),
                auth_token: token.map(str::to_string),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_collection_and_document_urls() {
        let store = store("https://demo.firebaseio.com/", None);
        assert_eq!(
            store.url(None).unwrap().as_str(),
            "https://demo.firebaseio.com/newsletter/prod/subscriptions.json"
        );
        assert_eq!(
            store.url(Some("-Nabc")).unwrap().as_str(),
            "https://demo.firebaseio.com/newsletter/prod/subscriptions/-Nabc.json"
        );
    }

    #[test]
    fn test_auth_token_in_query() {
        let store = store("https://demo.firebaseio.com", Some("s3cret"));
        assert_eq!(
            store.url(Some("k")).unwrap().as_str(),
            "https://demo.firebaseio.com/newsletter/prod/subscriptions/k.json?auth=s3cret"
        );
    }
}
