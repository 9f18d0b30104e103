//! Restaurant search over SerpAPI's Google Maps engine.

use anyhow::{Context, Result};
use async_trait::async_trait;
use orchestrator_core::ports::RestaurantSearchPort;
use reqwest::Client;
use router::Candidate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

const SERPAPI_URL: &str = "https://serpapi.com/search";
const MAX_RESULTS: usize = 5;

#[derive(Debug, Deserialize)]
struct LocalResult {
    title: Option<String>,
    address: Option<String>,
    place_id: Option<String>,
    website: Option<String>,
}

pub struct SerpApiSearch {
    client: Client,
    api_key: Option<String>,
    location: String,
    base_url: String,
}

impl SerpApiSearch {
    /// A missing key is allowed; every search then fails with a visible notice.
    pub fn new(client: Client, api_key: Option<String>, location: impl Into<String>) -> Self {
        Self { client, api_key, location: location.into(), base_url: SERPAPI_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn query(&self, cuisine: &str) -> String {
        format!("{} restaurants in {}", cuisine, self.location)
    }
}

#[async_trait]
impl RestaurantSearchPort for SerpApiSearch {
    async fn search(&self, cuisine: &str) -> Result<Vec<Candidate>> {
        let api_key = self.api_key.as_deref().context("SERPAPI_KEY is not configured")?;
        let q = self.query(cuisine);
        info!(query = %q, "search start");

        let response = self
            .client
            .get(&self.base_url)
            .header("Accept", "application/json")
            .query(&[("engine", "google_maps"), ("q", q.as_str()), ("api_key", api_key)])
            .send()
            .await
            .context("Failed to send SerpAPI request")?;

        let status = response.status();
        let body: Value = response.json().await.context("Failed to parse SerpAPI response")?;
        if !status.is_success() && body.get("error").is_none() {
            error!(%status, "SerpAPI returned an error status");
            anyhow::bail!("SerpAPI returned status: {}", status);
        }

        let results = parse_local_results(&body)?;
        info!(results = results.len(), "search results");
        Ok(results)
    }
}

/// Keeps at most five `local_results` that carry a title, an address and a
/// place id. An `error` field in the body is an error.
pub fn parse_local_results(body: &Value) -> Result<Vec<Candidate>> {
    if let Some(err) = body.get("error") {
        let message = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
        anyhow::bail!("SerpAPI error: {}", message);
    }

    let Some(local) = body.get("local_results").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let candidates = local
        .iter()
        .take(MAX_RESULTS)
        .filter_map(|place| serde_json::from_value::<LocalResult>(place.clone()).ok())
        .filter_map(|place| {
            let title = place.title.filter(|t| !t.trim().is_empty())?;
            let address = place.address.filter(|a| !a.trim().is_empty())?;
            let place_id = place.place_id.filter(|p| !p.trim().is_empty())?;
            Some(Candidate {
                title,
                address,
                link: format!("https://www.google.com/maps/place/?q=place_id:{}", place_id),
                website: place.website.filter(|w| !w.trim().is_empty()),
            })
        })
        .collect();
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keeps_complete_results_only() {
        let body = json!({
            "local_results": [
                {"title": "Thai Garden", "address": "12 Main St", "place_id": "a1", "website": "https://thaigarden.example"},
                {"title": "No Address", "place_id": "b2"},
                {"title": "Bangkok Express", "address": "99 Broad St", "place_id": "c3"},
                {"address": "1 Nowhere", "place_id": "d4"}
            ]
        });
        let found = parse_local_results(&body).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].title, "Thai Garden");
        assert_eq!(found[0].link, "https://www.google.com/maps/place/?q=place_id:a1");
        assert_eq!(found[0].website.as_deref(), Some("https://thaigarden.example"));
        assert_eq!(found[1].title, "Bangkok Express");
        assert!(found[1].website.is_none());
    }

    #[test]
    fn test_caps_at_five_results() {
        let places: Vec<Value> = (0..8)
            .map(|i| json!({"title": format!("Place {}", i), "address": "Somewhere", "place_id": format!("p{}", i)}))
            .collect();
        let found = parse_local_results(&json!({ "local_results": places })).unwrap();
        assert_eq!(found.len(), 5);
        assert_eq!(found[4].title, "Place 4");
    }

    #[test]
    fn test_error_field_is_an_error() {
        let err = parse_local_results(&json!({"error": "Invalid API key."})).unwrap_err();
        assert!(err.to_string().contains("Invalid API key."));
    }

    #[test]
    fn test_missing_results_is_empty() {
        assert!(parse_local_results(&json!({"search_metadata": {}})).unwrap().is_empty());
    }

    #[test]
    fn test_query_uses_location() {
        let search = SerpApiSearch::new(Client::new(), None, "Newark, NJ");
        assert_eq!(search.query("thai"), "thai restaurants in Newark, NJ");
    }

    #[tokio::test]
    async fn test_missing_key_fails() {
        let search = SerpApiSearch::new(Client::new(), None, "Newark, NJ");
        assert!(search.search("thai").await.is_err());
    }
}
