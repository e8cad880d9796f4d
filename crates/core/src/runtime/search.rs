//! # Web Search Tool
//!
//! Executes the `web_search` capability for fact-checker agents. Queries go
//! to a SearXNG instance: a user-configured one first (`SEARXNG_URL`), then
//! a short list of public instances, then localhost. The result handed back
//! to the agent is a JSON string of `{title, url, snippet}` entries.

use serde_json::json;

/// Default number of results returned to the agent.
const DEFAULT_MAX_RESULTS: u32 = 5;

/// Run a web search and render the outcome as a tool-result string.
///
/// Never errors: an unreachable search backend is reported to the agent as
/// an empty result set with an explanatory message, so a flaky instance
/// degrades the verdict quality rather than failing the exchange.
pub(crate) async fn web_search(
    client: &reqwest::Client,
    query: &str,
    max_results: Option<u32>,
) -> String {
    let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    match query_searxng(client, query, max_results).await {
        Some(results) => json!({
            "query": query,
            "results": results,
        })
        .to_string(),
        None => json!({
            "query": query,
            "results": [],
            "message": "No search backend reachable; answer from what you already know and mark the claim UNVERIFIABLE if needed.",
        })
        .to_string(),
    }
}

async fn query_searxng(
    client: &reqwest::Client,
    query: &str,
    max_results: u32,
) -> Option<Vec<serde_json::Value>> {
    // Endpoint order: user-configured, public instances, local fallback.
    let mut endpoints: Vec<String> = Vec::new();

    if let Ok(custom_url) = std::env::var("SEARXNG_URL") {
        endpoints.push(format!("{}/search", custom_url.trim_end_matches('/')));
    }

    endpoints.extend([
        "https://searx.be/search".to_string(),
        "https://search.sapti.me/search".to_string(),
        "https://searx.tiekoetter.com/search".to_string(),
    ]);

    endpoints.push("http://localhost:8888/search".to_string());

    for endpoint in endpoints {
        let url = format!("{}?q={}&format=json", endpoint, urlencoding::encode(query));

        let Ok(response) = client.get(&url).send().await else {
            continue;
        };
        let Ok(body) = response.json::<serde_json::Value>().await else {
            continue;
        };
        if let Some(results) = body.get("results").and_then(|r| r.as_array()) {
            let limited: Vec<serde_json::Value> = results
                .iter()
                .take(max_results as usize)
                .map(|r| {
                    json!({
                        "title": r.get("title").and_then(|t| t.as_str()).unwrap_or(""),
                        "url": r.get("url").and_then(|u| u.as_str()).unwrap_or(""),
                        "snippet": r.get("content").and_then(|c| c.as_str()).unwrap_or(""),
                    })
                })
                .collect();
            return Some(limited);
        }
        tracing::warn!(endpoint = %endpoint, "search endpoint answered without a results array");
    }

    None
}
