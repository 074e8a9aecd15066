use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    AggregatedResult, ContactError, ContactQuery, EnrichmentOutcome, PageError, PagePlan,
    SearchPage,
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

/// Upstream search endpoints.
pub const ORGANIZATION_SEARCH_PATH: &str = "/mixed_companies/search";
pub const PEOPLE_SEARCH_PATH: &str = "/mixed_people/search";
pub const PERSON_MATCH_PATH: &str = "/people/match";

/// Client for the Apollo sales-intelligence API.
///
/// All calls are sequential; a fixed delay between requests keeps the
/// service under the upstream per-minute rate limit.
#[derive(Clone)]
pub struct ApolloService {
    client: Client,
    base_url: String,
    api_key: String,
    page_delay: Duration,
}

impl ApolloService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Apollo client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.apollo_base_url.clone(),
            api_key: config.apollo_api_key.clone(),
            page_delay: Duration::from_millis(config.page_delay_ms),
        })
    }

    /// POSTs a JSON body to an upstream path and returns the raw response.
    ///
    /// The API key goes in the `X-Api-Key` header and must never appear in
    /// logs.
    async fn post_json(&self, path: &str, body: &Value) -> Result<reqwest::Response, AppError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {} (api key redacted)", url);

        self.client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .header("Cache-Control", "no-cache")
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Apollo request failed: {}", e)))
    }

    /// Fetches a single search page from the upstream.
    async fn fetch_search_page(&self, path: &str, body: &Value) -> Result<SearchPage, AppError> {
        let response = self.post_json(path, body).await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited(format!(
                "Apollo returned 429 for {}",
                path
            )));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Apollo returned status {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Apollo response: {}", e))
        })
    }

    /// Paginates a search endpoint sequentially, aggregating records.
    ///
    /// Failed pages are recorded in `page_errors` and the loop moves on to
    /// the next page; a 429 stops the loop outright, since continuing past a
    /// rate-limit rejection defeats the fixed delay. The loop also stops once
    /// the upstream reports the last page via `pagination.total_pages`.
    ///
    /// `base_body` carries the caller's search filters; `page` and
    /// `per_page` are filled in here per request.
    pub async fn paginate_search(
        &self,
        path: &str,
        base_body: Value,
        plan: PagePlan,
    ) -> AggregatedResult {
        let mut records = Vec::new();
        let mut page_errors = Vec::new();
        let mut total_entries = None;
        let mut pages_fetched = 0u32;
        let mut pages_requested = 0u32;
        let mut rate_limited = false;

        for offset in 0..plan.max_pages {
            // A caller may start at any page, so the page number can run out
            // of u32 range before the page cap does.
            let Some(page_number) = plan.start_page.checked_add(offset) else {
                tracing::warn!("Page numbering exhausted at u32::MAX; stopping pagination");
                break;
            };

            if offset > 0 {
                tokio::time::sleep(self.page_delay).await;
            }

            let mut body = base_body.clone();
            if let Some(obj) = body.as_object_mut() {
                obj.insert("page".to_string(), json!(page_number));
                obj.insert("per_page".to_string(), json!(plan.per_page));
            }

            pages_requested += 1;
            tracing::info!("Fetching {} page {}", path, page_number);

            match self.fetch_search_page(path, &body).await {
                Ok(page) => {
                    pages_fetched += 1;
                    let last_page = page
                        .pagination
                        .as_ref()
                        .map(|p| page_number >= p.total_pages)
                        .unwrap_or(false);
                    if let Some(ref pagination) = page.pagination {
                        total_entries = Some(pagination.total_entries);
                    }
                    records.extend(page.into_records());
                    if last_page {
                        tracing::info!("Reached last page {} of {}", page_number, path);
                        break;
                    }
                }
                Err(AppError::RateLimited(msg)) => {
                    tracing::warn!("Stopping pagination at page {}: {}", page_number, msg);
                    page_errors.push(PageError {
                        page: page_number,
                        error: msg,
                    });
                    rate_limited = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Page {} of {} failed: {}", page_number, path, e);
                    page_errors.push(PageError {
                        page: page_number,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Aggregated {} records from {} page(s) of {} ({} failed)",
            records.len(),
            pages_fetched,
            path,
            page_errors.len()
        );

        AggregatedResult {
            records,
            total_entries,
            pages_fetched,
            pages_requested,
            partial: !page_errors.is_empty() || rate_limited,
            page_errors,
        }
    }

    /// Matches a single contact via the person-match endpoint.
    ///
    /// Returns `Ok(None)` when the upstream has no match (404 or a null
    /// `person` field).
    pub async fn match_person(
        &self,
        contact: &ContactQuery,
        reveal_personal_emails: bool,
    ) -> Result<Option<Value>, AppError> {
        let mut body = serde_json::to_value(contact)
            .map_err(|e| AppError::InternalError(format!("Failed to serialize contact: {}", e)))?;
        if let Some(obj) = body.as_object_mut() {
            obj.insert(
                "reveal_personal_emails".to_string(),
                json!(reveal_personal_emails),
            );
        }

        let response = self.post_json(PERSON_MATCH_PATH, &body).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited(
                "Apollo returned 429 for /people/match".to_string(),
            ));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Apollo returned status {}: {}",
                status, error_text
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Apollo response: {}", e))
        })?;

        match data.get("person") {
            Some(person) if !person.is_null() => Ok(Some(person.clone())),
            _ => Ok(None),
        }
    }

    /// Enriches a list of contacts sequentially with the same fixed delay.
    ///
    /// Per-contact failures are recorded and the loop continues; a 429 stops
    /// it, mirroring `paginate_search`.
    pub async fn enrich_contacts(
        &self,
        contacts: &[ContactQuery],
        reveal_personal_emails: bool,
    ) -> EnrichmentOutcome {
        let mut matched = Vec::new();
        let mut misses = Vec::new();
        let mut errors = Vec::new();

        for (index, contact) in contacts.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.page_delay).await;
            }

            match self.match_person(contact, reveal_personal_emails).await {
                Ok(Some(person)) => matched.push(person),
                Ok(None) => {
                    tracing::info!("No upstream match for contact {}", index);
                    misses.push(index);
                }
                Err(AppError::RateLimited(msg)) => {
                    tracing::warn!("Stopping enrichment at contact {}: {}", index, msg);
                    errors.push(ContactError { index, error: msg });
                    break;
                }
                Err(e) => {
                    tracing::warn!("Contact {} enrichment failed: {}", index, e);
                    errors.push(ContactError {
                        index,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Enriched {}/{} contacts ({} misses, {} errors)",
            matched.len(),
            contacts.len(),
            misses.len(),
            errors.len()
        );

        EnrichmentOutcome {
            matched,
            misses,
            errors,
        }
    }
}
