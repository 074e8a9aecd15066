use crate::apollo::{ApolloService, ORGANIZATION_SEARCH_PATH, PEOPLE_SEARCH_PATH};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the upstream sales-intelligence API.
    pub apollo: ApolloService,
}

/// Routes that sit behind the security layers in production.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(dispatch))
}

/// Routes that bypass rate limiting (platform health probes).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// Builds the full route table without middleware. `main` layers the
/// security middleware onto `protected_routes` before merging.
pub fn router(state: Arc<AppState>) -> Router {
    public_routes().merge(protected_routes()).with_state(state)
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "prospect-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /
///
/// Single dispatch entry point. The JSON body names the operation in its
/// `endpoint` field; remaining fields are the operation's parameters.
///
/// The body is parsed by hand rather than through the `Json` extractor so
/// malformed input yields the dispatch-level error messages callers of the
/// old entry point expect.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Response, AppError> {
    // An absent body counts as an empty request, not malformed JSON.
    let raw = if body.trim().is_empty() { "{}" } else { &body };
    let request: Value = serde_json::from_str(raw)
        .map_err(|_| AppError::BadRequest("Invalid JSON in request body".to_string()))?;

    let endpoint = request
        .get("endpoint")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("No endpoint provided in request body".to_string())
        })?
        .to_string();

    tracing::info!("Dispatching endpoint: {}", endpoint);

    match endpoint.as_str() {
        "search_organizations" => {
            let params = parse_params::<OrganizationSearchParams>(&endpoint, &request)?;
            Ok(Json(search_organizations(&state, params).await).into_response())
        }
        "search_people" => {
            let params = parse_params::<PeopleSearchParams>(&endpoint, &request)?;
            Ok(Json(search_people(&state, params).await).into_response())
        }
        "enrich_contacts" => {
            let params = parse_params::<EnrichContactsParams>(&endpoint, &request)?;
            Ok(Json(enrich_contacts(&state, params).await?).into_response())
        }
        _ => Err(AppError::BadRequest(format!(
            "Unknown endpoint: {}",
            endpoint
        ))),
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    request: &Value,
) -> Result<T, AppError> {
    serde_json::from_value(request.clone()).map_err(|e| {
        AppError::BadRequest(format!("Invalid parameters for {}: {}", endpoint, e))
    })
}

fn metadata(endpoint: &str) -> ResponseMetadata {
    ResponseMetadata {
        source: "prospect-api".to_string(),
        endpoint: endpoint.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// Inserts a value into the search body only when the caller provided it.
fn insert_if_some(body: &mut serde_json::Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        body.insert(key.to_string(), json!(v));
    }
}

fn insert_if_nonempty(body: &mut serde_json::Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        body.insert(key.to_string(), json!(values));
    }
}

/// `endpoint: "search_organizations"`
///
/// Paginates the upstream organization search and aggregates the
/// `organizations` array across pages.
async fn search_organizations(
    state: &AppState,
    params: OrganizationSearchParams,
) -> SearchResponse {
    let mut body = serde_json::Map::new();
    insert_if_some(&mut body, "q_organization_name", &params.q_organization_name);
    insert_if_nonempty(
        &mut body,
        "organization_locations",
        &params.organization_locations,
    );
    insert_if_nonempty(
        &mut body,
        "organization_num_employees_ranges",
        &params.organization_num_employees_ranges,
    );
    insert_if_nonempty(
        &mut body,
        "q_organization_keyword_tags",
        &params.q_organization_keyword_tags,
    );

    let plan = PagePlan::normalize(&params.paging, state.config.max_pages);
    let result = state
        .apollo
        .paginate_search(ORGANIZATION_SEARCH_PATH, Value::Object(body), plan)
        .await;

    SearchResponse {
        result,
        metadata: metadata("search_organizations"),
    }
}

/// `endpoint: "search_people"`
///
/// Paginates the upstream people search and aggregates the `people` array
/// across pages.
async fn search_people(state: &AppState, params: PeopleSearchParams) -> SearchResponse {
    let mut body = serde_json::Map::new();
    insert_if_nonempty(&mut body, "person_titles", &params.person_titles);
    insert_if_nonempty(&mut body, "person_locations", &params.person_locations);
    insert_if_nonempty(&mut body, "person_seniorities", &params.person_seniorities);
    insert_if_nonempty(
        &mut body,
        "organization_domains",
        &params.organization_domains,
    );
    insert_if_some(&mut body, "q_keywords", &params.q_keywords);

    let plan = PagePlan::normalize(&params.paging, state.config.max_pages);
    let result = state
        .apollo
        .paginate_search(PEOPLE_SEARCH_PATH, Value::Object(body), plan)
        .await;

    SearchResponse {
        result,
        metadata: metadata("search_people"),
    }
}

/// `endpoint: "enrich_contacts"`
///
/// Runs the caller's contact list through the upstream person-match endpoint
/// one contact at a time.
async fn enrich_contacts(
    state: &AppState,
    params: EnrichContactsParams,
) -> Result<EnrichResponse, AppError> {
    if params.contacts.is_empty() {
        return Err(AppError::BadRequest(
            "'contacts' must be a non-empty list".to_string(),
        ));
    }
    for (index, contact) in params.contacts.iter().enumerate() {
        if !contact.has_identifier() {
            return Err(AppError::BadRequest(format!(
                "Contact {} has no usable identifier (need email, linkedin_url, name, or first_name + last_name)",
                index
            )));
        }
    }

    let outcome = state
        .apollo
        .enrich_contacts(&params.contacts, params.reveal_personal_emails)
        .await;

    Ok(EnrichResponse {
        outcome,
        metadata: metadata("enrich_contacts"),
    })
}
