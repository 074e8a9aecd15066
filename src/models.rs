use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hard bounds Apollo enforces on the `per_page` parameter.
pub const PER_PAGE_MIN: u32 = 1;
pub const PER_PAGE_MAX: u32 = 100;
pub const PER_PAGE_DEFAULT: u32 = 25;

/// Paging controls shared by the search operations.
///
/// Callers may supply any of these; `PagePlan::normalize` clamps them into
/// the ranges the upstream accepts and the configured page cap.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagingParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub max_pages: Option<u32>,
}

/// Normalized paging plan for a single search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub start_page: u32,
    pub per_page: u32,
    pub max_pages: u32,
}

impl PagePlan {
    /// Clamps caller-supplied paging controls into valid ranges.
    ///
    /// `page` defaults to 1 (and 0 is treated as 1, Apollo pages are
    /// 1-based). `per_page` is clamped to 1..=100. `max_pages` defaults to
    /// the configured cap and can never exceed it.
    pub fn normalize(params: &PagingParams, cap: u32) -> Self {
        let cap = cap.max(1);
        Self {
            start_page: params.page.unwrap_or(1).max(1),
            per_page: params
                .per_page
                .unwrap_or(PER_PAGE_DEFAULT)
                .clamp(PER_PAGE_MIN, PER_PAGE_MAX),
            max_pages: params.max_pages.unwrap_or(cap).clamp(1, cap),
        }
    }
}

/// Filters for the organization search operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationSearchParams {
    pub q_organization_name: Option<String>,
    #[serde(default)]
    pub organization_locations: Vec<String>,
    #[serde(default)]
    pub organization_num_employees_ranges: Vec<String>,
    #[serde(default)]
    pub q_organization_keyword_tags: Vec<String>,
    #[serde(flatten)]
    pub paging: PagingParams,
}

/// Filters for the people search operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeopleSearchParams {
    #[serde(default)]
    pub person_titles: Vec<String>,
    #[serde(default)]
    pub person_locations: Vec<String>,
    #[serde(default)]
    pub person_seniorities: Vec<String>,
    #[serde(default)]
    pub organization_domains: Vec<String>,
    pub q_keywords: Option<String>,
    #[serde(flatten)]
    pub paging: PagingParams,
}

/// A single contact to enrich via the person-match endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
}

impl ContactQuery {
    /// True when at least one identifier the upstream can match on is set.
    pub fn has_identifier(&self) -> bool {
        self.email.is_some()
            || self.linkedin_url.is_some()
            || self.name.is_some()
            || (self.first_name.is_some() && self.last_name.is_some())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichContactsParams {
    pub contacts: Vec<ContactQuery>,
    #[serde(default)]
    pub reveal_personal_emails: bool,
}

/// Pagination block Apollo returns alongside search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total_entries: u64,
    pub total_pages: u32,
}

/// One page of an upstream search response.
///
/// Organization and people searches share the envelope; only the populated
/// array differs.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub organizations: Vec<Value>,
    #[serde(default)]
    pub people: Vec<Value>,
    #[serde(default)]
    pub contacts: Vec<Value>,
    pub pagination: Option<Pagination>,
}

impl SearchPage {
    /// Drains the records of this page, whichever array the upstream filled.
    pub fn into_records(self) -> Vec<Value> {
        let mut records = self.organizations;
        records.extend(self.people);
        records.extend(self.contacts);
        records
    }
}

/// A page that failed during best-effort pagination.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageError {
    pub page: u32,
    pub error: String,
}

/// Aggregated outcome of paginating a search endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedResult {
    pub records: Vec<Value>,
    pub total_entries: Option<u64>,
    pub pages_fetched: u32,
    pub pages_requested: u32,
    pub page_errors: Vec<PageError>,
    /// True when any page failed or pagination stopped early on a 429.
    pub partial: bool,
}

/// A contact whose upstream match call failed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContactError {
    pub index: usize,
    pub error: String,
}

/// Aggregated outcome of the contact enrichment operation.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentOutcome {
    pub matched: Vec<Value>,
    /// Indices of contacts the upstream could not match.
    pub misses: Vec<usize>,
    pub errors: Vec<ContactError>,
}

/// Metadata block attached to every successful operation response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub source: String,
    pub endpoint: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub result: AggregatedResult,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichResponse {
    #[serde(flatten)]
    pub outcome: EnrichmentOutcome,
    pub metadata: ResponseMetadata,
}
