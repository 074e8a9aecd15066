/// Property-based tests using proptest
/// Tests invariants that should hold for all paging inputs
use proptest::prelude::*;
use prospect_api::models::{PagePlan, PagingParams, PER_PAGE_MAX, PER_PAGE_MIN};

// Property: normalized plans always land in valid ranges
proptest! {
    #[test]
    fn plan_always_in_bounds(
        page in proptest::option::of(0u32..=10_000),
        per_page in proptest::option::of(0u32..=10_000),
        max_pages in proptest::option::of(0u32..=10_000),
        cap in 1u32..=100
    ) {
        let params = PagingParams { page, per_page, max_pages };
        let plan = PagePlan::normalize(&params, cap);

        prop_assert!(plan.start_page >= 1);
        prop_assert!(plan.per_page >= PER_PAGE_MIN && plan.per_page <= PER_PAGE_MAX);
        prop_assert!(plan.max_pages >= 1 && plan.max_pages <= cap);
    }

    #[test]
    fn in_range_values_pass_through(
        page in 1u32..=500,
        per_page in PER_PAGE_MIN..=PER_PAGE_MAX,
        max_pages in 1u32..=10
    ) {
        let params = PagingParams {
            page: Some(page),
            per_page: Some(per_page),
            max_pages: Some(max_pages),
        };
        let plan = PagePlan::normalize(&params, 10);

        prop_assert_eq!(plan.start_page, page);
        prop_assert_eq!(plan.per_page, per_page);
        prop_assert_eq!(plan.max_pages, max_pages);
    }

    #[test]
    fn normalize_is_idempotent(
        page in proptest::option::of(0u32..=10_000),
        per_page in proptest::option::of(0u32..=10_000),
        max_pages in proptest::option::of(0u32..=10_000),
        cap in 1u32..=100
    ) {
        let params = PagingParams { page, per_page, max_pages };
        let plan = PagePlan::normalize(&params, cap);

        let again = PagePlan::normalize(
            &PagingParams {
                page: Some(plan.start_page),
                per_page: Some(plan.per_page),
                max_pages: Some(plan.max_pages),
            },
            cap,
        );
        prop_assert_eq!(plan, again);
    }

    #[test]
    fn zero_cap_never_panics(
        page in proptest::option::of(0u32..=100),
        per_page in proptest::option::of(0u32..=100),
        max_pages in proptest::option::of(0u32..=100)
    ) {
        // A misconfigured cap of 0 still yields a plan with at least one page
        let params = PagingParams { page, per_page, max_pages };
        let plan = PagePlan::normalize(&params, 0);
        prop_assert_eq!(plan.max_pages, 1);
    }
}

// Property: paging params deserialize from arbitrary JSON objects without panicking
proptest! {
    #[test]
    fn paging_params_parse_never_panics(
        page in 0u64..=u32::MAX as u64,
        per_page in 0u64..=u32::MAX as u64
    ) {
        let value = serde_json::json!({"page": page, "per_page": per_page});
        let _ = serde_json::from_value::<PagingParams>(value);
    }
}
