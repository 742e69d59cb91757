//! List/query behavior through the lifecycle service: filtering, sorting,
//! pagination bounds, and the page partition property.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use uuid::Uuid;

use review_lifecycle::events::NotificationSink;
use review_lifecycle::query_builder::{QueryError, RequestFilter, MAX_PAGE_SIZE};
use review_lifecycle::services::CreateRequest;
use review_lifecycle::test_helpers::{InMemoryRequestStore, RecordingNotificationSink};
use review_lifecycle::{
    LifecycleError, LifecycleService, ListQuery, RequestStatus, WorkflowKind,
};

fn approval_service() -> LifecycleService<InMemoryRequestStore> {
    let notifier: Arc<dyn NotificationSink> = Arc::new(RecordingNotificationSink::new());
    LifecycleService::new(WorkflowKind::Approval, InMemoryRequestStore::new(), notifier)
}

fn request_for(requested_by: &str, subject_id: &str, reason: &str) -> CreateRequest {
    CreateRequest {
        subject_type: "asset".to_string(),
        subject_id: subject_id.to_string(),
        requested_by: requested_by.to_string(),
        payload: json!({"actionType": "disposal", "requestReason": reason}),
        supporting_docs: vec![],
    }
}

async fn seed(service: &LifecycleService<InMemoryRequestStore>, n: usize) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let created = service
            .create(request_for("alice", &format!("ASSET-{i}"), "routine"))
            .await
            .unwrap();
        ids.push(created.id);
    }
    ids
}

#[tokio::test]
async fn test_list_defaults_to_first_page_of_ten() {
    let service = approval_service();
    seed(&service, 12).await;

    let page = service.list(ListQuery::default()).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 10);
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.total, 12);
    assert_eq!(page.total_pages, 2);
}

#[tokio::test]
async fn test_filters_narrow_with_logical_and() {
    let service = approval_service();
    service.create(request_for("alice", "ASSET-1", "routine")).await.unwrap();
    service.create(request_for("bob", "ASSET-1", "routine")).await.unwrap();
    let decided = service.create(request_for("alice", "ASSET-2", "routine")).await.unwrap();
    service
        .update_status(decided.id, RequestStatus::Approved, "carol", None)
        .await
        .unwrap();

    let query = ListQuery {
        filter: RequestFilter {
            status: Some(RequestStatus::Submitted),
            requested_by: Some("alice".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let page = service.list(query).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].subject_id, "ASSET-1");
    assert_eq!(page.data[0].requested_by, "alice");
}

#[tokio::test]
async fn test_search_is_case_insensitive_over_payload() {
    let service = approval_service();
    service.create(request_for("alice", "ASSET-1", "Water Damage")).await.unwrap();
    service.create(request_for("alice", "ASSET-2", "routine audit")).await.unwrap();

    let query = ListQuery {
        filter: RequestFilter {
            search: Some("water damage".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let page = service.list(query).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].subject_id, "ASSET-1");
}

#[tokio::test]
async fn test_sort_by_whitelisted_field() {
    let service = approval_service();
    let first = service.create(request_for("alice", "ASSET-1", "routine")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let second = service.create(request_for("alice", "ASSET-2", "routine")).await.unwrap();

    let query = ListQuery {
        sort_by: Some("created_at".to_string()),
        sort_order: Some("asc".to_string()),
        ..Default::default()
    };
    let page = service.list(query).await.unwrap();
    assert_eq!(
        page.data.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );
}

#[tokio::test]
async fn test_malformed_query_specs_rejected_before_store_access() {
    let service = approval_service();

    let zero_page = service
        .list(ListQuery {
            page: Some(0),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        zero_page,
        Err(LifecycleError::Query(QueryError::InvalidPage { page: 0 }))
    ));

    let zero_limit = service
        .list(ListQuery {
            limit: Some(0),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        zero_limit,
        Err(LifecycleError::Query(QueryError::InvalidLimit { limit: 0 }))
    ));

    let bad_field = service
        .list(ListQuery {
            sort_by: Some("payload; DROP TABLE".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        bad_field,
        Err(LifecycleError::Query(QueryError::InvalidSortField { .. }))
    ));

    let bad_order = service
        .list(ListQuery {
            sort_order: Some("sideways".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        bad_order,
        Err(LifecycleError::Query(QueryError::InvalidSortOrder { .. }))
    ));
}

#[tokio::test]
async fn test_oversized_limit_is_capped_not_rejected() {
    let service = approval_service();
    seed(&service, 3).await;

    let page = service
        .list(ListQuery {
            limit: Some(500),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.limit, MAX_PAGE_SIZE);
    assert_eq!(page.data.len(), 3);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty_with_correct_totals() {
    let service = approval_service();
    seed(&service, 5).await;

    let page = service
        .list(ListQuery {
            page: Some(4),
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Walking all pages yields every matching record exactly once.
    #[test]
    fn prop_pages_partition_the_result_set(total in 0usize..=35, limit in 1u32..=12) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let service = approval_service();
            let seeded = seed(&service, total).await;

            let first = service
                .list(ListQuery { limit: Some(limit), ..Default::default() })
                .await
                .unwrap();
            prop_assert_eq!(first.total, total as u64);

            let mut collected: Vec<Uuid> = Vec::new();
            for page_number in 1..=first.total_pages.max(1) {
                let page = service
                    .list(ListQuery {
                        page: Some(page_number as u32),
                        limit: Some(limit),
                        ..Default::default()
                    })
                    .await
                    .unwrap();
                prop_assert!(page.data.len() as u32 <= limit);
                collected.extend(page.data.iter().map(|r| r.id));
            }

            prop_assert_eq!(collected.len(), total);
            let mut seen: Vec<Uuid> = collected.clone();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), total, "no record may appear on two pages");

            let mut expected = seeded;
            expected.sort();
            let mut got = collected;
            got.sort();
            prop_assert_eq!(got, expected, "no record may be omitted");
            Ok(())
        })?;
    }
}
