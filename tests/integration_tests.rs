//! Integration tests for the Giglet marketplace
//!
//! These tests drive the services and the HTTP router end to end against
//! the in-memory store, with emphasis on the capacity guarantees under
//! concurrent acceptance and submission.

use chrono::{Duration, Utc};
use giglet::models::{
    Creator, GigRequirements, GigStatus, GigVisibility, PayoutStructure, SubmissionStatus, User,
    UserRole,
};
use giglet::{
    GigService, GigletError, MarketplaceStore, MemoryStore, NewGig, RepEvent, ReputationManager,
    ReputationThresholds, ReviewDecision, ReviewRequest, SquadService,
};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

const BRAND: &str = "brand_acme";
/// Rep that puts a creator at the top level, past every early-access delay
const LEGEND_REP: u32 = 2500;

struct Market {
    store: Arc<MemoryStore>,
    reputation: Arc<ReputationManager>,
    gigs: Arc<GigService>,
}

async fn market() -> Market {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_user(&User::new(
            BRAND.to_string(),
            "team@acme.test".to_string(),
            UserRole::Brand,
        ))
        .await
        .unwrap();
    let reputation = Arc::new(ReputationManager::new(
        store.clone(),
        ReputationThresholds::default(),
    ));
    Market {
        gigs: Arc::new(GigService::new(store.clone(), reputation.clone())),
        reputation,
        store,
    }
}

async fn add_creators(store: &MemoryStore, count: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = format!("creator_{:02}", i);
        store
            .insert_creator(
                &Creator::new(id.clone(), id.clone())
                    .with_rep(LEGEND_REP)
                    .with_followers(10_000),
            )
            .await
            .unwrap();
        ids.push(id);
    }
    ids
}

fn gig_request(limit: u32) -> NewGig {
    NewGig {
        brand_id: BRAND.to_string(),
        title: "30s product demo".to_string(),
        description: "Show the product in daily use".to_string(),
        payout: PayoutStructure::Fixed { amount_cents: 7_500 },
        visibility: GigVisibility::Open,
        deadline: Utc::now() + Duration::days(7),
        accepted_submissions_limit: limit,
        requirements: GigRequirements::default(),
        reimbursement: false,
        premium: false,
        compliance_required: false,
    }
}

// ============================================================================
// Acceptance Concurrency Gate
// ============================================================================

mod acceptance {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_accepts_on_single_slot_gig() {
        let m = market().await;
        let creators = add_creators(&m.store, 16).await;
        let gig = m.gigs.create_gig(gig_request(1)).await.unwrap();

        let handles: Vec<_> = creators
            .iter()
            .map(|creator_id| {
                let gigs = m.gigs.clone();
                let gig_id = gig.id.clone();
                let creator_id = creator_id.clone();
                tokio::spawn(async move { gigs.accept_gig(&gig_id, &creator_id).await })
            })
            .collect();
        let results = futures::future::join_all(handles).await;

        let mut successes = 0;
        let mut conflicts = 0;
        for result in results {
            match result.unwrap() {
                Ok(outcome) => {
                    assert!(!outcome.already_accepted);
                    successes += 1;
                }
                Err(GigletError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 15);

        let gig = m.gigs.get_gig(&gig.id).await.unwrap();
        assert_eq!(gig.status, GigStatus::Accepted);
        assert_eq!(gig.acceptances.len(), 1);
        assert_eq!(gig.accepted_by.as_deref(), Some(gig.acceptances[0].as_str()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_respect_limit() {
        let m = market().await;
        let creators = add_creators(&m.store, 10).await;
        let gig = m.gigs.create_gig(gig_request(3)).await.unwrap();

        for creator_id in &creators {
            m.gigs.accept_gig(&gig.id, creator_id).await.unwrap();
        }

        let handles: Vec<_> = creators
            .iter()
            .map(|creator_id| {
                let gigs = m.gigs.clone();
                let gig_id = gig.id.clone();
                let creator_id = creator_id.clone();
                tokio::spawn(async move {
                    gigs.submit(&gig_id, &creator_id, "https://cdn.test/clip.mp4")
                        .await
                })
            })
            .collect();
        let accepted = futures::future::join_all(handles)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();

        assert_eq!(accepted, 3);
        assert_eq!(m.store.count_live_submissions(&gig.id).await.unwrap(), 3);

        // Full gig: a new acceptance is refused as well
        let late = add_creators_with_prefix(&m.store, "late").await;
        assert!(matches!(
            m.gigs.accept_gig(&gig.id, &late).await,
            Err(GigletError::Conflict(_))
        ));
    }

    async fn add_creators_with_prefix(store: &MemoryStore, id: &str) -> String {
        store
            .insert_creator(&Creator::new(id.to_string(), id.to_string()).with_rep(LEGEND_REP))
            .await
            .unwrap();
        id.to_string()
    }

    #[tokio::test]
    async fn test_reaccept_is_idempotent() {
        let m = market().await;
        let creators = add_creators(&m.store, 1).await;
        let gig = m.gigs.create_gig(gig_request(1)).await.unwrap();

        let first = m.gigs.accept_gig(&gig.id, &creators[0]).await.unwrap();
        let second = m.gigs.accept_gig(&gig.id, &creators[0]).await.unwrap();

        assert!(!first.already_accepted);
        assert!(second.already_accepted);
        assert_eq!(second.gig.acceptances, vec![creators[0].clone()]);
        assert_eq!(second.gig.accepted_at, first.gig.accepted_at);
    }

    #[tokio::test]
    async fn test_expired_gig_always_fails() {
        let m = market().await;
        let creators = add_creators(&m.store, 2).await;
        let gig = m.gigs.create_gig(gig_request(2)).await.unwrap();
        m.gigs.accept_gig(&gig.id, &creators[0]).await.unwrap();

        let after_deadline = gig.deadline + Duration::seconds(1);
        for creator_id in &creators {
            assert_eq!(
                m.gigs
                    .accept_gig_at(&gig.id, creator_id, after_deadline)
                    .await
                    .unwrap_err(),
                GigletError::DeadlinePassed
            );
        }
        // Store-level check agrees, even without the service pre-check
        assert_eq!(
            m.store
                .accept_gig(&gig.id, &creators[1], after_deadline)
                .await
                .unwrap_err(),
            GigletError::DeadlinePassed
        );
    }
}

// ============================================================================
// Submission, Review and Payment
// ============================================================================

mod review_flow {
    use super::*;

    #[tokio::test]
    async fn test_approvals_pay_once_and_close_gig() {
        let m = market().await;
        let creators = add_creators(&m.store, 2).await;
        let gig = m.gigs.create_gig(gig_request(2)).await.unwrap();

        let mut submissions = Vec::new();
        for creator_id in &creators {
            m.gigs.accept_gig(&gig.id, creator_id).await.unwrap();
            submissions.push(
                m.gigs
                    .submit(&gig.id, creator_id, "https://cdn.test/take1.mp4")
                    .await
                    .unwrap(),
            );
        }

        let approve = || ReviewRequest {
            reviewer_id: BRAND.to_string(),
            decision: ReviewDecision::Approve,
        };

        let first = m.gigs.review(&submissions[0].id, approve()).await.unwrap();
        assert!(!first.gig_closed);
        // Approving the same submission twice must not pay twice
        assert!(matches!(
            m.gigs.review(&submissions[0].id, approve()).await,
            Err(GigletError::Conflict(_))
        ));

        let second = m.gigs.review(&submissions[1].id, approve()).await.unwrap();
        assert!(second.gig_closed);

        for creator_id in &creators {
            let payments = m.gigs.list_payments(creator_id).await.unwrap();
            assert_eq!(payments.len(), 1);
            assert_eq!(payments[0].amount_cents, 7_500);

            let creator = m.reputation.get_creator(creator_id).await.unwrap();
            assert_eq!(creator.balance_cents, 7_500);
            assert_eq!(creator.gigs_completed, 1);
            assert_eq!(creator.rep, LEGEND_REP + 50);
        }

        let gig = m.gigs.get_gig(&gig.id).await.unwrap();
        assert_eq!(gig.status, GigStatus::Closed);
        assert_eq!(
            m.gigs
                .submit(&gig.id, &creators[0], "https://cdn.test/again.mp4")
                .await
                .unwrap_err(),
            GigletError::GigClosed
        );
    }

    #[tokio::test]
    async fn test_rejection_keeps_single_slot_holder() {
        let m = market().await;
        let creators = add_creators(&m.store, 2).await;
        let gig = m.gigs.create_gig(gig_request(1)).await.unwrap();
        m.gigs.accept_gig(&gig.id, &creators[0]).await.unwrap();
        let submission = m
            .gigs
            .submit(&gig.id, &creators[0], "https://cdn.test/a.mp4")
            .await
            .unwrap();

        let outcome = m
            .gigs
            .review(
                &submission.id,
                ReviewRequest {
                    reviewer_id: BRAND.to_string(),
                    decision: ReviewDecision::Reject,
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.submission.status, SubmissionStatus::Rejected);
        assert_eq!(m.store.count_live_submissions(&gig.id).await.unwrap(), 0);

        // Single-slot gigs stay with their first acceptor
        assert!(matches!(
            m.gigs.accept_gig(&gig.id, &creators[1]).await,
            Err(GigletError::Conflict(_))
        ));
    }
}

// ============================================================================
// Reputation
// ============================================================================

mod reputation {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rep_never_negative_under_concurrent_penalties() {
        let m = market().await;
        m.store
            .insert_creator(&Creator::new("c".into(), "c".into()).with_rep(45))
            .await
            .unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let reputation = m.reputation.clone();
                tokio::spawn(async move {
                    reputation
                        .award_rep("c", RepEvent::SubmissionFailed)
                        .await
                })
            })
            .collect();
        for result in futures::future::join_all(handles).await {
            let award = result.unwrap().unwrap();
            assert!(award.change.applied_delta <= 0);
        }

        assert_eq!(m.reputation.get_creator("c").await.unwrap().rep, 0);
    }

    #[tokio::test]
    async fn test_rookie_waits_for_early_access() {
        let m = market().await;
        m.store
            .insert_creator(&Creator::new("rookie".into(), "rookie".into()).with_followers(500))
            .await
            .unwrap();
        let gig = m.gigs.create_gig(gig_request(5)).await.unwrap();

        assert!(m.gigs.feed("rookie", Utc::now()).await.unwrap().is_empty());
        let report = m
            .gigs
            .access_report(&gig.id, "rookie", Utc::now())
            .await
            .unwrap();
        assert!(!report.visibility.is_visible());

        let later = gig.created_at + Duration::minutes(60);
        let feed = m.gigs.feed("rookie", later).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].payout_cents, Some(7_500));
    }
}

// ============================================================================
// Squads
// ============================================================================

mod squads {
    use super::*;

    #[tokio::test]
    async fn test_squad_gig_visible_to_members_only() {
        let m = market().await;
        let creators = add_creators(&m.store, 2).await;
        let squads = SquadService::new(m.store.clone(), m.reputation.clone());

        let squad = squads
            .create_squad(&creators[0], "Weekend Crew")
            .await
            .unwrap()
            .squad;
        let mut request = gig_request(1);
        request.visibility = GigVisibility::Squad {
            squad_id: squad.id.clone(),
        };
        let gig = m.gigs.create_gig(request).await.unwrap();

        assert!(matches!(
            m.gigs.accept_gig(&gig.id, &creators[1]).await,
            Err(GigletError::Forbidden(_))
        ));
        m.gigs.accept_gig(&gig.id, &creators[0]).await.unwrap();

        let creator = m.reputation.get_creator(&creators[0]).await.unwrap();
        assert_eq!(creator.rep, LEGEND_REP + 10);
        assert_eq!(creator.squad_id.as_deref(), Some(squad.id.as_str()));
    }
}

// ============================================================================
// HTTP API
// ============================================================================

mod http_api {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use giglet::api::{
        ApiState, SecurityMiddlewareConfig, SecurityState, create_app,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const API_KEY: &str = "test-api-key-0123456789";
    const ADMIN_KEY: &str = "test-admin-key-0123456789abcdefghij";

    fn app() -> Router {
        let store: Arc<dyn MarketplaceStore> = Arc::new(MemoryStore::new());
        let reputation = Arc::new(ReputationManager::new(
            store.clone(),
            ReputationThresholds::default(),
        ));
        let state = ApiState::new(store, reputation, Some(ADMIN_KEY.to_string()));
        let security = SecurityState::new(SecurityMiddlewareConfig {
            api_keys: vec![API_KEY.to_string()],
            ..SecurityMiddlewareConfig::default()
        });
        create_app(state, security)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        call_with(app, method, uri, body, &[("x-api-key", API_KEY)]).await
    }

    async fn call_with(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_is_public_and_rest_needs_key() {
        let app = app();

        let (status, body) = call_with(&app, "GET", "/health", None, &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["store"], "memory");

        let (status, body) = call_with(&app, "GET", "/gigs/nope", None, &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["category"], "eligibility");

        let (status, body) = call(&app, "GET", "/gigs/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["category"], "not_found");
    }

    #[tokio::test]
    async fn test_accept_flow_over_http() {
        let app = app();

        let (status, brand) =
            call(&app, "POST", "/brands", Some(json!({"email": "ops@brand.test"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let brand_id = brand["id"].as_str().unwrap().to_string();

        let mut creator_ids = Vec::new();
        for name in ["ana", "ben"] {
            let (status, creator) = call(
                &app,
                "POST",
                "/creators",
                Some(json!({
                    "email": format!("{name}@creators.test"),
                    "username": name,
                    "follower_count": 2000
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            creator_ids.push(creator["id"].as_str().unwrap().to_string());
        }

        // Admin boost past the early-access window
        for creator_id in &creator_ids {
            let (status, award) = call_with(
                &app,
                "POST",
                &format!("/creators/{creator_id}/rep"),
                Some(json!({"event": "manual", "delta": 2500, "reason": "launch cohort"})),
                &[("x-api-key", API_KEY), ("x-admin-key", ADMIN_KEY)],
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(award["level_after"], 7);
        }

        let (status, standing) = call(
            &app,
            "GET",
            &format!("/creators/{}/reputation", creator_ids[0]),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(standing["rep"], 2500);
        assert_eq!(standing["level"]["title"], "Legend");

        let (status, gig) = call(
            &app,
            "POST",
            "/gigs",
            Some(json!({
                "brand_id": brand_id,
                "title": "Unboxing",
                "payout": {"type": "fixed", "amount_cents": 3000},
                "deadline": (Utc::now() + Duration::days(3)).to_rfc3339(),
                "accepted_submissions_limit": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let gig_id = gig["id"].as_str().unwrap().to_string();

        let accept_uri = format!("/gigs/{gig_id}/accept");
        let (status, body) = call(
            &app,
            "POST",
            &accept_uri,
            Some(json!({"creator_id": creator_ids[0]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "already_accepted": false, "gig_status": "accepted"}));

        let (_, body) = call(
            &app,
            "POST",
            &accept_uri,
            Some(json!({"creator_id": creator_ids[0]})),
        )
        .await;
        assert_eq!(body["already_accepted"], true);

        let (status, body) = call(
            &app,
            "POST",
            &accept_uri,
            Some(json!({"creator_id": creator_ids[1]})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["category"], "conflict");
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn test_bad_bodies_use_error_envelope() {
        let app = app();

        let (status, body) = call(
            &app,
            "POST",
            "/submissions/any/evaluation",
            Some(json!({"quality_score": 300})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["category"], "validation");

        let (status, body) = call(&app, "POST", "/gigs", Some(json!({"title": "no brand"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["category"], "validation");
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn test_admin_rep_requires_admin_key() {
        let app = app();
        let (_, creator) = call(
            &app,
            "POST",
            "/creators",
            Some(json!({"email": "cy@creators.test", "username": "cy"})),
        )
        .await;
        let uri = format!("/creators/{}/rep", creator["id"].as_str().unwrap());

        let (status, _) = call(&app, "POST", &uri, Some(json!({"event": "gig_completed"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
