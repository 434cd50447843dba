use std::sync::Arc;

use assert_matches::assert_matches;

use super::*;
use crate::company::{CreateCompanyFor, UpsertCompany};
use crate::policy::{ReviewPolicy, RewardPolicy};
use crate::store::MemoryStore;
use crate::submission::{RejectInput, SubmitWork};
use crate::task::{CreateTask, Difficulty, UpdateTask};

const OWNER: DbId = 100;
const OTHER_OWNER: DbId = 101;
const ENGINEER: DbId = 200;
const SECOND_ENGINEER: DbId = 201;
const MENTOR: DbId = 300;
const ADMIN: DbId = 400;
const NEW_OWNER: DbId = 102;

fn company() -> Actor {
    Actor::new(OWNER, UserRole::Company).with_email("owner@acme.io")
}

fn other_company() -> Actor {
    Actor::new(OTHER_OWNER, UserRole::Company)
}

fn engineer() -> Actor {
    Actor::new(ENGINEER, UserRole::Engineer)
}

fn second_engineer() -> Actor {
    Actor::new(SECOND_ENGINEER, UserRole::Engineer)
}

fn mentor() -> Actor {
    Actor::new(MENTOR, UserRole::Mentor)
}

fn admin() -> Actor {
    Actor::new(ADMIN, UserRole::Admin)
}

fn new_task(budget: i64, base_xp: Option<i64>) -> CreateTask {
    CreateTask {
        title: "Add pagination".into(),
        description: Some("Cursor based".into()),
        difficulty: Difficulty::Medium,
        budget,
        base_xp,
        deadline_at: None,
    }
}

fn work(notes: &str) -> SubmitWork {
    SubmitWork {
        notes: Some(notes.into()),
        attachment_url: None,
    }
}

struct Harness {
    market: Marketplace,
    store: Arc<MemoryStore>,
}

fn harness_with(policy: MarketplacePolicy) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let market = Marketplace::new(store.clone(), policy).unwrap();
    Harness { market, store }
}

async fn harness() -> Harness {
    let h = harness_with(MarketplacePolicy::default());
    for owner in [company(), other_company()] {
        h.market
            .upsert_my_company(
                &owner,
                UpsertCompany {
                    name: format!("Company {}", owner.user_id),
                    description: None,
                },
            )
            .await
            .unwrap();
    }
    h
}

async fn posted(h: &Harness, budget: i64, base_xp: Option<i64>) -> Task {
    h.market
        .create_task(&company(), new_task(budget, base_xp))
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Task lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_task_starts_published() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(250)).await;

    assert_eq!(task.status, TaskStatus::Published);
    let published = h.market.list_published_tasks().await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].id, task.id);
}

#[tokio::test]
async fn create_task_without_company_is_rejected_in_strict_mode() {
    let h = harness_with(MarketplacePolicy::default());
    let result = h.market.create_task(&company(), new_task(10, None)).await;
    assert_matches!(result, Err(CoreError::CompanyNotFound { owner_id: OWNER }));
}

#[tokio::test]
async fn create_task_provisions_company_when_enabled() {
    let h = harness_with(MarketplacePolicy {
        auto_provision_company: true,
        ..Default::default()
    });
    let task = h.market.create_task(&company(), new_task(10, None)).await.unwrap();

    let company_record = h.market.get_my_company(&company()).await.unwrap();
    assert_eq!(task.company_id, company_record.id);
    assert_eq!(company_record.name, "owner@acme.io's company");

    // A second task reuses the same company.
    let again = h.market.create_task(&company(), new_task(10, None)).await.unwrap();
    assert_eq!(again.company_id, company_record.id);
}

#[tokio::test]
async fn engineers_cannot_create_tasks() {
    let h = harness().await;
    let result = h.market.create_task(&engineer(), new_task(10, None)).await;
    assert_matches!(result, Err(CoreError::NotAuthorized(_)));
}

#[tokio::test]
async fn invalid_task_input_is_rejected() {
    let h = harness().await;
    let result = h.market.create_task(&company(), new_task(-5, None)).await;
    assert_matches!(result, Err(CoreError::Validation(_)));
}

#[tokio::test]
async fn claim_advances_task_and_is_idempotent() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;

    let first = h.market.claim_task(&engineer(), task.id).await.unwrap();
    assert_eq!(first.task.status, TaskStatus::Claimed);
    assert_eq!(first.task.assignee_id, Some(ENGINEER));
    assert_eq!(first.submission.status, SubmissionStatus::Draft);
    assert!(first.submission.claimed_at.is_some());

    let second = h.market.claim_task(&engineer(), task.id).await.unwrap();
    assert_eq!(second.submission.id, first.submission.id);
    assert_eq!(h.store.submissions_for_task(task.id).await.len(), 1);
}

#[tokio::test]
async fn concurrent_claims_both_succeed() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;

    let (first, second) = (engineer(), second_engineer());
    let (a, b) = tokio::join!(
        h.market.claim_task(&first, task.id),
        h.market.claim_task(&second, task.id)
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.submission.id, b.submission.id);

    let submissions = h.store.submissions_for_task(task.id).await;
    assert_eq!(submissions.len(), 2);

    let published = h.market.list_published_tasks().await.unwrap();
    assert!(published.is_empty());
    let mine = h.market.list_tasks_for_company(&company()).await.unwrap();
    assert_eq!(mine[0].status, TaskStatus::Claimed);
}

#[tokio::test]
async fn submit_without_claim_creates_submission() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;

    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();
    assert_eq!(progress.task.status, TaskStatus::Submitted);
    assert_eq!(progress.submission.status, SubmissionStatus::Pending);
    assert_eq!(progress.submission.claimed_at, None);
    assert!(progress.submission.submitted_at.is_some());
}

#[tokio::test]
async fn resubmit_updates_existing_row() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    h.market.claim_task(&engineer(), task.id).await.unwrap();

    let first = h
        .market
        .submit_task(&engineer(), task.id, work("v1"))
        .await
        .unwrap();
    let second = h
        .market
        .submit_task(&engineer(), task.id, work("v2"))
        .await
        .unwrap();

    assert_eq!(first.submission.id, second.submission.id);
    assert_eq!(second.submission.notes.as_deref(), Some("v2"));
    assert_eq!(h.store.submissions_for_task(task.id).await.len(), 1);
}

#[tokio::test]
async fn cancelled_task_rejects_claims_and_submissions() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    let cancelled = h.market.cancel_task(&company(), task.id).await.unwrap();
    assert_eq!(cancelled.status, TaskStatus::Cancelled);

    assert_matches!(
        h.market.claim_task(&engineer(), task.id).await,
        Err(CoreError::InvalidState { entity: "Task", .. })
    );
    assert_matches!(
        h.market.submit_task(&engineer(), task.id, work("late")).await,
        Err(CoreError::InvalidState { entity: "Task", .. })
    );
    assert_matches!(
        h.market.cancel_task(&company(), task.id).await,
        Err(CoreError::InvalidState { .. })
    );
}

#[tokio::test]
async fn missing_task_is_not_found() {
    let h = harness().await;
    assert_matches!(
        h.market.claim_task(&engineer(), 9_999).await,
        Err(CoreError::NotFound { entity: "Task", id: 9_999 })
    );
}

#[tokio::test]
async fn only_owner_may_update_or_delete() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    let patch = UpdateTask {
        title: Some("Renamed".into()),
        ..Default::default()
    };

    assert_matches!(
        h.market.update_task(&other_company(), task.id, patch.clone()).await,
        Err(CoreError::NotAuthorized(_))
    );
    assert_matches!(
        h.market.delete_task(&other_company(), task.id).await,
        Err(CoreError::NotAuthorized(_))
    );

    let updated = h.market.update_task(&company(), task.id, patch).await.unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.status, task.status);
    assert_eq!(updated.budget, task.budget);

    h.market.claim_task(&engineer(), task.id).await.unwrap();
    h.market.delete_task(&company(), task.id).await.unwrap();
    assert!(h.store.submissions_for_task(task.id).await.is_empty());
    assert_matches!(
        h.market.claim_task(&engineer(), task.id).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn engineer_listing_merges_published_and_own_tasks() {
    let h = harness().await;
    let open = posted(&h, 100, None).await;
    let claimed = posted(&h, 100, None).await;
    let submitted = posted(&h, 100, None).await;
    let foreign = posted(&h, 100, None).await;

    h.market.claim_task(&engineer(), claimed.id).await.unwrap();
    h.market
        .submit_task(&engineer(), submitted.id, work("done"))
        .await
        .unwrap();
    h.market.claim_task(&second_engineer(), foreign.id).await.unwrap();

    let views = h.market.list_tasks_for_engineer(&engineer()).await.unwrap();
    let ids: Vec<DbId> = views.iter().map(|v| v.task.id).collect();
    assert_eq!(ids, vec![open.id, claimed.id, submitted.id]);

    assert!(!views[0].claimed_by_me);
    assert!(views[1].claimed_by_me && !views[1].submitted_by_me);
    assert!(views[2].claimed_by_me && views[2].submitted_by_me);
}

// ---------------------------------------------------------------------------
// Review and rewards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mentor_approval_pays_everyone() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(250)).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();

    let approved = h
        .market
        .approve_submission(&mentor(), progress.submission.id, ReviewInput::default())
        .await
        .unwrap();
    assert_eq!(approved.status, SubmissionStatus::Approved);
    assert_eq!(approved.xp_awarded, Some(250));
    assert_eq!(approved.approved_by, Some(MENTOR));
    assert!(approved.approved_at.is_some());

    let junior = h.store.profile(ENGINEER).await.unwrap();
    assert_eq!(junior.xp_points, 250);
    assert_eq!(junior.honey_drops, 650);
    let mentor_profile = h.store.profile(MENTOR).await.unwrap();
    assert_eq!(mentor_profile.honey_drops, 150);
    assert_eq!(mentor_profile.reputation_score, 10.0);

    let tasks = h.market.list_tasks_for_company(&company()).await.unwrap();
    assert_eq!(tasks[0].status, TaskStatus::Completed);
}

#[tokio::test]
async fn claim_then_quick_submit_earns_speed_bonus() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(250)).await;
    h.market.claim_task(&engineer(), task.id).await.unwrap();
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("fast"))
        .await
        .unwrap();

    let approved = h
        .market
        .approve_submission(&mentor(), progress.submission.id, ReviewInput::default())
        .await
        .unwrap();
    assert_eq!(approved.xp_awarded, Some(275));
}

#[tokio::test]
async fn company_approval_pays_no_mentor_cut() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(100)).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();

    let review = ReviewInput {
        quality_score: Some(2.0),
        comment: Some("solid".into()),
    };
    let approved = h
        .market
        .approve_submission(&company(), progress.submission.id, review)
        .await
        .unwrap();
    assert_eq!(approved.xp_awarded, Some(200));
    assert_eq!(approved.quality_score, Some(2.0));
    assert_eq!(approved.review_comment.as_deref(), Some("solid"));

    let junior = h.store.profile(ENGINEER).await.unwrap();
    assert_eq!(junior.honey_drops, 800);
    assert!(h.store.profile(OWNER).await.is_none());
}

#[tokio::test]
async fn approving_twice_grants_once() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(250)).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();
    let id = progress.submission.id;

    let first = h
        .market
        .approve_submission(&mentor(), id, ReviewInput::default())
        .await
        .unwrap();
    let second = h
        .market
        .approve_submission(&mentor(), id, ReviewInput::default())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(h.store.profile(ENGINEER).await.unwrap().xp_points, 250);
}

#[tokio::test]
async fn concurrent_approvals_grant_once() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(250)).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();
    let id = progress.submission.id;

    let (mentor_a, company_b, mentor_c) = (mentor(), company(), mentor());
    let (a, b, c) = tokio::join!(
        h.market.approve_submission(&mentor_a, id, ReviewInput::default()),
        h.market.approve_submission(&company_b, id, ReviewInput::default()),
        h.market.approve_task(&mentor_c, task.id, ReviewInput::default())
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let junior = h.store.profile(ENGINEER).await.unwrap();
    assert_eq!(junior.xp_points, 250);
    let mentor_drops = h.store.profile(MENTOR).await.map_or(0, |p| p.honey_drops);
    // Platform keeps 200 whichever reviewer won the race.
    assert_eq!(junior.honey_drops + mentor_drops, 800);
}

#[tokio::test]
async fn foreign_company_cannot_approve() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();

    assert_matches!(
        h.market
            .approve_submission(&other_company(), progress.submission.id, ReviewInput::default())
            .await,
        Err(CoreError::NotAuthorized(_))
    );
    assert_matches!(
        h.market
            .approve_task(&other_company(), task.id, ReviewInput::default())
            .await,
        Err(CoreError::NotAuthorized(_))
    );
    assert!(h.store.profile(ENGINEER).await.is_none());
}

#[tokio::test]
async fn engineers_cannot_review() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();

    assert_matches!(
        h.market
            .approve_submission(&second_engineer(), progress.submission.id, ReviewInput::default())
            .await,
        Err(CoreError::NotAuthorized(_))
    );
}

#[tokio::test]
async fn company_self_approval_can_be_disabled() {
    let h = harness_with(MarketplacePolicy {
        review: ReviewPolicy {
            company_may_approve: false,
            mentor_may_approve: true,
        },
        ..Default::default()
    });
    h.market
        .upsert_my_company(
            &company(),
            UpsertCompany {
                name: "Acme".into(),
                description: None,
            },
        )
        .await
        .unwrap();
    let task = posted(&h, 100, None).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();

    assert_matches!(
        h.market
            .approve_submission(&company(), progress.submission.id, ReviewInput::default())
            .await,
        Err(CoreError::NotAuthorized(_))
    );
    assert!(h
        .market
        .approve_submission(&mentor(), progress.submission.id, ReviewInput::default())
        .await
        .is_ok());
}

#[tokio::test]
async fn draft_submission_cannot_be_approved() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    let progress = h.market.claim_task(&engineer(), task.id).await.unwrap();

    assert_matches!(
        h.market
            .approve_submission(&mentor(), progress.submission.id, ReviewInput::default())
            .await,
        Err(CoreError::InvalidState { entity: "Submission", .. })
    );
}

#[tokio::test]
async fn out_of_range_quality_score_is_rejected() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();

    let review = ReviewInput {
        quality_score: Some(9.0),
        comment: None,
    };
    assert_matches!(
        h.market
            .approve_submission(&mentor(), progress.submission.id, review)
            .await,
        Err(CoreError::Validation(_))
    );
}

#[tokio::test]
async fn rejected_work_can_be_resubmitted_and_approved() {
    let h = harness().await;
    let task = posted(&h, 100, Some(100)).await;
    let progress = h
        .market
        .submit_task(&engineer(), task.id, work("v1"))
        .await
        .unwrap();
    let id = progress.submission.id;

    let rejected = h
        .market
        .reject_submission(
            &mentor(),
            id,
            RejectInput {
                comment: Some("needs tests".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_matches!(
        h.market.approve_submission(&mentor(), id, ReviewInput::default()).await,
        Err(CoreError::InvalidState { .. })
    );

    let again = h
        .market
        .submit_task(&engineer(), task.id, work("v2"))
        .await
        .unwrap();
    assert_eq!(again.submission.id, id);
    assert_eq!(again.submission.status, SubmissionStatus::Pending);
    assert_eq!(again.submission.review_comment, None);

    let approved = h
        .market
        .approve_submission(&mentor(), id, ReviewInput::default())
        .await
        .unwrap();
    assert_eq!(approved.xp_awarded, Some(100));
}

#[tokio::test]
async fn approve_task_rewards_every_pending_submission() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(100)).await;
    h.market
        .submit_task(&engineer(), task.id, work("a"))
        .await
        .unwrap();
    h.market
        .submit_task(&second_engineer(), task.id, work("b"))
        .await
        .unwrap();

    let result = h
        .market
        .approve_task(&company(), task.id, ReviewInput::default())
        .await
        .unwrap();
    assert_eq!(result.task.status, TaskStatus::Completed);
    assert_eq!(result.approved.len(), 2);
    assert!(result.skipped.is_empty());

    let again = h
        .market
        .approve_task(&company(), task.id, ReviewInput::default())
        .await
        .unwrap();
    assert!(again.approved.is_empty());
    assert_eq!(again.task.status, TaskStatus::Completed);

    for engineer_id in [ENGINEER, SECOND_ENGINEER] {
        let profile = h.store.profile(engineer_id).await.unwrap();
        assert_eq!(profile.xp_points, 100);
        assert_eq!(profile.honey_drops, 800);
    }
}

#[tokio::test]
async fn approve_task_leaves_drafts_alone() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    h.market.claim_task(&engineer(), task.id).await.unwrap();

    let result = h
        .market
        .approve_task(&mentor(), task.id, ReviewInput::default())
        .await
        .unwrap();
    assert!(result.approved.is_empty());
    assert_eq!(result.task.status, TaskStatus::Claimed);
}

#[tokio::test]
async fn approve_task_skips_submission_without_engineer() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(100)).await;
    let orphan = h
        .market
        .submit_task(&engineer(), task.id, work("a"))
        .await
        .unwrap()
        .submission;
    h.market
        .submit_task(&second_engineer(), task.id, work("b"))
        .await
        .unwrap();

    // Simulate the engineer's user record being removed.
    let mut tx = h.store.begin().await.unwrap();
    let mut detached = orphan.clone();
    detached.engineer_id = None;
    tx.save_submission(&detached).await.unwrap();
    tx.commit().await.unwrap();

    let result = h
        .market
        .approve_task(&mentor(), task.id, ReviewInput::default())
        .await
        .unwrap();
    assert_eq!(result.skipped, vec![orphan.id]);
    assert_eq!(result.approved.len(), 1);
    assert_eq!(result.task.status, TaskStatus::Completed);

    assert_matches!(
        h.market
            .approve_submission(&mentor(), orphan.id, ReviewInput::default())
            .await,
        Err(CoreError::EngineerMissing { .. })
    );
}

#[tokio::test]
async fn completed_task_cannot_be_deleted() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    h.market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();
    h.market
        .approve_task(&company(), task.id, ReviewInput::default())
        .await
        .unwrap();

    assert_matches!(
        h.market.delete_task(&company(), task.id).await,
        Err(CoreError::InvalidState { .. })
    );
    assert_matches!(
        h.market.submit_task(&engineer(), task.id, work("more")).await,
        Err(CoreError::InvalidState { .. })
    );
}

#[tokio::test]
async fn pending_queue_is_scoped_by_reviewer() {
    let h = harness().await;
    let own = posted(&h, 100, None).await;
    let foreign = h
        .market
        .create_task(&other_company(), new_task(100, None))
        .await
        .unwrap();
    h.market
        .submit_task(&engineer(), own.id, work("a"))
        .await
        .unwrap();
    h.market
        .submit_task(&engineer(), foreign.id, work("b"))
        .await
        .unwrap();

    let company_queue = h.market.list_pending_submissions(&company()).await.unwrap();
    assert_eq!(company_queue.len(), 1);
    assert_eq!(company_queue[0].task_id, own.id);

    let mentor_queue = h.market.list_pending_submissions(&mentor()).await.unwrap();
    assert_eq!(mentor_queue.len(), 2);

    assert_matches!(
        h.market.list_pending_submissions(&engineer()).await,
        Err(CoreError::NotAuthorized(_))
    );
}

#[tokio::test]
async fn task_submissions_visibility() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    h.market.claim_task(&engineer(), task.id).await.unwrap();
    h.market.claim_task(&second_engineer(), task.id).await.unwrap();

    let all = h
        .market
        .get_submissions_for_task(&company(), task.id)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let own = h
        .market
        .get_submissions_for_task(&engineer(), task.id)
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].engineer_id, Some(ENGINEER));

    assert_matches!(
        h.market.get_submissions_for_task(&other_company(), task.id).await,
        Err(CoreError::NotAuthorized(_))
    );
}

// ---------------------------------------------------------------------------
// Profiles, leaderboard, companies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn profile_is_created_on_first_read() {
    let h = harness().await;
    let profile = h.market.get_profile(&engineer()).await.unwrap();
    assert_eq!(profile.xp_points, 0);
    assert_eq!(profile.level, 1);
    assert!(h.store.profile(ENGINEER).await.is_some());
}

#[tokio::test]
async fn leaderboard_ranks_by_xp_with_levels() {
    let h = harness().await;
    for (engineer, base_xp) in [(engineer(), 600), (second_engineer(), 100)] {
        let task = posted(&h, 0, Some(base_xp)).await;
        let progress = h
            .market
            .submit_task(&engineer, task.id, work("done"))
            .await
            .unwrap();
        h.market
            .approve_submission(&company(), progress.submission.id, ReviewInput::default())
            .await
            .unwrap();
    }

    let board = h.market.leaderboard(None).await.unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0].user_id, ENGINEER);
    assert_eq!(board[0].level, 2);
    assert_eq!(board[1].user_id, SECOND_ENGINEER);
    assert_eq!(board[1].level, 1);

    let top = h.market.leaderboard(Some(1)).await.unwrap();
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn upsert_company_updates_in_place() {
    let h = harness().await;
    let before = h.market.get_my_company(&company()).await.unwrap();
    let after = h
        .market
        .upsert_my_company(
            &company(),
            UpsertCompany {
                name: "Acme Renamed".into(),
                description: Some("We build things".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(after.id, before.id);
    assert_eq!(after.name, "Acme Renamed");
    assert_matches!(
        h.market.get_my_company(&engineer()).await,
        Err(CoreError::NotAuthorized(_))
    );
}

#[tokio::test]
async fn missing_submission_is_not_found_for_review() {
    let h = harness().await;
    assert_matches!(
        h.market
            .approve_submission(&mentor(), 9_999, ReviewInput::default())
            .await,
        Err(CoreError::NotFound { entity: "Submission", id: 9_999 })
    );
    assert_matches!(
        h.market
            .reject_submission(&mentor(), 9_999, RejectInput::default())
            .await,
        Err(CoreError::NotFound { entity: "Submission", id: 9_999 })
    );
}

#[tokio::test]
async fn mentor_task_approval_credits_mentor_once_per_submission() {
    let h = harness().await;
    let task = posted(&h, 1_000, Some(100)).await;
    for who in [engineer(), second_engineer()] {
        h.market.submit_task(&who, task.id, work("done")).await.unwrap();
    }

    let approval = h
        .market
        .approve_task(&mentor(), task.id, ReviewInput::default())
        .await
        .unwrap();
    assert_eq!(approval.approved.len(), 2);

    let mentor_profile = h.store.profile(MENTOR).await.unwrap();
    assert_eq!(mentor_profile.honey_drops, 300);
    assert_eq!(mentor_profile.reputation_score, 20.0);
    for id in [ENGINEER, SECOND_ENGINEER] {
        let profile = h.store.profile(id).await.unwrap();
        assert_eq!(profile.xp_points, 100);
        assert_eq!(profile.honey_drops, 650);
    }
}

// ---------------------------------------------------------------------------
// Company administration
// ---------------------------------------------------------------------------

fn company_named(name: &str) -> UpsertCompany {
    UpsertCompany {
        name: name.into(),
        description: None,
    }
}

#[tokio::test]
async fn any_user_can_list_companies() {
    let h = harness().await;
    let companies = h.market.list_companies(&engineer()).await.unwrap();
    let owners: Vec<DbId> = companies.iter().map(|c| c.owner_id).collect();
    assert_eq!(owners, vec![OWNER, OTHER_OWNER]);
}

#[tokio::test]
async fn admin_creates_updates_and_deletes_companies() {
    let h = harness().await;
    let created = h
        .market
        .create_company_for(
            &admin(),
            CreateCompanyFor {
                owner_id: NEW_OWNER,
                company: company_named("Hive"),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.owner_id, NEW_OWNER);

    let updated = h
        .market
        .update_company(&admin(), created.id, company_named("Hive Two"))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Hive Two");

    h.market.delete_company(&admin(), created.id).await.unwrap();
    assert_eq!(h.market.list_companies(&admin()).await.unwrap().len(), 2);
    assert_matches!(
        h.market.delete_company(&admin(), created.id).await,
        Err(CoreError::NotFound { entity: "Company", .. })
    );
    assert_matches!(
        h.market
            .update_company(&admin(), created.id, company_named("Gone"))
            .await,
        Err(CoreError::NotFound { entity: "Company", .. })
    );
}

#[tokio::test]
async fn admin_cannot_give_an_owner_a_second_company() {
    let h = harness().await;
    assert_matches!(
        h.market
            .create_company_for(
                &admin(),
                CreateCompanyFor {
                    owner_id: OWNER,
                    company: company_named("Duplicate"),
                },
            )
            .await,
        Err(CoreError::Conflict(_))
    );
}

#[tokio::test]
async fn company_administration_requires_admin() {
    let h = harness().await;
    let own = h.market.get_my_company(&company()).await.unwrap();
    assert_matches!(
        h.market
            .update_company(&company(), own.id, company_named("Mine"))
            .await,
        Err(CoreError::NotAuthorized(_))
    );
    assert_matches!(
        h.market.delete_company(&mentor(), own.id).await,
        Err(CoreError::NotAuthorized(_))
    );
    assert_matches!(
        h.market
            .create_company_for(
                &engineer(),
                CreateCompanyFor {
                    owner_id: ENGINEER,
                    company: company_named("Side gig"),
                },
            )
            .await,
        Err(CoreError::NotAuthorized(_))
    );
}

#[tokio::test]
async fn deleting_a_company_removes_its_open_tasks() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    h.market
        .submit_task(&engineer(), task.id, work("draft"))
        .await
        .unwrap();
    let own = h.market.get_my_company(&company()).await.unwrap();

    h.market.delete_company(&admin(), own.id).await.unwrap();

    assert!(h.store.submissions_for_task(task.id).await.is_empty());
    assert_matches!(
        h.market.claim_task(&engineer(), task.id).await,
        Err(CoreError::NotFound { entity: "Task", .. })
    );
}

#[tokio::test]
async fn company_with_completed_work_cannot_be_deleted() {
    let h = harness().await;
    let task = posted(&h, 100, None).await;
    h.market
        .submit_task(&engineer(), task.id, work("done"))
        .await
        .unwrap();
    h.market
        .approve_task(&company(), task.id, ReviewInput::default())
        .await
        .unwrap();
    let own = h.market.get_my_company(&company()).await.unwrap();

    assert_matches!(
        h.market.delete_company(&admin(), own.id).await,
        Err(CoreError::InvalidState { .. })
    );
    assert_eq!(h.store.submissions_for_task(task.id).await.len(), 1);
}

#[test]
fn inconsistent_reward_policy_is_refused() {
    let policy = MarketplacePolicy {
        reward: RewardPolicy {
            platform_fee_bps: 9_000,
            mentor_fee_bps: 2_000,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = Marketplace::new(Arc::new(MemoryStore::new()), policy);
    assert!(matches!(result, Err(CoreError::Validation(_))));
}
