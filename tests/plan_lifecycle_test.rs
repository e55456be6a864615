// ABOUTME: Integration tests for the plan lifecycle through the relationship engine
// ABOUTME: Covers creation, activation toggles, deletion, authorization, and concurrency
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use coachlink::errors::ErrorCode;
use coachlink::models::{
    CreatePlanRequest, ExerciseEntry, UpdatePlanRequest, User,
};
use common::{create_coach, create_trainee, identity_of, test_database, test_engine};
use uuid::Uuid;

fn plan_request(coach: &User, trainee: &User, name: &str) -> CreatePlanRequest {
    CreatePlanRequest {
        coach_email: coach.email.clone(),
        trainee_email: trainee.email.clone(),
        name: name.to_owned(),
        description: Some("Strength block".to_owned()),
        exercises: vec![ExerciseEntry {
            exercise: "Back squat".to_owned(),
            load_kg: Some(80.0),
            reps: Some("5x5".to_owned()),
            rest: Some("180s".to_owned()),
            note: None,
        }],
        note: None,
    }
}

#[tokio::test]
async fn plan_creation_links_all_three_records() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;

    let plan = engine
        .create_plan(&identity_of(&coach), plan_request(&coach, &trainee, "Block 1"))
        .await
        .expect("Failed to create plan");

    assert!(plan.active);
    assert_eq!(plan.coach_id, coach.id);
    assert_eq!(plan.trainee_id, trainee.id);

    // The plan sits in the trainee's current bucket, nowhere else
    let trainee = db.get_user(trainee.id).await.unwrap().unwrap();
    let trainee_profile = trainee.trainee_profile().unwrap();
    assert_eq!(trainee_profile.current_plans, vec![plan.id]);
    assert!(trainee_profile.past_plans.is_empty());
    assert_eq!(trainee_profile.coach_id, Some(coach.id));

    // The coach's trainee set contains the trainee
    let coach = db.get_user(coach.id).await.unwrap().unwrap();
    assert_eq!(coach.coach_profile().unwrap().trainee_ids, vec![trainee.id]);
}

#[tokio::test]
async fn repeated_plans_do_not_duplicate_trainee_membership() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;
    let auth = identity_of(&coach);

    engine
        .create_plan(&auth, plan_request(&coach, &trainee, "Block 1"))
        .await
        .unwrap();
    engine
        .create_plan(&auth, plan_request(&coach, &trainee, "Block 2"))
        .await
        .unwrap();

    let coach = db.get_user(coach.id).await.unwrap().unwrap();
    assert_eq!(coach.coach_profile().unwrap().trainee_ids, vec![trainee.id]);

    let trainee = db.get_user(trainee.id).await.unwrap().unwrap();
    assert_eq!(trainee.trainee_profile().unwrap().current_plans.len(), 2);
}

#[tokio::test]
async fn plan_creation_requires_a_coach_identity() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;

    let err = engine
        .create_plan(
            &identity_of(&trainee),
            plan_request(&coach, &trainee, "Block 1"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    // Failed creation leaves no partial state behind
    let trainee = db.get_user(trainee.id).await.unwrap().unwrap();
    assert!(trainee.trainee_profile().unwrap().current_plans.is_empty());
}

#[tokio::test]
async fn plan_creation_fails_on_unknown_participants() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;
    let auth = identity_of(&coach);

    let mut unknown_trainee = plan_request(&coach, &trainee, "Block 1");
    unknown_trainee.trainee_email = "ghost@x.example".to_owned();
    let err = engine.create_plan(&auth, unknown_trainee).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let mut unknown_coach = plan_request(&coach, &trainee, "Block 1");
    unknown_coach.coach_email = "ghost@x.example".to_owned();
    let err = engine.create_plan(&auth, unknown_coach).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    // Aborted creations must not leave coach membership behind
    let coach = db.get_user(coach.id).await.unwrap().unwrap();
    assert!(coach.coach_profile().unwrap().trainee_ids.is_empty());
}

#[tokio::test]
async fn activation_toggle_moves_plan_between_buckets() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;
    let auth = identity_of(&coach);

    let plan = engine
        .create_plan(&auth, plan_request(&coach, &trainee, "Block 1"))
        .await
        .unwrap();

    // Deactivate: current -> past
    let updated = engine
        .update_plan(
            &auth,
            plan.id,
            UpdatePlanRequest {
                active: Some(false),
                ..UpdatePlanRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.active);

    let reloaded = db.get_user(trainee.id).await.unwrap().unwrap();
    let profile = reloaded.trainee_profile().unwrap();
    assert!(profile.current_plans.is_empty());
    assert_eq!(profile.past_plans, vec![plan.id]);

    // Reactivate: past -> current
    engine
        .update_plan(
            &auth,
            plan.id,
            UpdatePlanRequest {
                active: Some(true),
                ..UpdatePlanRequest::default()
            },
        )
        .await
        .unwrap();

    let reloaded = db.get_user(trainee.id).await.unwrap().unwrap();
    let profile = reloaded.trainee_profile().unwrap();
    assert_eq!(profile.current_plans, vec![plan.id]);
    assert!(profile.past_plans.is_empty());
}

#[tokio::test]
async fn unchanged_active_value_leaves_buckets_untouched() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;
    let auth = identity_of(&coach);

    let plan = engine
        .create_plan(&auth, plan_request(&coach, &trainee, "Block 1"))
        .await
        .unwrap();

    // active=true on an already-active plan: field update only, no move
    let updated = engine
        .update_plan(
            &auth,
            plan.id,
            UpdatePlanRequest {
                name: Some("Block 1 revised".to_owned()),
                active: Some(true),
                ..UpdatePlanRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Block 1 revised");

    let reloaded = db.get_user(trainee.id).await.unwrap().unwrap();
    let profile = reloaded.trainee_profile().unwrap();
    assert_eq!(profile.current_plans, vec![plan.id]);
    assert!(profile.past_plans.is_empty());
}

#[tokio::test]
async fn toggle_with_corrupted_bucket_fails_with_conflict() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;
    let auth = identity_of(&coach);

    let plan = engine
        .create_plan(&auth, plan_request(&coach, &trainee, "Block 1"))
        .await
        .unwrap();

    // Corrupt the stored buckets behind the engine's back
    sqlx::query("UPDATE users SET current_plans = '[]' WHERE id = $1")
        .bind(trainee.id.to_string())
        .execute(db.pool())
        .await
        .unwrap();

    let err = engine
        .update_plan(
            &auth,
            plan.id,
            UpdatePlanRequest {
                active: Some(false),
                ..UpdatePlanRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    // The aborted toggle must not have persisted the field update either
    let stored = db.get_plan(plan.id).await.unwrap().unwrap();
    assert!(stored.active);
}

#[tokio::test]
async fn plan_deletion_scrubs_buckets_and_requires_coach() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;
    let auth = identity_of(&coach);

    let plan = engine
        .create_plan(&auth, plan_request(&coach, &trainee, "Block 1"))
        .await
        .unwrap();

    let err = engine
        .delete_plan(&identity_of(&trainee), plan.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    engine.delete_plan(&auth, plan.id).await.unwrap();

    assert!(db.get_plan(plan.id).await.unwrap().is_none());
    let reloaded = db.get_user(trainee.id).await.unwrap().unwrap();
    let profile = reloaded.trainee_profile().unwrap();
    assert!(profile.current_plans.is_empty());
    assert!(profile.past_plans.is_empty());

    let err = engine.delete_plan(&auth, plan.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn full_lifecycle_scenario() {
    // Create coach and trainee, assign a plan, deactivate it, delete it
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach C").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee T").await;
    let auth = identity_of(&coach);

    let plan = engine
        .create_plan(&auth, plan_request(&coach, &trainee, "P"))
        .await
        .unwrap();

    let state = db.get_user(trainee.id).await.unwrap().unwrap();
    assert_eq!(state.trainee_profile().unwrap().current_plans, vec![plan.id]);
    let state = db.get_user(coach.id).await.unwrap().unwrap();
    assert_eq!(state.coach_profile().unwrap().trainee_ids, vec![trainee.id]);

    engine
        .update_plan(
            &auth,
            plan.id,
            UpdatePlanRequest {
                active: Some(false),
                ..UpdatePlanRequest::default()
            },
        )
        .await
        .unwrap();
    let state = db.get_user(trainee.id).await.unwrap().unwrap();
    assert!(state.trainee_profile().unwrap().current_plans.is_empty());
    assert_eq!(state.trainee_profile().unwrap().past_plans, vec![plan.id]);

    engine.delete_plan(&auth, plan.id).await.unwrap();
    let state = db.get_user(trainee.id).await.unwrap().unwrap();
    assert!(state.trainee_profile().unwrap().past_plans.is_empty());
    assert!(db.get_plan(plan.id).await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_plan_creations_both_link() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;
    let auth = identity_of(&coach);

    let first = engine.create_plan(&auth, plan_request(&coach, &trainee, "A"));
    let second = engine.create_plan(&auth, plan_request(&coach, &trainee, "B"));
    let (first, second) = tokio::join!(first, second);
    let first = first.expect("First creation should succeed");
    let second = second.expect("Second creation should succeed");

    // No lost update: both plans visible in the trainee's current bucket
    let reloaded = db.get_user(trainee.id).await.unwrap().unwrap();
    let current = &reloaded.trainee_profile().unwrap().current_plans;
    assert_eq!(current.len(), 2);
    assert!(current.contains(&first.id));
    assert!(current.contains(&second.id));

    let coach = db.get_user(coach.id).await.unwrap().unwrap();
    assert_eq!(coach.coach_profile().unwrap().trainee_ids, vec![trainee.id]);
}

#[tokio::test]
async fn trainee_plans_read_resolves_buckets_with_authorization() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;
    let trainee = create_trainee(&db, "t@x.example", "Trainee").await;
    let other = create_trainee(&db, "other@x.example", "Other").await;
    let auth = identity_of(&coach);

    let plan = engine
        .create_plan(&auth, plan_request(&coach, &trainee, "Block 1"))
        .await
        .unwrap();

    // Self and coach may read
    let own_view = engine
        .trainee_plans(&identity_of(&trainee), trainee.id)
        .await
        .unwrap();
    assert_eq!(own_view.current.len(), 1);
    assert_eq!(own_view.current[0].id, plan.id);
    assert!(own_view.past.is_empty());

    let coach_view = engine.trainee_plans(&auth, trainee.id).await.unwrap();
    assert_eq!(coach_view.current.len(), 1);

    // Another trainee may not
    let err = engine
        .trainee_plans(&identity_of(&other), trainee.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = engine.trainee_plans(&auth, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn updating_missing_plan_is_not_found() {
    let db = test_database().await;
    let engine = test_engine(&db);
    let coach = create_coach(&db, "c@x.example", "Coach").await;

    let err = engine
        .update_plan(
            &identity_of(&coach),
            Uuid::new_v4(),
            UpdatePlanRequest::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}
