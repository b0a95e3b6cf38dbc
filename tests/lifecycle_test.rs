//! End-to-end flows through the identity provider and the lifecycle
//! manager over in-memory storage.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use common::{approval_form, registration_form, Harness};
use trading_onboard::domain::{TradingBound, UserRole};
use trading_onboard::errors::AppError;
use trading_onboard::policy::{AuthContext, ADMIN_REQUIRED};
use trading_onboard::services::{
    AuthService, InvalidationBus, LifecycleManager, LoginOutcome, UserLifecycle, ViewInvalidation,
};

fn admin() -> AuthContext {
    AuthContext::user(Uuid::new_v4(), UserRole::Admin)
}

#[tokio::test]
async fn registration_verification_and_login() {
    let h = Harness::new();

    let user = h.auth.register(registration_form("alice")).await.unwrap();
    assert!(!user.approved);
    assert_eq!(user.role, UserRole::User);
    assert_eq!(h.outbox.count(), 1);

    // Unverified: a fresh link instead of a session
    let login = json!({ "username": "alice", "password": "secret1" });
    let outcome = h.auth.login(login.clone()).await.unwrap();
    assert!(matches!(outcome, LoginOutcome::VerificationSent));
    assert_eq!(h.outbox.count(), 2);
    assert_eq!(h.store.tokens.count(), 1);

    let token = h.outbox.last_token_for("alice@example.com").unwrap();
    let verified = h.auth.verify_email(&token).await.unwrap();
    assert!(verified.is_verified());
    assert_eq!(h.store.tokens.count(), 0);

    match h.auth.login(login).await.unwrap() {
        LoginOutcome::SignedIn(session) => {
            let claims = h.auth.verify_token(&session.access_token).unwrap();
            assert_eq!(claims.sub, user.id);
            assert_eq!(claims.role(), UserRole::User);
        }
        other => panic!("expected a session, got {other:?}"),
    }
}

#[tokio::test]
async fn verification_token_is_single_use() {
    let h = Harness::new();
    h.auth.register(registration_form("alice")).await.unwrap();
    let token = h.outbox.last_token_for("alice@example.com").unwrap();

    h.auth.verify_email(&token).await.unwrap();
    let err = h.auth.verify_email(&token).await.unwrap_err();

    assert_eq!(err.to_string(), "Token does not exist!");
}

#[tokio::test]
async fn wrong_password_after_verification() {
    let h = Harness::new();
    h.auth.register(registration_form("alice")).await.unwrap();
    let token = h.outbox.last_token_for("alice@example.com").unwrap();
    h.auth.verify_email(&token).await.unwrap();

    let err = h
        .auth
        .login(json!({ "username": "alice", "password": "wrong-one" }))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let h = Harness::new();
    h.auth.register(registration_form("alice")).await.unwrap();

    let mut form = registration_form("alice");
    form["email"] = json!("other@example.com");
    let err = h.auth.register(form).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(h.store.users.count(), 1);
}

#[tokio::test]
async fn non_admin_approval_changes_nothing() {
    let h = Harness::new();
    let user = h.auth.register(registration_form("alice")).await.unwrap();
    let caller = AuthContext::user(user.id, UserRole::User);

    let err = h
        .lifecycle
        .approve(&caller, user.id, approval_form())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), ADMIN_REQUIRED);
    assert!(!h.store.users.get(user.id).unwrap().approved);
    assert!(h.sink.take().is_empty());
}

#[tokio::test]
async fn guest_cannot_list_users() {
    let h = Harness::new();

    let err = h.lifecycle.list_pending(&AuthContext::guest()).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn approval_stores_unlimited_as_absent_bound() {
    let h = Harness::new();
    let user = h.auth.register(registration_form("alice")).await.unwrap();

    let approved = h.lifecycle.approve(&admin(), user.id, approval_form()).await.unwrap();

    assert!(approved.approved);
    assert_eq!(approved.whitelisted, Some(true));
    assert_eq!(approved.trading.allowed_trading_amount_to, TradingBound::Unlimited);
    assert_eq!(approved.trading.allowed_trading_amount_to.to_storage(), None);
    assert_eq!(
        h.sink.take(),
        vec![ViewInvalidation::PendingList, ViewInvalidation::ApprovedList]
    );

    let listed = h.lifecycle.list_approved(&admin()).await.unwrap();
    let body = serde_json::to_value(&listed).unwrap();
    assert_eq!(body[0]["allowedTradingAmountTo"], json!("Unlimited"));
    assert!(h.lifecycle.list_pending(&admin()).await.unwrap().is_empty());
}

#[tokio::test]
async fn lists_reflect_the_latest_edit() {
    let h = Harness::new();
    let user = h.auth.register(registration_form("alice")).await.unwrap();
    h.lifecycle.approve(&admin(), user.id, approval_form()).await.unwrap();
    h.sink.take();

    let edit = json!({
        "firstname": "Alicia",
        "lastname": "Doe",
        "phone": "+447911123456",
        "country": "GB",
        "metamask": "0xdef",
        "autotrade": "alicia-auto",
        "email": "alicia@example.com",
        "approved": true,
        "whitelisted": false,
        "groupId": "tier-2",
        "allowedTradingAmountFrom": 10,
        "allowedTradingAmountTo": 5000,
        "adminFee": 1,
        "userProfit": 60,
        "introducerFee": 0
    });
    h.lifecycle.edit_approved(&admin(), user.id, edit).await.unwrap();

    let listed = h.lifecycle.list_approved(&admin()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].firstname, "Alicia");
    assert_eq!(listed[0].email, "alicia@example.com");
    assert_eq!(listed[0].group_id, "tier-2");
    assert_eq!(listed[0].allowed_trading_amount_to, TradingBound::Amount(5000.0));
    assert_eq!(h.sink.take(), vec![ViewInvalidation::ApprovedList]);
}

#[tokio::test]
async fn unapproving_edit_moves_user_back_to_pending() {
    let h = Harness::new();
    let user = h.auth.register(registration_form("alice")).await.unwrap();
    h.lifecycle.approve(&admin(), user.id, approval_form()).await.unwrap();
    h.sink.take();

    let mut edit = approval_form();
    edit["firstname"] = json!("Alice");
    edit["lastname"] = json!("Doe");
    edit["phone"] = json!("+447911123456");
    edit["country"] = json!("GB");
    edit["metamask"] = json!("0xabc");
    edit["autotrade"] = json!("alice-auto");
    edit["email"] = json!("alice@example.com");
    edit["approved"] = json!(false);
    h.lifecycle.edit_approved(&admin(), user.id, edit).await.unwrap();

    assert_eq!(h.lifecycle.list_pending(&admin()).await.unwrap().len(), 1);
    assert_eq!(
        h.sink.take(),
        vec![ViewInvalidation::ApprovedList, ViewInvalidation::PendingList]
    );
}

#[tokio::test]
async fn edit_cannot_take_another_users_email() {
    let h = Harness::new();
    let alice = h.auth.register(registration_form("alice")).await.unwrap();
    h.auth.register(registration_form("bob")).await.unwrap();

    let mut edit = approval_form();
    edit["firstname"] = json!("Alice");
    edit["lastname"] = json!("Doe");
    edit["phone"] = json!("+447911123456");
    edit["country"] = json!("GB");
    edit["metamask"] = json!("0xabc");
    edit["autotrade"] = json!("alice-auto");
    edit["email"] = json!("bob@example.com");
    edit["approved"] = json!(true);

    let err = h.lifecycle.edit_approved(&admin(), alice.id, edit).await.unwrap_err();
    assert_eq!(err.to_string(), "Email already in use!");
    assert_eq!(h.store.users.get(alice.id).unwrap().email, "alice@example.com");
}

#[tokio::test]
async fn rejecting_removes_the_user() {
    let h = Harness::new();
    let user = h.auth.register(registration_form("alice")).await.unwrap();

    h.lifecycle.delete_user(&admin(), user.id).await.unwrap();

    assert!(h.store.users.get(user.id).is_none());
    assert!(h.lifecycle.list_pending(&admin()).await.unwrap().is_empty());
    assert_eq!(
        h.sink.take(),
        vec![ViewInvalidation::ApprovedList, ViewInvalidation::PendingList]
    );
}

#[tokio::test]
async fn deleting_a_missing_user_fails() {
    let h = Harness::new();

    let err = h.lifecycle.delete_user(&admin(), Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, AppError::Persistence(_)));
    assert!(h.sink.take().is_empty());
}

#[tokio::test]
async fn pending_list_is_newest_first() {
    let h = Harness::new();
    let now = Utc::now();

    for (name, age_minutes) in [("carol", 5), ("alice", 30), ("bob", 1)] {
        let mut user = h.auth.register(registration_form(name)).await.unwrap();
        user.created_at = now - Duration::minutes(age_minutes);
        h.store.users.insert(user);
    }

    let listed = h.lifecycle.list_pending(&admin()).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|u| u.username.as_str()).collect();

    assert_eq!(names, ["bob", "carol", "alice"]);
}

#[tokio::test]
async fn views_are_stale_before_the_mutation_returns() {
    let h = Harness::new();
    let user = h.auth.register(registration_form("alice")).await.unwrap();

    let bus = Arc::new(InvalidationBus::new(8));
    let generations = bus.generations();
    let lifecycle = LifecycleManager::new(h.store.clone(), bus);

    let key = |view: ViewInvalidation| view.cache_key(generations.current(view));
    let pending_before = key(ViewInvalidation::PendingList);
    let approved_before = key(ViewInvalidation::ApprovedList);

    lifecycle.approve(&admin(), user.id, approval_form()).await.unwrap();

    // Nothing consumes the bus here: the keys moved synchronously.
    assert_ne!(key(ViewInvalidation::PendingList), pending_before);
    assert_ne!(key(ViewInvalidation::ApprovedList), approved_before);
}
