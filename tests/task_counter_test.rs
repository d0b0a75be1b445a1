//! Daily task claims: quota, rate limit and reward crediting.

mod common;

use chrono::{ DateTime, Duration, TimeZone, Utc };

use common::{ setup, TestApp };
use taskearn::db::TaskLogRepository;
use taskearn::enums::{ AdjustmentAction, WalletType };
use taskearn::services::balance_engine::AdjustmentRequest;
use taskearn::AppError;

fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
}

async fn member(app: &TestApp, id: &str) {
    app.register(id, None).await;
    app.activate(id, 500_000).await;
}

/// Claims `count` tasks spaced past the rate limit, returning the time of
/// the last claim.
async fn claim_many(app: &TestApp, id: &str, start: DateTime<Utc>, count: usize) -> DateTime<Utc> {
    let mut at = start;
    for i in 0..count {
        at = start + Duration::seconds(11 * (i as i64));
        app.tasks.claim(id, at).await.unwrap();
    }
    at
}

#[tokio::test]
async fn first_claim_credits_locked_reward() {
    let app = setup().await;
    member(&app, "alice").await;
    let unlock_before = app.wallet("alice").await.unlock_date;

    let receipt = app.tasks.claim("alice", morning()).await.unwrap();

    assert_eq!(receipt.counter, 1);
    assert_eq!(receipt.max_tasks, 20);
    assert_eq!(receipt.reward, 1_250);
    assert_eq!(receipt.transaction.tx_type, "REWARD_TASK");
    assert_eq!(receipt.transaction.status, "SUCCESS");
    assert_eq!(receipt.transaction.amount, 1_250);

    let wallet = app.wallet("alice").await;
    assert_eq!(wallet.balance_reward_task, 1_250);
    assert_eq!(wallet.balance_available, 0);
    assert_eq!(wallet.unlock_date, unlock_before);

    app.assert_balanced("alice").await;
}

#[tokio::test]
async fn reward_follows_tier() {
    let app = setup().await;
    app.register("bob", None).await;
    app.activate("bob", 2_000_000).await;

    let receipt = app.tasks.claim("bob", morning()).await.unwrap();

    assert_eq!(receipt.reward, 5_000);
    assert_eq!(app.wallet("bob").await.balance_reward_task, 5_000);
}

#[tokio::test]
async fn claims_inside_window_are_rate_limited() {
    let app = setup().await;
    member(&app, "alice").await;
    let start = morning();

    app.tasks.claim("alice", start).await.unwrap();

    let early = app.tasks.claim("alice", start + Duration::seconds(5)).await;
    assert!(matches!(early, Err(AppError::RateLimited { retry_after_secs: 5 })));

    // Refused claims leave the counter and balance untouched
    let status = app.tasks.get_status("alice", start + Duration::seconds(5)).await.unwrap();
    assert_eq!(status.counter, 1);
    assert_eq!(status.wait_seconds, 5);
    assert!(!status.can_claim);
    assert_eq!(app.wallet("alice").await.balance_reward_task, 1_250);

    let receipt = app.tasks.claim("alice", start + Duration::seconds(11)).await.unwrap();
    assert_eq!(receipt.counter, 2);
    assert_eq!(app.wallet("alice").await.balance_reward_task, 2_500);
}

#[tokio::test]
async fn partial_seconds_round_up() {
    let app = setup().await;
    member(&app, "alice").await;
    let start = morning();

    app.tasks.claim("alice", start).await.unwrap();

    let result = app.tasks.claim("alice", start + Duration::milliseconds(9_500)).await;
    assert!(matches!(result, Err(AppError::RateLimited { retry_after_secs: 1 })));

    app.tasks.claim("alice", start + Duration::seconds(10)).await.unwrap();
}

#[tokio::test]
async fn twentieth_claim_succeeds_then_limit_applies() {
    let app = setup().await;
    member(&app, "alice").await;

    let last = claim_many(&app, "alice", morning(), 19).await;

    let receipt = app.tasks.claim("alice", last + Duration::seconds(11)).await.unwrap();
    assert_eq!(receipt.counter, 20);

    // Limit wins over the rate limit that would also apply here
    let over = app.tasks.claim("alice", last + Duration::seconds(12)).await;
    assert!(matches!(over, Err(AppError::DailyLimitReached { limit: 20 })));

    let later = app.tasks.claim("alice", last + Duration::hours(2)).await;
    assert!(matches!(later, Err(AppError::DailyLimitReached { limit: 20 })));

    let wallet = app.wallet("alice").await;
    assert_eq!(wallet.balance_reward_task, 20 * 1_250);
    app.assert_balanced("alice").await;
}

#[tokio::test]
async fn new_day_starts_a_fresh_counter() {
    let app = setup().await;
    member(&app, "alice").await;

    let last = claim_many(&app, "alice", morning(), 20).await;
    assert!(app.tasks.claim("alice", last + Duration::seconds(11)).await.is_err());

    let next_day = morning() + Duration::days(1);
    let receipt = app.tasks.claim("alice", next_day).await.unwrap();
    assert_eq!(receipt.counter, 1);

    let logs = TaskLogRepository::new(&app.db);
    let yesterday = logs.find_for_day("alice", morning().date_naive()).await.unwrap().unwrap();
    assert_eq!(yesterday.counter, 20);
}

#[tokio::test]
async fn rate_limit_window_resets_with_the_day() {
    let app = setup().await;
    member(&app, "alice").await;
    let before_midnight = Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 59).unwrap();

    app.tasks.claim("alice", before_midnight).await.unwrap();

    // Each day keeps its own last claim, so two seconds later a new day may claim
    let receipt = app.tasks.claim("alice", before_midnight + Duration::seconds(2)).await.unwrap();
    assert_eq!(receipt.counter, 1);

    let early = app.tasks.claim("alice", before_midnight + Duration::seconds(3)).await;
    assert!(matches!(early, Err(AppError::RateLimited { retry_after_secs: 9 })));
}

#[tokio::test]
async fn free_user_cannot_claim() {
    let app = setup().await;
    app.register("alice", None).await;

    let result = app.tasks.claim("alice", morning()).await;
    assert!(matches!(result, Err(AppError::AccountNotActive)));

    let status = app.tasks.get_status("alice", morning()).await.unwrap();
    assert!(!status.can_claim);
    assert_eq!(status.reward_per_task, 0);
}

#[tokio::test]
async fn banned_member_cannot_claim() {
    let app = setup().await;
    member(&app, "alice").await;
    app.accounts.ban("alice", morning()).await.unwrap();

    let result = app.tasks.claim("alice", morning()).await;
    assert!(matches!(result, Err(AppError::AccountNotActive)));

    app.accounts.unban("alice", morning()).await.unwrap();
    app.tasks.claim("alice", morning()).await.unwrap();
}

#[tokio::test]
async fn deposit_below_tier_blocks_claims() {
    let app = setup().await;
    member(&app, "alice").await;

    app.engine
        .manual_adjustment(
            AdjustmentRequest {
                user_id: "alice".into(),
                wallet_type: WalletType::DepositLocked,
                action: AdjustmentAction::Cut,
                amount: 1,
                notes: None,
                trigger_bonus: false,
            },
            morning()
        ).await
        .unwrap();

    let result = app.tasks.claim("alice", morning()).await;
    assert!(matches!(result, Err(AppError::InsufficientDeposit { required: 500_000 })));
    assert_eq!(app.wallet("alice").await.balance_reward_task, 0);
}

#[tokio::test]
async fn status_creates_the_day_lazily() {
    let app = setup().await;
    member(&app, "alice").await;

    let logs = TaskLogRepository::new(&app.db);
    assert!(logs.find_for_day("alice", morning().date_naive()).await.unwrap().is_none());

    let status = app.tasks.get_status("alice", morning()).await.unwrap();
    assert_eq!(status.date, morning().date_naive());
    assert_eq!(status.counter, 0);
    assert_eq!(status.max_tasks, 20);
    assert_eq!(status.reward_per_task, 1_250);
    assert_eq!(status.wait_seconds, 0);
    assert!(status.can_claim);

    let row = logs.find_for_day("alice", morning().date_naive()).await.unwrap();
    assert_eq!(row.map(|r| r.counter), Some(0));

    // A second read must not create a duplicate row
    app.tasks.get_status("alice", morning()).await.unwrap();
}

#[tokio::test]
async fn concurrent_claims_count_once() {
    let app = setup().await;
    member(&app, "alice").await;
    let now = morning();

    let (first, second) = tokio::join!(app.tasks.claim("alice", now), app.tasks.claim("alice", now));

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let refused = if first.is_err() { first } else { second };
    assert!(matches!(refused, Err(AppError::RateLimited { .. })));

    let status = app.tasks.get_status("alice", now).await.unwrap();
    assert_eq!(status.counter, 1);
    assert_eq!(app.wallet("alice").await.balance_reward_task, 1_250);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = setup().await;

    let result = app.tasks.claim("ghost", morning()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
