//! Settlement flows of the balance engine against an in-memory ledger.

mod common;

use chrono::{ Duration, Utc };
use sea_orm::{ ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter };

use common::{ assert_time, setup };
use taskearn::db::entity::{ transaction, Transaction };
use taskearn::db::{ TransactionFilter, TransactionRepository };
use taskearn::enums::{ AdjustmentAction, TxStatus, TxType, WalletType };
use taskearn::services::balance_engine::{ AdjustmentRequest, DepositRequest, WithdrawRequest };
use taskearn::services::BalanceEngine;
use taskearn::{ AppError, SettlementRules };

fn withdraw_request(amount: i64) -> WithdrawRequest {
    WithdrawRequest {
        amount,
        bank_name: "BCA".into(),
        bank_account: "1234567890".into(),
        account_name: "Alice".into(),
    }
}

fn adjustment(
    user_id: &str,
    wallet_type: WalletType,
    action: AdjustmentAction,
    amount: i64,
    trigger_bonus: bool
) -> AdjustmentRequest {
    AdjustmentRequest {
        user_id: user_id.to_string(),
        wallet_type,
        action,
        amount,
        notes: Some("admin correction".into()),
        trigger_bonus,
    }
}

async fn transactions_of(app: &common::TestApp, user_id: &str) -> Vec<transaction::Model> {
    TransactionRepository::new(&app.db)
        .list(TransactionFilter { user_id: Some(user_id.into()), ..Default::default() }).await
        .unwrap()
}

#[tokio::test]
async fn deposit_approval_activates_tier_and_pays_sponsor() {
    let app = setup().await;
    app.register("sponsor", None).await;
    app.activate("sponsor", 2_000_000).await;
    app.register("alice", Some("sponsor")).await;

    let deposit = app.submit_deposit("alice", 500_000).await;
    assert_eq!(deposit.status, "PENDING");
    assert_eq!(app.wallet("alice").await.balance_deposit, 0);

    let now = Utc::now();
    let settlement = app.engine.approve_deposit(deposit.id, now).await.unwrap();

    let alice = app.user("alice").await;
    assert_eq!(alice.tier_level, 3);
    assert!(alice.is_active);

    let wallet = app.wallet("alice").await;
    assert_eq!(wallet.balance_deposit, 500_000);
    assert_time(wallet.unlock_date, now + Duration::days(30));
    assert_eq!(settlement.transaction.status, "SUCCESS");

    let sponsor_wallet = app.wallet("sponsor").await;
    assert_eq!(sponsor_wallet.balance_available, 50_000);

    let bonus = settlement.sponsor_bonus.expect("sponsor bonus recorded");
    assert_eq!(bonus.user_id, "sponsor");
    assert_eq!(bonus.tx_type, "BONUS_SPONSOR");
    assert_eq!(bonus.amount, 50_000);
    assert_eq!(bonus.status, "SUCCESS");

    app.assert_balanced("alice").await;
    app.assert_balanced("sponsor").await;
}

#[tokio::test]
async fn deposit_without_sponsor_pays_no_bonus() {
    let app = setup().await;
    app.register("root", None).await;

    let settlement = app.activate("root", 1_000_000).await;

    assert!(settlement.sponsor_bonus.is_none());
    assert_eq!(app.user("root").await.tier_level, 2);
    assert_eq!(transactions_of(&app, "root").await.len(), 1);
}

#[tokio::test]
async fn second_approval_fails_without_side_effects() {
    let app = setup().await;
    app.register("sponsor", None).await;
    app.activate("sponsor", 500_000).await;
    app.register("alice", Some("sponsor")).await;

    let deposit = app.submit_deposit("alice", 500_000).await;
    app.engine.approve_deposit(deposit.id, Utc::now()).await.unwrap();

    let again = app.engine.approve_deposit(deposit.id, Utc::now()).await;
    assert!(matches!(again, Err(AppError::AlreadyProcessed)));

    let reject = app.engine.reject_deposit(deposit.id, "late".into(), Utc::now()).await;
    assert!(matches!(reject, Err(AppError::AlreadyProcessed)));

    assert_eq!(app.wallet("alice").await.balance_deposit, 500_000);
    assert_eq!(app.wallet("sponsor").await.balance_available, 50_000);
    assert_eq!(transactions_of(&app, "sponsor").await.len(), 2);
}

#[tokio::test]
async fn concurrent_approvals_settle_once() {
    let app = setup().await;
    app.register("sponsor", None).await;
    app.activate("sponsor", 500_000).await;
    app.register("alice", Some("sponsor")).await;
    let deposit = app.submit_deposit("alice", 500_000).await;

    let (first, second) = tokio::join!(
        app.engine.approve_deposit(deposit.id, Utc::now()),
        app.engine.approve_deposit(deposit.id, Utc::now())
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    assert_eq!(app.wallet("alice").await.balance_deposit, 500_000);
    assert_eq!(app.wallet("sponsor").await.balance_available, 50_000);
}

#[tokio::test]
async fn failed_approval_leaves_no_partial_state() {
    let app = setup().await;
    app.register("sponsor", None).await;
    app.activate("sponsor", 500_000).await;
    app.register("alice", Some("sponsor")).await;
    let deposit = app.submit_deposit("alice", 500_000).await;

    // Fail the last write of the unit: tier and deposit credit are already applied by then
    app.db
        .execute_unprepared(
            "CREATE TRIGGER block_sponsor_bonus BEFORE INSERT ON transactions \
             WHEN NEW.tx_type = 'BONUS_SPONSOR' \
             BEGIN SELECT RAISE(ABORT, 'sponsor bonus blocked'); END"
        ).await
        .unwrap();

    let result = app.engine.approve_deposit(deposit.id, Utc::now()).await;
    assert!(matches!(result, Err(AppError::Database(_))));

    let alice = app.user("alice").await;
    assert_eq!(alice.tier_level, 0);
    assert!(!alice.is_active);

    let wallet = app.wallet("alice").await;
    assert_eq!(wallet.balance_deposit, 0);
    assert!(wallet.unlock_date.is_none());

    let stored = Transaction::find_by_id(deposit.id).one(&app.db).await.unwrap().unwrap();
    assert_eq!(stored.status, "PENDING");

    let bonuses = Transaction::find()
        .filter(transaction::Column::TxType.eq(TxType::BonusSponsor.as_str()))
        .all(&app.db).await
        .unwrap();
    assert!(bonuses.is_empty());
    assert_eq!(app.wallet("sponsor").await.balance_available, 0);

    app.db.execute_unprepared("DROP TRIGGER block_sponsor_bonus").await.unwrap();
    app.engine.approve_deposit(deposit.id, Utc::now()).await.unwrap();
    assert_eq!(app.wallet("alice").await.balance_deposit, 500_000);
    assert_eq!(app.wallet("sponsor").await.balance_available, 50_000);
}

#[tokio::test]
async fn configured_lock_period_applies_to_every_deposit_credit() {
    let app = setup().await;
    let rules = SettlementRules { lock_period_days: 7, ..SettlementRules::default() };
    let engine = BalanceEngine::new(app.db.clone(), rules);

    app.register("alice", None).await;
    app.register("bob", None).await;

    let deposit = app.submit_deposit("alice", 500_000).await;
    let now = Utc::now();
    let settlement = engine.approve_deposit(deposit.id, now).await.unwrap();
    assert_time(settlement.wallet.unlock_date, now + Duration::days(7));

    let result = engine
        .manual_adjustment(
            adjustment("bob", WalletType::DepositLocked, AdjustmentAction::Add, 100_000, false),
            now
        ).await
        .unwrap();
    assert_time(result.wallet.unlock_date, now + Duration::days(7));
}

#[tokio::test]
async fn second_pending_deposit_cannot_be_approved_once_active() {
    let app = setup().await;
    app.register("alice", None).await;

    let first = app.submit_deposit("alice", 500_000).await;
    let second = app.submit_deposit("alice", 1_000_000).await;

    app.engine.approve_deposit(first.id, Utc::now()).await.unwrap();

    let result = app.engine.approve_deposit(second.id, Utc::now()).await;
    assert!(matches!(result, Err(AppError::DuplicateActiveDeposit)));

    assert_eq!(app.wallet("alice").await.balance_deposit, 500_000);
    assert_eq!(app.user("alice").await.tier_level, 3);

    // The leftover request can still be closed out
    let rejected = app.engine
        .reject_deposit(second.id, "already active".into(), Utc::now()).await
        .unwrap();
    assert_eq!(rejected.status, "REJECTED");
    app.assert_balanced("alice").await;
}

#[tokio::test]
async fn later_approval_resets_lock_clock() {
    let app = setup().await;
    app.register("alice", None).await;

    let first = Utc::now() - Duration::days(10);
    app.activate_at("alice", 500_000, first).await;

    // Admin emptied the deposit, so a fresh deposit is allowed again
    app.engine
        .manual_adjustment(
            adjustment("alice", WalletType::DepositLocked, AdjustmentAction::Cut, 500_000, false),
            first
        ).await
        .unwrap();

    let second = Utc::now();
    app.activate_at("alice", 1_000_000, second).await;

    let wallet = app.wallet("alice").await;
    assert_eq!(wallet.balance_deposit, 1_000_000);
    assert_time(wallet.unlock_date, second + Duration::days(30));
    assert_eq!(app.user("alice").await.tier_level, 2);
    app.assert_balanced("alice").await;
}

#[tokio::test]
async fn deposit_amount_must_match_a_tier() {
    let app = setup().await;
    app.register("alice", None).await;

    let result = app.engine.submit_deposit(
        "alice",
        DepositRequest { amount: 750_000, proof_image_url: None, notes: None },
        Utc::now()
    ).await;

    assert!(matches!(result, Err(AppError::InvalidTierAmount(750_000))));
    assert!(transactions_of(&app, "alice").await.is_empty());
}

#[tokio::test]
async fn active_deposit_blocks_new_submission() {
    let app = setup().await;
    app.register("alice", None).await;
    app.activate("alice", 500_000).await;

    let result = app.engine.submit_deposit(
        "alice",
        DepositRequest { amount: 1_000_000, proof_image_url: None, notes: None },
        Utc::now()
    ).await;

    assert!(matches!(result, Err(AppError::DuplicateActiveDeposit)));
}

#[tokio::test]
async fn rejected_deposit_never_moves_funds() {
    let app = setup().await;
    app.register("alice", None).await;
    let deposit = app.submit_deposit("alice", 500_000).await;

    let blank = app.engine.reject_deposit(deposit.id, "   ".into(), Utc::now()).await;
    assert!(matches!(blank, Err(AppError::ValidationError(_))));

    let rejected = app.engine.reject_deposit(deposit.id, "blurry proof".into(), Utc::now()).await.unwrap();
    assert_eq!(rejected.status, "REJECTED");
    assert_eq!(rejected.rejected_reason.as_deref(), Some("blurry proof"));
    assert!(rejected.processed_at.is_some());

    assert_eq!(app.wallet("alice").await.balance_deposit, 0);
    assert_eq!(app.user("alice").await.tier_level, 0);

    let approve = app.engine.approve_deposit(deposit.id, Utc::now()).await;
    assert!(matches!(approve, Err(AppError::AlreadyProcessed)));
}

#[tokio::test]
async fn approving_unknown_transaction_is_not_found() {
    let app = setup().await;

    let result = app.engine.approve_deposit(uuid::Uuid::new_v4(), Utc::now()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn withdrawal_beyond_available_balance_is_refused() {
    let app = setup().await;
    app.register("alice", None).await;
    app.credit_available("alice", 30_000).await;

    let result = app.engine.submit_withdrawal("alice", withdraw_request(40_000), Utc::now()).await;
    assert!(matches!(result, Err(AppError::InsufficientBalance)));

    assert_eq!(app.wallet("alice").await.balance_available, 30_000);
    let withdrawals = transactions_of(&app, "alice").await
        .into_iter()
        .filter(|t| t.tx_type == "WD_AVAILABLE")
        .count();
    assert_eq!(withdrawals, 0);
}

#[tokio::test]
async fn withdrawal_below_minimum_is_refused() {
    let app = setup().await;
    app.register("alice", None).await;
    app.credit_available("alice", 100_000).await;

    let result = app.engine.submit_withdrawal("alice", withdraw_request(49_999), Utc::now()).await;
    assert!(matches!(result, Err(AppError::BelowMinimum { minimum: 50_000 })));
    assert_eq!(app.wallet("alice").await.balance_available, 100_000);
}

#[tokio::test]
async fn withdrawal_requires_bank_details() {
    let app = setup().await;
    app.register("alice", None).await;
    app.credit_available("alice", 100_000).await;

    let mut request = withdraw_request(60_000);
    request.bank_account = " ".into();

    let result = app.engine.submit_withdrawal("alice", request, Utc::now()).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn rejected_withdrawal_is_refunded() {
    let app = setup().await;
    app.register("alice", None).await;
    app.credit_available("alice", 100_000).await;

    let withdrawal = app.engine
        .submit_withdrawal("alice", withdraw_request(60_000), Utc::now()).await
        .unwrap();
    assert_eq!(withdrawal.status, "PENDING");
    assert_eq!(withdrawal.tx_type, "WD_AVAILABLE");
    assert_eq!(withdrawal.bank_name.as_deref(), Some("BCA"));
    assert_eq!(app.wallet("alice").await.balance_available, 40_000);
    app.assert_balanced("alice").await;

    let settlement = app.engine
        .reject_withdrawal(withdrawal.id, "invalid bank".into(), Utc::now()).await
        .unwrap();

    assert_eq!(settlement.wallet.balance_available, 100_000);
    assert_eq!(settlement.transaction.status, "REJECTED");
    assert_eq!(settlement.transaction.rejected_reason.as_deref(), Some("invalid bank"));
    assert_eq!(app.wallet("alice").await.balance_available, 100_000);
    app.assert_balanced("alice").await;

    let again = app.engine.reject_withdrawal(withdrawal.id, "twice".into(), Utc::now()).await;
    assert!(matches!(again, Err(AppError::AlreadyProcessed)));
    assert_eq!(app.wallet("alice").await.balance_available, 100_000);
}

#[tokio::test]
async fn approved_withdrawal_keeps_the_debit() {
    let app = setup().await;
    app.register("alice", None).await;
    app.credit_available("alice", 100_000).await;

    let withdrawal = app.engine
        .submit_withdrawal("alice", withdraw_request(100_000), Utc::now()).await
        .unwrap();
    let approved = app.engine.approve_withdrawal(withdrawal.id, Utc::now()).await.unwrap();

    assert_eq!(approved.status, "SUCCESS");
    assert_eq!(app.wallet("alice").await.balance_available, 0);

    let reject = app.engine.reject_withdrawal(withdrawal.id, "too late".into(), Utc::now()).await;
    assert!(matches!(reject, Err(AppError::AlreadyProcessed)));
    assert_eq!(app.wallet("alice").await.balance_available, 0);
    app.assert_balanced("alice").await;
}

#[tokio::test]
async fn settlement_operations_check_transaction_type() {
    let app = setup().await;
    app.register("alice", None).await;
    app.credit_available("alice", 100_000).await;

    let deposit = app.submit_deposit("alice", 500_000).await;
    let withdrawal = app.engine
        .submit_withdrawal("alice", withdraw_request(50_000), Utc::now()).await
        .unwrap();

    let wrong = app.engine.approve_withdrawal(deposit.id, Utc::now()).await;
    assert!(matches!(wrong, Err(AppError::ValidationError(_))));

    let wrong = app.engine.approve_deposit(withdrawal.id, Utc::now()).await;
    assert!(matches!(wrong, Err(AppError::ValidationError(_))));

    assert_eq!(app.wallet("alice").await.balance_available, 50_000);
}

#[tokio::test]
async fn manual_deposit_add_resets_unlock_and_can_pay_bonus() {
    let app = setup().await;
    app.register("sponsor", None).await;
    app.activate("sponsor", 500_000).await;
    app.register("alice", Some("sponsor")).await;

    let now = Utc::now();
    let result = app.engine
        .manual_adjustment(
            adjustment("alice", WalletType::DepositLocked, AdjustmentAction::Add, 123_457, true),
            now
        ).await
        .unwrap();

    assert_eq!(result.wallet.balance_deposit, 123_457);
    assert_time(result.wallet.unlock_date, now + Duration::days(30));
    assert_eq!(result.transaction.tx_type, "MANUAL_ADJUSTMENT");
    assert_eq!(result.transaction.amount, 123_457);
    assert_eq!(result.transaction.wallet_type.as_deref(), Some("DEPOSIT_LOCKED"));
    assert_eq!(result.transaction.adjustment_action.as_deref(), Some("ADD"));

    let bonus = result.sponsor_bonus.expect("bonus triggered");
    assert_eq!(bonus.amount, 12_345);
    // The sponsor has no upline of its own, so the bonus is its only credit
    assert_eq!(app.wallet("sponsor").await.balance_available, 12_345);

    // Manual adjustments never change membership
    assert_eq!(app.user("alice").await.tier_level, 0);

    app.assert_balanced("alice").await;
    app.assert_balanced("sponsor").await;
}

#[tokio::test]
async fn manual_adjustment_without_trigger_pays_no_bonus() {
    let app = setup().await;
    app.register("sponsor", None).await;
    app.activate("sponsor", 500_000).await;
    app.register("alice", Some("sponsor")).await;

    let result = app.engine
        .manual_adjustment(
            adjustment("alice", WalletType::DepositLocked, AdjustmentAction::Add, 500_000, false),
            Utc::now()
        ).await
        .unwrap();

    assert!(result.sponsor_bonus.is_none());
    assert_eq!(app.wallet("sponsor").await.balance_available, 0);
}

#[tokio::test]
async fn available_adjustment_keeps_unlock_date() {
    let app = setup().await;
    app.register("alice", None).await;
    let settlement = app.activate("alice", 500_000).await;

    let result = app.engine
        .manual_adjustment(
            adjustment("alice", WalletType::Available, AdjustmentAction::Add, 75_000, true),
            Utc::now() + Duration::days(3)
        ).await
        .unwrap();

    assert_eq!(result.wallet.balance_available, 75_000);
    assert_eq!(result.wallet.unlock_date, settlement.wallet.unlock_date);
    assert!(result.sponsor_bonus.is_none());
}

#[tokio::test]
async fn cut_below_zero_is_refused_atomically() {
    let app = setup().await;
    app.register("alice", None).await;
    app.credit_available("alice", 10_000).await;
    let before = transactions_of(&app, "alice").await.len();

    let result = app.engine.manual_adjustment(
        adjustment("alice", WalletType::Available, AdjustmentAction::Cut, 10_001, false),
        Utc::now()
    ).await;

    assert!(matches!(result, Err(AppError::InsufficientBalance)));
    assert_eq!(app.wallet("alice").await.balance_available, 10_000);
    assert_eq!(transactions_of(&app, "alice").await.len(), before);

    let result = app.engine
        .manual_adjustment(
            adjustment("alice", WalletType::Available, AdjustmentAction::Cut, 10_000, false),
            Utc::now()
        ).await
        .unwrap();
    assert_eq!(result.wallet.balance_available, 0);
    assert_eq!(result.transaction.amount, 10_000);
    app.assert_balanced("alice").await;
}

#[tokio::test]
async fn adjustment_amount_must_be_positive() {
    let app = setup().await;
    app.register("alice", None).await;

    let result = app.engine.manual_adjustment(
        adjustment("alice", WalletType::Available, AdjustmentAction::Add, 0, false),
        Utc::now()
    ).await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn pending_queue_lists_only_pending_rows() {
    let app = setup().await;
    app.register("alice", None).await;
    app.register("bob", None).await;

    let alice_deposit = app.submit_deposit("alice", 500_000).await;
    let bob_deposit = app.submit_deposit("bob", 1_000_000).await;
    app.engine.reject_deposit(bob_deposit.id, "duplicate".into(), Utc::now()).await.unwrap();

    let pending = app.ledger
        .list_transactions(TransactionFilter {
            status: Some(TxStatus::Pending),
            tx_type: Some(TxType::Deposit),
            ..Default::default()
        }).await
        .unwrap();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, alice_deposit.id);
}
