//! Shared fixtures: a fresh in-memory SQLite ledger per test.
#![allow(dead_code)]

use chrono::{ DateTime, Utc };
use sea_orm::DatabaseConnection;

use taskearn::db::entity::{ transaction, user, wallet };
use taskearn::db::{ UserRepository, WalletRepository };
use taskearn::enums::{ AdjustmentAction, Position, WalletType };
use taskearn::services::account_service::{ Account, RegisterRequest };
use taskearn::services::balance_engine::{ AdjustmentRequest, DepositRequest, Settlement };
use taskearn::services::{ AccountService, BalanceEngine, LedgerService, NetworkService, TaskCounter };
use taskearn::SettlementRules;

pub struct TestApp {
    pub db: DatabaseConnection,
    pub accounts: AccountService,
    pub engine: BalanceEngine,
    pub tasks: TaskCounter,
    pub network: NetworkService,
    pub ledger: LedgerService,
}

pub async fn setup() -> TestApp {
    let db = taskearn::db::connect("sqlite::memory:").await.unwrap();
    let rules = SettlementRules::default();

    TestApp {
        accounts: AccountService::new(db.clone()),
        engine: BalanceEngine::new(db.clone(), rules),
        tasks: TaskCounter::new(db.clone(), rules),
        network: NetworkService::new(db.clone()),
        ledger: LedgerService::new(db.clone()),
        db,
    }
}

pub fn register_request(id: &str, sponsor: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        name: format!("User {}", id),
        email: format!("{}@example.com", id),
        sponsor_id: sponsor.map(str::to_string),
        upline_binary_id: None,
        position: None,
    }
}

impl TestApp {
    pub async fn register(&self, id: &str, sponsor: Option<&str>) -> Account {
        self.accounts.register(id, register_request(id, sponsor), Utc::now()).await.unwrap()
    }

    pub async fn register_placed(
        &self,
        id: &str,
        sponsor: Option<&str>,
        upline: &str,
        position: Position
    ) -> Account {
        let mut request = register_request(id, sponsor);
        request.upline_binary_id = Some(upline.to_string());
        request.position = Some(position);

        self.accounts.register(id, request, Utc::now()).await.unwrap()
    }

    pub async fn submit_deposit(&self, id: &str, amount: i64) -> transaction::Model {
        self.engine
            .submit_deposit(
                id,
                DepositRequest {
                    amount,
                    proof_image_url: Some("https://cdn.example.com/proof.jpg".into()),
                    notes: None,
                },
                Utc::now()
            ).await
            .unwrap()
    }

    /// Submits and approves a deposit at `now`.
    pub async fn activate_at(&self, id: &str, amount: i64, now: DateTime<Utc>) -> Settlement {
        let deposit = self.submit_deposit(id, amount).await;
        self.engine.approve_deposit(deposit.id, now).await.unwrap()
    }

    pub async fn activate(&self, id: &str, amount: i64) -> Settlement {
        self.activate_at(id, amount, Utc::now()).await
    }

    pub async fn credit_available(&self, id: &str, amount: i64) {
        self.engine
            .manual_adjustment(
                AdjustmentRequest {
                    user_id: id.to_string(),
                    wallet_type: WalletType::Available,
                    action: AdjustmentAction::Add,
                    amount,
                    notes: Some("test funding".into()),
                    trigger_bonus: false,
                },
                Utc::now()
            ).await
            .unwrap();
    }

    pub async fn wallet(&self, id: &str) -> wallet::Model {
        WalletRepository::new(&self.db).find_by_user(id).await.unwrap()
    }

    pub async fn user(&self, id: &str) -> user::Model {
        UserRepository::new(&self.db).find_by_id(id).await.unwrap()
    }

    pub async fn assert_balanced(&self, id: &str) {
        let report = self.ledger.reconcile(id).await.unwrap();
        assert!(report.balanced, "ledger for {} out of balance: {:?}", id, report);
    }
}

/// Timestamps come back from storage, so compare them to the millisecond.
pub fn assert_time(actual: Option<DateTime<Utc>>, expected: DateTime<Utc>) {
    let actual = actual.expect("timestamp set");
    assert!(
        (actual - expected).num_milliseconds().abs() <= 1,
        "expected {}, got {}",
        expected,
        actual
    );
}
