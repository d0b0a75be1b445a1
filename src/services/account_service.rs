use chrono::{ DateTime, Utc };
use sea_orm::{ DatabaseConnection, TransactionTrait };
use serde::{ Deserialize, Serialize };

use crate::db::entity::{ user, wallet };
use crate::db::{ NewUser, UserRepository, WalletRepository };
use crate::enums::Position;
use crate::error::{ AppError, Result };

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub sponsor_id: Option<String>,
    pub upline_binary_id: Option<String>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub user: user::Model,
    pub wallet: wallet::Model,
}

/// User records and their wallets. The caller's identity has already been
/// verified upstream; the id arrives here as-is.
#[derive(Clone)]
pub struct AccountService {
    db: DatabaseConnection,
}

impl AccountService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an inactive free-tier user together with an empty wallet.
    pub async fn register(
        &self,
        user_id: &str,
        request: RegisterRequest,
        now: DateTime<Utc>
    ) -> Result<Account> {
        let user_id = user_id.trim();
        if user_id.is_empty() || user_id.len() > 64 {
            return Err(AppError::ValidationError("User id must be 1 to 64 characters".into()));
        }

        let name = request.name.trim().to_string();
        let email = request.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".into()));
        }
        if !email.contains('@') {
            return Err(AppError::ValidationError("A valid email is required".into()));
        }

        let txn = self.db.begin().await?;
        let users = UserRepository::new(&txn);

        if users.find(user_id).await?.is_some() {
            return Err(AppError::ValidationError(format!("User {} already exists", user_id)));
        }

        if let Some(sponsor_id) = request.sponsor_id.as_deref() {
            let sponsor = users.find_by_id(sponsor_id).await?;
            if !sponsor.is_active {
                return Err(AppError::AccountNotActive);
            }
        }

        match (request.upline_binary_id.as_deref(), request.position) {
            (Some(upline_id), Some(position)) => {
                users.find_by_id(upline_id).await?;
                if users.find_binary_child(upline_id, position).await?.is_some() {
                    return Err(
                        AppError::ValidationError(
                            format!("{} slot under {} is already taken", position, upline_id)
                        )
                    );
                }
            }
            (None, None) => {}
            _ => {
                return Err(
                    AppError::ValidationError(
                        "Binary upline and position must be given together".into()
                    )
                );
            }
        }

        let user = users.create(
            NewUser {
                id: user_id.to_string(),
                name,
                email,
                sponsor_id: request.sponsor_id,
                upline_binary_id: request.upline_binary_id,
                position: request.position,
            },
            now
        ).await?;
        let wallet = WalletRepository::new(&txn).create_for_user(&user.id, now).await?;

        txn.commit().await?;

        tracing::info!("Registered user {} (sponsor {:?})", user.id, user.sponsor_id);

        Ok(Account { user, wallet })
    }

    pub async fn get_account(&self, user_id: &str) -> Result<Account> {
        let user = UserRepository::new(&self.db).find_by_id(user_id).await?;
        let wallet = WalletRepository::new(&self.db).find_by_user(user_id).await?;

        Ok(Account { user, wallet })
    }

    pub async fn list_accounts(&self, limit: Option<u64>, offset: Option<u64>) -> Result<Vec<Account>> {
        let users = UserRepository::new(&self.db).list(
            limit.unwrap_or(50).min(500),
            offset.unwrap_or(0)
        ).await?;

        let ids = users
            .iter()
            .map(|u| u.id.clone())
            .collect();
        let mut wallets = WalletRepository::new(&self.db).find_by_users(ids).await?;

        let mut accounts = Vec::with_capacity(users.len());
        for user in users {
            let idx = wallets
                .iter()
                .position(|w| w.user_id == user.id)
                .ok_or_else(|| AppError::NotFound(format!("Wallet for user {}", user.id)))?;
            let wallet = wallets.swap_remove(idx);
            accounts.push(Account { user, wallet });
        }

        Ok(accounts)
    }

    pub async fn ban(&self, user_id: &str, now: DateTime<Utc>) -> Result<user::Model> {
        self.set_active(user_id, false, now).await
    }

    pub async fn unban(&self, user_id: &str, now: DateTime<Utc>) -> Result<user::Model> {
        self.set_active(user_id, true, now).await
    }

    async fn set_active(&self, user_id: &str, is_active: bool, now: DateTime<Utc>) -> Result<user::Model> {
        let users = UserRepository::new(&self.db);
        let user = users.find_by_id(user_id).await?;

        if user.is_active == is_active {
            return Ok(user);
        }

        let user = users.set_active(user, is_active, now).await?;
        tracing::info!("User {} is_active set to {}", user.id, is_active);

        Ok(user)
    }
}
