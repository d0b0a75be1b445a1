use std::collections::HashSet;

use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::db::entity::user;
use crate::db::UserRepository;
use crate::enums::Position;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct NetworkStats {
    pub user_id: String,
    pub sponsor_id: Option<String>,
    pub direct_referrals: usize,
    pub left_count: u64,
    pub right_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralSummary {
    pub id: String,
    pub name: String,
    pub tier_level: i32,
    pub is_active: bool,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl From<user::Model> for ReferralSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            tier_level: user.tier_level,
            is_active: user.is_active,
            joined_at: user.created_at,
        }
    }
}

/// Walks the sponsor (unilevel) and binary relations between users.
#[derive(Clone)]
pub struct NetworkService {
    db: DatabaseConnection,
}

impl NetworkService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_sponsor(&self, user_id: &str) -> Result<Option<user::Model>> {
        let users = UserRepository::new(&self.db);
        let user = users.find_by_id(user_id).await?;

        match user.sponsor_id {
            Some(sponsor_id) => users.find(&sponsor_id).await,
            None => Ok(None),
        }
    }

    pub async fn find_binary_upline(&self, user_id: &str) -> Result<Option<(user::Model, Position)>> {
        let users = UserRepository::new(&self.db);
        let user = users.find_by_id(user_id).await?;

        let (Some(upline_id), Some(position)) = (user.upline_binary_id, user.position) else {
            return Ok(None);
        };

        let position: Position = position.parse()?;
        Ok(users.find(&upline_id).await?.map(|upline| (upline, position)))
    }

    pub async fn direct_referrals(&self, user_id: &str) -> Result<Vec<user::Model>> {
        UserRepository::new(&self.db).find_by_sponsor(user_id).await
    }

    /// Size of the binary subtree hanging off `side` of the user, walked
    /// breadth-first one level per query.
    pub async fn count_subtree(&self, user_id: &str, side: Position) -> Result<u64> {
        let users = UserRepository::new(&self.db);

        let Some(root) = users.find_binary_child(user_id, side).await? else {
            return Ok(0);
        };

        let mut seen: HashSet<String> = HashSet::from([user_id.to_string(), root.id.clone()]);
        let mut frontier = vec![root.id];
        let mut count = 1u64;

        while !frontier.is_empty() {
            let children = users.find_binary_children_ids(frontier).await?;

            frontier = children
                .into_iter()
                .filter(|id| seen.insert(id.clone()))
                .collect();
            count += frontier.len() as u64;
        }

        Ok(count)
    }

    pub async fn stats(&self, user_id: &str) -> Result<NetworkStats> {
        let user = UserRepository::new(&self.db).find_by_id(user_id).await?;

        let direct_referrals = self.direct_referrals(user_id).await?.len();
        let left_count = self.count_subtree(user_id, Position::Left).await?;
        let right_count = self.count_subtree(user_id, Position::Right).await?;

        tracing::debug!("Network of {}: {} left, {} right", user_id, left_count, right_count);

        Ok(NetworkStats {
            user_id: user.id,
            sponsor_id: user.sponsor_id,
            direct_referrals,
            left_count,
            right_count,
        })
    }
}
