use chrono::{ DateTime, Utc };
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
};

use crate::db::entity::{ user, User };
use crate::enums::Position;
use crate::error::{ AppError, Result };

pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub sponsor_id: Option<String>,
    pub upline_binary_id: Option<String>,
    pub position: Option<Position>,
}

pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<user::Model> {
        let user = user::ActiveModel {
            id: Set(new_user.id),
            name: Set(new_user.name),
            email: Set(new_user.email),
            tier_level: Set(0),
            is_active: Set(false),
            sponsor_id: Set(new_user.sponsor_id),
            upline_binary_id: Set(new_user.upline_binary_id),
            position: Set(new_user.position.map(|p| p.as_str().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(user.insert(self.conn).await?)
    }

    pub async fn find(&self, id: &str) -> Result<Option<user::Model>> {
        Ok(User::find_by_id(id.to_string()).one(self.conn).await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<user::Model> {
        self.find(id).await?.ok_or_else(|| AppError::NotFound(format!("User {}", id)))
    }

    /// Sets the membership tier and activates the account.
    pub async fn activate_tier(
        &self,
        user: user::Model,
        tier_level: i32,
        now: DateTime<Utc>
    ) -> Result<user::Model> {
        let mut active: user::ActiveModel = user.into();
        active.tier_level = Set(tier_level);
        active.is_active = Set(true);
        active.updated_at = Set(now);

        Ok(active.update(self.conn).await?)
    }

    pub async fn set_active(
        &self,
        user: user::Model,
        is_active: bool,
        now: DateTime<Utc>
    ) -> Result<user::Model> {
        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(now);

        Ok(active.update(self.conn).await?)
    }

    pub async fn find_by_sponsor(&self, sponsor_id: &str) -> Result<Vec<user::Model>> {
        Ok(
            User::find()
                .filter(user::Column::SponsorId.eq(sponsor_id))
                .order_by_asc(user::Column::CreatedAt)
                .all(self.conn).await?
        )
    }

    pub async fn find_binary_child(
        &self,
        upline_id: &str,
        position: Position
    ) -> Result<Option<user::Model>> {
        Ok(
            User::find()
                .filter(user::Column::UplineBinaryId.eq(upline_id))
                .filter(user::Column::Position.eq(position.as_str()))
                .one(self.conn).await?
        )
    }

    /// Ids of every binary child of the given uplines, either side.
    pub async fn find_binary_children_ids(&self, upline_ids: Vec<String>) -> Result<Vec<String>> {
        if upline_ids.is_empty() {
            return Ok(vec![]);
        }

        Ok(
            User::find()
                .select_only()
                .column(user::Column::Id)
                .filter(user::Column::UplineBinaryId.is_in(upline_ids))
                .into_tuple::<String>()
                .all(self.conn).await?
        )
    }

    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<user::Model>> {
        Ok(
            User::find()
                .order_by_desc(user::Column::CreatedAt)
                .limit(limit)
                .offset(offset)
                .all(self.conn).await?
        )
    }
}
