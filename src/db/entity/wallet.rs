use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: String,
    pub balance_deposit: i64,
    pub balance_reward_task: i64,
    pub balance_matching_lock: i64,
    pub balance_available: i64,
    pub unlock_date: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn total_locked(&self) -> i64 {
        self.balance_deposit + self.balance_reward_task + self.balance_matching_lock
    }

    pub fn is_unlocked(&self, now: DateTimeUtc) -> bool {
        self.unlock_date.map_or(true, |unlock| unlock <= now)
    }
}
