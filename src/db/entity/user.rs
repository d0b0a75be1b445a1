use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub tier_level: i32,
    pub is_active: bool,
    pub sponsor_id: Option<String>,
    pub upline_binary_id: Option<String>,
    pub position: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::wallet::Entity")]
    Wallet,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Eligible for task rewards: activated by a deposit and holding a paid tier.
    pub fn is_member(&self) -> bool {
        self.is_active && self.tier_level > 0
    }
}
