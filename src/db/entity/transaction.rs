use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

use crate::enums::{ TxStatus, TxType };

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub tx_type: String,
    pub amount: i64,
    pub status: String,
    pub wallet_type: Option<String>,
    pub adjustment_action: Option<String>,
    pub proof_image_url: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub account_name: Option<String>,
    pub notes: Option<String>,
    pub rejected_reason: Option<String>,
    pub processed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
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
    pub fn kind(&self) -> crate::error::Result<TxType> {
        self.tx_type.parse()
    }

    pub fn state(&self) -> crate::error::Result<TxStatus> {
        self.status.parse()
    }
}
