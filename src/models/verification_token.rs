use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Single-use email-verification token. Structurally identical to the
/// password-reset token but kept in its own table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: Uuid,

    /// Salted hash of the token value
    #[sea_orm(unique)]
    pub token_hash: String,

    pub expires_at: NaiveDateTime,

    /// Consumable iff `used == false && expires_at > now`
    #[sea_orm(default_value = false)]
    pub used: bool,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
