use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Single-use password-reset token. The plaintext is delivered by email once;
/// only its salted hash is persisted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "password_reset_tokens")]
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
