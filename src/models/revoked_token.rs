use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Revocation-ledger entry: a refresh token that must no longer be honored.
/// Stores only a salted one-way hash, never the plaintext.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revoked_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The user who owned the revoked token
    pub user_id: Uuid,

    /// Salted hash of the revoked refresh token
    #[sea_orm(unique)]
    pub token_hash: String,

    /// Copied from the token's own exp claim so the row can be pruned
    /// once the token would have expired anyway
    pub expires_at: NaiveDateTime,

    pub revoked_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
