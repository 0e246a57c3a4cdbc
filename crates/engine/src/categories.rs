//! Categories.
//!
//! A category is either global (no owner, visible to everyone) or owned by a
//! single user. Every user gets one system category named
//! [`OTHER_CATEGORY_NAME`] per kind, used as the fallback when a transaction
//! is created without a category or when its category is deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, Condition, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, TransactionKind, util::parse_uuid};

/// Name of the per-user fallback category.
pub const OTHER_CATEGORY_NAME: &str = "Other";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Whether a transaction of `kind` may reference a category of this kind.
    pub fn matches(self, kind: TransactionKind) -> bool {
        self == Self::from(kind)
    }
}

impl From<TransactionKind> for CategoryKind {
    fn from(value: TransactionKind) -> Self {
        match value {
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(format!(
                "invalid category type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    /// `None` for global categories.
    pub user_id: Option<Uuid>,
    pub name: String,
    pub kind: CategoryKind,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// A category is usable by `user_id` when it is global or owned by them.
    pub fn visible_to(&self, user_id: Uuid) -> bool {
        self.user_id.is_none_or(|owner| owner == user_id)
    }
}

/// Query condition matching exactly the rows [`Category::visible_to`] accepts.
pub(crate) fn visible_to_condition(user_id: Uuid) -> Condition {
    Condition::any()
        .add(Column::UserId.is_null())
        .add(Column::UserId.eq(user_id.to_string()))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub kind: String,
    pub is_system: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.map(|id| id.to_string())),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            is_system: ActiveValue::Set(value.is_system),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            user_id: model
                .user_id
                .as_deref()
                .map(|id| parse_uuid(id, "user"))
                .transpose()?,
            name: model.name,
            kind: CategoryKind::try_from(model.kind.as_str())?,
            is_system: model.is_system,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(user_id: Option<Uuid>) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            user_id,
            name: "Groceries".to_string(),
            kind: CategoryKind::Expense,
            is_system: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn global_category_is_visible_to_everyone() {
        assert!(category(None).visible_to(Uuid::new_v4()));
    }

    #[test]
    fn owned_category_is_visible_to_owner_only() {
        let owner = Uuid::new_v4();
        let category = category(Some(owner));
        assert!(category.visible_to(owner));
        assert!(!category.visible_to(Uuid::new_v4()));
    }

    #[test]
    fn kind_matching() {
        assert!(CategoryKind::Expense.matches(TransactionKind::Expense));
        assert!(!CategoryKind::Expense.matches(TransactionKind::Income));
        assert!(CategoryKind::Income.matches(TransactionKind::Income));
    }
}
