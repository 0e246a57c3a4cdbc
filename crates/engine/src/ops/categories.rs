use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    Category, CategoryKind, EngineError, OTHER_CATEGORY_NAME, ResultEngine, categories,
    categories::visible_to_condition, transactions, util::normalize_required_name,
};

use super::{Engine, with_tx};

/// Outcome of [`Engine::delete_category`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryDeletion {
    pub category_id: Uuid,
    /// The "Other" category that inherited the transactions.
    pub fallback_id: Uuid,
    pub reassigned: u64,
}

impl Engine {
    /// Returns the user's system "Other" category of `kind`, creating it if
    /// needed.
    ///
    /// The insert is a no-op when the row already exists (unique index on
    /// system categories), so two callers racing on first use still end up
    /// reading the same row.
    pub(super) async fn system_other<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        kind: CategoryKind,
    ) -> ResultEngine<Category> {
        let now = Utc::now();
        let candidate = Category {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            name: OTHER_CATEGORY_NAME.to_string(),
            kind,
            is_system: true,
            created_at: now,
            updated_at: now,
        };
        categories::Entity::insert(categories::ActiveModel::from(&candidate))
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;

        let model = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .filter(categories::Column::Name.eq(OTHER_CATEGORY_NAME))
            .filter(categories::Column::IsSystem.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not found".to_string()))?;
        Category::try_from(model)
    }

    /// Idempotent: every call for the same `(user_id, kind)` yields the same
    /// category.
    pub async fn ensure_system_other(
        &self,
        user_id: Uuid,
        kind: CategoryKind,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| self.system_other(&db_tx, user_id, kind).await)
    }

    /// Loads a category the user may reference: a global one or one of their
    /// own. Anything else is reported as missing.
    pub(super) async fn visible_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id.to_string())
            .filter(visible_to_condition(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not found".to_string()))?;
        Category::try_from(model)
    }

    /// Global categories plus the user's own, system ones first.
    pub async fn list_categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(visible_to_condition(user_id))
            .order_by_desc(categories::Column::IsSystem)
            .order_by_desc(categories::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub async fn category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<Category> {
        self.visible_category(&self.database, user_id, category_id)
            .await
    }

    pub async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        kind: CategoryKind,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            name,
            kind,
            is_system: false,
            created_at: now,
            updated_at: now,
        };
        categories::ActiveModel::from(&category)
            .insert(&self.database)
            .await?;
        Ok(category)
    }

    /// Only the user's own non-system categories can be renamed.
    pub async fn rename_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(category_id.to_string())
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .filter(categories::Column::IsSystem.eq(false))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("category not found or not editable".to_string())
                })?;
            let mut active: categories::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Category::try_from(model)
        })
    }

    /// Deletes one of the user's categories.
    ///
    /// Transactions pointing at it move to the user's "Other" category of the
    /// same kind, in the same database transaction as the delete, so no
    /// transaction is ever left without a category. System categories cannot
    /// be deleted; global and foreign ones are reported as missing.
    pub async fn delete_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<CategoryDeletion> {
        with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(category_id.to_string())
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("category not found".to_string()))?;
            let category = Category::try_from(model)?;
            if category.is_system {
                return Err(EngineError::Immutable(
                    "system category cannot be deleted".to_string(),
                ));
            }

            let fallback = self.system_other(&db_tx, user_id, category.kind).await?;
            let reassigned = transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::CategoryId,
                    Expr::value(fallback.id.to_string()),
                )
                .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .filter(transactions::Column::CategoryId.eq(category_id.to_string()))
                .exec(&db_tx)
                .await?
                .rows_affected;

            categories::Entity::delete_by_id(category_id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::info!(
                %user_id,
                %category_id,
                fallback_id = %fallback.id,
                reassigned,
                "category deleted"
            );
            Ok(CategoryDeletion {
                category_id,
                fallback_id: fallback.id,
                reassigned,
            })
        })
    }
}
