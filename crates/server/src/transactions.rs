//! Transactions API endpoints

use api_types::{
    Status,
    transaction::{
        TransactionBody, TransactionList, TransactionNew, TransactionPatch, TransactionQuery,
        TransactionType, TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use engine::{
    NewTransactionCmd, Transaction, TransactionKind, TransactionListFilter, TransactionPatchCmd,
};
use uuid::Uuid;

use crate::{AuthUser, ServerError, server::ServerState};

fn map_kind(kind: TransactionKind) -> TransactionType {
    match kind {
        TransactionKind::Income => TransactionType::Income,
        TransactionKind::Expense => TransactionType::Expense,
    }
}

fn engine_kind(kind: TransactionType) -> TransactionKind {
    match kind {
        TransactionType::Income => TransactionKind::Income,
        TransactionType::Expense => TransactionKind::Expense,
    }
}

fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        user_id: tx.user_id,
        account_id: tx.account_id,
        category_id: tx.category_id,
        amount: tx.amount,
        kind: map_kind(tx.kind),
        occurred_at: tx.occurred_at,
        comment: tx.comment,
        is_imported: tx.is_imported,
        is_hidden: tx.is_hidden,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

/// Empty query values count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_filter(query: TransactionQuery) -> Result<TransactionListFilter, ServerError> {
    let uuid = |value: Option<String>, name: &str| {
        present(value)
            .map(|v| Uuid::parse_str(&v))
            .transpose()
            .map_err(|_| ServerError::bad_request(format!("invalid {name}")))
    };
    let instant = |value: Option<String>, name: &str| {
        present(value)
            .map(|v| DateTime::parse_from_rfc3339(&v).map(|dt| dt.with_timezone(&Utc)))
            .transpose()
            .map_err(|_| ServerError::bad_request(format!("invalid {name} (use RFC3339)")))
    };

    let kind = present(query.kind)
        .map(|v| TransactionKind::try_from(v.as_str()))
        .transpose()
        .map_err(|_| ServerError::bad_request("invalid type"))?;
    let is_hidden = match present(query.is_hidden).as_deref() {
        None => None,
        Some("true" | "1") => Some(true),
        Some("false" | "0") => Some(false),
        Some(_) => return Err(ServerError::bad_request("invalid is_hidden")),
    };

    Ok(TransactionListFilter {
        account_id: uuid(query.account_id, "account_id")?,
        category_id: uuid(query.category_id, "category_id")?,
        kind,
        is_hidden,
        from: instant(query.start, "start")?,
        to: instant(query.end, "end")?,
    })
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<TransactionList>, ServerError> {
    let Query(query) = query?;
    let filter = parse_filter(query)?;
    let transactions = state
        .engine
        .list_transactions(user.user_id, &filter)
        .await?;
    Ok(Json(TransactionList {
        transactions: transactions.into_iter().map(view).collect(),
    }))
}

/// Handle requests for recording an income or an expense
pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionBody>), ServerError> {
    let Json(payload) = payload?;

    let mut cmd = NewTransactionCmd::new(
        user.user_id,
        payload.account_id,
        payload.amount,
        engine_kind(payload.kind),
        payload.occurred_at.with_timezone(&Utc),
    )
    .imported(payload.is_imported.unwrap_or(false))
    .hidden(payload.is_hidden.unwrap_or(false));
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(comment) = payload.comment {
        cmd = cmd.comment(comment);
    }

    let tx = state.engine.create_transaction(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionBody {
            transaction: view(tx),
        }),
    ))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TransactionBody>, ServerError> {
    let Path(id) = id?;
    let tx = state.engine.transaction(user.user_id, id).await?;
    Ok(Json(TransactionBody {
        transaction: view(tx),
    }))
}

/// Handle requests for partially updating a transaction
pub async fn patch(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TransactionPatch>, JsonRejection>,
) -> Result<Json<TransactionBody>, ServerError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let cmd = TransactionPatchCmd {
        user_id: user.user_id,
        transaction_id: id,
        amount: payload.amount,
        kind: payload.kind.map(engine_kind),
        occurred_at: payload.occurred_at.map(|dt| dt.with_timezone(&Utc)),
        category_id: payload.category_id,
        comment: payload.comment,
        is_hidden: payload.is_hidden,
    };
    let tx = state.engine.patch_transaction(cmd).await?;
    Ok(Json(TransactionBody {
        transaction: view(tx),
    }))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Status>, ServerError> {
    let Path(id) = id?;
    state.engine.delete_transaction(user.user_id, id).await?;
    Ok(Json(Status::ok()))
}
