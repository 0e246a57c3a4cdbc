//! Accounts API endpoints

use api_types::{
    Status,
    account::{AccountBody, AccountList, AccountNew, AccountPatch, AccountType, AccountView},
};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use engine::{Account, AccountKind, NewAccountCmd};
use uuid::Uuid;

use crate::{AuthUser, ServerError, server::ServerState};

fn map_kind(kind: AccountKind) -> AccountType {
    match kind {
        AccountKind::Manual => AccountType::Manual,
        AccountKind::Imported => AccountType::Imported,
    }
}

fn view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        user_id: account.user_id,
        name: account.name,
        kind: map_kind(account.kind),
        initial_balance: account.initial_balance,
        balance: account.balance,
        external_id: account.external_id,
        last_synced_at: account.last_synced_at,
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<AccountList>, ServerError> {
    let accounts = state.engine.list_accounts(user.user_id).await?;
    Ok(Json(AccountList {
        accounts: accounts.into_iter().map(view).collect(),
    }))
}

/// Handle requests for creating a new account
pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<AccountNew>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountBody>), ServerError> {
    let Json(payload) = payload?;
    let kind = match payload.kind.unwrap_or_default() {
        AccountType::Manual => AccountKind::Manual,
        AccountType::Imported => AccountKind::Imported,
    };

    let mut cmd = NewAccountCmd::new(user.user_id, payload.name)
        .kind(kind)
        .initial_balance(payload.initial_balance);
    if let Some(external_id) = payload.external_id {
        cmd = cmd.external_id(external_id);
    }
    if let Some(last_synced_at) = payload.last_synced_at {
        cmd = cmd.last_synced_at(last_synced_at.with_timezone(&Utc));
    }

    let account = state.engine.create_account(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(AccountBody {
            account: view(account),
        }),
    ))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AccountBody>, ServerError> {
    let Path(id) = id?;
    let account = state.engine.account(user.user_id, id).await?;
    Ok(Json(AccountBody {
        account: view(account),
    }))
}

/// Handle requests for renaming an account
pub async fn patch(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AccountPatch>, JsonRejection>,
) -> Result<Json<AccountBody>, ServerError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let Some(name) = payload.name.filter(|name| !name.is_empty()) else {
        return Err(ServerError::bad_request("nothing to update"));
    };

    let account = state.engine.rename_account(user.user_id, id, &name).await?;
    Ok(Json(AccountBody {
        account: view(account),
    }))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Status>, ServerError> {
    let Path(id) = id?;
    state.engine.delete_account(user.user_id, id).await?;
    Ok(Json(Status::ok()))
}
