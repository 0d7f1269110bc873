use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::handlers::Data;
use crate::AppState;

fn parse_role(raw: &str) -> AppResult<UserRole> {
    UserRole::parse(raw)
        .ok_or_else(|| AppError::Validation("role must be one of client, driver".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub clerk_id: String,
    pub role: Option<String>,
}

/// Register the authenticated principal. Identity itself comes from the
/// external auth provider; only the opaque `clerk_id` is stored.
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateUserRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Data<user::Model>>)> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("email must not be empty".to_string()));
    }
    if payload.clerk_id.trim().is_empty() {
        return Err(AppError::Validation(
            "clerk_id must not be empty".to_string(),
        ));
    }
    let role = match payload.role.as_deref() {
        Some(raw) => parse_role(raw)?,
        None => UserRole::Client,
    };

    let existing = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(&payload.email))
                .add(user::Column::ClerkId.eq(&payload.clerk_id)),
        )
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("User already registered".to_string()));
    }

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        clerk_id: Set(payload.clerk_id),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    };

    let created = new_user.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(Data { data: created })))
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub clerk_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: UserRole,
}

/// Current role for one principal.
pub async fn get_role(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> AppResult<Json<Data<RoleResponse>>> {
    let clerk_id = query
        .clerk_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("clerk_id is required".to_string()))?;

    let found = user::Entity::find()
        .filter(user::Column::ClerkId.eq(&clerk_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(Data {
        data: RoleResponse { role: found.role },
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub clerk_id: String,
    pub role: String,
}

/// Switch a principal between the client and driver roles.
pub async fn update_role(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateRoleRequest>, AppError>,
) -> AppResult<Json<Data<RoleResponse>>> {
    if payload.clerk_id.trim().is_empty() {
        return Err(AppError::Validation(
            "clerk_id must not be empty".to_string(),
        ));
    }
    let role = parse_role(&payload.role)?;

    let found = user::Entity::find()
        .filter(user::Column::ClerkId.eq(&payload.clerk_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = found.into();
    active.role = Set(role);
    let updated = active.update(&state.db).await?;

    Ok(Json(Data {
        data: RoleResponse { role: updated.role },
    }))
}
