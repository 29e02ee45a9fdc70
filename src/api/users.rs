//! User registration, login, and profile endpoints.
//!
//! Profile routes are protected: the handler passes the request headers to
//! [`AuthGate::authorize`](crate::auth::AuthGate::authorize) and stops on the
//! first rejection.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::{with_context, AppContext};
use crate::accounts::{Account, AccountError};
use crate::http::response::internal_error;
use crate::http::{json_body, json_message, ApiRequest, Handler};
use crate::routing::RouteTableBuilder;

const CREDENTIALS_REQUIRED: &str = "Username and password are required";
const INVALID_USER_ID: &str = "Invalid user ID";
const USER_NOT_FOUND: &str = "User not found";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterRequest {
    #[serde(alias = "Username")]
    username: Option<String>,
    #[serde(alias = "Email")]
    email: Option<String>,
    #[serde(alias = "Password")]
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginRequest {
    #[serde(alias = "Username")]
    username: Option<String>,
    #[serde(alias = "Password")]
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateProfileRequest {
    #[serde(alias = "Email")]
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    id: i64,
    username: String,
    email: String,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user_id: i64,
    username: String,
}

pub fn register_routes(routes: &mut RouteTableBuilder<Handler>, context: &AppContext) {
    routes
        .post("/api/users/register", with_context(context, register))
        .post("/api/users/login", with_context(context, login))
        .get("/api/users/{id}/profile", with_context(context, get_profile))
        .put("/api/users/{id}/profile", with_context(context, update_profile));
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn register(context: AppContext, request: ApiRequest) -> Response {
    let body: RegisterRequest = request.json().unwrap_or_default();
    let (Some(username), Some(password)) = (non_empty(body.username), non_empty(body.password))
    else {
        return json_message(StatusCode::BAD_REQUEST, CREDENTIALS_REQUIRED);
    };

    let password_hash = match context.hasher.hash(&password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(request_id = %request.request_id, error = %e, "Password hashing failed");
            return internal_error();
        }
    };

    let email = body.email.unwrap_or_default();
    match context.accounts.register(&username, &email, password_hash) {
        Ok(account) => json_body(StatusCode::CREATED, UserResponse::from(account)),
        Err(AccountError::UsernameTaken(_)) => {
            json_message(StatusCode::CONFLICT, "Username already exists")
        }
        Err(e) => {
            tracing::error!(request_id = %request.request_id, error = %e, "Registration failed");
            internal_error()
        }
    }
}

async fn login(context: AppContext, request: ApiRequest) -> Response {
    let body: LoginRequest = request.json().unwrap_or_default();
    let (Some(username), Some(password)) = (non_empty(body.username), non_empty(body.password))
    else {
        return json_message(StatusCode::BAD_REQUEST, CREDENTIALS_REQUIRED);
    };

    let account = context
        .accounts
        .find_by_username(&username)
        .filter(|account| context.hasher.verify(&password, &account.password_hash));
    let Some(account) = account else {
        tracing::info!(request_id = %request.request_id, username = %username, "Login rejected");
        return json_message(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    match context
        .gate
        .codec()
        .issue(&account.username, account.id, context.token_ttl)
    {
        Ok(token) => json_body(
            StatusCode::OK,
            LoginResponse {
                token,
                user_id: account.id,
                username: account.username,
            },
        ),
        Err(e) => {
            tracing::error!(request_id = %request.request_id, error = %e, "Token issue failed");
            internal_error()
        }
    }
}

fn user_id(request: &ApiRequest) -> Option<i64> {
    request.param("id")?.parse().ok()
}

async fn get_profile(context: AppContext, request: ApiRequest) -> Response {
    let Some(id) = user_id(&request) else {
        return json_message(StatusCode::BAD_REQUEST, INVALID_USER_ID);
    };
    if let Err(e) = context.gate.authorize(&request.headers).await {
        return e.into_response();
    }

    match context.accounts.find_by_id(id) {
        Some(account) => json_body(StatusCode::OK, UserResponse::from(account)),
        None => json_message(StatusCode::NOT_FOUND, USER_NOT_FOUND),
    }
}

async fn update_profile(context: AppContext, request: ApiRequest) -> Response {
    let Some(id) = user_id(&request) else {
        return json_message(StatusCode::BAD_REQUEST, INVALID_USER_ID);
    };
    let identity = match context.gate.authorize(&request.headers).await {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };
    if !identity.owns(id) {
        return json_message(StatusCode::FORBIDDEN, "You can only modify your own profile");
    }

    let body: UpdateProfileRequest = request.json().unwrap_or_default();
    let Some(email) = body.email else {
        return json_message(StatusCode::BAD_REQUEST, "Email is required");
    };

    match context.accounts.update_email(id, &email) {
        Ok(account) => json_body(StatusCode::OK, UserResponse::from(account)),
        Err(AccountError::NotFound(_)) => json_message(StatusCode::NOT_FOUND, USER_NOT_FOUND),
        Err(e) => {
            tracing::error!(request_id = %request.request_id, error = %e, "Profile update failed");
            internal_error()
        }
    }
}
