//! Login, registration, logout and password reset.
//!
//! Credentials go straight to WooGraphQL; the storefront only keeps the
//! issued JWTs in the session (see `services::auth`).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::{
    FieldErrors, ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm, auth::safe_next,
};
use crate::middleware::{Chrome, OptionalAuth};
use crate::models::Flash;
use crate::services::auth;
use crate::services::cart::CartSession;
use crate::services::flash;
use crate::state::AppState;
use crate::woo::{Envelope, LoginResult, WooError};

/// Account dashboard path.
const ACCOUNT_PATH: &str = "/account";

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub username: String,
    pub next: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub chrome: Chrome,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub chrome: Chrome,
    pub username: String,
    pub errors: FieldErrors,
    /// The email was requested (shown whether or not the account exists).
    pub sent: bool,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub chrome: Chrome,
    pub key: String,
    pub login: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// `?next=` on the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// `?key=&login=` from the reset email.
#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub key: Option<String>,
    pub login: Option<String>,
}

/// Store the login and send the browser on.
async fn complete_login(
    session: &Session,
    envelope: Envelope<LoginResult>,
    target: &str,
) -> Result<Response> {
    let Envelope {
        data: login,
        session_token,
    } = envelope;
    let customer = auth::start_customer_session(session, &login, session_token.as_deref()).await?;

    set_sentry_user(&customer.id, Some(&customer.email));

    Ok(Redirect::to(target).into_response())
}

/// Display the login page. Logged-in customers go to the dashboard.
#[instrument(skip_all)]
pub async fn login_page(
    chrome: Chrome,
    OptionalAuth(customer): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> Response {
    if customer.is_some() {
        return Redirect::to(ACCOUNT_PATH).into_response();
    }
    LoginTemplate {
        chrome,
        username: String::new(),
        next: safe_next(query.next.as_deref()).unwrap_or_default(),
        errors: FieldErrors::default(),
        error: None,
    }
    .into_response()
}

/// Log in.
///
/// The guest cart's session token is sent along so WooCommerce merges the
/// guest cart into the customer's.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    chrome: Chrome,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let page = |errors: FieldErrors, error: Option<String>| LoginTemplate {
        chrome: chrome.clone(),
        username: form.username.clone().unwrap_or_default(),
        next: safe_next(form.next.as_deref()).unwrap_or_default(),
        errors,
        error,
    };

    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page(errors, None)).into_response());
        }
    };

    let cart_session = CartSession::load(&session).await;
    match state
        .woo()
        .login(
            &cart_session.context(),
            &credentials.username,
            &credentials.password,
        )
        .await
    {
        Ok(envelope) => complete_login(&session, envelope, &form.redirect_target()).await,
        Err(e @ WooError::UserError(_)) => {
            warn!("Login rejected");
            Ok((
                StatusCode::UNAUTHORIZED,
                page(FieldErrors::default(), e.user_message()),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(chrome: Chrome, OptionalAuth(customer): OptionalAuth) -> Response {
    if customer.is_some() {
        return Redirect::to(ACCOUNT_PATH).into_response();
    }
    RegisterTemplate {
        chrome,
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        errors: FieldErrors::default(),
        error: None,
    }
    .into_response()
}

/// Create an account and log straight in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    chrome: Chrome,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let page = |errors: FieldErrors, error: Option<String>| RegisterTemplate {
        chrome: chrome.clone(),
        email: form.email.clone().unwrap_or_default(),
        first_name: form.first_name.clone().unwrap_or_default(),
        last_name: form.last_name.clone().unwrap_or_default(),
        errors,
        error,
    };

    let new_customer = match form.validate() {
        Ok(new_customer) => new_customer,
        Err(errors) => {
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page(errors, None)).into_response());
        }
    };

    let cart_session = CartSession::load(&session).await;
    match state
        .woo()
        .register_customer(&cart_session.context(), &new_customer)
        .await
    {
        Ok(envelope) => {
            flash::set(&session, Flash::info("Welcome! Your account has been created.")).await;
            complete_login(&session, envelope, ACCOUNT_PATH).await
        }
        Err(e @ WooError::UserError(_)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            page(FieldErrors::default(), e.user_message()),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Log out and forget the customer's cart token.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    auth::end_customer_session(&session).await?;
    clear_sentry_user();
    flash::set(&session, Flash::info("You have been logged out.")).await;
    Ok(Redirect::to("/"))
}

/// Display the forgot password page.
#[instrument(skip_all)]
pub async fn forgot_password_page(chrome: Chrome) -> ForgotPasswordTemplate {
    ForgotPasswordTemplate {
        chrome,
        username: String::new(),
        errors: FieldErrors::default(),
        sent: false,
    }
}

/// Request a password reset email.
///
/// The response is the same whether or not the account exists.
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    chrome: Chrome,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response> {
    let username = match form.validate() {
        Ok(username) => username,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                ForgotPasswordTemplate {
                    chrome,
                    username: String::new(),
                    errors,
                    sent: false,
                },
            )
                .into_response());
        }
    };

    state.woo().send_password_reset_email(&username).await?;

    Ok(ForgotPasswordTemplate {
        chrome,
        username,
        errors: FieldErrors::default(),
        sent: true,
    }
    .into_response())
}

/// Display the reset password page (from the emailed link).
#[instrument(skip_all)]
pub async fn reset_password_page(
    chrome: Chrome,
    Query(query): Query<ResetQuery>,
) -> ResetPasswordTemplate {
    let key = query.key.unwrap_or_default();
    let login = query.login.unwrap_or_default();
    let mut errors = FieldErrors::default();
    if key.trim().is_empty() || login.trim().is_empty() {
        errors.add(
            "form",
            "This password reset link is invalid. Please request a new one.",
        );
    }
    ResetPasswordTemplate {
        chrome,
        key,
        login,
        errors,
        error: None,
    }
}

/// Set a new password, then send the customer to log in.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    chrome: Chrome,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response> {
    let page = |errors: FieldErrors, error: Option<String>| ResetPasswordTemplate {
        chrome: chrome.clone(),
        key: form.key.clone().unwrap_or_default(),
        login: form.login.clone().unwrap_or_default(),
        errors,
        error,
    };

    let reset = match form.validate() {
        Ok(reset) => reset,
        Err(errors) => {
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page(errors, None)).into_response());
        }
    };

    match state
        .woo()
        .reset_password(&reset.key, &reset.login, &reset.password)
        .await
    {
        Ok(()) => {
            flash::set(
                &session,
                Flash::info("Your password has been reset. Please log in."),
            )
            .await;
            Ok(Redirect::to(crate::middleware::LOGIN_PATH).into_response())
        }
        Err(e @ WooError::UserError(_)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            page(FieldErrors::default(), e.user_message()),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}
