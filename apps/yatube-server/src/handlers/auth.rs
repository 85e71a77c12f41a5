//! Login, signup and logout.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{HttpResponse, web};

use yatube_core::error::DomainError;
use yatube_core::forms::{FormErrors, SignupForm};
use yatube_shared::dto::{LoginForm, NextQuery, SignupFormData};

use super::redirect;
use crate::middleware::auth::{LOGIN_URL, SESSION_COOKIE, safe_next};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views;

/// GET /auth/login/
pub async fn login_form(query: web::Query<NextQuery>) -> AppResult<HttpResponse> {
    views::render(views::auth::login_page(
        "",
        query.next.as_deref(),
        &FormErrors::default(),
    ))
}

/// POST /auth/login/ - sets the session cookie and follows `next`.
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    let user = match state
        .accounts
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(DomainError::Validation(errors)) => {
            return views::render(views::auth::login_page(
                &form.username,
                form.next.as_deref(),
                &errors,
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(state.tokens.expiration_seconds()))
        .finish();

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, safe_next(form.next.as_deref())))
        .cookie(cookie)
        .finish())
}

/// GET /auth/signup/
pub async fn signup_form() -> AppResult<HttpResponse> {
    views::render(views::auth::signup_page("", "", &FormErrors::default()))
}

/// POST /auth/signup/ - on success the new user is sent to the login page.
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<SignupFormData>,
) -> AppResult<HttpResponse> {
    let data = form.into_inner();
    let signup = SignupForm::new(&data.username, &data.email, &data.password1, &data.password2);

    match state.accounts.signup(signup).await {
        Ok(_) => Ok(redirect(LOGIN_URL)),
        Err(DomainError::Validation(errors)) => {
            views::render(views::auth::signup_page(&data.username, &data.email, &errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish()
}
