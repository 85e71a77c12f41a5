//! Login and signup pages.

use askama::Template;

use yatube_core::forms::FormErrors;

use crate::middleware::auth::Identity;

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginPage<'a> {
    pub viewer: Option<&'a Identity>,
    pub username: &'a str,
    pub next: Option<&'a str>,
    pub errors: &'a FormErrors,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupPage<'a> {
    pub viewer: Option<&'a Identity>,
    pub username: &'a str,
    pub email: &'a str,
    pub errors: &'a FormErrors,
}

pub fn login_page<'a>(
    username: &'a str,
    next: Option<&'a str>,
    errors: &'a FormErrors,
) -> LoginPage<'a> {
    LoginPage {
        viewer: None,
        username,
        next,
        errors,
    }
}

pub fn signup_page<'a>(username: &'a str, email: &'a str, errors: &'a FormErrors) -> SignupPage<'a> {
    SignupPage {
        viewer: None,
        username,
        email,
        errors,
    }
}
