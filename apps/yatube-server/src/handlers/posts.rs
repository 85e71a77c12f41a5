//! Post creation, viewing, editing and comments.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use yatube_core::domain::{Post, PostId};
use yatube_core::error::DomainError;
use yatube_core::forms::{CommentForm, FormErrors, PostForm};
use yatube_shared::dto::CommentFormData;

use super::multipart::read_post_form;
use super::{post_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;
use crate::views::forms::PostFormValues;

async fn render_form(
    state: &AppState,
    identity: &Identity,
    values: &PostFormValues,
    errors: &FormErrors,
    editing: Option<&Post>,
) -> AppResult<HttpResponse> {
    let groups = state.posts.post_form_groups().await?;
    views::render(views::forms::post_form_page(
        identity, &groups, values, errors, editing,
    ))
}

fn submitted_values(form: &PostForm, current_image: Option<String>) -> PostFormValues {
    PostFormValues {
        text: form.text.clone(),
        group: form.group.clone(),
        image: current_image,
    }
}

/// GET /new/
pub async fn new_post_form(
    identity: Identity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    render_form(
        &state,
        &identity,
        &PostFormValues::default(),
        &FormErrors::default(),
        None,
    )
    .await
}

/// POST /new/ - redirects to the index on success, re-renders the form
/// with errors otherwise.
pub async fn new_post(
    identity: Identity,
    state: web::Data<AppState>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_post_form(payload).await?;
    let values = submitted_values(&form, None);

    match state.posts.create_post(identity.user_id, form).await {
        Ok(_) => Ok(redirect("/")),
        Err(DomainError::Validation(errors)) => {
            render_form(&state, &identity, &values, &errors, None).await
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /{username}/{post_id}/
pub async fn post_view(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<(String, PostId)>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let detail = state.posts.post_detail(&username, post_id).await?;
    views::render(views::post::post_page(viewer.0.as_ref(), &detail))
}

/// GET /{username}/{post_id}/edit/ - non-owners are sent to the post.
pub async fn post_edit_form(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(String, PostId)>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();

    match state
        .posts
        .post_for_edit(identity.user_id, &username, post_id)
        .await
    {
        Ok(post) => {
            render_form(
                &state,
                &identity,
                &PostFormValues::from_post(&post),
                &FormErrors::default(),
                Some(&post),
            )
            .await
        }
        Err(DomainError::Forbidden) => Ok(redirect(post_url(&username, post_id))),
        Err(e) => Err(e.into()),
    }
}

/// POST /{username}/{post_id}/edit/
pub async fn post_edit(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(String, PostId)>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let form = read_post_form(payload).await?;
    let submitted = submitted_values(&form, None);

    match state
        .posts
        .edit_post(identity.user_id, &username, post_id, form)
        .await
    {
        Ok(_) => Ok(redirect(post_url(&username, post_id))),
        Err(DomainError::Forbidden) => Ok(redirect(post_url(&username, post_id))),
        Err(DomainError::Validation(errors)) => {
            let post = state
                .posts
                .post_for_edit(identity.user_id, &username, post_id)
                .await?;
            let values = PostFormValues {
                image: post.image.clone(),
                ..submitted
            };
            render_form(&state, &identity, &values, &errors, Some(&post)).await
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /{username}/{post_id}/comment
pub async fn add_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<(String, PostId)>,
    form: web::Form<CommentFormData>,
) -> AppResult<HttpResponse> {
    let (username, post_id) = path.into_inner();
    state
        .posts
        .add_comment(
            identity.user_id,
            &username,
            post_id,
            CommentForm::new(&form.text),
        )
        .await?;

    Ok(redirect(post_url(&username, post_id)))
}
