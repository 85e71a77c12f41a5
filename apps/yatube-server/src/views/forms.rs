//! The new / edit post form.

use askama::Template;

use yatube_core::domain::{Group, Post};
use yatube_core::forms::FormErrors;

use crate::middleware::auth::Identity;

/// What the form fields show.
#[derive(Debug, Clone, Default)]
pub struct PostFormValues {
    pub text: String,
    /// Raw value of the group select.
    pub group: Option<String>,
    /// Current image of an edited post.
    pub image: Option<String>,
}

impl PostFormValues {
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
            image: post.image.clone(),
        }
    }

    pub fn is_selected(&self, group: &Group) -> bool {
        self.group.as_deref() == Some(group.id.to_string().as_str())
    }
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormPage<'a> {
    pub viewer: Option<&'a Identity>,
    pub groups: &'a [Group],
    pub values: &'a PostFormValues,
    pub errors: &'a FormErrors,
    pub editing: Option<&'a Post>,
    pub action: String,
}

pub fn post_form_page<'a>(
    viewer: &'a Identity,
    groups: &'a [Group],
    values: &'a PostFormValues,
    errors: &'a FormErrors,
    editing: Option<&'a Post>,
) -> PostFormPage<'a> {
    let action = match editing {
        Some(post) => format!("/{}/{}/edit/", viewer.username, post.id),
        None => "/new/".to_string(),
    };

    PostFormPage {
        viewer: Some(viewer),
        groups,
        values,
        errors,
        editing,
        action,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use yatube_core::forms::INVALID_IMAGE;

    use super::*;

    fn viewer() -> Identity {
        Identity {
            user_id: 1,
            username: "leo".to_string(),
        }
    }

    #[test]
    fn test_selected_group_and_errors() {
        let groups = vec![Group {
            id: 4,
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: String::new(),
        }];
        let values = PostFormValues {
            text: "draft".to_string(),
            group: Some("4".to_string()),
            image: None,
        };
        let mut errors = FormErrors::default();
        errors.add("image", INVALID_IMAGE);

        let viewer = viewer();
        let page = post_form_page(&viewer, &groups, &values, &errors, None)
            .render()
            .unwrap();
        assert!(page.contains(r#"<option value="4" selected>Cats</option>"#));
        assert!(page.contains(r#"action="/new/""#));
        assert!(page.contains(INVALID_IMAGE));
        assert!(page.contains(">draft</textarea>"));
        assert!(!page.contains("image-clear"));
    }

    #[test]
    fn test_edit_form_offers_clearing_the_image() {
        let post = Post {
            id: 7,
            text: "old".to_string(),
            pub_date: Utc::now(),
            author_id: 1,
            group_id: None,
            image: Some("posts/x.png".to_string()),
        };
        let values = PostFormValues::from_post(&post);
        let errors = FormErrors::default();

        let viewer = viewer();
        let page = post_form_page(&viewer, &[], &values, &errors, Some(&post))
            .render()
            .unwrap();
        assert!(page.contains(r#"action="/leo/7/edit/""#));
        assert!(page.contains(r#"name="image-clear""#));
        assert!(page.contains("Сохранить"));
    }
}
