//! The single post page.

use askama::Template;

use yatube_core::domain::{CommentEntry, Group, Post, User};
use yatube_core::services::PostDetail;

use super::filters;
use crate::middleware::auth::Identity;

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostPage<'a> {
    pub viewer: Option<&'a Identity>,
    pub title: String,
    pub author: &'a User,
    pub post: &'a Post,
    pub group: Option<&'a Group>,
    pub comments: &'a [CommentEntry],
    pub is_author: bool,
}

pub fn post_page<'a>(viewer: Option<&'a Identity>, detail: &'a PostDetail) -> PostPage<'a> {
    PostPage {
        viewer,
        title: detail.post.text.chars().take(30).collect(),
        author: &detail.author,
        post: &detail.post,
        group: detail.group.as_ref(),
        comments: &detail.comments,
        is_author: viewer.is_some_and(|v| v.user_id == detail.author.id),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use yatube_core::domain::{Comment, UserSummary};

    use super::*;

    fn detail() -> PostDetail {
        PostDetail {
            author: User {
                id: 1,
                username: "leo".to_string(),
                email: String::new(),
                password_hash: String::new(),
                date_joined: Utc::now(),
            },
            post: Post {
                id: 5,
                text: "A rather long post text that gets cut in the title".to_string(),
                pub_date: Utc::now(),
                author_id: 1,
                group_id: None,
                image: None,
            },
            group: None,
            comments: vec![CommentEntry {
                comment: Comment {
                    id: 1,
                    post_id: 5,
                    author_id: 2,
                    text: "<b>hi</b>".to_string(),
                    created: Utc::now(),
                },
                author: UserSummary {
                    id: 2,
                    username: "reader".to_string(),
                },
            }],
        }
    }

    #[test]
    fn test_edit_link_and_comment_form() {
        let detail = detail();
        let owner = Identity {
            user_id: 1,
            username: "leo".to_string(),
        };

        let html = post_page(Some(&owner), &detail).render().unwrap();
        assert!(html.contains(r#"href="/leo/5/edit/""#));
        assert!(html.contains(r#"action="/leo/5/comment""#));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains("<title>A rather long post text that g</title>"));

        let html = post_page(None, &detail).render().unwrap();
        assert!(!html.contains("/edit/"));
        assert!(!html.contains(r#"action="/leo/5/comment""#));
    }
}
