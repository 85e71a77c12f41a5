//! Submitted forms and their field-level validation.
//!
//! Messages are the localized (Russian) texts users see next to the field.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::ports::Upload;

pub const REQUIRED_TEXT: &str = "Пожалуйста, заполните это поле";
pub const REQUIRED_FIELD: &str = "Обязательное поле.";
pub const INVALID_GROUP: &str =
    "Выберите корректный вариант. Вашего варианта нет среди допустимых значений.";
pub const INVALID_IMAGE: &str = "Загрузите правильное изображение. Файл, который вы загрузили, поврежден или не является изображением.";
pub const INVALID_USERNAME: &str = "Введите правильное имя пользователя. Оно может содержать только буквы, цифры и знаки @/./+/-/_.";
pub const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";
pub const PASSWORD_MISMATCH: &str = "Введенные пароли не совпадают.";
pub const INVALID_LOGIN: &str = "Пожалуйста, введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";
pub const INVALID_EMAIL: &str = "Введите правильный адрес электронной почты.";
pub const PASSWORD_TOO_SHORT: &str =
    "Введённый пароль слишком короткий. Он должен содержать как минимум 8 символов.";
pub const UPLOAD_AND_CLEAR: &str =
    "Пожалуйста, загрузите файл или поставьте флажок \"Очистить\", но не оба одновременно.";

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD: &str = "__all__";

/// Usernames that would shadow top-level routes.
pub const RESERVED_USERNAMES: &[&str] = &["new", "follow", "group", "auth", "media", "health"];

/// Field name -> messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form = FormErrors::default();
        for (field, list) in errors.field_errors() {
            for error in list.iter() {
                let message = match error.message.as_ref() {
                    Some(message) => message.to_string(),
                    None => message_for(&error.code).to_string(),
                };
                form.add(field.to_string(), message);
            }
        }
        form
    }
}

/// Validation codes used by the derives below.
const CODE_REQUIRED_TEXT: &str = "required_text";
const CODE_REQUIRED: &str = "required";
const CODE_EMAIL: &str = "email";
const CODE_PASSWORD_LENGTH: &str = "password_length";

fn message_for(code: &str) -> &str {
    match code {
        CODE_REQUIRED_TEXT => REQUIRED_TEXT,
        CODE_REQUIRED => REQUIRED_FIELD,
        CODE_EMAIL => INVALID_EMAIL,
        CODE_PASSWORD_LENGTH => PASSWORD_TOO_SHORT,
        other => other,
    }
}

/// Post creation / edit form.
#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, code = "required_text"))]
    pub text: String,
    /// Raw value of the group select; empty means no group.
    pub group: Option<String>,
    pub image: Option<Upload>,
    /// The "clear image" checkbox of the edit form.
    pub clear_image: bool,
}

impl PostForm {
    pub fn new(text: &str, group: Option<String>, image: Option<Upload>, clear_image: bool) -> Self {
        Self {
            text: text.trim().to_string(),
            group: group.filter(|g| !g.trim().is_empty()),
            image: image.filter(|upload| !upload.bytes.is_empty() || !upload.filename.is_empty()),
            clear_image,
        }
    }

    /// Checks that need no storage access.
    pub fn check(&self) -> FormErrors {
        match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(errors) => errors.into(),
        }
    }
}

/// Comment form.
#[derive(Debug, Clone, Default, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, code = "required"))]
    pub text: String,
}

impl CommentForm {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
        }
    }

    pub fn check(&self) -> FormErrors {
        match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(errors) => errors.into(),
        }
    }
}

/// Registration form.
#[derive(Debug, Clone, Default, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, max = 150, code = "required"))]
    pub username: String,
    #[validate(email(code = "email"))]
    pub email: Option<String>,
    #[validate(length(min = 8, code = "password_length"))]
    pub password: String,
    pub password_confirm: String,
}

impl SignupForm {
    pub fn new(username: &str, email: &str, password: &str, password_confirm: &str) -> Self {
        let email = email.trim();
        Self {
            username: username.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            password: password.to_string(),
            password_confirm: password_confirm.to_string(),
        }
    }

    /// Everything except username uniqueness.
    pub fn check(&self) -> FormErrors {
        let mut errors: FormErrors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(errors) => errors.into(),
        };

        if !self.username.is_empty() && !is_valid_username(&self.username) {
            errors.add("username", INVALID_USERNAME);
        }
        if RESERVED_USERNAMES.contains(&self.username.to_lowercase().as_str()) {
            errors.add("username", USERNAME_TAKEN);
        }
        if self.password != self.password_confirm {
            errors.add("password_confirm", PASSWORD_MISMATCH);
        }

        errors
    }
}

/// Letters, digits and `@ . + - _`.
pub fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_post_text_is_required() {
        let form = PostForm::new("   \n", None, None, false);
        let errors = form.check();
        assert_eq!(errors.get("text"), [REQUIRED_TEXT.to_string()]);
    }

    #[test]
    fn test_post_form_normalizes_input() {
        let form = PostForm::new("  hello ", Some(" ".into()), None, false);
        assert_eq!(form.text, "hello");
        assert!(form.group.is_none());
        assert!(form.check().is_empty());
    }

    #[test]
    fn test_empty_file_field_is_no_upload() {
        let upload = Upload {
            filename: String::new(),
            content_type: None,
            bytes: Vec::new(),
        };
        let form = PostForm::new("text", None, Some(upload), false);
        assert!(form.image.is_none());
    }

    #[test]
    fn test_comment_requires_text() {
        assert_eq!(
            CommentForm::new(" ").check().get("text"),
            [REQUIRED_FIELD.to_string()]
        );
        assert!(CommentForm::new("nice").check().is_empty());
    }

    #[test]
    fn test_signup_checks() {
        let form = SignupForm::new("bad name!", "", "short", "other");
        let errors = form.check();

        assert_eq!(errors.get("username"), [INVALID_USERNAME.to_string()]);
        assert_eq!(errors.get("password"), [PASSWORD_TOO_SHORT.to_string()]);
        assert_eq!(
            errors.get("password_confirm"),
            [PASSWORD_MISMATCH.to_string()]
        );
        assert!(errors.get("email").is_empty());
    }

    #[test]
    fn test_signup_field_messages() {
        let errors = SignupForm::new("", "not-an-email", "long-enough", "long-enough").check();
        assert_eq!(errors.get("username"), [REQUIRED_FIELD.to_string()]);
        assert_eq!(errors.get("email"), [INVALID_EMAIL.to_string()]);
    }

    #[test]
    fn test_signup_rejects_reserved_names() {
        let form = SignupForm::new("Follow", "a@b.io", "long-enough", "long-enough");
        assert_eq!(form.check().get("username"), [USERNAME_TAKEN.to_string()]);
    }

    #[test]
    fn test_valid_signup() {
        let form = SignupForm::new("pickle.rick", "rick@test.com", "fungi123", "fungi123");
        assert!(form.check().is_empty());
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = FormErrors::default();
        errors.add("a", "one");
        errors.add("b", "two");
        assert_eq!(errors.to_string(), "a: one; b: two");
    }
}
