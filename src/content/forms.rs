use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// 评论表单，仅包含正文。
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub body: String,
}

/// 合作请求表单。
///
/// 缺失的字段按空字符串处理，由校验规则报告为字段错误。
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct CollaborateForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub name: String,

    #[validate(
        custom(function = "not_blank"),
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this value has at most 254 characters.")
    )]
    pub email: String,

    #[validate(custom(function = "not_blank"))]
    pub message: String,
}

/// 校验前的清洗，去掉各字段首尾空白
pub trait Clean {
    fn clean(self) -> Self;
}

impl Clean for CommentForm {
    fn clean(self) -> Self {
        Self {
            body: self.body.trim().to_string(),
        }
    }
}

impl Clean for CollaborateForm {
    fn clean(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("This field is required.".into()));
    }
    Ok(())
}

/// 字段名到错误信息列表的映射，键有序以保证输出稳定。
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let map = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self(map)
    }
}

/// 绑定了提交数据的表单状态，供模板回显数据和错误。
#[derive(Debug, Default, Clone, Serialize)]
pub struct FormState<F> {
    pub data: F,
    pub errors: FieldErrors,
}

impl<F: Validate + Clean + Default> FormState<F> {
    /// 未绑定数据的空表单
    pub fn empty() -> Self {
        Self::default()
    }

    /// 绑定提交数据，清洗后立即校验
    pub fn bind(data: F) -> Self {
        let data = data.clean();
        let errors = data.validate().err().map(FieldErrors::from).unwrap_or_default();
        Self { data, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_form_is_valid() {
        let form = FormState::bind(CommentForm {
            body: "This is a great post".to_string(),
        });
        assert!(form.is_valid());
    }

    #[test]
    fn test_comment_form_is_invalid() {
        let form = FormState::bind(CommentForm {
            body: "".to_string(),
        });
        assert!(!form.is_valid());
        assert_eq!(
            form.errors.get("body"),
            Some(&["This field is required.".to_string()][..])
        );
    }

    #[test]
    fn test_comment_form_whitespace_only_is_invalid() {
        let form = FormState::bind(CommentForm {
            body: "  \n\t".to_string(),
        });
        assert!(!form.is_valid());
    }

    #[test]
    fn test_collaborate_form_is_valid() {
        let form = FormState::bind(CollaborateForm {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            message: "Let's build something".to_string(),
        });
        assert!(form.is_valid(), "{:?}", form.errors);
    }

    #[test]
    fn test_collaborate_form_missing_fields_default_to_empty() {
        // 只提交了 name，其余字段缺失
        let data: CollaborateForm = serde_json::from_str(r#"{"name":"Alice"}"#).unwrap();
        let form = FormState::bind(data);

        assert!(!form.is_valid());
        assert!(form.errors.get("name").is_none());
        assert!(form.errors.get("email").is_some());
        assert!(form.errors.get("message").is_some());
    }

    #[test]
    fn test_collaborate_form_rejects_bad_email_and_long_name() {
        let form = FormState::bind(CollaborateForm {
            name: "x".repeat(201),
            email: "not-an-email".to_string(),
            message: "hi".to_string(),
        });

        assert_eq!(
            form.errors.get("email"),
            Some(&["Enter a valid email address.".to_string()][..])
        );
        assert_eq!(
            form.errors.get("name"),
            Some(&["Ensure this value has at most 200 characters.".to_string()][..])
        );
    }

    #[test]
    fn test_collaborate_form_rejects_overlong_email() {
        // 本地部分和各级域名都在限制内，但总长超过 254
        let email = format!(
            "{}@{}.{}.{}.com",
            "a".repeat(64),
            "b".repeat(63),
            "c".repeat(63),
            "d".repeat(63)
        );
        assert!(email.len() > 254);

        let form = FormState::bind(CollaborateForm {
            name: "Alice".to_string(),
            email,
            message: "hi".to_string(),
        });

        assert_eq!(
            form.errors.get("email"),
            Some(&["Ensure this value has at most 254 characters.".to_string()][..])
        );
    }

    #[test]
    fn test_collaborate_form_trims_before_validation() {
        let form = FormState::bind(CollaborateForm {
            name: format!("  {}  ", "x".repeat(200)),
            email: " alice@example.com ".to_string(),
            message: "\thello\n".to_string(),
        });

        assert!(form.is_valid(), "{:?}", form.errors);
        assert_eq!(form.data.email, "alice@example.com");
        assert_eq!(form.data.name.len(), 200);
        assert_eq!(form.data.message, "hello");
    }

    #[test]
    fn test_comment_form_body_is_trimmed() {
        let form = FormState::bind(CommentForm {
            body: "  nice post \n".to_string(),
        });
        assert!(form.is_valid());
        assert_eq!(form.data.body, "nice post");
    }

    #[test]
    fn test_empty_form_has_no_errors() {
        let form = FormState::<CollaborateForm>::empty();
        assert!(form.errors.is_empty());
        assert!(form.data.name.is_empty());
    }
}
