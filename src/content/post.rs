use serde::{Deserialize, Serialize};

/// 文章的可见状态，数据库中以 `SMALLINT` 存储。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[repr(i16)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft = 0,
    Published = 1,
}

/// 由标题生成 slug
///
/// 转小写，仅保留 ASCII 字母数字；空白、`-`、`_` 连续出现时折叠为一个 `-`，
/// 首尾的 `-` 去掉，其余字符丢弃。
///
/// ```ignore
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}
