use std::fmt;

use chrono::{DateTime, Local};

use crate::content::PostStatus;

/// 用户，仅保存外部认证层给出的 id 和用户名
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// 关于页内容
#[derive(Debug, sqlx::FromRow)]
pub struct About {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub updated_on: DateTime<Local>,
}

/// 文章，附带作者用户名。
#[derive(Debug, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub author_id: i64,
    /// 作者用户名，来自 `users` 表
    pub author: String,
    /// 外部图床上的图片引用
    pub featured_image: String,
    pub content: String,
    pub excerpt: String,
    pub status: PostStatus,
    pub created_on: DateTime<Local>,
    pub updated_on: DateTime<Local>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} written by {}", self.title, self.author)
    }
}

/// 评论
#[derive(Debug, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author: String,
    pub body: String,
    pub approved: bool,
    pub created_on: DateTime<Local>,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comment {} by {}", self.body, self.author)
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub event_name: String,
    pub location: String,
    pub date: DateTime<Local>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.event_name)
    }
}

/// 活动门票，附带活动名与持票人用户名。
#[derive(Debug, sqlx::FromRow)]
pub struct Ticket {
    pub id: i64,
    pub event_id: i64,
    pub event_name: String,
    pub ticket_holder_id: i64,
    pub ticket_holder: String,
    pub date_issued: DateTime<Local>,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticket for {}", self.ticket_holder)
    }
}

/// 合作请求
#[derive(Debug, sqlx::FromRow)]
pub struct CollaborateRequest {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub read: bool,
    pub created_on: DateTime<Local>,
}

/// 新建文章所需字段
#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub author_id: i64,
    pub content: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub status: PostStatus,
}
