#![allow(dead_code)]

use blogsite::storage::{DBPool, NewPost, Store, init_db_from_env, migrate};
use blogsite::content::{PostStatus, slugify};

/// 连接 `DATABASE_URL` 指向的数据库，建表并清空所有数据
pub async fn fresh_db() -> DBPool {
    let db = init_db_from_env().await.expect("连接数据库失败");

    migrate(&db, "sql/01-CREATE_TABLE.sql")
        .await
        .expect("初始化sql失败");

    sqlx::query(
        "TRUNCATE TABLE tickets, events, comments, posts, about, collaborate_requests, users
         RESTART IDENTITY CASCADE",
    )
    .execute(&db)
    .await
    .expect("清空数据失败");

    db
}

pub async fn add_post(db: &DBPool, author_id: i64, title: &str, status: PostStatus) -> i64 {
    db.create_post(&NewPost {
        title: title.to_string(),
        slug: slugify(title),
        author_id,
        content: format!("<p>{title}</p>"),
        excerpt: String::new(),
        featured_image: None,
        status,
    })
    .await
    .expect("创建文章失败")
}

/// 直接改写创建时间，便于构造排序场景
pub async fn set_created_on(db: &DBPool, table: &str, id: i64, ts: &str) {
    sqlx::query(&format!(
        "UPDATE {table} SET created_on = $1::timestamptz WHERE id = $2"
    ))
    .bind(ts)
    .bind(id)
    .execute(db)
    .await
    .expect("更新时间失败");
}
