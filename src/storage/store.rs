use chrono::{DateTime, Local};

use super::{DBPool, NewPost, User};
use crate::content::{CollaborateForm, PostStatus};

/// 写入接口
///
/// 删除依赖外键上的 `ON DELETE CASCADE`：删除文章会带走其评论，
/// 删除活动会带走门票，删除用户会带走其文章、评论和门票。
/// 返回 `bool` 的方法表示是否命中了记录。
pub trait Store: Send + Sync {
    type Error;

    fn create_user(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<User, Self::Error>>;

    fn delete_user(&self, id: i64) -> impl std::future::Future<Output = Result<bool, Self::Error>>;

    /// 新增一条关于页内容，最新的一条会被展示
    fn insert_about(
        &self,
        title: &str,
        content: &str,
    ) -> impl std::future::Future<Output = Result<i64, Self::Error>>;

    /// 保存一条已通过校验的合作请求
    fn insert_collaborate_request(
        &self,
        form: &CollaborateForm,
    ) -> impl std::future::Future<Output = Result<i64, Self::Error>>;

    fn create_post(
        &self,
        post: &NewPost,
    ) -> impl std::future::Future<Output = Result<i64, Self::Error>>;

    fn set_post_status(
        &self,
        slug: &str,
        status: PostStatus,
    ) -> impl std::future::Future<Output = Result<bool, Self::Error>>;

    fn delete_post(&self, slug: &str)
    -> impl std::future::Future<Output = Result<bool, Self::Error>>;

    /// 新评论一律为未审核状态
    fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        body: &str,
    ) -> impl std::future::Future<Output = Result<i64, Self::Error>>;

    /// 修改评论正文，评论重新回到未审核状态
    fn update_comment(
        &self,
        comment_id: i64,
        body: &str,
    ) -> impl std::future::Future<Output = Result<bool, Self::Error>>;

    fn approve_comment(
        &self,
        comment_id: i64,
    ) -> impl std::future::Future<Output = Result<bool, Self::Error>>;

    fn delete_comment(
        &self,
        comment_id: i64,
    ) -> impl std::future::Future<Output = Result<bool, Self::Error>>;

    fn create_event(
        &self,
        name: &str,
        location: &str,
        date: DateTime<Local>,
    ) -> impl std::future::Future<Output = Result<i64, Self::Error>>;

    /// 删除活动，其门票随之删除
    fn delete_event(
        &self,
        event_id: i64,
    ) -> impl std::future::Future<Output = Result<bool, Self::Error>>;

    fn issue_ticket(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<i64, Self::Error>>;
}

impl Store for DBPool {
    type Error = sqlx::Error;

    async fn create_user(&self, username: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>("INSERT INTO users (username) VALUES ($1) RETURNING id, username")
            .bind(username)
            .fetch_one(self)
            .await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_about(&self, title: &str, content: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO about (title, content) VALUES ($1, $2) RETURNING id")
            .bind(title)
            .bind(content)
            .fetch_one(self)
            .await
    }

    async fn insert_collaborate_request(&self, form: &CollaborateForm) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO collaborate_requests (name, email, message)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&form.name)
        .bind(&form.email)
        .bind(&form.message)
        .fetch_one(self)
        .await
    }

    async fn create_post(&self, post: &NewPost) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO posts
                (title, slug, author_id, featured_image, content, excerpt, status)
            VALUES ($1, $2, $3, COALESCE($4, 'placeholder'), $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(post.author_id)
        .bind(post.featured_image.as_deref())
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(post.status)
        .fetch_one(self)
        .await
    }

    async fn set_post_status(&self, slug: &str, status: PostStatus) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE posts SET status = $1, updated_on = now() WHERE slug = $2")
                .bind(status)
                .bind(slug)
                .execute(self)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE slug = $1")
            .bind(slug)
            .execute(self)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_comment(
        &self,
        post_id: i64,
        author_id: i64,
        body: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO comments (post_id, author_id, body) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(self)
        .await
    }

    async fn update_comment(&self, comment_id: i64, body: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE comments SET body = $1, approved = FALSE WHERE id = $2")
            .bind(body)
            .bind(comment_id)
            .execute(self)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn approve_comment(&self, comment_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE comments SET approved = TRUE WHERE id = $1")
            .bind(comment_id)
            .execute(self)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(self)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_event(
        &self,
        name: &str,
        location: &str,
        date: DateTime<Local>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events (event_name, location, date) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(location)
        .bind(date)
        .fetch_one(self)
        .await
    }

    async fn delete_event(&self, event_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(self)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn issue_ticket(&self, event_id: i64, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO tickets (event_id, ticket_holder_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(self)
        .await
    }
}
