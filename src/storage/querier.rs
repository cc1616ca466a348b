use super::{About, CollaborateRequest, Comment, DBPool, Event, Post, Ticket, User};

const POST_COLUMNS: &str = r#"
    p.id, p.title, p.slug, p.author_id, u.username AS author, p.featured_image,
    p.content, p.excerpt, p.status, p.created_on, p.updated_on
"#;

const COMMENT_COLUMNS: &str = r#"
    c.id, c.post_id, c.author_id, u.username AS author, c.body, c.approved, c.created_on
"#;

/// 只读查询接口
///
/// 公开的文章查询只返回已发布（`status = 1`）的文章。
pub trait Querier: Send + Sync {
    type Error;

    /// 最近更新的关于页内容
    fn latest_about(&self)
    -> impl std::future::Future<Output = Result<Option<About>, Self::Error>>;

    /// 按 id 查询用户
    fn user(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<User>, Self::Error>>;

    /// 已发布文章总数
    fn published_post_count(&self) -> impl std::future::Future<Output = Result<i64, Self::Error>>;

    /// 分页查询已发布文章
    ///
    /// 按创建时间倒序，同一时间按作者排序。
    fn published_posts(
        &self,
        limit: i64,
        offset: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Post>, Self::Error>>;

    /// 根据 slug 获取已发布文章
    fn published_post(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<Post>, Self::Error>>;

    /// 根据 slug 获取文章，不限状态
    fn post(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<Post>, Self::Error>>;

    /// 文章下对 `viewer` 可见的评论
    ///
    /// 已审核的评论对所有人可见，未审核的只对其作者可见。按创建时间倒序。
    fn visible_comments(
        &self,
        post_id: i64,
        viewer: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<Comment>, Self::Error>>;

    /// 已审核评论数
    fn approved_comment_count(
        &self,
        post_id: i64,
    ) -> impl std::future::Future<Output = Result<i64, Self::Error>>;

    /// 获取属于指定文章的某条评论
    fn comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Comment>, Self::Error>>;

    /// 所有活动，按时间排序
    fn events(&self) -> impl std::future::Future<Output = Result<Vec<Event>, Self::Error>>;

    /// 某用户持有的门票
    fn tickets_of(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Ticket>, Self::Error>>;

    /// 所有合作请求，最新的在前
    fn collaborate_requests(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<CollaborateRequest>, Self::Error>>;
}

impl Querier for DBPool {
    type Error = sqlx::Error;

    async fn latest_about(&self) -> Result<Option<About>, sqlx::Error> {
        sqlx::query_as::<_, About>(
            r#"
            SELECT id, title, content, updated_on
            FROM about
            ORDER BY updated_on DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self)
        .await
    }

    async fn user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self)
            .await
    }

    async fn published_post_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = 1")
            .fetch_one(self)
            .await
    }

    async fn published_posts(&self, limit: i64, offset: i64) -> Result<Vec<Post>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            INNER JOIN users u ON p.author_id = u.id
            WHERE p.status = 1
            ORDER BY p.created_on DESC, p.author_id
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self)
            .await
    }

    async fn published_post(&self, slug: &str) -> Result<Option<Post>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            INNER JOIN users u ON p.author_id = u.id
            WHERE p.slug = $1 AND p.status = 1
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(self)
            .await
    }

    async fn post(&self, slug: &str) -> Result<Option<Post>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            INNER JOIN users u ON p.author_id = u.id
            WHERE p.slug = $1
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(self)
            .await
    }

    async fn visible_comments(
        &self,
        post_id: i64,
        viewer: Option<i64>,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            INNER JOIN users u ON c.author_id = u.id
            WHERE c.post_id = $1
            AND (c.approved OR c.author_id = $2)
            ORDER BY c.created_on DESC
            "#
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .bind(viewer)
            .fetch_all(self)
            .await
    }

    async fn approved_comment_count(&self, post_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1 AND approved")
            .bind(post_id)
            .fetch_one(self)
            .await
    }

    async fn comment(&self, post_id: i64, comment_id: i64) -> Result<Option<Comment>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            INNER JOIN users u ON c.author_id = u.id
            WHERE c.id = $1 AND c.post_id = $2
            "#
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(comment_id)
            .bind(post_id)
            .fetch_optional(self)
            .await
    }

    async fn events(&self) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, event_name, location, date FROM events ORDER BY date, id",
        )
        .fetch_all(self)
        .await
    }

    async fn tickets_of(&self, user_id: i64) -> Result<Vec<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(
            r#"
            SELECT t.id, t.event_id, e.event_name, t.ticket_holder_id,
                   u.username AS ticket_holder, t.date_issued
            FROM tickets t
            INNER JOIN events e ON t.event_id = e.id
            INNER JOIN users u ON t.ticket_holder_id = u.id
            WHERE t.ticket_holder_id = $1
            ORDER BY t.date_issued DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self)
        .await
    }

    async fn collaborate_requests(&self) -> Result<Vec<CollaborateRequest>, sqlx::Error> {
        sqlx::query_as::<_, CollaborateRequest>(
            r#"
            SELECT id, name, email, message, read, created_on
            FROM collaborate_requests
            ORDER BY created_on DESC, id DESC
            "#,
        )
        .fetch_all(self)
        .await
    }
}
