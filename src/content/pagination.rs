use serde::Serialize;

/// 首页每页文章数
pub const POSTS_PER_PAGE: i64 = 6;

/// 分页信息，对应模板中的 `page_obj`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: i64,
    pub num_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    /// 根据总条数计算第 `number` 页的分页信息
    ///
    /// 页码从 1 开始。空列表也有第 1 页；超出范围返回 `None`。
    pub fn new(number: i64, per_page: i64, total: i64) -> Option<Self> {
        let num_pages = Self::page_count(per_page, total);

        if number < 1 || number > num_pages {
            return None;
        }

        Some(Self {
            number,
            num_pages,
            has_previous: number > 1,
            has_next: number < num_pages,
        })
    }

    /// 总页数，至少为 1
    pub fn page_count(per_page: i64, total: i64) -> i64 {
        ((total + per_page - 1) / per_page).max(1)
    }

    pub fn offset(&self, per_page: i64) -> i64 {
        (self.number - 1) * per_page
    }

    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}
