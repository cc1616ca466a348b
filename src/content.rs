mod forms;
mod pagination;
mod post;

pub use self::{
    forms::{Clean, CollaborateForm, CommentForm, FieldErrors, FormState},
    pagination::{POSTS_PER_PAGE, PageInfo},
    post::{PostStatus, slugify},
};
