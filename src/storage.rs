mod models;
mod postgres;
mod querier;
mod store;

pub use self::{
    models::{About, CollaborateRequest, Comment, Event, NewPost, Post, Ticket, User},
    postgres::{DBPool, init_db_from_env, migrate, new_db_pool},
    querier::Querier,
    store::Store,
};
