pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod edit;
pub(crate) mod get_thing;
mod images;
pub(crate) mod list;
pub mod models;
pub(crate) mod upload_url;
