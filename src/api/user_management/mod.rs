pub(crate) mod identity;
pub(crate) mod login;
pub mod models;
pub(crate) mod sessions;

#[cfg(test)]
mod tests;
