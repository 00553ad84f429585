pub(crate) mod storage;
pub(crate) mod thing_management;
pub(crate) mod user_management;
