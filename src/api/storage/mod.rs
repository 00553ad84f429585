pub(crate) mod tickets;
pub(crate) mod upload;

#[cfg(test)]
mod tests;
