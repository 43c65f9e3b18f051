pub mod handle_exclusive;
pub mod handle_shared;
pub mod handle_weak;
pub mod is_null;
pub mod macros;

#[cfg(test)]
pub(crate) mod test;
