#[macro_use]
pub mod macros;

pub mod api;
pub mod asrs;
pub mod batch_driver;
pub mod document;
pub mod fs_util;
pub mod schema;
pub mod session;
pub mod wizard_trait;

#[cfg(test)]
mod testing;
