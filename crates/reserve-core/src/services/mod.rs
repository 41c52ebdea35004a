//! Application services shared by every reserve interface.

pub mod history;
mod reserve;

pub use reserve::ReserveService;
