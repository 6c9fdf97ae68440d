pub mod form_controller;
pub mod gateway;

pub use form_controller::{FormController, PageView};
pub use gateway::Gateway;
