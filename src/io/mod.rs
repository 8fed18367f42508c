pub mod file;
pub mod store;

pub use file::{load_project, save_project};
pub use store::{StoreCommand, TaskStore};
