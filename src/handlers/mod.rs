pub mod delete_all;
pub mod delete_one;
pub mod health;
pub mod list;
pub mod upload;

pub use delete_all::delete_all_handler;
pub use delete_one::delete_one_handler;
pub use health::health_handler;
pub use list::list_handler;
pub use upload::upload_handler;
