pub mod repository_error;
pub mod blob_store;
pub mod quote_store;
pub mod mongo;
pub mod gallery_repo;
pub mod engine_page_repo;
pub mod client_reply_repo;
pub mod settings_repo;
