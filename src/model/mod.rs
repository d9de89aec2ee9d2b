pub mod quote;
pub mod client_reply;
pub mod history;
pub mod gallery;
pub mod engine_page;
pub mod settings;
