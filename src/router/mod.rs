pub mod auth_router;
pub mod engine_page_router;
pub mod gallery_router;
pub mod quote_router;
pub mod reply_router;
pub mod settings_router;
pub mod site_router;
