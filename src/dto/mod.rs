pub mod pagination;
pub mod quote_dto;
pub mod reply_dto;
pub mod gallery_dto;
pub mod engine_page_dto;
pub mod auth_dto;
