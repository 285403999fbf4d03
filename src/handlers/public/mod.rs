// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Routes: banner, health, video reads, contact submission, admin login/creation

pub mod admin;
pub mod contact;
pub mod root;
pub mod videos;
