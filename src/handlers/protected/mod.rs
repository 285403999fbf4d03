// handlers/protected/mod.rs - Protected handlers (admin bearer token required)
//
// Security Level: JWT Authentication Required
// Middleware: jwt_auth_middleware, which places the AdminUser in request extensions

pub mod admin;
pub mod contact;
pub mod videos;
