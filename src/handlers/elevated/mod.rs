// handlers/elevated/mod.rs - Database gateway handlers (API key required)
//
// Security Level: X-Api-User + X-Api-Key
// Middleware: api_key_middleware, which places the ApiKeyPrincipal in request extensions.
// Each operation then checks its own permission tier (read / write / delete).

pub mod db;
