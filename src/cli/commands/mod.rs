pub mod admin;
pub mod apikey;
pub mod db;
pub mod token;
