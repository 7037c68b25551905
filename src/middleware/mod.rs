pub mod auth;
pub mod flash;
pub mod rate_limit;
pub mod security;
