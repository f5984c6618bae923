pub mod client_ip;
pub mod db;
pub mod error;
pub mod pagination;
pub mod rate_limit;
