//! Application constants

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 2;

/// Upper bound for any requested page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Lowest star a rating may carry
pub const MIN_STAR: i32 = 1;

/// Highest star a rating may carry
pub const MAX_STAR: i32 = 5;

pub const REVIEW_NAME_MAX_LEN: usize = 100;
pub const REVIEW_EMAIL_MAX_LEN: usize = 254;
pub const REVIEW_TEXT_MAX_LEN: usize = 5000;

/// Deepest level a reply may sit at; a root review is level 1
pub const MAX_REVIEW_DEPTH: i64 = 32;

/// Longest value accepted from X-Forwarded-For (fits the ratings.ip column)
pub const CLIENT_IP_MAX_LEN: usize = 64;
