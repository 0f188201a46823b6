pub mod ip;
pub mod time_parser;
pub mod url_validator;

pub use ip::extract_client_ip;
pub use time_parser::TimeParser;
pub use url_validator::validate_url;
