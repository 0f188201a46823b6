mod error_code;
mod health;
mod helpers;
mod links;
mod redirect;
mod types;

pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{error_from_linkpulse, error_response, json_response, success_response};
pub use links::links_routes;
pub use redirect::{ClientIpPolicy, RedirectHandler, redirect_routes};
pub use types::*;
