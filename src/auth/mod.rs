//! Authentication glue between the REST API and the session cache

mod guard;
mod service;

pub use guard::{check_access, Access};
pub use service::AuthService;
