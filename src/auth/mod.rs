pub mod config;
pub use self::config::AuthConfig;

mod error;
pub use self::error::{AuthError, ConfigError, TemplateError};

pub mod identity;
pub use self::identity::{EmailTemplate, Field, IdentifierTemplate, IdentityFields};

pub mod login;
pub use self::login::{cookie_value, user_login, Authenticator, LoginOutcome};
