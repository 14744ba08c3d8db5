use secrecy::SecretString;

pub const DEFAULT_COOKIE_NAME: &str = "das-macaroon";
pub const DEFAULT_IDENTIFIER_FORMAT: &str = "{{firstname}};{{lastname}}";
pub const DEFAULT_EMAIL_TEMPLATE: &str = "{{firstname}}.{{lastname}}@company.tld";
pub const MAX_CAVEAT_CONDITIONS: usize = 3;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub secret: SecretString,
    pub identifier_format: String,
    pub email_template: String,
    pub caveat_conditions: Vec<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secret,
            identifier_format: DEFAULT_IDENTIFIER_FORMAT.to_string(),
            email_template: DEFAULT_EMAIL_TEMPLATE.to_string(),
            caveat_conditions: Vec::new(),
        }
    }

    /// Add a condition caveats may match; empty conditions are skipped.
    ///
    /// At most [`MAX_CAVEAT_CONDITIONS`] are accepted by
    /// [`crate::auth::Authenticator::new`].
    #[must_use]
    pub fn with_caveat_condition(mut self, condition: impl Into<String>) -> Self {
        let condition = condition.into();
        if !condition.is_empty() {
            self.caveat_conditions.push(condition);
        }
        self
    }

    pub fn set_secret(&mut self, secret: SecretString) {
        self.secret = secret;
    }
}
