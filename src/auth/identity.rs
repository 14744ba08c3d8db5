//! Mapping of verified macaroon identifiers onto account fields.
//!
//! The identifier format is a `;` separated list where each position is
//! either a `{{field}}` placeholder or a literal that is ignored, e.g.
//! `{{firstname}};{{lastname}}`.

use super::TemplateError;
use regex::Regex;

pub const DELIMITER: char = ';';

const PLACEHOLDER: &str = r"\{\{(\w+)\}\}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Firstname,
    Lastname,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Firstname => "firstname",
            Self::Lastname => "lastname",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "username" => Some(Self::Username),
            "firstname" => Some(Self::Firstname),
            "lastname" => Some(Self::Lastname),
            _ => None,
        }
    }
}

/// Account fields parsed out of an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFields {
    pub username: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

impl IdentityFields {
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Username => self.username.as_deref(),
            Field::Firstname => self.firstname.as_deref(),
            Field::Lastname => self.lastname.as_deref(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.firstname.is_none() && self.lastname.is_none()
    }

    /// Local account name: `username` when present, otherwise first and last
    /// name glued together. `None` if that ends up empty.
    #[must_use]
    pub fn login_name(&self) -> Option<String> {
        let login = match self.username.as_deref() {
            Some(username) if !username.is_empty() => username.to_string(),
            _ => format!(
                "{}{}",
                self.firstname.as_deref().unwrap_or_default(),
                self.lastname.as_deref().unwrap_or_default()
            ),
        };

        (!login.is_empty()).then_some(login)
    }

    fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Username => &mut self.username,
            Field::Firstname => &mut self.firstname,
            Field::Lastname => &mut self.lastname,
        };
        *slot = Some(value.to_string());
    }
}

/// Positional layout of a macaroon identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierTemplate {
    positions: Vec<Option<Field>>,
}

impl IdentifierTemplate {
    /// Parse an identifier format such as `{{username}};{{firstname}}`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for unknown or repeated placeholders, or a
    /// format without any placeholder.
    pub fn parse(format: &str) -> Result<Self, TemplateError> {
        let re = Regex::new(&format!("^{PLACEHOLDER}$"))?;

        let mut positions = Vec::new();
        for segment in format.split(DELIMITER) {
            let field = match re.captures(segment).and_then(|c| c.get(1)) {
                Some(name) => {
                    let field = Field::from_name(name.as_str())
                        .ok_or_else(|| TemplateError::UnknownPlaceholder(name.as_str().to_string()))?;
                    if positions.contains(&Some(field)) {
                        return Err(TemplateError::DuplicatePlaceholder(field.as_str().to_string()));
                    }
                    Some(field)
                }
                None => None,
            };
            positions.push(field);
        }

        if positions.iter().all(Option::is_none) {
            return Err(TemplateError::NoPlaceholders);
        }

        Ok(Self { positions })
    }

    /// Number of `;` separated positions an identifier must have.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.positions.len()
    }

    /// Split `identifier` and pick out the templated fields.
    ///
    /// An identifier with a different number of positions yields empty
    /// fields rather than an error.
    #[must_use]
    pub fn map(&self, identifier: &str) -> IdentityFields {
        let values: Vec<&str> = identifier.split(DELIMITER).collect();
        let mut fields = IdentityFields::default();

        if values.len() != self.positions.len() {
            return fields;
        }

        for (field, value) in self.positions.iter().zip(values) {
            if let Some(field) = field {
                fields.set(*field, value);
            }
        }

        fields
    }
}

/// E-mail address template using `{{firstname}}` and `{{lastname}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate(String);

impl EmailTemplate {
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownPlaceholder`] for any placeholder other
    /// than `{{firstname}}` and `{{lastname}}`.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let re = Regex::new(PLACEHOLDER)?;
        for captures in re.captures_iter(template) {
            let name = captures.get(1).map_or("", |m| m.as_str());
            if !matches!(Field::from_name(name), Some(Field::Firstname | Field::Lastname)) {
                return Err(TemplateError::UnknownPlaceholder(name.to_string()));
            }
        }
        Ok(Self(template.to_string()))
    }

    /// Substitute the placeholders literally; missing fields become empty.
    #[must_use]
    pub fn render(&self, fields: &IdentityFields) -> String {
        [Field::Firstname, Field::Lastname]
            .into_iter()
            .fold(self.0.clone(), |out, field| {
                out.replace(
                    &format!("{{{{{}}}}}", field.as_str()),
                    fields.get(field).unwrap_or_default(),
                )
            })
    }
}
