use crate::auth::AuthConfig;
use crate::cli::actions::{inspect, verify, Action};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn verify_args(matches: &clap::ArgMatches) -> Result<verify::Args> {
    let source = match (
        matches.get_one::<String>("token"),
        matches.get_one::<String>("cookie-header"),
    ) {
        (Some(token), None) => verify::Source::Token(SecretString::from(token.as_str())),
        (None, Some(header)) => verify::Source::CookieHeader(SecretString::from(header.as_str())),
        _ => return Err(anyhow!("exactly one of --token or --cookie-header is required")),
    };

    let mut config = AuthConfig::new(SecretString::from(required(matches, "secret")?));
    config.cookie_name = required(matches, "cookie-name")?;
    config.identifier_format = required(matches, "identifier-format")?;
    config.email_template = required(matches, "email-template")?;

    // Conditions are compared byte for byte, so they are not trimmed.
    let config = ["caveat", "caveats"]
        .into_iter()
        .filter_map(|name| matches.get_many::<String>(name))
        .flatten()
        .map(String::as_str)
        .fold(config, AuthConfig::with_caveat_condition);

    Ok(verify::Args { source, config })
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("verify", sub_m)) => Ok(Action::Verify(verify_args(sub_m)?)),
        Some(("inspect", sub_m)) => Ok(Action::Inspect(inspect::Args {
            token: SecretString::from(required(sub_m, "token")?),
        })),
        _ => Err(anyhow!("unknown subcommand")),
    }
}
