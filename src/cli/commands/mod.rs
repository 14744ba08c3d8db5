use crate::auth::config::{DEFAULT_COOKIE_NAME, DEFAULT_EMAIL_TEMPLATE, DEFAULT_IDENTIFIER_FORMAT};
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ArgGroup, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn verify() -> Command {
    Command::new("verify")
        .about("Verify a macaroon and print the account it logs in")
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .help("Serialized macaroon")
                .env("MACAROON_AUTH_TOKEN")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("cookie-header")
                .long("cookie-header")
                .help("Raw Cookie header to read the macaroon from")
                .env("MACAROON_AUTH_COOKIE_HEADER")
                .hide_env_values(true),
        )
        .group(
            ArgGroup::new("source")
                .args(["token", "cookie-header"])
                .required(true),
        )
        .arg(
            Arg::new("secret")
                .short('s')
                .long("secret")
                .help("Secret the macaroon was signed with")
                .env("MACAROON_AUTH_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("cookie-name")
                .short('c')
                .long("cookie-name")
                .help("Name of the cookie the macaroon is stored in")
                .default_value(DEFAULT_COOKIE_NAME)
                .env("MACAROON_AUTH_COOKIE_NAME"),
        )
        .arg(
            Arg::new("identifier-format")
                .long("identifier-format")
                .help("Identifier format, placeholders: {{username}}, {{firstname}}, {{lastname}}, delimited by ';'")
                .default_value(DEFAULT_IDENTIFIER_FORMAT)
                .env("MACAROON_AUTH_IDENTIFIER_FORMAT"),
        )
        .arg(
            Arg::new("email-template")
                .long("email-template")
                .help("E-mail template, placeholders: {{firstname}}, {{lastname}}")
                .default_value(DEFAULT_EMAIL_TEMPLATE)
                .env("MACAROON_AUTH_EMAIL_TEMPLATE"),
        )
        .arg(
            Arg::new("caveat")
                .long("caveat")
                .help("Accepted caveat condition, matched exactly, may be given up to 3 times")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("caveats")
                .long("caveats")
                .help("Comma separated caveat conditions")
                .env("MACAROON_AUTH_CAVEATS")
                .value_delimiter(',')
                .hide(true)
                .action(ArgAction::Append),
        )
}

fn inspect() -> Command {
    Command::new("inspect")
        .about("Decode a macaroon without verifying it")
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .help("Serialized macaroon")
                .env("MACAROON_AUTH_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("macaroon-auth")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(verify())
        .subcommand(inspect())
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .help("Write logs as JSON")
                .env("MACAROON_AUTH_LOG_JSON")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("MACAROON_AUTH_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
