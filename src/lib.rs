pub mod archive;
pub mod cli;
pub mod commands;
pub mod error;
pub mod export;
pub mod history;
pub mod message;
pub mod select;
pub mod settings;
pub mod slack;
pub mod workspace;

pub use cli::Cli;
pub use error::{AppError, Result};

/// Resolve the API token from the command line or the environment.
pub fn load_token(cli_token: Option<String>) -> Result<String> {
    cli_token
        .or_else(|| std::env::var("SLACK_TOKEN").ok())
        .ok_or(AppError::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_token_prefers_cli_argument() {
        let token = load_token(Some("xoxp-cli".to_string())).unwrap();
        assert_eq!(token, "xoxp-cli");
    }
}
