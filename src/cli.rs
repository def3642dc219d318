use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "slack-export")]
#[command(about = "Export the full message history of a Slack workspace to per-day JSON files")]
pub struct Cli {
    /// Slack API token (falls back to the SLACK_TOKEN environment variable)
    #[arg(long)]
    pub token: Option<String>,

    /// Name of a zip file to pack the export into
    #[arg(long)]
    pub zip: Option<String>,

    /// List the conversations that would be exported (don't fetch/write history)
    #[arg(long)]
    pub dry_run: bool,

    /// Export the given Public Channels
    #[arg(long, num_args = 0.., value_name = "CHANNEL_NAME")]
    pub public_channels: Option<Vec<String>>,

    /// Export the given Private Channels / Group DMs
    #[arg(long, num_args = 0.., value_name = "GROUP_NAME")]
    pub groups: Option<Vec<String>>,

    /// Export 1:1 DMs with the given users (by name or id)
    #[arg(long, num_args = 0.., value_name = "USER_NAME")]
    pub direct_messages: Option<Vec<String>>,

    /// Prompt to select the conversations to export
    #[arg(long)]
    pub prompt: bool,

    /// Messages requested per history/replies page (overrides settings.toml)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Output directory, defaults to <YYYYmmdd-HHMMSS>-slack_export
    #[arg(short, long)]
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args() {
        let cli = Cli::parse_from(["slack-export"]);

        assert!(cli.token.is_none());
        assert!(cli.public_channels.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.prompt);
        assert!(cli.page_size.is_none());
    }

    #[test]
    fn test_page_size_flag() {
        let cli = Cli::parse_from(["slack-export", "--page-size", "50"]);

        assert_eq!(cli.page_size, Some(50));
    }

    #[test]
    fn test_kind_flag_without_names_is_empty_list() {
        let cli = Cli::parse_from(["slack-export", "--public-channels"]);

        assert_eq!(cli.public_channels, Some(Vec::new()));
        assert!(cli.groups.is_none());
    }

    #[test]
    fn test_kind_flag_with_names() {
        let cli = Cli::parse_from(["slack-export", "--groups", "team-a", "team-b"]);

        assert_eq!(
            cli.groups,
            Some(vec!["team-a".to_string(), "team-b".to_string()])
        );
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "slack-export",
            "--token",
            "xoxp-123",
            "--dry-run",
            "--zip",
            "backup",
            "--output",
            "out",
        ]);

        assert_eq!(cli.token.as_deref(), Some("xoxp-123"));
        assert!(cli.dry_run);
        assert_eq!(cli.zip.as_deref(), Some("backup"));
        assert_eq!(cli.output.as_deref(), Some("out"));
    }
}
