use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::archive::zip_directory;
use crate::cli::Cli;
use crate::error::Result;
use crate::export::{write_day_files, write_dummy_channel_dir, write_metadata_files};
use crate::history::fetch_history;
use crate::load_token;
use crate::message::ConversationKind;
use crate::select::{
    filter_conversations_by_name, filter_dms_by_user, prompt_for_conversations, prompt_for_dms,
    select_conversations,
};
use crate::settings::Settings;
use crate::slack::{ConversationInfo, SlackClient};
use crate::workspace::Workspace;

/// Run the whole export: authenticate, snapshot the workspace, select
/// conversations, then fetch, merge and write one conversation at a time.
pub async fn run_export(cli: Cli) -> Result<()> {
    let token = load_token(cli.token.clone())?;
    let settings = Settings::load()?;
    let delay = settings.delay();
    let page_size = cli.page_size.unwrap_or(settings.export.page_size);
    let client = SlackClient::new(token, page_size, settings.export.api_base_url.clone());

    let auth = client.auth_test().await?;
    println!(
        "Successfully authenticated for team {} and user {}",
        auth.team, auth.user
    );

    let workspace = Workspace::bootstrap(&client, auth.user_id, delay).await?;

    let any_specified =
        cli.public_channels.is_some() || cli.groups.is_some() || cli.direct_messages.is_some();

    let selected_channels = select_conversations(
        &workspace.channels,
        cli.public_channels.as_deref(),
        any_specified,
        cli.prompt,
        filter_conversations_by_name,
        |all| prompt_for_conversations(all, "Select the Public Channels you want to export:"),
    )?;

    let selected_groups = select_conversations(
        &workspace.groups,
        cli.groups.as_deref(),
        any_specified,
        cli.prompt,
        filter_conversations_by_name,
        |all| {
            prompt_for_conversations(
                all,
                "Select the Private Channels and Group DMs you want to export:",
            )
        },
    )?;

    let selected_dms = select_conversations(
        &workspace.dms,
        cli.direct_messages.as_deref(),
        any_specified,
        cli.prompt,
        |all, names| filter_dms_by_user(all, names, &workspace.user_ids_by_name),
        |all| prompt_for_dms(all, &workspace),
    )?;

    if cli.dry_run {
        print_dry_run(&workspace, &selected_channels, &selected_groups, &selected_dms);
        return Ok(());
    }

    let output_dir = match &cli.output {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(format!(
            "{}-slack_export",
            Local::now().format("%Y%m%d-%H%M%S")
        )),
    };
    fs::create_dir_all(&output_dir)?;

    write_metadata_files(&output_dir, &workspace)?;

    for channel in &selected_channels {
        let dir_name = channel.display_name().to_string();
        println!("Fetching history for Public Channel: {dir_name}");
        let messages = fetch_history(&client, &channel.id, delay).await?;
        write_day_files(&output_dir, &dir_name, ConversationKind::Channel, &messages)?;
    }

    if !selected_groups.is_empty() {
        if selected_channels.is_empty() {
            write_dummy_channel_dir(&output_dir, &workspace)?;
        }
        for group in &selected_groups {
            let dir_name = group.display_name().to_string();
            println!("Fetching history for Private Channel / Group DM: {dir_name}");
            let messages = fetch_history(&client, &group.id, delay).await?;
            write_day_files(&output_dir, &dir_name, ConversationKind::Group, &messages)?;
        }
    }

    for dm in &selected_dms {
        println!("Fetching 1:1 DMs with {}", workspace.dm_display_name(dm));
        let messages = fetch_history(&client, &dm.id, delay).await?;
        write_day_files(&output_dir, &dm.id, ConversationKind::Im, &messages)?;
    }

    if let Some(zip_name) = &cli.zip {
        let zip_path = zip_directory(&output_dir, zip_name)?;
        fs::remove_dir_all(&output_dir)?;
        println!("Export packed into {}", zip_path.display());
    } else {
        println!("Export written to {}", output_dir.display());
    }

    Ok(())
}

fn print_dry_run(
    workspace: &Workspace,
    channels: &[ConversationInfo],
    groups: &[ConversationInfo],
    dms: &[ConversationInfo],
) {
    println!("Public Channels selected for export:");
    for channel in channels {
        println!("{}", channel.display_name());
    }
    println!();

    println!("Private Channels and Group DMs selected for export:");
    for group in groups {
        println!("{}", group.display_name());
    }
    println!();

    println!("1:1 DMs selected for export:");
    for dm in dms {
        println!("{}", workspace.dm_display_name(dm));
    }
    println!();
}
