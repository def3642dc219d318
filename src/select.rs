use std::collections::HashMap;

use inquire::MultiSelect;

use crate::slack::ConversationInfo;
use crate::workspace::Workspace;
use crate::{AppError, Result};

/// Pick which conversations of one kind reach the export pipeline.
///
/// - a non-empty name list on the command line filters by name;
/// - a kind given without names, or no kind given at all, selects everything
///   (or opens the interactive prompt when `use_prompt` is set);
/// - otherwise some other kind was requested, so this one exports nothing.
pub fn select_conversations<F, P>(
    all: &[ConversationInfo],
    arg: Option<&[String]>,
    any_specified: bool,
    use_prompt: bool,
    filter: F,
    prompt: P,
) -> Result<Vec<ConversationInfo>>
where
    F: Fn(&[ConversationInfo], &[String]) -> Vec<ConversationInfo>,
    P: Fn(&[ConversationInfo]) -> Result<Vec<ConversationInfo>>,
{
    match arg {
        Some(names) if !names.is_empty() => Ok(filter(all, names)),
        Some(_) => {
            if use_prompt {
                prompt(all)
            } else {
                Ok(all.to_vec())
            }
        }
        None if !any_specified => {
            if use_prompt {
                prompt(all)
            } else {
                Ok(all.to_vec())
            }
        }
        None => Ok(Vec::new()),
    }
}

pub fn filter_conversations_by_name(
    conversations: &[ConversationInfo],
    names: &[String],
) -> Vec<ConversationInfo> {
    conversations
        .iter()
        .filter(|c| {
            c.name
                .as_deref()
                .is_some_and(|name| names.iter().any(|wanted| wanted == name))
        })
        .cloned()
        .collect()
}

/// DMs are matched by the peer's user name or raw user id.
pub fn filter_dms_by_user(
    dms: &[ConversationInfo],
    names_or_ids: &[String],
    user_ids_by_name: &HashMap<String, String>,
) -> Vec<ConversationInfo> {
    let ids: Vec<&str> = names_or_ids
        .iter()
        .map(|name_or_id| {
            user_ids_by_name
                .get(name_or_id)
                .map(String::as_str)
                .unwrap_or(name_or_id.as_str())
        })
        .collect();

    dms.iter()
        .filter(|dm| dm.user.as_deref().is_some_and(|user| ids.contains(&user)))
        .cloned()
        .collect()
}

/// Interactive multi-select over conversation display names.
pub fn prompt_for_conversations(
    conversations: &[ConversationInfo],
    title: &str,
) -> Result<Vec<ConversationInfo>> {
    let labels: Vec<String> = conversations
        .iter()
        .map(|c| c.display_name().to_string())
        .collect();
    let picked = multi_select(title, labels)?;
    Ok(resolve_picked(conversations, &picked))
}

pub fn prompt_for_dms(dms: &[ConversationInfo], workspace: &Workspace) -> Result<Vec<ConversationInfo>> {
    let labels: Vec<String> = dms.iter().map(|dm| workspace.dm_display_name(dm)).collect();
    let picked = multi_select("Select the 1:1 DMs you want to export:", labels)?;
    Ok(resolve_picked(dms, &picked))
}

fn multi_select(title: &str, labels: Vec<String>) -> Result<Vec<usize>> {
    if labels.is_empty() {
        return Ok(Vec::new());
    }
    let picked = MultiSelect::new(title, labels)
        .raw_prompt()
        .map_err(|e| AppError::Prompt(e.to_string()))?;
    Ok(picked.into_iter().map(|option| option.index).collect())
}

fn resolve_picked(conversations: &[ConversationInfo], indices: &[usize]) -> Vec<ConversationInfo> {
    indices
        .iter()
        .filter_map(|&index| conversations.get(index).cloned())
        .collect()
}
