use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::message::{ConversationKind, Message, file_date};
use crate::workspace::Workspace;
use crate::{AppError, Result};

/// Write any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| AppError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, data).map_err(|e| AppError::JsonSerialize(e.to_string()))?;
    Ok(())
}

/// Write one day's messages, creating the conversation directory on demand.
/// An empty buffer writes nothing; the partitioner relies on this guard for
/// the flush of the initial sentinel state.
pub fn write_message_file(path: &Path, messages: &[&Message]) -> Result<()> {
    if messages.is_empty() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    write_json(path, &messages)
}

/// Move every file written under the old conversation name to the new one.
/// A missing old directory means nothing was written yet; nothing to move.
/// The old directory does not exist afterward.
pub fn rename_conversation_dir(root: &Path, old_name: &str, new_name: &str) -> Result<()> {
    let rename_err = |source| AppError::RenameDir {
        from: old_name.to_string(),
        to: new_name.to_string(),
        source,
    };

    let old_dir = root.join(old_name);
    if !old_dir.is_dir() {
        return Ok(());
    }

    let new_dir = root.join(new_name);
    fs::create_dir_all(&new_dir).map_err(rename_err)?;

    for entry in fs::read_dir(&old_dir).map_err(rename_err)? {
        let entry = entry.map_err(rename_err)?;
        fs::rename(entry.path(), new_dir.join(entry.file_name())).map_err(rename_err)?;
    }
    fs::remove_dir(&old_dir).map_err(rename_err)?;

    log::info!("renamed conversation directory {old_name} -> {new_name}");
    Ok(())
}

/// Partition an ordered message sequence into per-day JSON files under
/// `root/<dir_name>/<YYYY-MM-DD>.json`.
///
/// Single pass: buffer messages until the UTC date changes, then flush the
/// buffer under the previous date. A rename event (`<kind>_name` subtype,
/// never on DMs) relocates everything already written and switches the
/// target directory for all later flushes; the triggering message is
/// buffered like any other.
pub fn write_day_files(
    root: &Path,
    dir_name: &str,
    kind: ConversationKind,
    messages: &[Message],
) -> Result<()> {
    let rename_subtype = kind.rename_subtype();

    let mut current_dir = dir_name.to_string();
    let mut current_date: Option<NaiveDate> = None;
    let mut buffer: Vec<&Message> = Vec::new();

    for message in messages {
        let date = file_date(&message.ts)?;

        if current_date != Some(date) {
            if let Some(previous) = current_date {
                flush_day(root, &current_dir, previous, &buffer)?;
            }
            buffer.clear();
            current_date = Some(date);
        }

        if rename_subtype.is_some()
            && message.subtype.as_deref() == rename_subtype
            && let (Some(new_name), Some(old_name)) = (&message.name, &message.old_name)
        {
            rename_conversation_dir(root, old_name, new_name)?;
            current_dir = new_name.clone();
        }

        buffer.push(message);
    }

    if let Some(date) = current_date {
        flush_day(root, &current_dir, date, &buffer)?;
    }

    Ok(())
}

fn flush_day(root: &Path, dir_name: &str, date: NaiveDate, buffer: &[&Message]) -> Result<()> {
    let path = root
        .join(dir_name)
        .join(format!("{}.json", date.format("%Y-%m-%d")));
    write_message_file(&path, buffer)
}

/// Dump workspace metadata the offline viewer expects: `channels.json`,
/// `groups.json` (non-mpim private channels), `mpims.json`, `dms.json`
/// and `users.json`. Existing files are overwritten.
pub fn write_metadata_files(root: &Path, workspace: &Workspace) -> Result<()> {
    println!("Making channels file");

    let mut private = Vec::new();
    let mut mpims = Vec::new();
    for group in &workspace.groups {
        if group.is_mpim.unwrap_or(false) {
            mpims.push(group.clone());
        } else {
            private.push(group.clone());
        }
    }

    // the viewer wants DMs to carry a members list
    let dms: Vec<_> = workspace
        .dms
        .iter()
        .map(|dm| {
            let mut dm = dm.clone();
            let user = dm.user.clone().unwrap_or_default();
            dm.extra.insert(
                "members".to_string(),
                serde_json::json!([user, workspace.token_owner_id]),
            );
            dm
        })
        .collect();

    write_json(&root.join("channels.json"), &workspace.channels)?;
    write_json(&root.join("groups.json"), &private)?;
    write_json(&root.join("mpims.json"), &mpims)?;
    write_json(&root.join("dms.json"), &dms)?;
    write_json(&root.join("users.json"), &workspace.users)?;

    Ok(())
}

/// Create an empty directory for the first public channel. The viewer errors
/// out on its root screen when no public channel was exported at all.
pub fn write_dummy_channel_dir(root: &Path, workspace: &Workspace) -> Result<()> {
    let Some(first) = workspace.channels.first() else {
        return Ok(());
    };
    let dir = root.join(first.display_name());
    fs::create_dir_all(&dir).map_err(|e| AppError::WriteFile {
        path: dir.display().to_string(),
        source: e,
    })?;
    Ok(())
}
