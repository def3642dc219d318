use std::collections::HashMap;
use std::time::Duration;

use tokio::time::sleep;

use crate::Result;
use crate::slack::{ConversationInfo, SlackClient};

/// Snapshot of the workspace taken once at startup and passed by reference
/// into the export pipeline.
#[derive(Debug, Default)]
pub struct Workspace {
    /// Raw user objects, dumped verbatim into `users.json`.
    pub users: Vec<serde_json::Value>,
    pub channels: Vec<ConversationInfo>,
    /// Private channels and group DMs (mpims), as Slack lists them together.
    pub groups: Vec<ConversationInfo>,
    pub dms: Vec<ConversationInfo>,
    pub user_names_by_id: HashMap<String, String>,
    pub user_ids_by_name: HashMap<String, String>,
    pub token_owner_id: String,
}

impl Workspace {
    /// List users and every conversation type, waiting `delay` between
    /// listing calls to respect the API rate limit.
    pub async fn bootstrap(
        client: &SlackClient,
        token_owner_id: String,
        delay: Duration,
    ) -> Result<Self> {
        let users = client.list_users().await?;
        println!("Found {} Users", users.len());
        sleep(delay).await;

        let channels = client.list_conversations("public_channel").await?;
        println!("Found {} Public Channels", channels.len());
        sleep(delay).await;

        let groups = client.list_conversations("private_channel,mpim").await?;
        println!("Found {} Private Channels or Group DMs", groups.len());
        sleep(delay).await;

        let dms = client.list_conversations("im").await?;
        println!("Found {} 1:1 DM conversations\n", dms.len());
        sleep(delay).await;

        let (user_names_by_id, user_ids_by_name) = build_user_maps(&users);

        Ok(Self {
            users,
            channels,
            groups,
            dms,
            user_names_by_id,
            user_ids_by_name,
            token_owner_id,
        })
    }

    /// Human-readable label for a DM, used by prompts and progress output.
    pub fn dm_display_name(&self, dm: &ConversationInfo) -> String {
        match dm.user.as_deref() {
            Some(user) => self
                .user_names_by_id
                .get(user)
                .cloned()
                .unwrap_or_else(|| format!("{user} (name unknown)")),
            None => dm.id.clone(),
        }
    }
}

fn build_user_maps(
    users: &[serde_json::Value],
) -> (HashMap<String, String>, HashMap<String, String>) {
    let mut names_by_id = HashMap::new();
    let mut ids_by_name = HashMap::new();

    for user in users {
        let id = user.get("id").and_then(|v| v.as_str());
        let name = user.get("name").and_then(|v| v.as_str());
        if let (Some(id), Some(name)) = (id, name) {
            names_by_id.insert(id.to_string(), name.to_string());
            ids_by_name.insert(name.to_string(), id.to_string());
        }
    }

    (names_by_id, ids_by_name)
}
