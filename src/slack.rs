use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::history::{MessageSource, Page};
use crate::message::Message;
use crate::{AppError, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Cursor-paginated listing page size for `users.list` / `conversations.list`.
const LIST_PAGE_LIMIT: u32 = 200;

/// One conversation as listed by `conversations.list`.
///
/// Typed fields are what the exporter routes on; the rest is kept in `extra`
/// so the metadata dumps round-trip the full objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Peer user id, set on DM conversations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mpim: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ConversationInfo {
    /// Display name, falling back to the id (DMs have no name).
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub team: String,
    pub user: String,
    pub user_id: String,
}

/// Thin async client over the Slack Web API methods the exporter needs.
pub struct SlackClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    page_size: u32,
}

impl SlackClient {
    pub fn new(token: String, page_size: u32, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url,
            page_size,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        log::debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Http(e.to_string()))?;
        let response = response
            .error_for_status()
            .map_err(|e| AppError::Http(e.to_string()))?;

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::JsonParse(e.to_string()))
    }

    /// Verify the token works and identify its owner.
    pub async fn auth_test(&self) -> Result<AuthInfo> {
        let response: AuthTestResponse = self.get_json("auth.test", &[]).await?;
        check_ok(response.ok, response.error)?;
        Ok(AuthInfo {
            team: response.team.unwrap_or_default(),
            user: response.user.unwrap_or_default(),
            user_id: response.user_id.unwrap_or_default(),
        })
    }

    /// All workspace users, kept as raw JSON for the `users.json` dump.
    pub async fn list_users(&self) -> Result<Vec<serde_json::Value>> {
        let mut all_users = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("limit", LIST_PAGE_LIMIT.to_string())];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let response: UsersListResponse = self.get_json("users.list", &query).await?;
            check_ok(response.ok, response.error)?;
            all_users.extend(response.members.unwrap_or_default());

            match response.response_metadata.and_then(|m| m.next_cursor) {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(all_users)
    }

    /// All conversations of the given comma-separated Slack types
    /// (e.g. `"public_channel"` or `"private_channel,mpim"`).
    pub async fn list_conversations(&self, types: &str) -> Result<Vec<ConversationInfo>> {
        let mut all_conversations = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![
                ("types", types.to_string()),
                ("limit", LIST_PAGE_LIMIT.to_string()),
            ];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let response: ConversationsListResponse =
                self.get_json("conversations.list", &query).await?;
            check_ok(response.ok, response.error)?;
            all_conversations.extend(response.channels.unwrap_or_default());

            match response.response_metadata.and_then(|m| m.next_cursor) {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(all_conversations)
    }
}

impl MessageSource for SlackClient {
    async fn history_page(&self, conversation_id: &str, latest: Option<&str>) -> Result<Page> {
        let mut query = vec![
            ("channel", conversation_id.to_string()),
            ("oldest", "0".to_string()),
            ("limit", self.page_size.to_string()),
        ];
        if let Some(latest) = latest {
            query.push(("latest", latest.to_string()));
        }

        let response: HistoryResponse = self.get_json("conversations.history", &query).await?;
        response.into_page()
    }

    async fn replies_page(
        &self,
        conversation_id: &str,
        thread_ts: &str,
        latest: Option<&str>,
    ) -> Result<Page> {
        let mut query = vec![
            ("channel", conversation_id.to_string()),
            ("ts", thread_ts.to_string()),
            ("oldest", "0".to_string()),
            ("limit", self.page_size.to_string()),
        ];
        if let Some(latest) = latest {
            query.push(("latest", latest.to_string()));
        }

        let response: HistoryResponse = self.get_json("conversations.replies", &query).await?;
        response.into_page()
    }
}

fn check_ok(ok: bool, error: Option<String>) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(AppError::SlackApi(
            error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
    error: Option<String>,
    team: Option<String>,
    user: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsersListResponse {
    ok: bool,
    error: Option<String>,
    members: Option<Vec<serde_json::Value>>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ConversationsListResponse {
    ok: bool,
    error: Option<String>,
    channels: Option<Vec<ConversationInfo>>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    error: Option<String>,
    messages: Option<Vec<Message>>,
    has_more: Option<bool>,
}

impl HistoryResponse {
    fn into_page(self) -> Result<Page> {
        check_ok(self.ok, self.error)?;
        Ok(Page {
            messages: self.messages.unwrap_or_default(),
            has_more: self.has_more.unwrap_or(false),
        })
    }
}
