use std::time::Duration;

use tokio::time::sleep;

use crate::Result;
use crate::message::{Message, ReplySummary};

/// One page of a time-ordered message listing, newest first.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub messages: Vec<Message>,
    pub has_more: bool,
}

/// Paged access to a conversation's messages and threads.
///
/// Implemented by [`crate::slack::SlackClient`]; tests substitute canned pages.
#[allow(async_fn_in_trait)]
pub trait MessageSource {
    /// One page of root messages, starting at `latest` and moving toward
    /// the beginning of history (`oldest=0`).
    async fn history_page(&self, conversation_id: &str, latest: Option<&str>) -> Result<Page>;

    /// One page of the reply thread rooted at `thread_ts`, same cursor
    /// semantics. The root message rides along in the response.
    async fn replies_page(
        &self,
        conversation_id: &str,
        thread_ts: &str,
        latest: Option<&str>,
    ) -> Result<Page>;
}

/// Fetch every page of a listing, concatenating the results.
///
/// After the first call the cursor is the `ts` of the most recently retrieved
/// item, so pages walk backward from latest to the start of history. A fixed
/// delay is awaited after each call to respect the Slack API rate limit.
/// Errors from `fetch` propagate unchanged; there is no retry here.
pub async fn fetch_all_pages<F>(delay: Duration, mut fetch: F) -> Result<Vec<Message>>
where
    F: AsyncFnMut(Option<String>) -> Result<Page>,
{
    let mut messages: Vec<Message> = Vec::new();
    let mut latest: Option<String> = None;

    loop {
        let page = fetch(latest.clone()).await?;
        sleep(delay).await;

        let has_more = page.has_more;
        messages.extend(page.messages);

        if !has_more {
            break;
        }
        match messages.last() {
            Some(last) => latest = Some(last.ts.clone()),
            // has_more with nothing retrieved would loop on the same cursor
            None => break,
        }
        log::debug!("message count: {}", messages.len());
    }

    Ok(messages)
}

/// A fully fetched reply thread, split into the two artifacts the
/// assembler needs.
#[derive(Debug, Default)]
pub struct ThreadExpansion {
    /// `{user, ts}` for every reply except the root, in fetch order.
    pub summaries: Vec<ReplySummary>,
    /// Full reply messages, minus the root and minus thread broadcasts
    /// (those already appear as root-level posts).
    pub replies: Vec<Message>,
}

/// Fetch and flatten the reply thread rooted at `thread_ts`.
///
/// A thread with zero non-root replies yields two empty lists.
pub async fn expand_thread<S: MessageSource>(
    source: &S,
    conversation_id: &str,
    thread_ts: &str,
    delay: Duration,
) -> Result<ThreadExpansion> {
    let fetched = fetch_all_pages(delay, async |latest| {
        source
            .replies_page(conversation_id, thread_ts, latest.as_deref())
            .await
    })
    .await?;

    let mut expansion = ThreadExpansion::default();
    for reply in fetched {
        if reply.ts == thread_ts {
            continue;
        }
        expansion.summaries.push(ReplySummary {
            user: reply.user.clone(),
            ts: reply.ts.clone(),
        });
        if reply.is_thread_broadcast() {
            continue;
        }
        expansion.replies.push(reply);
    }

    Ok(expansion)
}

/// Fetch the complete, time-ordered history of one conversation.
///
/// Two phases: all root messages first, then every reply thread, because
/// thread membership is only known once the roots are in hand. Roots and
/// flattened replies are concatenated and re-sorted once at the end so the
/// on-disk ordering interleaves them chronologically regardless of fetch
/// order. Sorts are stable and `ts` keys are unique in practice.
pub async fn fetch_history<S: MessageSource>(
    source: &S,
    conversation_id: &str,
    delay: Duration,
) -> Result<Vec<Message>> {
    let mut messages = fetch_all_pages(delay, async |latest| {
        source.history_page(conversation_id, latest.as_deref()).await
    })
    .await?;
    println!("Total message count: {}", messages.len());

    messages.sort_by(|a, b| a.ts.cmp(&b.ts));

    let mut all_replies: Vec<Message> = Vec::new();
    let mut total_replies = 0usize;
    for root in messages.iter_mut().filter(|m| m.is_thread_root()) {
        let thread_ts = root.ts.clone();
        let expansion = expand_thread(source, conversation_id, &thread_ts, delay).await?;

        root.replies = Some(expansion.summaries);
        total_replies += expansion.replies.len();
        all_replies.extend(expansion.replies);
        log::debug!("thread {thread_ts}: {total_replies} replies so far");
    }
    println!("Total thread replies: {total_replies}");

    messages.append(&mut all_replies);
    messages.sort_by(|a, b| a.ts.cmp(&b.ts));

    Ok(messages)
}
