use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::client_reply::ClientReply;
use crate::model::quote::{QuoteResponse, ResponseChannel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
}

/// One line of the merged conversation shown under a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub direction: Direction,
    pub channel: ResponseChannel,
    pub message: String,
    pub author: String,
    pub created_at: String,
}

impl HistoryEntry {
    pub fn outbound(response: &QuoteResponse) -> Self {
        HistoryEntry {
            direction: Direction::Outbound,
            channel: response.channel,
            message: response.message.clone(),
            author: "admin".to_string(),
            created_at: response.created_at.clone(),
        }
    }

    pub fn inbound(reply: &ClientReply) -> Self {
        HistoryEntry {
            direction: Direction::Inbound,
            channel: reply.channel,
            message: reply.message.clone(),
            author: reply.from.clone().unwrap_or_else(|| "client".to_string()),
            created_at: reply.created_at.clone(),
        }
    }

    fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.created_at).ok()
    }
}

/// Merge outbound responses and inbound replies into one ascending timeline.
///
/// The sort is stable over `outbound ++ inbound`, so equal timestamps keep
/// outbound entries first. Unparsable timestamps sort before everything else.
pub fn merge_history(responses: &[QuoteResponse], replies: &[ClientReply]) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = responses
        .iter()
        .map(HistoryEntry::outbound)
        .chain(replies.iter().map(HistoryEntry::inbound))
        .collect();
    entries.sort_by_cached_key(HistoryEntry::timestamp);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(message: &str, at: &str) -> QuoteResponse {
        QuoteResponse {
            channel: ResponseChannel::Email,
            message: message.to_string(),
            created_at: at.to_string(),
        }
    }

    fn reply(message: &str, at: &str) -> ClientReply {
        ClientReply {
            id: None,
            quote_id: "q1".to_string(),
            from: Some("client@example.com".to_string()),
            channel: ResponseChannel::Email,
            message: message.to_string(),
            created_at: at.to_string(),
        }
    }

    fn messages(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn test_out_of_order_inputs_come_out_chronological() {
        let responses = vec![
            response("r3", "2024-05-03T09:00:00Z"),
            response("r1", "2024-05-01T09:00:00Z"),
        ];
        let replies = vec![
            reply("c4", "2024-05-04T09:00:00+02:00"),
            reply("c2", "2024-05-02T09:00:00Z"),
        ];
        let merged = merge_history(&responses, &replies);
        assert_eq!(messages(&merged), vec!["r1", "c2", "r3", "c4"]);
        assert_eq!(merged[1].direction, Direction::Inbound);
        assert_eq!(merged[1].author, "client@example.com");
    }

    #[test]
    fn test_offsets_are_compared_as_instants() {
        let responses = vec![response("late", "2024-05-01T10:30:00+02:00")];
        let replies = vec![reply("early", "2024-05-01T08:00:00Z")];
        assert_eq!(messages(&merge_history(&responses, &replies)), vec!["early", "late"]);
    }

    #[test]
    fn test_equal_timestamps_keep_outbound_first() {
        let at = "2024-05-01T09:00:00.000Z";
        let merged = merge_history(&[response("out", at)], &[reply("in", at)]);
        assert_eq!(messages(&merged), vec!["out", "in"]);
    }

    #[test]
    fn test_unparsable_timestamps_sort_first_in_source_order() {
        let responses = vec![response("ok", "2024-05-01T09:00:00Z"), response("bad1", "hier")];
        let replies = vec![reply("bad2", "")];
        assert_eq!(messages(&merge_history(&responses, &replies)), vec!["bad1", "bad2", "ok"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_history(&[], &[]).is_empty());
    }
}
