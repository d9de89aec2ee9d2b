use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::quote::ResponseChannel;

/// Inbound message from the customer about a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientReply {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub quote_id: String,
    pub from: Option<String>,
    pub channel: ResponseChannel,
    pub message: String,
    pub created_at: String,
}
