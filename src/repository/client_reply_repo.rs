use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::{options::FindOptions, Collection, Database};
use tracing::{info, instrument};

use crate::model::client_reply::ClientReply;
use crate::repository::mongo::collect_all;
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait ClientReplyRepository: Send + Sync {
    async fn create(&self, reply: ClientReply) -> RepositoryResult<ClientReply>;
    async fn list_for_quote(&self, quote_id: &str) -> RepositoryResult<Vec<ClientReply>>;
}

pub struct MongoClientReplyRepository {
    collection: Collection<ClientReply>,
}

impl MongoClientReplyRepository {
    pub fn new(db: &Database) -> Self {
        MongoClientReplyRepository { collection: db.collection("client_replies") }
    }
}

#[async_trait]
impl ClientReplyRepository for MongoClientReplyRepository {
    #[instrument(skip(self, reply), fields(quote_id = %reply.quote_id))]
    async fn create(&self, mut reply: ClientReply) -> RepositoryResult<ClientReply> {
        reply.id = Some(ObjectId::new());
        self.collection.insert_one(&reply, None).await?;
        info!("Client reply recorded");
        Ok(reply)
    }

    #[instrument(skip(self))]
    async fn list_for_quote(&self, quote_id: &str) -> RepositoryResult<Vec<ClientReply>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();
        let cursor = self.collection.find(doc! { "quoteId": quote_id }, options).await?;
        collect_all(cursor).await
    }
}
