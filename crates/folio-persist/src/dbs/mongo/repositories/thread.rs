use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::IndexOptions;
use mongodb::{bson::doc, Client, Collection, IndexModel};

use crate::error::{PersistError, Result};
use crate::models::{ThreadMessage, ThreadRecord};

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<ThreadRecord>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "thread_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Replace by `thread_id`, keeping the original creation time
    pub async fn upsert(&self, thread: ThreadRecord) -> Result<()> {
        let mut thread = thread;
        let filter = doc! { "thread_id": thread.thread_id.as_str() };

        if let Some(existing) = self.collection.find_one(filter.clone()).await? {
            thread.created_at = existing.created_at;
        }
        thread.updated_at = Utc::now();

        self.collection
            .replace_one(filter, &thread)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn get(&self, thread_id: &str, user_id: &str) -> Result<Option<ThreadRecord>> {
        let filter = doc! { "thread_id": thread_id, "user_id": user_id };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<ThreadRecord>> {
        let threads = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "updated_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    pub async fn update_messages(
        &self,
        thread_id: &str,
        messages: Vec<ThreadMessage>,
        summary: Option<String>,
    ) -> Result<()> {
        let update = doc! {
            "$set": {
                "messages": bson::to_bson(&messages)?,
                "summary": bson::to_bson(&summary)?,
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };

        let result = self
            .collection
            .update_one(doc! { "thread_id": thread_id }, update)
            .await?;

        if result.matched_count == 0 {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }
        Ok(())
    }
}
