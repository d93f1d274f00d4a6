use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::UsageRecord;

#[derive(Clone)]
pub struct MongoUsageRepository {
    collection: Collection<UsageRecord>,
}

impl MongoUsageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("usage");
        Self { collection }
    }

    pub async fn insert(&self, record: UsageRecord) -> Result<()> {
        self.collection.insert_one(record).await?;
        Ok(())
    }

    pub async fn total_tokens(&self, user_id: &str) -> Result<u64> {
        let records: Vec<UsageRecord> = self
            .collection
            .find(doc! { "user_id": user_id })
            .await?
            .try_collect()
            .await?;
        Ok(records.iter().map(|r| u64::from(r.total_tokens)).sum())
    }
}
