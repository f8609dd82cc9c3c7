use log::{error, info};
use mongodb::bson::doc;
use mongodb::{Client, IndexModel, options::ClientOptions};
use std::error::Error;

use crate::comment::model::CommentDocument;
use crate::comment::service::COMMENTS_COLLECTION;
use crate::forum::model::ForumPostDocument;
use crate::forum::service::FORUM_COLLECTION;
use crate::utils::config::AppConfig;

pub struct Database {
    pub client: Client,
}

impl Database {
    pub async fn init(config: &AppConfig) -> Result<Self, Box<dyn Error>> {
        let mut client_options = ClientOptions::parse(&config.mongodb_uri).await?;
        client_options.app_name = Some("recipe_forum".to_string());

        let client = Client::with_options(client_options)?;

        // Ping the server to see if you can connect to the cluster
        client
            .database("admin")
            .run_command(doc! {"ping": 1})
            .await?;

        info!("Connected successfully to MongoDB");

        Ok(Self { client })
    }

    /// Indexes backing the per-subject comment fetch and slug lookups.
    pub async fn ensure_indexes(&self, database: &str) -> Result<(), Box<dyn Error>> {
        let db = self.client.database(database);

        db.collection::<CommentDocument>(COMMENTS_COLLECTION)
            .create_index(IndexModel::builder().keys(doc! { "post_slug": 1, "_id": 1 }).build())
            .await?;

        db.collection::<ForumPostDocument>(FORUM_COLLECTION)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "slug": 1 })
                    .options(
                        mongodb::options::IndexOptions::builder()
                            .unique(true)
                            .build(),
                    )
                    .build(),
            )
            .await?;

        Ok(())
    }
}

// This function is a convenience wrapper around Database::init()
pub async fn connect_to_mongo(config: &AppConfig) -> Result<Client, Box<dyn Error>> {
    let database = Database::init(config).await.map_err(|e| {
        error!("Failed to initialize database: {:?}", e);
        e
    })?;
    database.ensure_indexes(&config.database_name).await?;
    Ok(database.client)
}
