use async_trait::async_trait;
use log::{debug, info};
use rusoto_core::{credential::StaticProvider, HttpClient, Region};
use rusoto_dynamodb::{DynamoDb, DynamoDbClient, PutItemInput};
use super::config::{Config, CredentialSource};
use super::error::StoreError;
use super::parser::{build_item, Record};

/// Something records can be put into, one item per call.
#[async_trait]
pub trait TableStore {
    fn table_name(&self) -> &str;

    // insert the record, or fully replace the item with the same key
    async fn put_item(&self, record: &Record) -> Result<(), StoreError>;
}

pub struct Dynamo {
    client: DynamoDbClient,
    table_name: String,
}

impl Dynamo {
    pub fn connect(config: &Config) -> Result<Dynamo, StoreError> {
        let region = resolve_region(config)?;
        info!("Connecting to DynamoDB table {} in {}", config.table_name, region.name());

        let client = match &config.credential_source {
            CredentialSource::Implicit => {
                debug!("Using credentials from the environment");
                DynamoDbClient::new(region)
            }
            CredentialSource::Explicit { access_key, secret_key } => {
                debug!("Using explicit credentials for access key {}", access_key);
                let credentials = StaticProvider::new_minimal(access_key.to_owned(), secret_key.to_owned());
                DynamoDbClient::new_with(HttpClient::new()?, credentials, region)
            }
        };

        Ok(Dynamo {
            client,
            table_name: config.table_name.to_owned(),
        })
    }
}

#[async_trait]
impl TableStore for Dynamo {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn put_item(&self, record: &Record) -> Result<(), StoreError> {
        let input = PutItemInput {
            table_name: self.table_name.to_owned(),
            item: build_item(record),
            ..Default::default()
        };

        self.client.put_item(input).await?;
        Ok(())
    }
}

// a custom endpoint keeps the region name for request signing
fn resolve_region(config: &Config) -> Result<Region, StoreError> {
    match &config.endpoint {
        Some(endpoint) => Ok(Region::Custom {
            name: config.region.to_owned(),
            endpoint: endpoint.to_owned(),
        }),
        None => config
            .region
            .parse()
            .map_err(|_| StoreError::InvalidRegion(config.region.to_owned())),
    }
}
