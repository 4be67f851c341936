use anyhow::Result;
use futures::stream::StreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions},
    Collection, Cursor, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::error;

/// Mongo error code for a violated unique index
const DUPLICATE_KEY_ERROR_CODE: i32 = 11000;

/// Persistence shape of a domain entity that this service reads
pub trait MongoDocument<E>: DeserializeOwned {
    fn to_domain(self) -> E;
}

/// Persistence shape of a domain entity that this service also writes
pub trait MongoWritableDocument<E>: MongoDocument<E> + Serialize {
    fn from_domain(entity: &E) -> Self;
}

fn get_id_filter(oid: &ObjectId) -> Document {
    doc! {
        "_id": oid
    }
}

fn entity_to_persistence<E, D: MongoWritableDocument<E>>(entity: &E) -> Result<Document> {
    let raw = D::from_domain(entity);
    bson::to_document(&raw).map_err(anyhow::Error::new)
}

pub fn persistence_to_entity<E, D: MongoDocument<E>>(doc: Document) -> Result<E> {
    let raw: D = bson::from_document(doc)?;
    Ok(raw.to_domain())
}

/// Checks if the given error was caused by a unique index rejecting a write
pub fn is_duplicate_key_error(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<mongodb::error::Error>() {
        Some(e) => match e.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
                write_error.code == DUPLICATE_KEY_ERROR_CODE
            }
            // find_one_and_update reports it as a command error
            ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_ERROR_CODE,
            _ => false,
        },
        None => false,
    }
}

pub async fn create_index(
    collection: &Collection<Document>,
    keys: Document,
    unique: bool,
) -> Result<()> {
    let options = IndexOptions::builder().unique(unique).build();
    let index = IndexModel::builder().keys(keys).options(options).build();
    collection.create_index(index, None).await?;
    Ok(())
}

pub async fn insert<E, D: MongoWritableDocument<E>>(
    collection: &Collection<Document>,
    entity: &E,
) -> Result<()> {
    let doc = entity_to_persistence::<E, D>(entity)?;
    collection.insert_one(doc, None).await?;
    Ok(())
}

pub async fn find<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    id: &ObjectId,
) -> Result<Option<E>> {
    let filter = get_id_filter(id);
    find_one_by::<E, D>(collection, filter).await
}

/// Both a failing query and a document that can not be read are errors,
/// only a missing document is `None`
pub async fn find_one_by<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    filter: Document,
) -> Result<Option<E>> {
    match collection.find_one(filter, None).await? {
        Some(doc) => persistence_to_entity::<E, D>(doc).map(Some),
        None => Ok(None),
    }
}

pub async fn find_many_by<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    filter: Document,
    options: Option<FindOptions>,
) -> Result<Vec<E>> {
    let cursor = collection.find(filter, options).await?;
    Ok(consume_cursor::<E, D>(cursor).await)
}

pub async fn delete<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    id: &ObjectId,
) -> Option<E> {
    let filter = get_id_filter(id);
    match collection.find_one_and_delete(filter, None).await {
        Ok(Some(doc)) => persistence_to_entity::<E, D>(doc).ok(),
        Ok(None) => None,
        Err(e) => {
            error!("Delete query failed: {:?}", e);
            None
        }
    }
}

async fn consume_cursor<E, D: MongoDocument<E>>(mut cursor: Cursor<Document>) -> Vec<E> {
    let mut documents = vec![];
    while let Some(result) = cursor.next().await {
        match result.map_err(anyhow::Error::new).and_then(persistence_to_entity::<E, D>) {
            Ok(entity) => documents.push(entity),
            Err(e) => {
                error!("Error reading document from cursor: {:?}", e);
            }
        }
    }

    documents
}
