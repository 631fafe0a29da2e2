use std::{error::Error, fmt};

use tracing::{debug, warn};
use weaviate_store::models::{BatchObject, BatchObjectResponse, InsertResult, RecordProperties};

use super::{BridgeError, WeaviateBridge};

/// A nested error reported for one submitted object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectError {
    /// Position of the object in the submitted batch.
    pub index: usize,
    pub message: String,
}

/// The backend accepted the batch but rejected some of its objects.
///
/// Always holds at least one failure, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialWriteError {
    failures: Vec<ObjectError>,
}

impl PartialWriteError {
    #[must_use]
    pub fn failures(&self) -> &[ObjectError] {
        &self.failures
    }

    /// Failures attributed to the object at `index`.
    pub fn for_object(&self, index: usize) -> impl Iterator<Item = &ObjectError> {
        self.failures.iter().filter(move |failure| failure.index == index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for PartialWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, failure) in self.failures.iter().enumerate() {
            if position > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&failure.message)?;
        }
        Ok(())
    }
}

impl Error for PartialWriteError {}

/// Batch entries together with every nested error they carried.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub responses: Vec<BatchObjectResponse>,
    pub errors: Option<PartialWriteError>,
}

impl BatchReport {
    #[must_use]
    pub fn from_responses(responses: Vec<BatchObjectResponse>) -> Self {
        let failures: Vec<ObjectError> = responses
            .iter()
            .enumerate()
            .flat_map(|(index, response)| {
                response
                    .error_messages()
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |message| ObjectError {
                        index,
                        message: message.to_string(),
                    })
            })
            .collect();

        let errors = if failures.is_empty() {
            None
        } else {
            Some(PartialWriteError { failures })
        };
        Self { responses, errors }
    }
}

impl WeaviateBridge {
    /// Inserts one object through the batch endpoint.
    ///
    /// The batch path is used even for a single object so that writes go
    /// through Weaviate's auto-schema handling.
    ///
    /// # Errors
    /// Returns `BridgeError::PartialWrite` with every nested message if the
    /// object was rejected, or any transport error from the batch call.
    pub async fn insert_object(
        &self,
        collection: &str,
        properties: RecordProperties,
    ) -> Result<InsertResult, BridgeError> {
        let object = BatchObject {
            class: collection.to_string(),
            properties,
        };
        let report = self.batch_insert(vec![object]).await?;
        if let Some(errors) = report.errors {
            warn!(collection, failures = errors.len(), "weaviate rejected object: {errors}");
            return Err(errors.into());
        }

        let entry = report
            .responses
            .into_iter()
            .next()
            .ok_or(BridgeError::EmptyResponse)?;
        let id = entry.id.ok_or(BridgeError::MissingId)?;
        debug!(collection, %id, "inserted object");
        Ok(InsertResult { id: id.to_string() })
    }

    /// Submits `objects` in one batch call.
    ///
    /// A transport failure fails the whole call. Otherwise the report carries
    /// every entry alongside the combined per-object errors.
    ///
    /// # Errors
    /// Returns `BridgeError` if the batch request itself fails or times out.
    pub async fn batch_insert(&self, objects: Vec<BatchObject>) -> Result<BatchReport, BridgeError> {
        let submitted = objects.len();
        let responses = self
            .within_deadline(self.store.batch_objects(objects))
            .await
            .inspect_err(|err| warn!(submitted, error = %err, "batch insert failed"))?;
        Ok(BatchReport::from_responses(responses))
    }
}
