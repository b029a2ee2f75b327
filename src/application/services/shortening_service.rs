//! Short code allocation service.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::application::retry::{RetryError, RetryPolicy};
use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{InsertOutcome, StoreError, UniqueField, UrlRepository};
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Outcome of a single allocation attempt that did not produce a record.
#[derive(Debug)]
enum AttemptError {
    /// The candidate code is already taken; try a fresh one.
    CodeTaken,
    /// The URL conflicted but its record was gone by the time we read it.
    Vanished,
    Store(StoreError),
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        matches!(self, AttemptError::CodeTaken | AttemptError::Vanished)
    }
}

/// Service for turning long URLs into unique short codes.
///
/// The store's conditional insert is the only uniqueness check: the service
/// never looks a code or URL up before inserting. Which constraint rejected
/// the insert decides the recovery.
///
/// - code conflict: discard the candidate and retry under the [`RetryPolicy`]
/// - URL conflict: the URL is already shortened (possibly by a concurrent
///   caller), so the existing record is returned
///
/// Concurrent calls for the same URL therefore all converge on one record.
pub struct ShorteningService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    generator: Arc<dyn CodeGenerator>,
    retry_policy: RetryPolicy,
}

impl<R: UrlRepository + ?Sized> ShorteningService<R> {
    /// Creates a new shortening service.
    pub fn new(
        repository: Arc<R>,
        generator: Arc<dyn CodeGenerator>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            repository,
            generator,
            retry_policy,
        }
    }

    /// Returns the record for `target_url`, creating it on first use.
    ///
    /// `target_url` must already be a validated absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeSpaceExhausted`] if every attempt collided.
    /// Returns [`AppError::StoreUnavailable`] on transient store failures and
    /// [`AppError::Internal`] when the store rejects the record; neither is
    /// retried.
    pub async fn shorten(&self, target_url: &str) -> Result<UrlRecord, AppError> {
        let outcome = self
            .retry_policy
            .run(
                move || self.try_insert(target_url),
                AttemptError::is_retryable,
            )
            .await;

        match outcome {
            Ok(record) => Ok(record),
            Err(RetryError::Exhausted {
                attempts,
                last: AttemptError::Vanished,
            }) => Err(AppError::StoreUnavailable(format!(
                "record for target URL disappeared during {} attempts",
                attempts
            ))),
            Err(RetryError::Exhausted { attempts, .. }) => {
                metrics::counter!("shortener_code_space_exhausted_total").increment(1);
                error!(
                    attempts,
                    "Code space exhausted: every generated code collided"
                );
                Err(AppError::CodeSpaceExhausted { attempts })
            }
            Err(RetryError::Aborted(AttemptError::Store(e))) => Err(e.into()),
            Err(RetryError::Aborted(other)) => Err(AppError::internal(
                "Unexpected allocation failure",
                json!({ "reason": format!("{:?}", other) }),
            )),
        }
    }

    /// One generate-and-insert round.
    async fn try_insert(&self, target_url: &str) -> Result<UrlRecord, AttemptError> {
        let candidate = self.generator.generate();
        let new_record = NewUrlRecord::new(candidate.clone(), target_url.to_string());

        let outcome = self
            .repository
            .insert_if_unique(new_record)
            .await
            .map_err(AttemptError::Store)?;

        match outcome {
            InsertOutcome::Inserted(record) => {
                metrics::counter!("shortener_links_created_total").increment(1);
                info!(code = %record.code, "Short link created");
                Ok(record)
            }
            InsertOutcome::Conflict(UniqueField::Code) => {
                metrics::counter!("shortener_code_collisions_total").increment(1);
                debug!(code = %candidate, "Generated code collided, retrying");
                Err(AttemptError::CodeTaken)
            }
            InsertOutcome::Conflict(UniqueField::TargetUrl) => {
                let existing = self
                    .repository
                    .find_by_target_url(target_url)
                    .await
                    .map_err(AttemptError::Store)?;

                match existing {
                    Some(record) => {
                        debug!(code = %record.code, "URL already shortened");
                        Ok(record)
                    }
                    None => {
                        warn!("URL conflict but no record found, retrying");
                        Err(AttemptError::Vanished)
                    }
                }
            }
        }
    }
}
