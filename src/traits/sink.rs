use async_trait::async_trait;

use crate::errors::SinkError;
use crate::model::Notification;

/// Delivers the aggregated result of a workflow to an external subscriber.
///
/// Publishing is attempted once; the runner turns a failure into a warning.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, notification: &Notification) -> Result<(), SinkError>;

    fn name(&self) -> &'static str;
}
