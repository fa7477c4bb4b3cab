use async_trait::async_trait;

use crate::domain::field::PartialRecord;
use crate::error::Result;

/// Turns free page text into whatever fields it can recognise.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_from_text(&self, text: &str, schema_description: &str)
    -> Result<PartialRecord>;
}
