use async_trait::async_trait;
use serde::Serialize;

use crate::tag::Tag;

/// A cacheable read against the server
#[async_trait]
pub trait Endpoint: Send + Sync {
    type Args: Serialize + Send + Sync;
    type Output: Clone + Send + Sync + 'static;
    type Error: Send;

    /// Name of the query, part of every cache key
    const NAME: &'static str;

    /// Cache key derived from the arguments. Defaults to their JSON encoding;
    /// override to make several argument sets share one entry.
    fn cache_key(args: &Self::Args) -> String {
        serde_json::to_string(args).unwrap_or_default()
    }

    /// Tags a fetched result provides
    fn provides_tags(_args: &Self::Args, _output: &Self::Output) -> Vec<Tag> {
        Vec::new()
    }

    async fn fetch(&self, args: &Self::Args) -> Result<Self::Output, Self::Error>;
}

/// A write against the server
#[async_trait]
pub trait Mutation: Send + Sync {
    type Args: Send + Sync;
    type Output: Send;
    type Error: Send;

    const NAME: &'static str;

    /// Tags invalidated after a successful call, unless suppressed
    fn invalidates_tags(_args: &Self::Args, _output: &Self::Output) -> Vec<Tag> {
        Vec::new()
    }

    async fn execute(&self, args: &Self::Args) -> Result<Self::Output, Self::Error>;
}
