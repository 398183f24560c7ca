//! Query cache for Ayon server reads
//!
//! A small key-addressed cache: queries fill it, optimistic updates patch it
//! (with an undo handle), mutations and explicit calls invalidate it by tag.

pub mod cache;
pub mod endpoint;
pub mod tag;

pub use cache::{
    CacheConfig, CacheEvent, MutateOptions, PatchHandle, QueryCache, QueryKey, QueryOptions,
};
pub use endpoint::{Endpoint, Mutation};
pub use tag::Tag;
