//! Domain types and pure logic for the mealsmith generation pipeline.
//!
//! Everything in this crate is side-effect free: request DTOs with their
//! validation rules, the recipe/meal-plan domain model, prompt construction,
//! and provider-response parsing. The HTTP surface, storage, and the provider
//! transport live in their own crates and depend on this one.

pub mod error;
pub mod parse;
pub mod prompt;
pub mod recipe;
pub mod request;
pub mod types;
