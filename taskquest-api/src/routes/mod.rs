/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Account endpoints (register, login, refresh, email tokens, profile)
/// - `resources`: Generic owner-scoped CRUD mounted for every resource
/// - `tasks`: Task routes, including the per-task child listings

pub mod auth;
pub mod health;
pub mod resources;
pub mod tasks;
