//! Tool plumbing for workflows
//!
//! - `pool`: the [`SessionPool`] merging the catalogs of all connected
//!   tool servers behind one namespace
//! - `schema`: encoding tool descriptors as function declarations

mod pool;
mod schema;

pub use pool::SessionPool;
pub use schema::FunctionDeclarationConverter;
