//! Language-pack description files: the schema that declares which keys a
//! pack may use, the in-memory pack, and the loaders that read them.

pub mod loader;
pub mod meta_error;
pub mod pack;
pub mod schema;

pub use loader::PackLoader;
pub use meta_error::MetaError;
pub use pack::LangPack;
pub use schema::{EntryKind, SchemaEntry, SchemaRegistry, ValueKind};
