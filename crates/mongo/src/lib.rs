//! MongoDB tool set: CRUD, aggregation, and collection inspection over
//! a single configured database.

mod codec;
mod config;
mod router;
mod tool;

pub use config::MongoConfig;
pub use router::{MongoRouter, catalog};
pub use tool::MongoTool;
