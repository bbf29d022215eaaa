pub mod db;

pub use db::{DATABASE_NAME, connect_to_mongo};
