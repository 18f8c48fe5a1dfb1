pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod paginate;
pub mod record;
pub mod sites;
