//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod mail;
pub mod payments;

pub use database::{
    connect_and_migrate, init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider,
};
