//! User infrastructure module
//!
//! This module provides the user service together with its in-memory and
//! PostgreSQL repositories, the request/response types and demo seed data.

mod dto;
mod postgres_repository;
mod repository;
mod seed;
mod service;

pub use dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
pub use postgres_repository::{PostgresUserRepository, EMAIL_CONSTRAINT, LOGIN_CONSTRAINT};
pub use repository::InMemoryUserRepository;
pub use seed::{demo_users, seed_users, SeedReport, SeedUser};
pub use service::UserService;
