//! Customers and authentication
//!
//! Registration and login (argon2 password hashes, HS256 JWT) plus the
//! middleware that turns a bearer token into an [`AuthenticatedCustomer`].

pub mod middleware;
pub mod models;
pub mod service;

pub use middleware::{AuthenticatedCustomer, jwt_auth_middleware};
pub use models::{Customer, NewCustomer};
pub use service::{AuthResponse, Claims, CustomerService, LoginRequest, RegisterRequest};
