use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::models::{Customer, NewCustomer};
use crate::core_types::CustomerId;
use crate::error::BankError;
use crate::store::BankStore;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (customer_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

impl Claims {
    pub fn customer_id(&self) -> Result<CustomerId, BankError> {
        self.sub.parse().map_err(|_| BankError::Unauthorized)
    }
}

/// Customer Registration Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 128, message = "name must be 2-128 characters"))]
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[validate(email(message = "invalid email"))]
    #[schema(example = "asha@example.com")]
    pub email: String,
    #[validate(length(max = 32, message = "phone is too long"))]
    #[schema(example = "+91-9800000000")]
    pub phone: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Customer Login Request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "invalid email"))]
    #[schema(example = "asha@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Auth Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
}

pub struct CustomerService {
    store: Arc<dyn BankStore>,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl CustomerService {
    pub fn new(store: Arc<dyn BankStore>, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl_hours,
        }
    }

    /// Register a new customer
    pub async fn register(&self, req: RegisterRequest) -> Result<Customer, BankError> {
        // 1. Hash password
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| BankError::Internal(format!("Hashing failed: {}", e)))?
            .to_string();

        // 2. Insert
        let customer = self
            .store
            .create_customer(NewCustomer {
                name: req.name.trim().to_string(),
                email: req.email.trim().to_lowercase(),
                phone: req.phone.filter(|p| !p.trim().is_empty()),
                password_hash,
            })
            .await?;

        tracing::info!(customer_id = customer.customer_id, "Customer registered");
        Ok(customer)
    }

    /// Login customer and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, BankError> {
        // 1. Find customer by email
        let customer = self
            .store
            .find_customer_by_email(req.email.trim())
            .await?
            .ok_or(BankError::InvalidCredentials)?;

        // 2. Verify password
        let parsed_hash = PasswordHash::new(&customer.password_hash)
            .map_err(|e| BankError::Internal(format!("Invalid hash format: {}", e)))?;

        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| BankError::InvalidCredentials)?;

        // 3. Generate JWT
        let token = self.issue_token(customer.customer_id)?;

        tracing::info!(customer_id = customer.customer_id, "Customer logged in");
        Ok(AuthResponse {
            token,
            customer_id: customer.customer_id,
            name: customer.name,
            email: customer.email,
        })
    }

    pub fn issue_token(&self, customer_id: CustomerId) -> Result<String, BankError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(self.token_ttl_hours))
            .ok_or_else(|| BankError::Internal("token expiry overflow".to_string()))?
            .timestamp();

        let claims = Claims {
            sub: customer_id.to_string(),
            exp: expiration as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| BankError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, BankError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| BankError::Unauthorized)?;
        Ok(token_data.claims)
    }
}
