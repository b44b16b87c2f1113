//! Credential primitives: JWT issuance/verification and password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtError, JwtService, TokenPair, TokenType};
pub use password::{hash_password, verify_password, PasswordError};
