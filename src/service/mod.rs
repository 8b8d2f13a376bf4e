//! Request validation for the book API.

mod validation;
pub use validation::BookValidator;
