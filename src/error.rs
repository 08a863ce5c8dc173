//! Error module for the Rusty Blocks library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq, Clone)]
pub enum CircuitError {
    /// Error for unsupported build types, topologies or invalid configuration contents.
    Configuration(String),
    /// Error for index sets whose lengths do not match, e.g., one-to-one wiring of subsets of different sizes.
    ArityMismatch(String),
    /// Error for a capability that the component (or its build variant) does not offer.
    UnsupportedOperation(String),
    /// Error for invalid parameters, e.g., negative delays or empty arrays.
    InvalidParameter(String),
    /// Error for out of bounds access, e.g., a neuron index beyond the population size.
    OutOfBounds(String),
    /// Error raised by the simulation engine, forwarded as is.
    Engine(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for CircuitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CircuitError::Configuration(e) => write!(f, "Configuration error: {}", e),
            CircuitError::ArityMismatch(e) => write!(f, "Arity mismatch: {}", e),
            CircuitError::UnsupportedOperation(e) => write!(f, "Unsupported operation: {}", e),
            CircuitError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            CircuitError::OutOfBounds(e) => write!(f, "Index out of bounds: {}", e),
            CircuitError::Engine(e) => write!(f, "Engine error: {}", e),
            CircuitError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for CircuitError {}

impl From<std::io::Error> for CircuitError {
    fn from(e: std::io::Error) -> Self {
        CircuitError::IOError(e.to_string())
    }
}
