//! Domain ports for the client's hexagonal boundary.
//!
//! Storage, navigation, and the verification backend are driven through
//! these traits so the domain services can be exercised with test doubles.

mod key_value_store;
mod navigator;
mod verification_gateway;

pub use key_value_store::{KeyValueStore, StorageError};
pub use navigator::Navigator;
pub use verification_gateway::{AuthClientError, VerificationGateway};

#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
#[cfg(test)]
pub use navigator::MockNavigator;
#[cfg(test)]
pub use verification_gateway::MockVerificationGateway;
