pub mod api_client;
pub mod builder;
pub mod error;
pub mod gateway;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod private_state;
pub mod push;
pub mod reconciler;
pub mod utils;

pub use api_client::GameApiClient;
pub use error::ClientError;
pub use gateway::{CryptoBackend, EncryptionGateway, MpcInputBackend};
pub use orchestrator::PhaseOrchestrator;
pub use params::{CryptoParameterStore, CryptoParameters};
pub use private_state::{InMemorySessionStore, PrivateRoundState, PrivateStateStore, SessionStore};
pub use reconciler::ResultReconciler;
