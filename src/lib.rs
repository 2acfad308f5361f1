pub mod client;
pub mod config;
pub mod coord_state;
pub mod error;
pub mod hooks;
pub mod io_struct;
pub mod model_store;
pub mod registry;
pub mod server;
pub mod update_collector;

pub use client::WorkerClient;
pub use coord_state::{CoordState, UpdateOutcome};
pub use hooks::CoordinatorHooks;
pub use model_store::{SharedGlobalModel, StandaloneHooks};
