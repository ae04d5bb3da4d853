pub mod config;
pub mod memory;
pub mod remote;
pub mod reset;
pub mod store;
pub mod tracked;
pub mod updater;
pub mod utils;
pub mod validate;

// Re-export commonly used types
pub use config::{read_config, write_config, ConfigError, OtaConfig};
pub use memory::{MemoryBudget, SystemMemory, DEFAULT_MINIMUM_FREE_MEMORY};
pub use remote::{
    Credentials, GitHubSource, RemoteError, RemoteResponse, RemoteSource, SourceLocator,
    DEFAULT_API_BASE,
};
pub use reset::{DeviceReset, ProcessRestart};
pub use store::{StoreError, VersionEntry, VersionMap, VersionStore};
pub use tracked::{FetchContext, FileError, FileState, TrackedFile};
pub use updater::{Collaborators, UpdateOrchestrator, UpdaterError, UpdaterOptions, RESET_DELAY};
pub use utils::{compute_blob_fingerprint, compute_file_fingerprint};
pub use validate::{AcceptAll, CommandValidator, Validator};
