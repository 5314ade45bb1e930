pub mod credentials;
pub mod input;
pub mod inventory;

pub use credentials::CredentialService;
pub use inventory::{
    AddOutcome, DuplicateResolution, InventoryService, PendingDuplicate, Resolution,
};
