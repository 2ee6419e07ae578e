//! Account auto-provisioning.

mod provision_account;

pub use provision_account::{AccountProvisioner, ProvisioningDefaults, ProvisioningOutcome};
