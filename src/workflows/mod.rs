// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod build;
pub mod delete;
pub mod inventory;
pub mod stop;
pub mod trigger;
pub mod versions;

pub use build::{BuildOperation, BuildWorkflow};
pub use delete::DeleteOperation;
pub use inventory::{describe_region, ProjectInventory, RegionInventory};
pub use stop::StopOperation;
pub use trigger::{ManifestTrigger, ManifestUpload};
pub use versions::VersionsWorkflow;
