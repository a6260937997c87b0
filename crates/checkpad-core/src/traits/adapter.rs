// SPDX-FileCopyrightText: 2026 Checkpad Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and lifecycle shared by every backend adapter.

use async_trait::async_trait;

use crate::error::CheckpadError;
use crate::types::{AdapterType, HealthStatus};

/// Common surface of the auth provider and the data store.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Probes the backend. Unreachable backends are reported as
    /// [`HealthStatus::Unhealthy`] rather than as an error where possible.
    async fn health_check(&self) -> Result<HealthStatus, CheckpadError>;

    /// Releases held resources. Both HTTP adapters have nothing to release.
    async fn shutdown(&self) -> Result<(), CheckpadError>;
}
