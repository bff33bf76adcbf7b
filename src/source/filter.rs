//! Device filtering for selective time travel.
//!
//! # Design
//!
//! - **Pure Matcher**: [`NameRegexFilter`] only answers "does this device id
//!   match?" without include/exclude semantics.
//! - **Filter Chain**: [`FilterChain`] combines matchers:
//!   - Exclude filters: any match rejects the device
//!   - Include filters: any match accepts it (empty = accept all)
//! - **Decorator**: [`FilteredSource`] applies a filter transparently to any
//!   [`SnapshotSource`].

use regex::Regex;

use crate::observation::{Observation, ObservationKind, Timestamp};

use super::{DeviceDifference, SnapshotSource, SourceError};

/// Trait for selecting devices by identifier.
///
/// Filters must be `Send + Sync` so filtered sources stay usable across
/// await points.
pub trait DeviceFilter: Send + Sync {
    /// Returns `true` if the device should be kept.
    fn matches(&self, device_id: &str) -> bool;
}

/// Matches device ids against a regex (pure matcher).
///
/// # Examples
///
/// ```
/// use net_rewind::source::{DeviceFilter, NameRegexFilter};
///
/// let filter = NameRegexFilter::new(r"^core-").unwrap();
///
/// assert!(filter.matches("core-r1"));
/// assert!(!filter.matches("edge-r1"));
/// ```
#[derive(Debug)]
pub struct NameRegexFilter {
    pattern: Regex,
}

impl NameRegexFilter {
    /// Creates a filter with the given regex pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns a reference to the regex pattern.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Regex is not a const type
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl DeviceFilter for NameRegexFilter {
    fn matches(&self, device_id: &str) -> bool {
        self.pattern.is_match(device_id)
    }
}

/// Filter chain with include/exclude semantics.
///
/// Evaluation order:
/// 1. **Exclude filters**: any match → reject.
/// 2. **Include filters**: any match → accept. No includes = accept all.
///
/// # Examples
///
/// ```
/// use net_rewind::source::{DeviceFilter, FilterChain, NameRegexFilter};
///
/// let chain = FilterChain::new()
///     .exclude(NameRegexFilter::new(r"-lab$").unwrap())
///     .include(NameRegexFilter::new(r"^core-").unwrap())
///     .include(NameRegexFilter::new(r"^edge-").unwrap());
///
/// assert!(chain.matches("core-r1"));
/// assert!(chain.matches("edge-r2"));
/// assert!(!chain.matches("core-lab"));
/// assert!(!chain.matches("access-sw1"));
/// ```
#[derive(Default)]
pub struct FilterChain {
    includes: Vec<Box<dyn DeviceFilter>>,
    excludes: Vec<Box<dyn DeviceFilter>>,
}

impl FilterChain {
    /// Creates an empty filter chain (matches all devices).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include filter.
    #[must_use]
    pub fn include<F: DeviceFilter + 'static>(mut self, filter: F) -> Self {
        self.includes.push(Box::new(filter));
        self
    }

    /// Adds an exclude filter.
    #[must_use]
    pub fn exclude<F: DeviceFilter + 'static>(mut self, filter: F) -> Self {
        self.excludes.push(Box::new(filter));
        self
    }

    /// Returns the number of include filters.
    #[must_use]
    pub fn include_count(&self) -> usize {
        self.includes.len()
    }

    /// Returns the number of exclude filters.
    #[must_use]
    pub fn exclude_count(&self) -> usize {
        self.excludes.len()
    }

    /// Returns true if no filters are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

impl DeviceFilter for FilterChain {
    fn matches(&self, device_id: &str) -> bool {
        if self.excludes.iter().any(|f| f.matches(device_id)) {
            return false;
        }

        self.includes.is_empty() || self.includes.iter().any(|f| f.matches(device_id))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("include_count", &self.includes.len())
            .field("exclude_count", &self.excludes.len())
            .finish()
    }
}

/// A source decorator that drops filtered-out devices from every result.
///
/// # Type Parameters
///
/// - `S`: The inner source (implements [`SnapshotSource`])
/// - `F`: The filter (implements [`DeviceFilter`])
#[derive(Debug)]
pub struct FilteredSource<S, F> {
    inner: S,
    filter: F,
}

impl<S, F> FilteredSource<S, F> {
    /// Creates a new filtered source.
    #[must_use]
    pub const fn new(inner: S, filter: F) -> Self {
        Self { inner, filter }
    }

    /// Returns a reference to the inner source.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a reference to the filter.
    pub const fn filter(&self) -> &F {
        &self.filter
    }

    /// Consumes the filtered source and returns the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: SnapshotSource, F: DeviceFilter> SnapshotSource for FilteredSource<S, F> {
    async fn timeline(&self, hours: u32) -> Result<Vec<Observation>, SourceError> {
        let observations = self.inner.timeline(hours).await?;
        Ok(observations
            .into_iter()
            .filter(|o| self.filter.matches(&o.device_id))
            .collect())
    }

    async fn devices(&self) -> Result<Vec<String>, SourceError> {
        let devices = self.inner.devices().await?;
        Ok(devices
            .into_iter()
            .filter(|device_id| self.filter.matches(device_id))
            .collect())
    }

    async fn compare(
        &self,
        first: &Timestamp,
        second: &Timestamp,
        kind: ObservationKind,
    ) -> Result<Vec<DeviceDifference>, SourceError> {
        let differences = self.inner.compare(first, second, kind).await?;
        Ok(differences
            .into_iter()
            .filter(|d| self.filter.matches(&d.device_id))
            .collect())
    }
}

impl<T: DeviceFilter + ?Sized> DeviceFilter for &T {
    fn matches(&self, device_id: &str) -> bool {
        (*self).matches(device_id)
    }
}

impl DeviceFilter for Box<dyn DeviceFilter> {
    fn matches(&self, device_id: &str) -> bool {
        self.as_ref().matches(device_id)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
