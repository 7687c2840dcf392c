//! Static region to endpoint directory
//!
//! The directory keeps the fixed, ordered list of regions separately from
//! the endpoint mapping so that a data-entry mistake (a listed region with
//! no endpoint, or an endpoint for an unlisted region) can be detected with
//! [`EndpointDirectory::validate`] instead of surfacing as a crash.

use crate::error::{AppError, Result};
use crate::types::Region;
use std::collections::HashMap;

/// Built-in regions and their echo endpoints, in display order
const BUILTIN_ENDPOINTS: &[(&str, &str)] = &[
    ("Asia Pacific (Hong Kong)", "ec2.ap-east-1.amazonaws.com"),
    ("Asia Pacific (Tokyo)", "gamelift.ap-northeast-1.amazonaws.com"),
    ("Asia Pacific (Seoul)", "gamelift.ap-northeast-2.amazonaws.com"),
    ("Asia Pacific (Mumbai)", "gamelift.ap-south-1.amazonaws.com"),
    ("Asia Pacific (Singapore)", "gamelift.ap-southeast-1.amazonaws.com"),
    ("Asia Pacific (Sydney)", "gamelift.ap-southeast-2.amazonaws.com"),
    ("Europe (Frankfurt)", "gamelift.eu-central-1.amazonaws.com"),
    ("Europe (Ireland)", "gamelift.eu-west-1.amazonaws.com"),
    ("South America (São Paulo)", "gamelift.sa-east-1.amazonaws.com"),
    ("US East (North Virginia)", "gamelift.us-east-1.amazonaws.com"),
    ("US West (Oregon)", "gamelift.us-west-2.amazonaws.com"),
];

/// Read-only mapping from region to host address
#[derive(Debug, Clone)]
pub struct EndpointDirectory {
    regions: Vec<Region>,
    endpoints: HashMap<Region, String>,
}

impl EndpointDirectory {
    /// The directory shipped with the tool
    pub fn builtin() -> Self {
        let regions = BUILTIN_ENDPOINTS
            .iter()
            .map(|&(name, _)| Region::from(name))
            .collect();
        let endpoints = BUILTIN_ENDPOINTS
            .iter()
            .map(|&(name, host)| (Region::from(name), host.to_string()))
            .collect();

        Self { regions, endpoints }
    }

    /// Build a directory from an ordered region list and an endpoint map.
    ///
    /// No consistency check happens here; call [`validate`](Self::validate)
    /// to detect missing or extra entries.
    pub fn from_parts(regions: Vec<Region>, endpoints: HashMap<Region, String>) -> Self {
        Self { regions, endpoints }
    }

    /// Build a directory where every region has an endpoint
    pub fn from_entries<I, R, H>(entries: I) -> Self
    where
        I: IntoIterator<Item = (R, H)>,
        R: Into<Region>,
        H: Into<String>,
    {
        let mut regions = Vec::new();
        let mut endpoints = HashMap::new();
        for (region, host) in entries {
            let region = region.into();
            regions.push(region.clone());
            endpoints.insert(region, host.into());
        }
        Self { regions, endpoints }
    }

    /// Endpoint for a region, `None` when the region has no entry
    pub fn lookup(&self, region: &Region) -> Option<&str> {
        self.endpoints.get(region).map(String::as_str)
    }

    /// The fixed region list in display order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Short region code derived from the endpoint host, e.g. `us-east-1`
    pub fn code(&self, region: &Region) -> Option<&str> {
        self.lookup(region).and_then(derive_code)
    }

    /// Match user input against display names (case-insensitive) or codes
    pub fn resolve_name(&self, input: &str) -> Option<Region> {
        let wanted = input.trim();
        if wanted.is_empty() {
            return None;
        }

        self.regions
            .iter()
            .find(|region| region.name() == wanted)
            .or_else(|| {
                self.regions
                    .iter()
                    .find(|region| region.name().eq_ignore_ascii_case(wanted))
            })
            .or_else(|| {
                self.regions.iter().find(|region| {
                    self.code(region)
                        .map_or(false, |code| code.eq_ignore_ascii_case(wanted))
                })
            })
            .cloned()
    }

    /// Check that the endpoint keys are exactly the region list
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = self
            .regions
            .iter()
            .filter(|region| !self.endpoints.contains_key(region))
            .map(Region::name)
            .collect();

        let mut extra: Vec<&str> = self
            .endpoints
            .keys()
            .filter(|region| !self.regions.contains(region))
            .map(Region::name)
            .collect();
        extra.sort_unstable();

        if missing.is_empty() && extra.is_empty() {
            return Ok(());
        }

        let mut problems = Vec::new();
        if !missing.is_empty() {
            problems.push(format!("no endpoint for {}", missing.join(", ")));
        }
        if !extra.is_empty() {
            problems.push(format!("endpoint for unlisted region {}", extra.join(", ")));
        }
        Err(AppError::config(format!("Endpoint directory is inconsistent: {}", problems.join("; "))))
    }
}

impl Default for EndpointDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

/// `gamelift.us-east-1.amazonaws.com` -> `us-east-1`
fn derive_code(host: &str) -> Option<&str> {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 4 && host.ends_with(".amazonaws.com") {
        Some(labels[labels.len() - 3])
    } else {
        None
    }
}
