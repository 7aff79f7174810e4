//! Test server catalog
//!
//! Selecting a server only changes the label shown with the results; every
//! run is simulated locally regardless of the choice.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A displayable test server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: u32,
    pub name: String,
    pub provider: String,
    pub location: String,
}

impl Server {
    fn new(id: u32, name: &str, provider: &str, location: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            provider: provider.to_string(),
            location: location.to_string(),
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.provider, self.location)
    }
}

/// All selectable servers, id 1 first
pub fn catalog() -> Vec<Server> {
    vec![
        Server::new(1, "Cloudflare", "Auto-Selected", "San Francisco, USA"),
        Server::new(2, "Google Cloud", "GCP", "New York, USA"),
        Server::new(3, "Fastly", "EdgeNet", "London, UK"),
        Server::new(4, "NTT", "NTT Communications", "Tokyo, Japan"),
        Server::new(5, "Vercel", "AWS", "Sydney, Australia"),
    ]
}

pub fn find_server(id: u32) -> Option<Server> {
    catalog().into_iter().find(|server| server.id == id)
}

/// Comma-separated list of valid ids, for error messages
pub fn server_ids() -> String {
    catalog()
        .iter()
        .map(|server| server.id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique_and_ordered() {
        let ids: Vec<u32> = catalog().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(server_ids(), "1, 2, 3, 4, 5");
    }

    #[test]
    fn test_find_server() {
        let default = find_server(crate::defaults::DEFAULT_SERVER_ID).unwrap();
        assert_eq!(default.name, "Cloudflare");
        assert_eq!(default.to_string(), "Cloudflare (Auto-Selected) - San Francisco, USA");

        assert_eq!(find_server(4).unwrap().location, "Tokyo, Japan");
        assert!(find_server(0).is_none());
        assert!(find_server(6).is_none());
    }
}
