//! Known peers as canonical `host:port` strings.

use serde::Serialize;

use crate::error::LedgerError;

/// Deduplicated peer addresses kept in registration order. Consensus walks
/// peers in this order, which is what makes its tie-break deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PeerSet {
    peers: Vec<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `address` in canonical form. Returns `false` if it was already known.
    pub fn insert(&mut self, address: &str) -> Result<bool, LedgerError> {
        let canonical = canonical_address(address)?;
        if self.peers.contains(&canonical) {
            return Ok(false);
        }
        self.peers.push(canonical);
        Ok(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.peers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Reduce a peer address to `host:port`.
///
/// Accepts a bare `host:port` or a URL such as `http://host:port/path`.
/// Chains are fetched over plain HTTP, so any scheme other than `http` is
/// rejected. A portless `http` URL maps to port 80; any other portless
/// address is rejected. Hosts are lowercased.
pub fn canonical_address(address: &str) -> Result<String, LedgerError> {
    let invalid = || LedgerError::InvalidPeerAddress(address.to_string());
    let trimmed = address.trim();

    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => (Some("http"), rest),
        Some(_) => return Err(invalid()),
        None => (None, trimmed),
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    // Drop any userinfo.
    let authority = authority.rsplit('@').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(invalid());
    }

    let (host, port) = match split_host_port(authority) {
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
        None => {
            let port = match scheme {
                Some("http") => 80,
                _ => return Err(invalid()),
            };
            (authority, port)
        }
    };
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(format!("{}:{port}", host.to_ascii_lowercase()))
}

/// Split off a trailing `:port`, leaving bracketed IPv6 hosts intact.
fn split_host_port(authority: &str) -> Option<(&str, &str)> {
    if authority.starts_with('[') {
        let close = authority.find(']')?;
        let (host, rest) = authority.split_at(close + 1);
        return rest.strip_prefix(':').map(|port| (host, port));
    }
    authority.rsplit_once(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_forms() {
        let cases = [
            ("127.0.0.1:5001", "127.0.0.1:5001"),
            ("http://127.0.0.1:5001", "127.0.0.1:5001"),
            ("http://127.0.0.1:5001/", "127.0.0.1:5001"),
            ("HTTP://LocalHost:5002/get_chain?x=1", "localhost:5002"),
            ("  node-a:8080  ", "node-a:8080"),
            ("http://node-a", "node-a:80"),
            ("http://user@node-a:81", "node-a:81"),
            ("http://[::1]:5000", "[::1]:5000"),
        ];
        for (input, expected) in cases {
            assert_eq!(canonical_address(input).as_deref(), Ok(expected), "{input}");
        }
    }

    #[test]
    fn rejects_unusable_addresses() {
        let inputs = [
            "",
            "   ",
            "http://",
            "node-a",
            "node-a:notaport",
            ":5000",
            "node-a:70000",
            "[::1]",
            "https://node-a",
            "https://node-a:443",
            "ftp://node-a:21",
        ];
        for input in inputs {
            assert!(
                matches!(canonical_address(input), Err(LedgerError::InvalidPeerAddress(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn insert_is_idempotent() {
        let mut peers = PeerSet::new();
        assert_eq!(peers.insert("http://127.0.0.1:5001"), Ok(true));
        assert_eq!(peers.insert("127.0.0.1:5001"), Ok(false));
        assert_eq!(peers.insert("http://127.0.0.1:5001/"), Ok(false));
        assert_eq!(peers.len(), 1);
        assert_eq!(peers.iter().collect::<Vec<_>>(), ["127.0.0.1:5001"]);
    }

    #[test]
    fn keeps_registration_order() {
        let mut peers = PeerSet::new();
        for addr in ["c:3", "a:1", "b:2", "a:1"] {
            peers.insert(addr).unwrap();
        }
        assert_eq!(peers.iter().collect::<Vec<_>>(), ["c:3", "a:1", "b:2"]);
    }

    #[test]
    fn serializes_as_a_list() {
        let mut peers = PeerSet::new();
        peers.insert("a:1").unwrap();
        peers.insert("b:2").unwrap();
        assert_eq!(serde_json::to_string(&peers).unwrap(), r#"["a:1","b:2"]"#);
    }
}
