// # Redirect Exclusion
//
// The provider runs an HTTP-redirect service out of a known network block.
// Address records pointing there are proxies for that service rather than
// hosts under local TTL control, so they are exempt from policy evaluation
// and kept out of the reverse index.
//
// The blocks are configuration (`policy.redirect_blocks`), not constants.

use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A CIDR network block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressBlock {
    network: IpAddr,
    prefix_len: u8,
}

impl AddressBlock {
    /// Create a block, rejecting prefix lengths longer than the address family allows
    pub fn new(network: IpAddr, prefix_len: u8) -> Result<Self> {
        let max = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix_len > max {
            return Err(Error::config(format!(
                "Prefix length /{} is too long for {}",
                prefix_len, network
            )));
        }
        Ok(Self {
            network,
            prefix_len,
        })
    }

    /// Whether `addr` lies inside this block
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self.network, addr) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = prefix_mask_u32(self.prefix_len);
                u32::from(net) & mask == u32::from(*ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = prefix_mask_u128(self.prefix_len);
                u128::from(net) & mask == u128::from(*ip) & mask
            }
            _ => false,
        }
    }
}

impl FromStr for AddressBlock {
    type Err = Error;

    /// Parse `a.b.c.d/n`, `x::y/n`, or a bare address (host block)
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };

        let network: IpAddr = addr
            .parse()
            .map_err(|e| Error::config(format!("Invalid redirect block '{}': {}", s, e)))?;

        let prefix_len = match prefix {
            Some(p) => p
                .parse::<u8>()
                .map_err(|e| Error::config(format!("Invalid prefix in '{}': {}", s, e)))?,
            None if network.is_ipv4() => 32,
            None => 128,
        };

        Self::new(network, prefix_len)
    }
}

impl std::fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

fn prefix_mask_u32(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => u32::MAX << (32 - u32::from(n)),
    }
}

fn prefix_mask_u128(prefix_len: u8) -> u128 {
    match prefix_len {
        0 => 0,
        n => u128::MAX << (128 - u32::from(n)),
    }
}

/// Set of redirect-service blocks
#[derive(Debug, Clone, Default)]
pub struct RedirectExclusion {
    blocks: Vec<AddressBlock>,
}

impl RedirectExclusion {
    /// Build from configured CIDR strings
    pub fn from_blocks<S: AsRef<str>>(blocks: &[S]) -> Result<Self> {
        let blocks = blocks
            .iter()
            .map(|b| b.as_ref().parse())
            .collect::<Result<Vec<AddressBlock>>>()?;
        Ok(Self { blocks })
    }

    /// Configured blocks
    pub fn blocks(&self) -> &[AddressBlock] {
        &self.blocks
    }

    /// Whether `address` belongs to a redirect block
    ///
    /// Addresses that do not parse as IPs never match.
    pub fn is_redirect_address(&self, address: &str) -> bool {
        match address.trim().parse::<IpAddr>() {
            Ok(ip) => self.blocks.iter().any(|block| block.contains(&ip)),
            Err(_) => false,
        }
    }
}
