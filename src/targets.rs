//! Benchmark target enumeration.
//!
//! Disks and TCP endpoints are reported in the order the OS lists them, so
//! callers never need to sort.

use serde::Serialize;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4, SocketAddrV6};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::AcquireError;

/// A block device usable as a disk target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskTarget {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Role of a TCP endpoint in a network test.
///
/// [`enumerate_tcp_endpoints`] only yields `Client` endpoints. `Server` is
/// assigned by the caller to the endpoints it listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
    Client,
    Server,
}

/// A local address a TCP worker can bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TcpEndpoint {
    pub interface: String,
    pub address: IpAddr,
    pub role: EndpointRole,
}

/// Parses /proc/partitions.
///
/// Format: "major minor  #blocks  name", sizes in 1 KiB blocks.
/// Loop and RAM devices are skipped.
pub fn parse_partitions(content: &str) -> Vec<DiskTarget> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue; // header and blank lines
        }
        let Ok(blocks) = parts[2].parse::<u64>() else {
            continue;
        };

        let name = parts[3];
        if name.starts_with("loop") || name.starts_with("ram") {
            continue;
        }

        disks.push(DiskTarget {
            name: name.to_string(),
            path: Path::new("/dev").join(name),
            size_bytes: blocks * 1024,
        });
    }

    disks
}

/// Lists disk targets from `<proc_root>/partitions`.
pub fn enumerate_disks(proc_root: &Path) -> Result<Vec<DiskTarget>, AcquireError> {
    let path = proc_root.join("partitions");
    let content = fs::read_to_string(&path).map_err(|source| AcquireError::Io {
        path: path.clone(),
        source,
    })?;

    let disks = parse_partitions(&content);
    info!("Found {} disk targets", disks.len());
    for disk in &disks {
        debug!("   Found {} ({} bytes)", disk.path.display(), disk.size_bytes);
    }
    Ok(disks)
}

/// Groups interface addresses into client endpoints.
///
/// Interfaces keep their first-seen order and every IPv4 address becomes one
/// endpoint. An interface without an IPv4 address is reported once with the
/// unspecified address.
pub fn endpoints_from_addresses<I>(addresses: I, skip_loopback: bool) -> Vec<TcpEndpoint>
where
    I: IntoIterator<Item = (String, Option<IpAddr>)>,
{
    let mut interfaces: Vec<(String, Vec<IpAddr>)> = Vec::new();

    for (name, address) in addresses {
        if skip_loopback && name == "lo" {
            continue;
        }
        let idx = match interfaces.iter().position(|(n, _)| *n == name) {
            Some(idx) => idx,
            None => {
                interfaces.push((name, Vec::new()));
                interfaces.len() - 1
            }
        };
        if let Some(addr @ IpAddr::V4(_)) = address {
            if !interfaces[idx].1.contains(&addr) {
                interfaces[idx].1.push(addr);
            }
        }
    }

    let mut endpoints = Vec::new();
    for (interface, addrs) in interfaces {
        if addrs.is_empty() {
            endpoints.push(TcpEndpoint {
                interface,
                address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                role: EndpointRole::Client,
            });
            continue;
        }
        for address in addrs {
            endpoints.push(TcpEndpoint {
                interface: interface.clone(),
                address,
                role: EndpointRole::Client,
            });
        }
    }
    endpoints
}

/// Lists TCP client endpoints from the host's interface addresses.
pub fn enumerate_tcp_endpoints(skip_loopback: bool) -> Result<Vec<TcpEndpoint>, AcquireError> {
    info!("Reporting TCP network information...");

    let addresses = nix::ifaddrs::getifaddrs().map_err(AcquireError::Interfaces)?;
    let pairs = addresses.map(|ifaddr| {
        let ip = ifaddr.address.as_ref().and_then(|storage| {
            storage
                .as_sockaddr_in()
                .map(|sin| IpAddr::V4(*SocketAddrV4::from(*sin).ip()))
                .or_else(|| {
                    storage
                        .as_sockaddr_in6()
                        .map(|sin6| IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
                })
        });
        (ifaddr.interface_name, ip)
    });

    let endpoints = endpoints_from_addresses(pairs, skip_loopback);
    for endpoint in &endpoints {
        debug!("   Found {} on {}", endpoint.address, endpoint.interface);
    }
    info!("   done, {} endpoints", endpoints.len());
    Ok(endpoints)
}
