//! Plugin handshake with the host process.
//!
//! The host launches the plugin with a magic cookie in its environment and
//! reads a single line from the plugin's stdout:
//!
//! ```text
//! CORE-PROTOCOL-VERSION|APP-PROTOCOL-VERSION|NETWORK|ADDRESS|PROTOCOL
//! 1|1|tcp|127.0.0.1:10000|grpc
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::net::SocketAddr;

use crate::types::{Error, HandshakeConfig, Result, ENV_PROTOCOL_VERSIONS};

/// Printed when the plugin is started by hand instead of by a host.
pub const NOT_A_HOST_MESSAGE: &str = "This binary is a plugin. These are not meant to be executed directly. \
Please execute the program that consumes these plugins, which will load any plugins automatically";

/// Line announcing where the plugin listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeLine {
    pub core_protocol_version: u32,
    pub app_protocol_version: u32,
    pub addr: SocketAddr,
}

impl HandshakeLine {
    pub fn new(core_protocol_version: u32, app_protocol_version: u32, addr: SocketAddr) -> Self {
        Self {
            core_protocol_version,
            app_protocol_version,
            addr,
        }
    }
}

impl fmt::Display for HandshakeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|tcp|{}|grpc",
            self.core_protocol_version, self.app_protocol_version, self.addr
        )
    }
}

/// Fail unless the host set the expected magic cookie.
pub fn verify_magic_cookie(config: &HandshakeConfig, env: &HashMap<String, String>) -> Result<()> {
    match env.get(&config.magic_cookie_key) {
        Some(value) if *value == config.magic_cookie_value => Ok(()),
        _ => Err(Error::handshake(NOT_A_HOST_MESSAGE)),
    }
}

/// Pick the app protocol version.
///
/// A host that lists the versions it accepts must include ours; a host that
/// lists none gets ours unconditionally.
pub fn negotiate_version(config: &HandshakeConfig, env: &HashMap<String, String>) -> Result<u32> {
    let Some(accepted) = env.get(ENV_PROTOCOL_VERSIONS).filter(|v| !v.trim().is_empty()) else {
        return Ok(config.app_protocol_version);
    };

    let mut versions = Vec::new();
    for part in accepted.split(',') {
        let version = part.trim().parse::<u32>().map_err(|e| {
            Error::handshake(format!(
                "invalid {} entry {:?}: {}",
                ENV_PROTOCOL_VERSIONS, part, e
            ))
        })?;
        versions.push(version);
    }

    if versions.contains(&config.app_protocol_version) {
        Ok(config.app_protocol_version)
    } else {
        Err(Error::handshake(format!(
            "host accepts protocol versions {:?}, plugin speaks {}",
            versions, config.app_protocol_version
        )))
    }
}

/// Write the handshake line and flush so the host sees it immediately.
pub fn announce<W: Write>(out: &mut W, line: &HandshakeLine) -> Result<()> {
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}
