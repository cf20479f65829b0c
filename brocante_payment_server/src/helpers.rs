use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use log::{debug, trace};
use regex::Regex;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        result =
            req.headers().get("X-Forwarded-For").and_then(|v| v.to_str().ok()).and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        let re = Regex::new(r#"for=(?P<ip>[^;]+)"#).unwrap();
        result = req
            .headers()
            .get("Forwarded")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| re.captures(v))
            .and_then(|caps| caps.name("ip"))
            .map(|m| m.as_str())
            .and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.connection_info().peer_addr().map(|a| a.to_string());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr.and_then(|s| IpAddr::from_str(&s).ok())
    })
}

/// HMAC-SHA256 over the exact bytes given. The key can be any length.
pub fn hmac_sha256(secret: &str, data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// The signature string for a payload: base64 of the HMAC-SHA256 digest. This is the format carried in the
/// `X-Payment-Signature` header and is also what the test suite uses to sign synthetic webhook bodies.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    base64::encode(hmac_sha256(secret, data))
}

/// Verifies a base64-encoded HMAC-SHA256 signature against the payload. A signature that does not decode as base64
/// is invalid. The digest comparison runs in constant time.
pub fn verify_signature(secret: &str, data: &[u8], signature: &str) -> bool {
    let expected = hmac_sha256(secret, data);
    match base64::decode(signature) {
        Ok(provided) => constant_time_eq(&expected, &provided),
        Err(_) => false,
    }
}

/// Byte-string equality that does not leak the position of the first mismatch through timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
