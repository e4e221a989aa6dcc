//! Identity grant storage (encrypted file-based)
//!
//! Stores the provider refresh grant encrypted with AES-256-GCM in
//! ~/.config/glimpse/credentials.enc. The encryption key is derived from
//! machine-specific identifiers, so the file is useless off this machine.
//! Access tokens are never stored; they are re-derived per run by silent
//! refresh.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use crate::paths;

const NONCE_SIZE: usize = 12;

/// The persisted identity grant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    /// Provider-issued viewer id (token subject)
    pub viewer_id: String,
    /// Long-lived refresh token
    pub refresh_token: String,
}

/// Get the credentials file path
fn credentials_path() -> Result<PathBuf> {
    paths::credentials_path()
}

/// Get machine ID for key derivation (cross-platform)
fn get_machine_id() -> String {
    // Linux: /etc/machine-id or /var/lib/dbus/machine-id
    #[cfg(target_os = "linux")]
    {
        if let Ok(id) = fs::read_to_string("/etc/machine-id") {
            return id.trim().to_string();
        }
        if let Ok(id) = fs::read_to_string("/var/lib/dbus/machine-id") {
            return id.trim().to_string();
        }
    }

    // macOS: IOPlatformUUID via ioreg
    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            for line in stdout.lines() {
                if line.contains("IOPlatformUUID") {
                    if let Some(uuid) = line.split('"').nth(3) {
                        return uuid.to_string();
                    }
                }
            }
        }
    }

    // Windows: MachineGuid from registry
    #[cfg(target_os = "windows")]
    {
        if let Ok(output) = std::process::Command::new("reg")
            .args([
                "query",
                r"HKLM\SOFTWARE\Microsoft\Cryptography",
                "/v",
                "MachineGuid",
            ])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            for line in stdout.lines() {
                if line.contains("MachineGuid") {
                    if let Some(guid) = line.split_whitespace().last() {
                        return guid.to_string();
                    }
                }
            }
        }
    }

    // Fallback: use home directory path (always available via dirs crate)
    dirs::home_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "glimpse-fallback-key".to_string())
}

/// Derive encryption key from machine-specific data
fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();

    hasher.update(get_machine_id().as_bytes());

    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }

    if let Some(data) = dirs::data_dir() {
        hasher.update(data.to_string_lossy().as_bytes());
    }

    // Fixed salt for this app
    hasher.update(b"glimpse-feed-client-v1");

    hasher.finalize().into()
}

/// Decrypt and deserialize the stored grant
fn read_encrypted(path: &PathBuf) -> Result<Option<Grant>> {
    if !path.exists() {
        return Ok(None);
    }

    let encrypted = fs::read(path).context("Failed to read credentials file")?;

    if encrypted.len() < NONCE_SIZE {
        return Ok(None);
    }

    let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let key = derive_key();
    let cipher = Aes256Gcm::new_from_slice(&key).expect("Invalid key length");

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| anyhow::anyhow!("Failed to decrypt credentials"))?;

    let json = String::from_utf8(plaintext).context("Invalid UTF-8 in credentials")?;
    let grant: Grant = serde_json::from_str(&json)?;

    Ok(Some(grant))
}

/// Serialize and encrypt the grant to disk
fn write_encrypted(path: &PathBuf, grant: &Grant) -> Result<()> {
    let json = serde_json::to_string(grant)?;

    let key = derive_key();
    let cipher = Aes256Gcm::new_from_slice(&key).expect("Invalid key length");

    let mut rng = rand::rng();
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.fill(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, json.as_bytes())
        .map_err(|_| anyhow::anyhow!("Failed to encrypt credentials"))?;

    let mut output = nonce_bytes.to_vec();
    output.extend(ciphertext);

    fs::write(path, output).context("Failed to write credentials file")?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Store the identity grant
pub fn store_grant(grant: &Grant) -> Result<()> {
    let path = credentials_path()?;
    write_encrypted(&path, grant)
}

/// Load the stored identity grant, if any
pub fn load_grant() -> Result<Option<Grant>> {
    let path = credentials_path()?;
    read_encrypted(&path)
}

/// Delete the stored identity grant (logout)
pub fn clear_grant() -> Result<()> {
    let path = credentials_path()?;
    if path.exists() {
        fs::remove_file(&path).context("Failed to remove credentials file")?;
    }
    Ok(())
}

/// Check whether a grant is stored
pub fn has_grant() -> bool {
    load_grant().map(|g| g.is_some()).unwrap_or(false)
}
