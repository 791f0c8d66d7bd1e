/*
[INPUT]:  CAIP-10 account id and key storage directory
[OUTPUT]: Persistent Ed25519 session keys, one per linked account
[POS]:    Auth layer - persistent storage for identity-link session keys
[UPDATE]: When key storage format or file naming conventions change
*/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use uuid::Uuid;

use crate::auth::Ed25519Signer;

const KEY_FILE_SUFFIX: &str = ".session.key";

/// Persists the session key each account is linked with, so repeated
/// handshakes for the same account present the same `did:key`.
#[derive(Debug, Clone)]
pub struct PersistentKeyManager {
    key_dir: PathBuf,
}

impl PersistentKeyManager {
    pub fn new(key_dir: impl AsRef<Path>) -> Self {
        Self {
            key_dir: key_dir.as_ref().to_path_buf(),
        }
    }

    pub fn key_dir(&self) -> &Path {
        &self.key_dir
    }

    /// Get the stored session key for an account, creating one on first use.
    ///
    /// The new key is published with a hard link, so concurrent first uses
    /// for one account agree on whichever key landed first.
    pub fn get_or_create_signer(&self, account_id: &str) -> io::Result<Ed25519Signer> {
        if let Some(signer) = self.load_signer(account_id) {
            return Ok(signer);
        }

        let signer = Ed25519Signer::generate();
        let path = self.key_file_path(account_id);
        let staged = self.stage_key_file(&path, &signer)?;
        let linked = fs::hard_link(&staged, &path);
        fs::remove_file(&staged)?;

        match linked {
            Ok(()) => {
                debug!(account_id, did = %signer.did_key(), "created session key");
                Ok(signer)
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                self.load_signer(account_id).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("unreadable session key at {}", path.display()),
                    )
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Load a session key from disk; unreadable or malformed files count as absent
    pub fn load_signer(&self, account_id: &str) -> Option<Ed25519Signer> {
        let content = fs::read_to_string(self.key_file_path(account_id)).ok()?;
        let bytes = STANDARD.decode(content.trim()).ok()?;
        let key_bytes: [u8; 32] = bytes.as_slice().try_into().ok()?;
        Some(Ed25519Signer::from_secret_key(&key_bytes))
    }

    /// Store a session key, replacing any existing one
    pub fn save_signer(&self, account_id: &str, signer: &Ed25519Signer) -> io::Result<()> {
        let path = self.key_file_path(account_id);
        let staged = self.stage_key_file(&path, signer)?;
        fs::rename(&staged, &path)
    }

    /// Write a complete key file next to `path` under a unique name
    fn stage_key_file(&self, path: &Path, signer: &Ed25519Signer) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.key_dir)?;

        let staged = path.with_extension(format!("key.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&staged, STANDARD.encode(signer.secret_key_bytes()))?;
        restrict_permissions(&staged)?;
        Ok(staged)
    }

    /// Forget the session key of an account
    pub fn remove_signer(&self, account_id: &str) -> io::Result<()> {
        match fs::remove_file(self.key_file_path(account_id)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }

    /// Account ids that currently have a stored session key
    pub fn list_stored_accounts(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.key_dir) else {
            return Vec::new();
        };

        let mut accounts: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let stem = name.strip_suffix(KEY_FILE_SUFFIX)?;
                Some(stem.replace('_', ":"))
            })
            .collect();
        accounts.sort();
        accounts
    }

    /// File path for an account's key; `:` separators become `_`
    pub fn key_file_path(&self, account_id: &str) -> PathBuf {
        let file_stem = account_id.trim().replace(':', "_");
        self.key_dir.join(format!("{file_stem}{KEY_FILE_SUFFIX}"))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
