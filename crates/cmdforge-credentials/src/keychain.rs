//! OS keychain layer, built on the `keyring` crate. Availability is
//! probed once at startup by writing
//! and deleting a throwaway entry; a probe failure routes every later
//! call straight to the encrypted file store instead of retrying per-call.

use keyring::Entry;

const PROBE_SERVICE: &str = "cmdforge";
const PROBE_ACCOUNT: &str = "__availability_probe__";

/// Tries a set-then-delete round trip against the OS keychain. `false`
/// means every keychain call for this process should be skipped.
pub fn probe_available() -> bool {
    let Ok(entry) = Entry::new(PROBE_SERVICE, PROBE_ACCOUNT) else {
        return false;
    };
    entry.set_password("probe").is_ok() && entry.delete_credential().is_ok()
}

pub fn get(provider: &str, kind: &str) -> Option<String> {
    let entry = Entry::new(provider, kind).ok()?;
    entry.get_password().ok()
}

pub fn set(provider: &str, kind: &str, secret: &str) -> Result<(), keyring::Error> {
    Entry::new(provider, kind)?.set_password(secret)
}

pub fn delete(provider: &str, kind: &str) -> Result<(), keyring::Error> {
    Entry::new(provider, kind)?.delete_credential()
}
