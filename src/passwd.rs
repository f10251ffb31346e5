use super::system_calls::SystemCalls;
use nix::unistd::{Gid, Uid, User};
use std::path::PathBuf;
use thiserror::Error;

/// A user's entry in the password database. Resolution only needs the
/// name, UID and primary GID; the home directory and login shell are
/// exposed for callers that want the rest of the entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: Uid,
    pub gid: Gid,
    pub home: PathBuf,
    pub shell: PathBuf,
}

impl From<User> for PasswdEntry {
    fn from(user: User) -> PasswdEntry {
        PasswdEntry {
            name: user.name,
            uid: user.uid,
            gid: user.gid,
            home: user.dir,
            shell: user.shell,
        }
    }
}

#[derive(Error, Debug)]
pub enum PasswdLookupError {
    #[error("Error looking up user database entry: {0}")]
    LookupError(#[source] nix::Error),

    #[error("User not found in user database")]
    NotFound,
}

/// Looks up a user's password database entry by its login name.
pub fn lookup_passwd_entry_by_name(
    name: &str,
    system_calls: &mut impl SystemCalls,
) -> Result<PasswdEntry, PasswdLookupError> {
    match system_calls.lookup_user_by_name(name) {
        Ok(Some(user)) => Ok(PasswdEntry::from(user)),
        Ok(None) => Err(PasswdLookupError::NotFound),
        Err(err) => Err(PasswdLookupError::LookupError(err)),
    }
}

/// Looks up a user's password database entry by its UID.
pub fn lookup_passwd_entry_by_uid(
    uid: Uid,
    system_calls: &mut impl SystemCalls,
) -> Result<PasswdEntry, PasswdLookupError> {
    match system_calls.lookup_user_by_uid(uid) {
        Ok(Some(user)) => Ok(PasswdEntry::from(user)),
        Ok(None) => Err(PasswdLookupError::NotFound),
        Err(err) => Err(PasswdLookupError::LookupError(err)),
    }
}
