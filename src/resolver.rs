//! Turns a user name and its password database entry into a [UnixUser] by
//! enumerating the user's groups and resolving their names.
use super::passwd::{
    lookup_passwd_entry_by_name, lookup_passwd_entry_by_uid, PasswdEntry, PasswdLookupError,
};
use super::system_calls::{GroupListTooSmall, SystemCalls};
use super::unix_user::UnixUser;
use libc::gid_t;
use log::{debug, trace, warn};
use nix::unistd::{Gid, Uid};
use std::collections::HashSet;
use std::ffi::{CStr, CString, NulError};
use thiserror::Error;

pub const DEFAULT_INITIAL_GROUP_CAPACITY: usize = 64;

/// Upper bound for [ResolverOptions::initial_group_capacity]. Matches the
/// kernel's NGROUPS_MAX on Linux.
pub const MAX_INITIAL_GROUP_CAPACITY: usize = 65536;

/// What to do with a group ID that the group database has no entry for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingGroupPolicy {
    /// Leave the group out and log a warning.
    Skip,
    /// Use the decimal group ID as the group's name.
    UseNumericId,
    /// Fail the resolution with [ResolutionError::GroupNotFound].
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Number of group ID slots to offer `getgrouplist()` on the first attempt.
    /// Clamped to `1..=MAX_INITIAL_GROUP_CAPACITY`.
    pub initial_group_capacity: usize,
    pub missing_group_policy: MissingGroupPolicy,
}

impl Default for ResolverOptions {
    fn default() -> ResolverOptions {
        ResolverOptions {
            initial_group_capacity: DEFAULT_INITIAL_GROUP_CAPACITY,
            missing_group_policy: MissingGroupPolicy::Skip,
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("User name is empty")]
    EmptyUserName,

    #[error("User name contains a NUL byte: {0}")]
    InvalidUserName(#[source] NulError),

    #[error(
        "getgrouplist() failed for user '{user}' even after growing \
         the buffer to {required} entries"
    )]
    GroupListFailed { user: String, required: usize },

    #[error("Error looking up group database entry for GID {0}: {1}")]
    GroupLookupError(Gid, #[source] nix::Error),

    #[error("Group with GID {0} not found in group database")]
    GroupNotFound(Gid),

    #[error("{0}")]
    PasswdLookup(#[from] PasswdLookupError),
}

pub struct UserGroupResolver<'a, S: SystemCalls> {
    system_calls: &'a mut S,
    options: ResolverOptions,
}

impl<'a, S: SystemCalls> UserGroupResolver<'a, S> {
    pub fn new(system_calls: &'a mut S) -> UserGroupResolver<'a, S> {
        UserGroupResolver::with_options(system_calls, ResolverOptions::default())
    }

    pub fn with_options(
        system_calls: &'a mut S,
        options: ResolverOptions,
    ) -> UserGroupResolver<'a, S> {
        UserGroupResolver {
            system_calls,
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Builds the identity record for `user_name`, whose password database
    /// entry has already been looked up. UID and GID are taken from `entry`
    /// as-is. Either the complete record is returned or nothing.
    pub fn resolve(
        &mut self,
        user_name: &str,
        entry: &PasswdEntry,
    ) -> Result<UnixUser, ResolutionError> {
        if user_name.is_empty() {
            return Err(ResolutionError::EmptyUserName);
        }
        let c_user_name = CString::new(user_name).map_err(ResolutionError::InvalidUserName)?;
        let group_ids = self.fetch_group_ids(user_name, &c_user_name, entry.gid)?;
        let groups = self.resolve_group_names(&group_ids)?;
        debug!(
            "Resolved user '{}' (UID {}, GID {}) with {} group(s).",
            user_name,
            entry.uid,
            entry.gid,
            groups.len()
        );
        Ok(UnixUser::new(
            String::from(user_name),
            entry.uid,
            entry.gid,
            groups,
        ))
    }

    pub fn resolve_by_name(&mut self, user_name: &str) -> Result<UnixUser, ResolutionError> {
        let entry = lookup_passwd_entry_by_name(user_name, &mut *self.system_calls)?;
        self.resolve(user_name, &entry)
    }

    pub fn resolve_by_uid(&mut self, uid: Uid) -> Result<UnixUser, ResolutionError> {
        let entry = lookup_passwd_entry_by_uid(uid, &mut *self.system_calls)?;
        self.resolve(&entry.name, &entry)
    }

    /// Resolves `user` as a login name. If no account has that name and
    /// `user` is numeric, resolves it as a UID instead, like `id(1)` does.
    pub fn resolve_by_name_or_uid(&mut self, user: &str) -> Result<UnixUser, ResolutionError> {
        match self.resolve_by_name(user) {
            Err(ResolutionError::PasswdLookup(PasswdLookupError::NotFound)) => {
                match user.parse::<u32>() {
                    Ok(uid) => {
                        debug!("No account named '{}', resolving it as a UID.", user);
                        self.resolve_by_uid(Uid::from_raw(uid))
                    }
                    Err(_) => Err(ResolutionError::PasswdLookup(PasswdLookupError::NotFound)),
                }
            }
            result => result,
        }
    }

    fn initial_capacity(&self) -> usize {
        self.options
            .initial_group_capacity
            .clamp(1, MAX_INITIAL_GROUP_CAPACITY)
    }

    // The OS reports the capacity it needs when the first buffer is too small.
    // Having grown to exactly that capacity, a second failure is not retried.
    fn fetch_group_ids(
        &mut self,
        user_name: &str,
        c_user_name: &CStr,
        gid: Gid,
    ) -> Result<Vec<gid_t>, ResolutionError> {
        let mut buffer: Vec<gid_t> = vec![0; self.initial_capacity()];
        let count = match self
            .system_calls
            .get_group_list(c_user_name, gid, &mut buffer)
        {
            Ok(count) => count,
            Err(GroupListTooSmall { required }) => {
                debug!(
                    "Group list of user '{}' does not fit in {} entries, \
                     retrying with {} entries.",
                    user_name,
                    buffer.len(),
                    required
                );
                buffer.resize(required, 0);
                self.system_calls
                    .get_group_list(c_user_name, gid, &mut buffer)
                    .map_err(|err| ResolutionError::GroupListFailed {
                        user: String::from(user_name),
                        required: err.required,
                    })?
            }
        };
        buffer.truncate(count);
        Ok(buffer)
    }

    fn resolve_group_names(
        &mut self,
        group_ids: &[gid_t],
    ) -> Result<HashSet<String>, ResolutionError> {
        let mut groups = HashSet::with_capacity(group_ids.len());
        for &raw_gid in group_ids {
            let gid = Gid::from_raw(raw_gid);
            trace!("Looking up name of group {}.", gid);
            match self.system_calls.lookup_group_by_gid(gid) {
                Ok(Some(group)) => {
                    groups.insert(group.name);
                }
                Ok(None) => match self.options.missing_group_policy {
                    MissingGroupPolicy::Skip => {
                        warn!("Group {} not found in group database, skipping.", gid);
                    }
                    MissingGroupPolicy::UseNumericId => {
                        groups.insert(raw_gid.to_string());
                    }
                    MissingGroupPolicy::Fail => return Err(ResolutionError::GroupNotFound(gid)),
                },
                Err(err) => return Err(ResolutionError::GroupLookupError(gid, err)),
            }
        }
        Ok(groups)
    }
}
