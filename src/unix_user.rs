use super::resolver::{ResolutionError, UserGroupResolver};
use super::system_calls::RealSystemCalls;
use nix::unistd::{Gid, Uid};
use std::collections::HashSet;
use std::fmt;

/// A Unix user account together with the names of all groups it belongs to.
/// Immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnixUser {
    user_name: String,
    uid: Uid,
    gid: Gid,
    groups: HashSet<String>,
}

impl UnixUser {
    pub(crate) fn new(user_name: String, uid: Uid, gid: Gid, groups: HashSet<String>) -> UnixUser {
        UnixUser {
            user_name,
            uid,
            gid,
            groups,
        }
    }

    /// Resolves the account named `user_name` using the OS user and group
    /// databases and the default resolver options.
    pub fn lookup(user_name: &str) -> Result<UnixUser, ResolutionError> {
        UserGroupResolver::new(&mut RealSystemCalls {}).resolve_by_name(user_name)
    }

    /// The account's login name. Never empty.
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn gid(&self) -> Gid {
        self.gid
    }

    /// Names of the groups this user belongs to, including the primary group
    /// when the group database knows it.
    pub fn groups(&self) -> &HashSet<String> {
        &self.groups
    }

    fn sorted_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self.groups.iter().map(String::as_str).collect();
        groups.sort_unstable();
        groups
    }
}

/// Formats the user the way `id(1)` does, minus the numeric group IDs.
impl fmt::Display for UnixUser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "uid={}({}) gid={} groups={}",
            self.uid,
            self.user_name,
            self.gid,
            self.sorted_groups().join(",")
        )
    }
}
