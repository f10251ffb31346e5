//! This module wraps the system calls that user and group resolution relies
//! on. Wrapped system calls are defined in the [SystemCalls] trait, whose
//! default methods call into the OS. [RealSystemCalls] provides the real
//! implementation. During tests, you can provide your own mock
//! implementations so that no actual system calls are made.
use libc::{c_int, gid_t};
use log::trace;
use nix::unistd::{Gid, Group, Uid, User};
use std::ffi::CStr;
use thiserror::Error;

/// Returned by [SystemCalls::get_group_list] when the supplied buffer cannot
/// hold all of the user's group IDs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("group list buffer too small: {required} entries required")]
pub struct GroupListTooSmall {
    /// The capacity reported by the OS as necessary to hold the full list.
    pub required: usize,
}

pub trait SystemCalls {
    /// Fills `groups` with the IDs of all groups that `user` is a member of,
    /// including `group`. Returns the number of IDs written.
    fn get_group_list(
        self: &mut Self,
        user: &CStr,
        group: Gid,
        groups: &mut [gid_t],
    ) -> Result<usize, GroupListTooSmall> {
        let mut ngroups = groups.len().min(c_int::MAX as usize) as c_int;
        trace!(
            "Calling getgrouplist({:?}, {}, <{} slots>)",
            user,
            group,
            ngroups
        );
        let ret = unsafe { call_getgrouplist(user, group, groups, &mut ngroups) };
        let count = ngroups.max(0) as usize;
        if ret < 0 {
            Err(GroupListTooSmall { required: count })
        } else {
            Ok(count.min(groups.len()))
        }
    }

    fn lookup_group_by_gid(self: &mut Self, gid: Gid) -> nix::Result<Option<Group>> {
        Group::from_gid(gid)
    }

    fn lookup_user_by_name(self: &mut Self, name: &str) -> nix::Result<Option<User>> {
        User::from_name(name)
    }

    fn lookup_user_by_uid(self: &mut Self, uid: Uid) -> nix::Result<Option<User>> {
        User::from_uid(uid)
    }
}

pub struct RealSystemCalls {}

impl SystemCalls for RealSystemCalls {}

// macOS declares getgrouplist() with int instead of gid_t.
#[cfg(any(target_os = "macos", target_os = "ios"))]
unsafe fn call_getgrouplist(
    user: &CStr,
    group: Gid,
    groups: &mut [gid_t],
    ngroups: &mut c_int,
) -> c_int {
    libc::getgrouplist(
        user.as_ptr(),
        group.as_raw() as c_int,
        groups.as_mut_ptr() as *mut c_int,
        ngroups,
    )
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
unsafe fn call_getgrouplist(
    user: &CStr,
    group: Gid,
    groups: &mut [gid_t],
    ngroups: &mut c_int,
) -> c_int {
    libc::getgrouplist(user.as_ptr(), group.as_raw(), groups.as_mut_ptr(), ngroups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn get_group_list_includes_primary_group() {
        let user = match User::from_uid(Uid::current()) {
            Ok(Some(user)) => user,
            _ => return,
        };
        let name = CString::new(user.name.as_bytes()).unwrap();
        let mut buffer = vec![0 as gid_t; 1024];
        let count = RealSystemCalls {}
            .get_group_list(&name, user.gid, &mut buffer)
            .unwrap();
        assert!(buffer[..count].contains(&user.gid.as_raw()));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn get_group_list_reports_required_capacity() {
        let user = match User::from_uid(Uid::current()) {
            Ok(Some(user)) => user,
            _ => return,
        };
        let name = CString::new(user.name.as_bytes()).unwrap();
        let mut empty: [gid_t; 0] = [];
        let result = RealSystemCalls {}.get_group_list(&name, user.gid, &mut empty);
        match result {
            Err(GroupListTooSmall { required }) => assert!(required >= 1),
            Ok(count) => panic!("Expected failure with an empty buffer, got {}", count),
        }
    }
}
