//! Looks up Unix accounts in the OS user and group databases and exposes
//! their identity: login name, UID, GID and the names of all groups the
//! account belongs to.
//!
//! ```no_run
//! let user = unixuser::UnixUser::lookup("root").unwrap();
//! println!("{} is in {} group(s)", user.user_name(), user.groups().len());
//! ```

pub mod config;
pub mod passwd;
pub mod resolver;
pub mod system_calls;
pub mod unix_user;

pub use passwd::{PasswdEntry, PasswdLookupError};
pub use resolver::{MissingGroupPolicy, ResolutionError, ResolverOptions, UserGroupResolver};
pub use system_calls::{RealSystemCalls, SystemCalls};
pub use unix_user::UnixUser;
