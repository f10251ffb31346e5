#[macro_use]
mod abort;
mod simple_logger;

use log::{debug, Level};
use nix::unistd;
use std::{env, process};
use unixuser::config::{self, Config};
use unixuser::{RealSystemCalls, ResolutionError, UnixUser, UserGroupResolver};

fn initialize_logger() {
    simple_logger::init_with_level(Level::Info).unwrap_or_else(|err| {
        eprintln!("*** ERROR initializing logger: {}", err);
        process::exit(1);
    });
}

fn reconfigure_logger(config: &Config) {
    simple_logger::set_level(config.log_level);
    debug!("Configuration: {:#?}", config);
}

fn print_usage() {
    println!(
        "Usage: unixuser-id [USER]\n\
         \n\
         Prints the UID, GID and group names of USER, which may be given as a \
         login name or a numeric UID. USER is looked up as a login name first; \
         a numeric USER that names no account is taken as a UID. Defaults to \
         the current user.\n\
         \n\
         Configuration is read from $UNIXUSER_CONFIG_FILE (default: {}) and \
         UNIXUSER_* environment variables.",
        config::DEFAULT_CONFIG_FILE_PATH
    );
}

enum Target {
    CurrentUser,
    NameOrUid(String),
}

fn parse_args() -> Target {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => Target::CurrentUser,
        [arg] if arg == "-h" || arg == "--help" => {
            print_usage();
            process::exit(0);
        }
        [arg] if arg.starts_with('-') => abort!("Unknown option '{}'. See --help.", arg),
        [arg] => Target::NameOrUid(arg.clone()),
        _ => abort!("Too many arguments. See --help."),
    }
}

fn resolve_target(config: &Config, target: &Target) -> Result<UnixUser, ResolutionError> {
    let mut system_calls = RealSystemCalls {};
    let mut resolver = UserGroupResolver::with_options(&mut system_calls, config.resolver_options());
    match target {
        Target::CurrentUser => {
            debug!("Resolving current user (UID {}).", unistd::getuid());
            resolver.resolve_by_uid(unistd::getuid())
        }
        Target::NameOrUid(user) => {
            debug!("Resolving user '{}'.", user);
            resolver.resolve_by_name_or_uid(user)
        }
    }
}

fn describe_target(target: &Target) -> String {
    match target {
        Target::CurrentUser => format!("current user (UID {})", unistd::getuid()),
        Target::NameOrUid(user) => format!("'{}'", user),
    }
}

fn main() {
    initialize_logger();
    let target = parse_args();
    let config = config::load_config().unwrap_or_else(|err| {
        abort!("Error loading configuration: {}", err);
    });
    reconfigure_logger(&config);

    let user = resolve_target(&config, &target).unwrap_or_else(|err| {
        abort!("Error resolving {}: {}", describe_target(&target), err);
    });
    println!("{}", user);
}
