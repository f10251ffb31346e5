use super::resolver::{
    MissingGroupPolicy, ResolverOptions, DEFAULT_INITIAL_GROUP_CAPACITY,
    MAX_INITIAL_GROUP_CAPACITY,
};
use std::env;
use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use yaml_rust::{ScanError, Yaml, YamlLoader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: log::Level,
    pub initial_group_capacity: usize,
    pub missing_group_policy: MissingGroupPolicy,
}

impl Config {
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            initial_group_capacity: self.initial_group_capacity,
            missing_group_policy: self.missing_group_policy,
        }
    }
}

pub const DEFAULT_CONFIG_FILE_PATH: &str = "/etc/unixuser.yml";

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Error reading from {}: {1}", .0.display())]
    FileReadError(PathBuf, #[source] io::Error),

    #[error("Error loading {}: {1}", .0.display())]
    FileParseError(PathBuf, #[source] ScanError),

    #[error("Error loading {}: the file must contain exactly 1 YAML document", .0.display())]
    NotSingleDocument(PathBuf),

    #[error("Error loading {}: the file must contain a YAML key-value map", .0.display())]
    NotKeyValueMap(PathBuf),

    #[error("Env variable {0} contains invalid value '{1}'")]
    EnvVarInvalidValue(String, String),

    #[error("Env variable {0} contains invalid UTF-8")]
    EnvVarNotUnicode(String),

    #[error("Config option {0} contains invalid value {1}")]
    ConfigFileInvalidValue(String, String),
}

type EnvLookup = dyn Fn(&str) -> Result<String, VarError>;
type EnvValParser<T> = dyn Fn(&str) -> Option<T>;
type ConfigFileValParser<T> = dyn Fn(&Yaml) -> Option<T>;

/// Loads the configuration from the environment and the config file.
/// Environment variables take precedence over the config file.
pub fn load_config() -> Result<Config, ConfigLoadError> {
    let file_config = load_config_file_yaml(&get_config_file_path())?;
    load_config_from(&|key| env::var(key), &file_config)
}

pub fn load_config_from(
    env_lookup: &EnvLookup,
    file_config: &Yaml,
) -> Result<Config, ConfigLoadError> {
    Ok(Config {
        log_level: load_config_key::<log::Level>(
            env_lookup,
            "UNIXUSER_LOG_LEVEL",
            file_config,
            "log_level",
            log::Level::Info,
            &parse_log_level,
            &|doc| doc.as_str().and_then(parse_log_level),
        )?,
        initial_group_capacity: load_config_key::<usize>(
            env_lookup,
            "UNIXUSER_INITIAL_GROUP_CAPACITY",
            file_config,
            "initial_group_capacity",
            DEFAULT_INITIAL_GROUP_CAPACITY,
            &parse_capacity_str,
            &parse_capacity_yaml,
        )?,
        missing_group_policy: load_config_key::<MissingGroupPolicy>(
            env_lookup,
            "UNIXUSER_MISSING_GROUP_POLICY",
            file_config,
            "missing_group_policy",
            MissingGroupPolicy::Skip,
            &parse_missing_group_policy,
            &|doc| doc.as_str().and_then(parse_missing_group_policy),
        )?,
    })
}

fn get_config_file_path() -> PathBuf {
    match env::var_os("UNIXUSER_CONFIG_FILE") {
        Some(val) => PathBuf::from(val),
        None => PathBuf::from(DEFAULT_CONFIG_FILE_PATH),
    }
}

/// Reads the YAML config file. A nonexistent file counts as an empty map.
pub fn load_config_file_yaml(path: &Path) -> Result<Yaml, ConfigLoadError> {
    let file_config_str = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::from("{}"),
        Err(err) => return Err(ConfigLoadError::FileReadError(path.to_path_buf(), err)),
    };

    let documents = YamlLoader::load_from_str(file_config_str.as_str())
        .map_err(|err| ConfigLoadError::FileParseError(path.to_path_buf(), err))?;
    if documents.len() != 1 {
        return Err(ConfigLoadError::NotSingleDocument(path.to_path_buf()));
    }

    match documents[0].as_hash() {
        Some(_) => Ok(documents[0].clone()),
        None => Err(ConfigLoadError::NotKeyValueMap(path.to_path_buf())),
    }
}

fn load_config_key<T>(
    env_lookup: &EnvLookup,
    env_key: &str,
    config_file: &Yaml,
    config_key: &str,
    default_value: T,
    env_val_parser: &EnvValParser<T>,
    config_file_val_parser: &ConfigFileValParser<T>,
) -> Result<T, ConfigLoadError> {
    let config_val = &config_file[config_key];

    match env_lookup(env_key) {
        Ok(env_val) => {
            if env_val.is_empty() {
                Ok(default_value)
            } else {
                match env_val_parser(env_val.as_str()) {
                    Some(result) => Ok(result),
                    None => Err(ConfigLoadError::EnvVarInvalidValue(
                        String::from(env_key),
                        env_val,
                    )),
                }
            }
        }
        Err(VarError::NotPresent) => match config_val {
            Yaml::Null | Yaml::BadValue => Ok(default_value),
            _ => match config_file_val_parser(config_val) {
                Some(result) => Ok(result),
                None => Err(ConfigLoadError::ConfigFileInvalidValue(
                    String::from(config_key),
                    format!("{:?}", config_val),
                )),
            },
        },
        Err(VarError::NotUnicode(_)) => Err(ConfigLoadError::EnvVarNotUnicode(String::from(env_key))),
    }
}

fn parse_log_level(level: &str) -> Option<log::Level> {
    match level.to_lowercase().as_str() {
        "error" | "e" => Some(log::Level::Error),
        "warn" | "warning" | "w" => Some(log::Level::Warn),
        "info" | "i" => Some(log::Level::Info),
        "debug" | "d" => Some(log::Level::Debug),
        "trace" | "t" => Some(log::Level::Trace),
        _ => None,
    }
}

fn parse_capacity_str(val: &str) -> Option<usize> {
    val.trim()
        .parse()
        .ok()
        .filter(|num| *num <= MAX_INITIAL_GROUP_CAPACITY)
}

fn parse_capacity_yaml(doc: &Yaml) -> Option<usize> {
    doc.as_i64()
        .filter(|num| *num >= 0 && *num <= MAX_INITIAL_GROUP_CAPACITY as i64)
        .map(|num| num as usize)
}

fn parse_missing_group_policy(val: &str) -> Option<MissingGroupPolicy> {
    match val.to_lowercase().as_str() {
        "skip" => Some(MissingGroupPolicy::Skip),
        "numeric" | "numeric_id" | "use_numeric_id" => Some(MissingGroupPolicy::UseNumericId),
        "fail" | "error" => Some(MissingGroupPolicy::Fail),
        _ => None,
    }
}
