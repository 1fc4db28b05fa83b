use clap::{clap_app, Error, ErrorKind};
use log::LevelFilter;
use std::{ffi::OsString, path::PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub region: String,
    // custom endpoint, e.g. http://localhost:8000 for DynamoDB Local
    pub endpoint: Option<String>,
    pub table_name: String,
    // only used to label progress lines, DynamoDB itself decides the key
    pub key_field: String,
    pub credential_source: CredentialSource,
    // exit with a failure code when any record could not be written
    pub strict: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

/// Where the DynamoDB client gets its credentials from.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    /// Environment variables, profile file, container or instance metadata.
    Implicit,
    Explicit {
        access_key: String,
        secret_key: String,
    },
}

pub const REGION_DEFAULT: &str = "ap-southeast-1";
pub const KEY_FIELD_DEFAULT: &str = "product_id";

pub fn get_arguments() -> Result<(PathBuf, Config), Error> {
    get_arguments_from(std::env::args_os())
}

// parse command line, the first item is the binary name
pub fn get_arguments_from<I, T>(args: I) -> Result<(PathBuf, Config), Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = clap_app!(x =>
        (name: "JSON_To_DynamoDB")
        (version: "0.1.0")
        (author: "Devin (github.com/devin-git)")
        (about: "Put every object of a JSON array into a DynamoDB table, one item at a time")
        (@arg TABLE: +required "Specify DynamoDB table name")
        (@arg FILENAME: +required "Provide JSON filename. The file must contain an array of objects")
        (@arg REGION: -r --region +takes_value "Specify AWS region. E.g. ap-southeast-2, ca-central-1, eu-north-1. Default ap-southeast-1")
        (@arg ENDPOINT: -e --endpoint +takes_value "Specify a custom endpoint, e.g. http://localhost:8000 for DynamoDB Local")
        (@arg KEY: -k --key +takes_value "Specify the key field shown in progress messages. Default product_id")
        (@arg ACCESS_KEY: --accesskey +takes_value requires[SECRET_KEY] "Specify AWS access key id instead of reading credentials from the environment")
        (@arg SECRET_KEY: --secretkey +takes_value requires[ACCESS_KEY] "Specify AWS secret access key, used together with --accesskey")
        (@arg STRICT: --strict "Exit with code 1 when any record failed to upload")
        (@arg LOG_FILE: -l --logfile +takes_value "Also save diagnostic logs to the given file")
        (@arg VERBOSE: -v --verbose ... "Print more diagnostic logs, can be repeated")
    )
    .get_matches_from_safe(args)?;

    let credential_source = match (matches.value_of("ACCESS_KEY"), matches.value_of("SECRET_KEY")) {
        (Some(access_key), Some(secret_key)) => CredentialSource::Explicit {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        },
        // a half-supplied pair is already rejected by requires[..]
        _ => CredentialSource::Implicit,
    };

    let table_name = matches.value_of("TABLE").unwrap_or_default().to_string();
    if table_name.trim().is_empty() {
        return Err(Error::with_description(
            "Table name cannot be empty",
            ErrorKind::EmptyValue,
        ));
    }

    let config = Config {
        region: matches.value_of("REGION").unwrap_or(REGION_DEFAULT).to_string(),
        endpoint: matches.value_of("ENDPOINT").map(|e| e.to_string()),
        table_name,
        key_field: matches.value_of("KEY").unwrap_or(KEY_FIELD_DEFAULT).to_string(),
        credential_source,
        strict: matches.is_present("STRICT"),
        log_file: matches.value_of("LOG_FILE").map(PathBuf::from),
        log_level: verbosity_to_level(matches.occurrences_of("VERBOSE")),
    };

    let filename = PathBuf::from(matches.value_of_os("FILENAME").unwrap_or_default());

    Ok((filename, config))
}

fn verbosity_to_level(occurrences: u64) -> LevelFilter {
    match occurrences {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
