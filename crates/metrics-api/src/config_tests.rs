use super::*;
use serial_test::serial;
use std::io::Write;

fn clear_env() {
    for key in [
        "ADDRESS",
        "STORE_INTERVAL",
        "FILE_STORAGE_PATH",
        "RESTORE",
        "DATABASE_DSN",
        "KEY",
        "CRYPTO_KEY",
        "TRUSTED_SUBNET",
        "AUDIT_FILE",
        "AUDIT_URL",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn defaults_apply_when_nothing_is_set() {
    clear_env();
    let cli = Cli::default();
    let settings = ServerSettings::resolve(cli).unwrap();

    assert_eq!(settings.address, "0.0.0.0:8080".parse().unwrap());
    assert_eq!(settings.store_interval, Duration::from_secs(300));
    assert!(!settings.restore);
    assert_eq!(settings.hmac_key, "");
}

#[test]
#[serial]
fn cli_flag_overrides_default() {
    clear_env();
    let cli = Cli {
        address: Some("127.0.0.1:9000".to_string()),
        ..Cli::default()
    };
    let settings = ServerSettings::resolve(cli).unwrap();

    assert_eq!(settings.address, "127.0.0.1:9000".parse().unwrap());
}

#[test]
#[serial]
fn config_file_overrides_default_but_not_cli() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"address": "127.0.0.1:7000", "hmac_key": "from-file"}}"#).unwrap();

    let cli = Cli {
        address: Some("127.0.0.1:9000".to_string()),
        config_path: Some(file.path().to_path_buf()),
        ..Cli::default()
    };
    let settings = ServerSettings::resolve(cli).unwrap();

    assert_eq!(settings.address, "127.0.0.1:9000".parse().unwrap());
    assert_eq!(settings.hmac_key, "from-file");
}

#[test]
#[serial]
fn environment_variable_outranks_cli_flag_and_file() {
    clear_env();
    std::env::set_var("ADDRESS", "192.168.0.1:1111");

    let cli = Cli {
        address: Some("127.0.0.1:9000".to_string()),
        ..Cli::default()
    };
    let settings = ServerSettings::resolve(cli).unwrap();

    assert_eq!(settings.address, "192.168.0.1:1111".parse().unwrap());
    std::env::remove_var("ADDRESS");
}

#[test]
#[serial]
fn invalid_address_is_a_configuration_error() {
    clear_env();
    let cli = Cli {
        address: Some("not-an-address".to_string()),
        ..Cli::default()
    };
    let err = ServerSettings::resolve(cli).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}
