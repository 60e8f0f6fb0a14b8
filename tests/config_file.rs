//! Integration tests for loading and saving the config file.

use std::io::Write;

use video2ascii::ascii::{CharsetKey, DitherMode};
use video2ascii::config::{AsciiOptions, Config, ConfigError};
use video2ascii::media::MediaType;
use video2ascii::render::ShaderDialect;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[source]
src = "https://example.com/cat.webp?size=large"

[render]
num_columns = 120
charset = "blocks"
dither = "bayer"
dialect = "glsl330"

[ripple]
enabled = true
speed = 60.0

[playback]
enable_spacebar_toggle = true
"#
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    let options = config.to_options();

    assert_eq!(options.num_columns, Some(120));
    assert_eq!(options.charset, CharsetKey::Blocks);
    assert_eq!(options.dither, DitherMode::Bayer);
    assert_eq!(options.dialect, ShaderDialect::Glsl330);
    assert!(options.enable_ripple);
    assert_eq!(options.ripple_speed, 60.0);
    assert!(options.enable_spacebar_toggle);
    assert_eq!(options.resolved_media_type().unwrap(), MediaType::Image);

    let defaults = AsciiOptions::default();
    assert_eq!(options.font_size, defaults.font_size);
    assert_eq!(options.trail_length, defaults.trail_length);
    assert!(options.is_playing);
    assert!(options.validate().is_ok());
}

#[test]
fn test_invalid_toml_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[render]\nfont_size = \"big\"").unwrap();

    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err
        .to_string()
        .contains(&file.path().display().to_string()));
}

#[test]
fn test_unknown_charset_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[render]\ncharset = \"emoji\"").unwrap();
    assert!(matches!(
        Config::load(Some(file.path())),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_save_then_load_preserves_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.render.custom_charset = Some(" .oO@".to_string());
    config.mouse.enabled = true;
    config.audio.effect = 40.0;
    config.source.media_type = Some(MediaType::Video);

    config.save(&path).unwrap();
    let loaded = Config::load(Some(&path)).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.to_options().effective_charset(), " .oO@");
}

#[test]
fn test_options_deserialize_from_json() {
    let options: AsciiOptions = serde_json::from_str(
        r#"{ "src": "loop.gif", "num_columns": 80, "enable_mouse": true, "show_stats": true }"#,
    )
    .unwrap();
    assert_eq!(options.num_columns, Some(80));
    assert!(options.enable_mouse);
    assert!(options.show_stats);
    assert_eq!(options.font_size, AsciiOptions::default().font_size);
    assert_eq!(options.resolved_media_type().unwrap(), MediaType::Image);
}
