use std::fs;
use std::path::Path;

use formats::Boundary;
use session::SessionConfig;

/// Environment variable that overrides the poll interval, in milliseconds.
pub const POLL_ENV: &str = "GEOFENCE_POLL_MS";

/// Loads the session config from `path` (defaults when absent), then applies
/// the poll interval override if one was given.
pub fn load_config(
    path: Option<&Path>,
    poll_override: Option<&str>,
) -> Result<SessionConfig, String> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            SessionConfig::from_json_str(&text).map_err(|e| format!("{path:?}: {e}"))?
        }
        None => SessionConfig::default(),
    };
    if let Some(raw) = poll_override {
        config
            .override_poll_interval(raw)
            .map_err(|e| format!("{POLL_ENV}: {e}"))?;
    }
    Ok(config)
}

pub fn read_boundary(path: &Path) -> Result<Boundary, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    Boundary::from_geojson_str(&text).map_err(|e| format!("{path:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::{load_config, read_boundary};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("geofence-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_without_file_or_override() {
        let config = load_config(None, None).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
    }

    #[test]
    fn override_beats_config_file() {
        let path = scratch_file("config.json", r#"{"poll_interval_ms": 1000, "map": {"zoom": 12}}"#);
        let config = load_config(Some(&path), Some("250")).unwrap();
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.map.zoom, 12.0);

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.poll_interval_ms, 1000);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn bad_override_names_the_variable() {
        let err = load_config(None, Some("0")).unwrap_err();
        assert!(err.starts_with("GEOFENCE_POLL_MS: "), "{err}");
        assert!(load_config(None, Some("soon")).is_err());
    }

    #[test]
    fn missing_files_are_reported() {
        let path = std::env::temp_dir().join("geofence-does-not-exist.json");
        assert!(load_config(Some(&path), None).unwrap_err().starts_with("read "));
        assert!(read_boundary(&path).unwrap_err().starts_with("read "));
    }

    #[test]
    fn reads_boundary_file() {
        let path = scratch_file(
            "boundary.geojson",
            r#"{"type":"Polygon","coordinates":[[[0,0],[0,10],[10,10],[10,0]]]}"#,
        );
        assert_eq!(read_boundary(&path).unwrap().vertex_count(), 4);
        fs::remove_file(&path).unwrap();
    }
}
