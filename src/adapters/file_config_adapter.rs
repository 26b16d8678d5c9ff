//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_usize(&self, section: &str, key: &str, default: usize) -> usize {
        self.config
            .getuint(section, key)
            .ok()
            .flatten()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[provider]
hist_base = http://localhost:9010
max_retries = 5

[cache]
data_dir = /tmp/eod-data

[backtest]
initial_cash = 250000.5
symbol_limit = 20
force_refresh = yes

[web]
listen = 127.0.0.1:8000
"#;

    #[test]
    fn reads_strings_across_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("provider", "hist_base"),
            Some("http://localhost:9010".to_string())
        );
        assert_eq!(
            adapter.get_string("cache", "data_dir"),
            Some("/tmp/eod-data".to_string())
        );
        assert_eq!(
            adapter.get_string("web", "listen"),
            Some("127.0.0.1:8000".to_string())
        );
        assert_eq!(adapter.get_string("web", "missing"), None);
        assert_eq!(adapter.get_string("nope", "listen"), None);
    }

    #[test]
    fn numeric_accessors_with_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();

        assert_eq!(adapter.get_int("provider", "max_retries", 3), 5);
        assert_eq!(adapter.get_int("provider", "missing", 3), 3);

        assert_eq!(adapter.get_usize("backtest", "symbol_limit", 10), 20);
        assert_eq!(adapter.get_usize("backtest", "missing", 10), 10);

        let cash = adapter.get_double("backtest", "initial_cash", 0.0);
        assert!((cash - 250_000.5).abs() < f64::EPSILON);
        assert!((adapter.get_double("backtest", "missing", 9.5) - 9.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_values_fall_back_to_default() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol_limit = lots\n").unwrap();
        assert_eq!(adapter.get_usize("backtest", "symbol_limit", 10), 10);
        assert_eq!(adapter.get_int("backtest", "symbol_limit", 7), 7);
    }

    #[test]
    fn bool_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[a]\nx = yes\ny = 0\nz = maybe\n").unwrap();
        assert!(adapter.get_bool("a", "x", false));
        assert!(!adapter.get_bool("a", "y", true));
        assert!(adapter.get_bool("a", "z", true));
        assert!(!adapter.get_bool("a", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[cache]\ndata_dir = ./data\n").unwrap();

        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("cache", "data_dir"),
            Some("./data".to_string())
        );
    }

    #[test]
    fn from_file_missing_path_errors() {
        assert!(FileConfigAdapter::from_file("/nonexistent/eodtrader.ini").is_err());
    }
}
