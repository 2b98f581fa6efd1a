//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive; they are stored lowercased.
//! Values that fail to parse as the requested type fall back to the
//! caller's default.

use crate::domain::error::TrendError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrendError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| TrendError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, TrendError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| TrendError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { ini })
    }

    fn parse<T: FromStr>(&self, section: &str, key: &str) -> Option<T> {
        self.ini.get(section, key)?.trim().parse().ok()
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parse(section, key).unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parse(section, key).unwrap_or(default)
    }

    fn sections(&self) -> Vec<String> {
        let mut sections = self.ini.sections();
        sections.sort();
        sections
    }
}
