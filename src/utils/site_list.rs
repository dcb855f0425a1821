// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ConfigError;
use std::fs;
use std::path::Path;

/// 读取站点列表：每行一个域名，空行与首尾空白忽略
///
/// 文件缺失对本次运行是致命的配置错误
pub fn load_sites(path: &Path) -> Result<Vec<String>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::SiteListMissing(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_and_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.txt");
        fs::write(&path, "a.example\n\n  b.example  \n\n").unwrap();

        let sites = load_sites(&path).unwrap();
        assert_eq!(sites, vec!["a.example".to_string(), "b.example".to_string()]);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_sites(Path::new("/nonexistent/sites.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::SiteListMissing(_)));
    }
}
