//! 带注释的 YAML 配置读写。
//!
//! 配置文件缺失时写入默认值；已有文件会与默认值深度合并，缺少字段时带注释重写。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid yaml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    pub name: &'static str,
    pub description: &'static str,
}

pub trait ConfigSpec: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;
    fn fields() -> &'static [FieldMeta];
}

/// 读取配置；`base_dir` 为 `None` 时使用当前目录。
pub fn load_or_create<T: ConfigSpec>(base_dir: Option<&Path>) -> Result<T, ConfigError> {
    let path = base_dir
        .map(|dir| dir.join(T::FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(T::FILE_NAME));
    load_or_create_at(&path)
}

pub fn load_or_create_at<T: ConfigSpec>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        let config = T::default();
        write_with_comments(&config, path)?;
        info!(target: "config", "已生成默认配置: {}", path.display());
        return Ok(config);
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let user: Value = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let missing = missing_fields::<T>(&user);

    let mut merged = to_yaml(&T::default())?;
    merge_values(&mut merged, user);
    let config: T =
        serde_yaml::from_value(merged).map_err(|err| ConfigError::Validation(err.to_string()))?;

    if !missing.is_empty() {
        info!(target: "config", "配置缺少字段 {:?}，已补全", missing);
        write_with_comments(&config, path)?;
    }
    Ok(config)
}

pub fn write_with_comments<T: ConfigSpec>(config: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let yaml = render_with_comments(config)?;
    fs::write(path, yaml).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn render_with_comments<T: ConfigSpec>(config: &T) -> Result<String, ConfigError> {
    let Value::Mapping(mapping) = to_yaml(config)? else {
        return Err(ConfigError::Validation(
            "config must serialize to a mapping".to_string(),
        ));
    };

    let mut out = String::new();
    for field in T::fields() {
        for line in field.description.lines() {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
        let key = Value::String(field.name.to_string());
        let val = mapping.get(&key).cloned().unwrap_or(Value::Null);
        let entry = serde_yaml::to_string(&Mapping::from_iter([(key, val)]))
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        out.push_str(entry.trim_end());
        out.push('\n');
    }
    Ok(out)
}

fn to_yaml<T: Serialize>(value: &T) -> Result<Value, ConfigError> {
    serde_yaml::to_value(value).map_err(|err| ConfigError::Validation(err.to_string()))
}

fn missing_fields<T: ConfigSpec>(user: &Value) -> Vec<&'static str> {
    let Value::Mapping(map) = user else {
        return T::fields().iter().map(|f| f.name).collect();
    };
    T::fields()
        .iter()
        .filter(|f| !map.contains_key(Value::String(f.name.to_string())))
        .map(|f| f.name)
        .collect()
}

fn merge_values(default: &mut Value, user: Value) {
    match (default, user) {
        (Value::Mapping(dest), Value::Mapping(src)) => {
            for (key, user_val) in src {
                match dest.get_mut(&key) {
                    Some(dest_val) => merge_values(dest_val, user_val),
                    None => {
                        dest.insert(key, user_val);
                    }
                }
            }
        }
        // 空文件解析为 Null，保留默认值
        (_, Value::Null) => {}
        (dest, other) => *dest = other,
    }
}
