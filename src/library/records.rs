//! 记录结构的字段元信息与插入前校验。

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct ColumnMeta {
    pub name: &'static str,
    pub primary_key: bool,
}

/// 可持久化的记录。列顺序即存储顺序，第一列主键为记录主键。
pub trait TableSchema: DeserializeOwned {
    const TABLE_NAME: &'static str;
    fn columns() -> &'static [ColumnMeta];
}

pub fn table_fields<T: TableSchema>() -> Vec<&'static str> {
    T::columns().iter().map(|c| c.name).collect()
}

pub fn table_pk<T: TableSchema>() -> Option<&'static str> {
    T::columns().iter().find(|c| c.primary_key).map(|c| c.name)
}

pub fn non_pk_fields<T: TableSchema>() -> Vec<&'static str> {
    let pk = table_pk::<T>();
    T::columns()
        .iter()
        .map(|c| c.name)
        .filter(|name| Some(*name) != pk)
        .collect()
}

/// 给定的字段是否覆盖了所有列。`ignore_pk` 为真时不要求主键（通常自增）。
pub fn all_fields_have_value<T, S>(fields_given: &[S], ignore_pk: bool) -> bool
where
    T: TableSchema,
    S: AsRef<str>,
{
    let required = if ignore_pk {
        non_pk_fields::<T>()
    } else {
        table_fields::<T>()
    };
    required
        .iter()
        .all(|f| fields_given.iter().any(|g| g.as_ref() == *f))
}

/// 这组值能否构造出一条记录（类型正确、没有未知字段）。
pub fn can_make_row<T: TableSchema>(values: &Map<String, Value>) -> bool {
    build_row::<T>(values).is_ok()
}

pub fn build_row<T: TableSchema>(values: &Map<String, Value>) -> serde_json::Result<T> {
    serde_json::from_value(Value::Object(values.clone()))
}

/// 第一个满足 `key(item) == value` 的下标。
pub fn find_by_attr<T, K, F>(items: &[T], value: &K, key: F) -> Option<usize>
where
    K: PartialEq + ?Sized,
    F: Fn(&T) -> &K,
{
    items.iter().position(|item| key(item) == value)
}
