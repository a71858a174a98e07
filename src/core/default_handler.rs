use crate::public::value_extern::ValueExt;
use quick_xml::escape::escape;
use serde_json::Value;

/// Default implementation of placeholder value handling / 占位符值处理的默认实现
///
/// - Strings are XML-escaped / 字符串进行 XML 转义
/// - Null becomes empty text / Null 变为空文本
/// - Numbers and booleans use their JSON spelling / 数字和布尔值使用 JSON 表示
/// - Arrays and objects are serialized as JSON, then escaped / 数组和对象序列化为 JSON 后转义
#[derive(Default)]
pub(crate) struct DefaultValueHandler;

impl DefaultValueHandler {
    /// Convert JSON value to string without quotes / 将 JSON 值转换为不带引号的字符串
    fn handle_without_quotes(value: &Value) -> String {
        match value {
            Value::String(s) => escape(s.as_str()).into_owned(),
            Value::Null => String::new(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => escape(value.to_string().as_str()).into_owned(),
        }
    }
}

impl ValueExt for DefaultValueHandler {
    fn replace(&self, _key: &str, value: &Value) -> String {
        Self::handle_without_quotes(value)
    }
}
