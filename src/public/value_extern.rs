use serde_json::Value;

/// Value extension trait for placeholder replacement / 占位符替换的值扩展 trait
///
/// Turns the JSON values given to `set_values` and `clone_row_and_set_values` into the text
/// written in place of a macro. The result is inserted verbatim, so implementations are
/// responsible for XML escaping.
/// 将 JSON 值转换为替换宏的文本，结果原样插入，实现需自行处理 XML 转义。
pub trait ValueExt: Send + Sync {
    /// Replace placeholders in regular text / 替换常规文本中的占位符
    ///
    /// # Arguments / 参数
    /// * `key` - Macro name without `${ }` / 不带 `${ }` 的宏名称
    /// * `value` - Value to render / 要渲染的值
    fn replace(&self, key: &str, value: &Value) -> String;

    /// Replace placeholders in a cloned table row / 替换克隆表格行中的占位符
    ///
    /// # Arguments / 参数
    /// * `index` - 1-based clone index / 从 1 开始的克隆索引
    /// * `key` - Macro name before the `#index` suffix / 追加 `#index` 之前的宏名称
    /// * `value` - Value to render / 要渲染的值
    fn replace_in_table(&self, index: usize, key: &str, value: &Value) -> String {
        let _ = index;
        self.replace(key, value)
    }
}
