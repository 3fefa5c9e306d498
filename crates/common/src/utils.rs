//! 通用工具函数

/// 存储键转义
///
/// 空白字符替换为 `+`，与存量数据使用的键格式保持一致，其余字节原样保留
pub fn encode_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_whitespace() { '+' } else { c })
        .collect()
}
