//! 用量限额
//!
//! 每个 (service, plan, metric, period) 最多一个整数限额。
//! 槽位只有两个状态：未配置（没有键）和已配置（有值），save 写入或覆盖，delete 清除。

mod limit;
mod period;
mod registry;

pub use limit::*;
pub use period::*;
pub use registry::*;
