//! 类型系统子模块
//!
//! - class: 类 (Class) 的标识与打包形式
//! - table: 结构类的哈希一致化 (hash-consing) 与布局
//! - value: 推断槽位与值
//! - evaluate: 延迟类的求值
//! - matching: 结构匹配与推断绑定
//! - coerce: 参数的数值/枚举转换
//! - error: 类型错误定义

pub mod class;
pub mod coerce;
pub mod error;
pub mod evaluate;
pub mod matching;
pub mod table;
pub mod value;

#[cfg(test)]
pub mod tests;

// 重新导出主要类型
pub use class::{class_hash, Class, ClassIndex, ClassKind, ClassTag, Prefix, PrefixKind, Prefixes, Scalar};
pub use error::TypeError;
pub use table::{
    ArrayInfo, ArraySize, ClassInfo, ClassTable, ClassTableStats, EnumInfo, Field, InstanceId, Layout,
    ProcPointerInfo, ProcedureInfo, ProcedureSignature, StructInfo, TupleInfo, ARRAY_SIZE_MAX,
    TUPLE_SIZE_MAX,
};
pub use value::{Bindings, ValueData, ValueFlags, ValueInfo, MAX_INFERED};
