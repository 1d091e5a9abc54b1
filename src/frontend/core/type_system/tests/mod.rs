//! Type system tests module
//!
//! - interning: 哈希一致化与布局
//! - evaluate: 延迟类求值
//! - matching: 前缀匹配与推断绑定
//! - coercion: 数值与枚举转换


use crate::frontend::core::names::{NameId, NameTable};
use crate::frontend::core::type_system::{ClassTable, Field};

/// Class table plus the names used to build structs and enums
pub(crate) struct Fixture {
    pub classes: ClassTable,
    pub names: NameTable,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            classes: ClassTable::default(),
            names: NameTable::default(),
        }
    }

    pub fn name(
        &mut self,
        text: &str,
    ) -> NameId {
        self.names.intern(text.as_bytes()).unwrap()
    }

    pub fn field(
        &mut self,
        text: &str,
        class: crate::frontend::core::type_system::Class,
    ) -> Field {
        Field::stored(self.name(text), class)
    }
}
