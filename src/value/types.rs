//! The closed set of runtime type discriminants.

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// Discriminant of a [`crate::Value`]'s runtime type.
///
/// The numeric codes follow the reference runtime's `LUA_T*` constants, which
/// leaves code 2 (light userdata) unused: host payloads are always full
/// userdata here.
///
/// # Examples
///
/// ```rust
/// use luavalue::LuaType;
///
/// assert_eq!(LuaType::Table.name(), "table");
/// assert_eq!(LuaType::Number.to_string(), "number");
/// assert_eq!(LuaType::Thread.code(), 8);
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumCount, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum LuaType {
    /// The `nil` type.
    Nil = 0,
    /// `true` and `false`.
    Boolean = 1,
    /// Integers and floats.
    Number = 3,
    /// Immutable text.
    String = 4,
    /// Shared key/value maps.
    Table = 5,
    /// Host functions and closures.
    Function = 6,
    /// Opaque host payloads.
    #[strum(serialize = "userdata")]
    UserData = 7,
    /// Coroutines.
    Thread = 8,
}

impl LuaType {
    /// Returns the lowercase type name as reported by the language's `type()`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Returns the numeric type code.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks a type up by its numeric code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(LuaType::Nil),
            1 => Some(LuaType::Boolean),
            3 => Some(LuaType::Number),
            4 => Some(LuaType::String),
            5 => Some(LuaType::Table),
            6 => Some(LuaType::Function),
            7 => Some(LuaType::UserData),
            8 => Some(LuaType::Thread),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_names() {
        let names: Vec<&str> = LuaType::iter().map(LuaType::name).collect();
        assert_eq!(
            names,
            [
                "nil", "boolean", "number", "string", "table", "function", "userdata", "thread"
            ]
        );
        assert_eq!(LuaType::COUNT, 8);
    }

    #[test]
    fn test_codes_round_trip() {
        for ty in LuaType::iter() {
            assert_eq!(LuaType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(LuaType::from_code(2), None);
        assert_eq!(LuaType::from_code(9), None);
    }
}
