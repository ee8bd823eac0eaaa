//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Each variant maps to exactly one canonical string. Parsing is
//! case-insensitive; display always emits the canonical spelling.
//!
//! # Example
//!
//! ```rust
//! use faros_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Edition {
//!     Cloud,
//!     Community,
//! }
//!
//! impl_domain_enum_conversions!(Edition {
//!     Cloud => "cloud",
//!     Community => "community",
//! });
//!
//! assert_eq!("CLOUD".parse::<Edition>().unwrap(), Edition::Cloud);
//! assert_eq!(Edition::Community.to_string(), "community");
//! ```

/// Implements Display and FromStr traits for enums with a canonical spelling
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Incremental,
        FullRefresh,
    }

    impl_domain_enum_conversions!(Mode {
        Incremental => "incremental",
        FullRefresh => "full_refresh",
    });

    /// Expanded next to the crate's one-parameter `Result` alias.
    mod beside_result_alias {
        #[allow(unused_imports)]
        use crate::errors::Result;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub(super) enum Edition {
            Cloud,
            Community,
        }

        impl_domain_enum_conversions!(Edition {
            Cloud => "cloud",
            Community => "community",
        });
    }

    #[test]
    fn test_display_uses_canonical_spelling() {
        assert_eq!(Mode::Incremental.to_string(), "incremental");
        assert_eq!(Mode::FullRefresh.to_string(), "full_refresh");
    }

    #[test]
    fn test_fromstr_is_case_insensitive() {
        assert_eq!(Mode::from_str("INCREMENTAL").unwrap(), Mode::Incremental);
        assert_eq!(Mode::from_str("Full_Refresh").unwrap(), Mode::FullRefresh);
    }

    #[test]
    fn test_expands_where_result_alias_is_in_scope() {
        use beside_result_alias::Edition;

        assert_eq!("CLOUD".parse::<Edition>(), Ok(Edition::Cloud));
        assert_eq!(Edition::Community.as_str(), "community");
        assert!("enterprise".parse::<Edition>().is_err());
    }

    #[test]
    fn test_fromstr_invalid() {
        let err = Mode::from_str("append").unwrap_err();
        assert!(err.contains("Invalid Mode"));
        assert!(err.contains("append"));
    }
}
