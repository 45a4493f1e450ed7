//! `define_port_error!`: port error enums with one constructor per variant.
//!
//! Every variant carries named fields. The generated constructor is the
//! snake_case variant name and takes each field as `impl Into<T>`, so
//! adapters can write `InventoryStoreError::store_unavailable("pool closed")`.

macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant {
                            $($field: $field.into()),+
                        }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;
