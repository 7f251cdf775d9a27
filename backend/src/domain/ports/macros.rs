//! `define_port_error!`: declares a driven-port error enum with snake_case
//! constructors.
//!
//! Each variant becomes a `thiserror` variant carrying its display message;
//! each constructor takes `impl Into<T>` per field so call sites can pass
//! `&str` where the field is a `String`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_fields $variant [] [] $( $field : $ty, )*);
    };

    (@ctor_fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            #[must_use]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_fields
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $(#[doc = concat!("Value of `", stringify!($field), "`.")] $field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
