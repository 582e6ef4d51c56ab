//! `define_port_error!`: declares a port error enum with `thiserror`
//! messages and one snake_case constructor per variant.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
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
                $variant $( { $($field : $ty),* } )?,
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

#[cfg(test)]
mod tests {
    //! Constructor generation checks.
    define_port_error! {
        pub enum ProbePortError {
            Unreachable { message: String } => "unreachable: {message}",
            Throttled { retry_after_secs: u32 } => "throttled for {retry_after_secs}s",
            Partial { message: String, received: u32 } => "partial: {message} after {received}",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        let err = ProbePortError::unreachable("dns");
        assert_eq!(err.to_string(), "unreachable: dns");
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        let err = ProbePortError::throttled(30_u32);
        assert_eq!(err, ProbePortError::Throttled { retry_after_secs: 30 });
    }

    #[test]
    fn mixed_fields_are_supported() {
        let err = ProbePortError::partial("eof", 3_u32);
        assert_eq!(err.to_string(), "partial: eof after 3");
    }
}
