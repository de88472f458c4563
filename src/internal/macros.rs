//! A set of macros for easily working with internals.

/// Generates an enum mirroring an integer value sent by Discord, with a catch-all `Unknown`
/// variant so that values introduced after this library was written survive a round trip.
///
/// Conversions in both directions are provided through `From`, which is what the rest of the
/// library uses to decode raw integers lazily, at read time.
macro_rules! enum_number {
    (
        $(#[$outer:meta])*
        $vis:vis enum $Enum:ident {
            $(
                $(#[doc = $doc:literal])*
                $Variant:ident = $value:literal,
            )*
            _ => Unknown($T:ty),
        }
    ) => {
        $(#[$outer])*
        $vis enum $Enum {
            $(
                $(#[doc = $doc])*
                $Variant,
            )*
            /// Variant value is unknown.
            Unknown($T),
        }

        impl From<$T> for $Enum {
            fn from(value: $T) -> Self {
                match value {
                    $($value => Self::$Variant,)*
                    unknown => Self::Unknown(unknown),
                }
            }
        }

        impl From<$Enum> for $T {
            fn from(value: $Enum) -> Self {
                match value {
                    $($Enum::$Variant => $value,)*
                    $Enum::Unknown(unknown) => unknown,
                }
            }
        }
    };
}

macro_rules! cdn {
    ($e:expr) => {
        concat!("https://cdn.discordapp.com", $e)
    };
    ($e:expr, $($rest:tt)*) => {
        format!(cdn!($e), $($rest)*)
    };
}

/// Formats a path below the REST API root held by an [`Http`] client.
///
/// [`Http`]: crate::http::Http
macro_rules! api {
    ($base:expr, $e:expr, $($rest:tt)*) => {
        format!(concat!("{}", $e), $base, $($rest)*)
    };
}
