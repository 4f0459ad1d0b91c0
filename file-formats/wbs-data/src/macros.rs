/// Declares a packed little-endian record.
///
/// Fields are read and written in declaration order and every field type must
/// implement [`WowStruct`](crate::types::WowStruct). The record's `SIZE` is the
/// sum of its field sizes.
///
/// ```
/// use wbs_data::wow_record;
/// use wbs_data::types::WowStruct;
///
/// wow_record! {
///     #[derive(Debug, Clone, Copy, Default, PartialEq)]
///     pub struct PortalRef {
///         pub portal_index: u16,
///         pub group_index: u16,
///         pub side: i16,
///         pub filler: u16,
///     }
/// }
///
/// assert_eq!(PortalRef::SIZE, 8);
/// ```
#[macro_export]
macro_rules! wow_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::types::WowDataR for $name {
            fn wow_read<R: ::std::io::Read>(reader: &mut R) -> $crate::error::Result<Self> {
                Ok(Self {
                    $( $field: <$fty as $crate::types::WowDataR>::wow_read(reader)?, )*
                })
            }
        }

        impl $crate::types::WowDataW for $name {
            fn wow_write<W: ::std::io::Write>(&self, writer: &mut W) -> $crate::error::Result<()> {
                $( $crate::types::WowDataW::wow_write(&self.$field, writer)?; )*
                Ok(())
            }

            fn wow_size(&self) -> usize {
                <Self as $crate::types::WowStruct>::SIZE
            }
        }

        impl $crate::types::WowStruct for $name {
            const SIZE: usize = 0 $( + <$fty as $crate::types::WowStruct>::SIZE )*;
        }
    };
}

/// Implements the record codec for a `bitflags` type over its raw integer.
///
/// Unknown bits are preserved.
#[macro_export]
macro_rules! wow_flags {
    ($name:ty, $repr:ty) => {
        impl $crate::types::WowDataR for $name {
            fn wow_read<R: ::std::io::Read>(reader: &mut R) -> $crate::error::Result<Self> {
                let bits = <$repr as $crate::types::WowDataR>::wow_read(reader)?;
                Ok(<$name>::from_bits_retain(bits))
            }
        }

        impl $crate::types::WowDataW for $name {
            fn wow_write<W: ::std::io::Write>(&self, writer: &mut W) -> $crate::error::Result<()> {
                $crate::types::WowDataW::wow_write(&self.bits(), writer)
            }

            fn wow_size(&self) -> usize {
                <$repr as $crate::types::WowStruct>::SIZE
            }
        }

        impl $crate::types::WowStruct for $name {
            const SIZE: usize = <$repr as $crate::types::WowStruct>::SIZE;
        }
    };
}
