/// A fixed-width unsigned integer, rendered and parsed a byte at a time.
///
/// Output order is always most significant byte first, whatever the byte order of the target.
pub trait Word: Copy {
    type Bytes: Default + AsRef<[u8]> + AsMut<[u8]> + IntoIterator<Item = u8>;

    /// Width in bytes.
    const BYTES: usize;

    fn from_be_bytes(bytes: Self::Bytes) -> Self;
    fn into_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_word {
    ($($t:ty),*) => {
        $(
            impl Word for $t {
                type Bytes = [u8; core::mem::size_of::<$t>()];

                const BYTES: usize = core::mem::size_of::<$t>();

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    Self::from_be_bytes(bytes)
                }

                fn into_be_bytes(self) -> Self::Bytes {
                    Self::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_word!(u8, u16, u32, u64);
