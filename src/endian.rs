//! Big-endian (network order) and native-endian pack/unpack helpers.
//!
//! The wire itself is always big-endian (see §6 of the protocol notes); the
//! native-endian variants exist only because the public API surface calls
//! for both, e.g. when a caller is preparing values for something other
//! than the wire. There is no runtime host-endianness probe: `byteorder`'s
//! marker types resolve the swap (or lack of one) at compile time.

use byteorder::{BigEndian, ByteOrder, NativeEndian};

macro_rules! pack_unpack {
    ($get_be:ident, $get_ne:ident, $put_be:ident, $put_ne:ident, $ty:ty, $read:ident, $write:ident) => {
        #[inline]
        pub fn $get_be(buf: &[u8]) -> $ty {
            BigEndian::$read(buf)
        }

        #[inline]
        pub fn $get_ne(buf: &[u8]) -> $ty {
            NativeEndian::$read(buf)
        }

        #[inline]
        pub fn $put_be(buf: &mut [u8], value: $ty) {
            BigEndian::$write(buf, value)
        }

        #[inline]
        pub fn $put_ne(buf: &mut [u8], value: $ty) {
            NativeEndian::$write(buf, value)
        }
    };
}

pack_unpack!(get_u16, get_u16_ne, put_u16, put_u16_ne, u16, read_u16, write_u16);
pack_unpack!(get_u32, get_u32_ne, put_u32, put_u32_ne, u32, read_u32, write_u32);
pack_unpack!(get_u64, get_u64_ne, put_u64, put_u64_ne, u64, read_u64, write_u64);
pack_unpack!(get_i16, get_i16_ne, put_i16, put_i16_ne, i16, read_i16, write_i16);
pack_unpack!(get_i32, get_i32_ne, put_i32, put_i32_ne, i32, read_i32, write_i32);
pack_unpack!(get_i64, get_i64_ne, put_i64, put_i64_ne, i64, read_i64, write_i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips_u32() {
        let mut buf = [0u8; 4];
        put_u32(&mut buf, 0xDEAD_BEEF);
        assert_eq!(buf, [0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(get_u32(&buf), 0xDEAD_BEEF);
    }

    #[test]
    fn it_round_trips_u16() {
        let mut buf = [0u8; 2];
        put_u16(&mut buf, 513);
        assert_eq!(get_u16(&buf), 513);
    }

    #[test]
    fn native_endian_matches_host() {
        let mut buf = [0u8; 8];
        put_u64_ne(&mut buf, 1);
        assert_eq!(get_u64_ne(&buf), 1);
    }
}
