//! Binary data reading and writing helpers.
//!
//! Little-endian cursor based primitives used whenever a component needs
//! to parse or produce a compact binary layout.

use std::io::{Cursor, Read, Write};

use crate::error::Error;

#[inline(always)]
pub fn read_u8(data: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    let mut buffer = [0x00; size_of::<u8>()];
    data.read_exact(&mut buffer)?;
    Ok(u8::from_le_bytes(buffer))
}

#[inline(always)]
pub fn read_u16(data: &mut Cursor<&[u8]>) -> Result<u16, Error> {
    let mut buffer = [0x00; size_of::<u16>()];
    data.read_exact(&mut buffer)?;
    Ok(u16::from_le_bytes(buffer))
}

#[inline(always)]
pub fn read_u32(data: &mut Cursor<&[u8]>) -> Result<u32, Error> {
    let mut buffer = [0x00; size_of::<u32>()];
    data.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

#[inline(always)]
pub fn read_bytes(data: &mut Cursor<&[u8]>, count: usize) -> Result<Vec<u8>, Error> {
    let mut buffer = vec![0x00; count];
    data.read_exact(&mut buffer)?;
    Ok(buffer)
}

#[inline(always)]
pub fn write_u8(data: &mut Cursor<Vec<u8>>, value: u8) -> Result<(), Error> {
    data.write_all(&value.to_le_bytes())?;
    Ok(())
}

#[inline(always)]
pub fn write_u16(data: &mut Cursor<Vec<u8>>, value: u16) -> Result<(), Error> {
    data.write_all(&value.to_le_bytes())?;
    Ok(())
}

#[inline(always)]
pub fn write_u32(data: &mut Cursor<Vec<u8>>, value: u32) -> Result<(), Error> {
    data.write_all(&value.to_le_bytes())?;
    Ok(())
}

#[inline(always)]
pub fn write_bytes(data: &mut Cursor<Vec<u8>>, value: &[u8]) -> Result<(), Error> {
    data.write_all(value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{read_u16, read_u8, write_u16, write_u8};

    #[test]
    fn test_read_round_trip() {
        let mut cursor = Cursor::new(vec![]);
        write_u8(&mut cursor, 0x12).unwrap();
        write_u16(&mut cursor, 0x3456).unwrap();

        let data = cursor.into_inner();
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(read_u8(&mut cursor).unwrap(), 0x12);
        assert_eq!(read_u16(&mut cursor).unwrap(), 0x3456);
    }

    #[test]
    fn test_read_exhausted() {
        let data = [0x01u8];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(read_u8(&mut cursor).unwrap(), 0x01);
        assert!(read_u16(&mut cursor).is_err());
    }
}
