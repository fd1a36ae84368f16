use super::MessageBuffer;
use super::write::bits_to_hold_u64;
use crate::bits;
use crate::error::{CodecError, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

impl MessageBuffer {
    fn pull_bits_u32(&mut self, bits: u32) -> Result<u32> {
        self.check_read(bits as usize)?;
        let value = bits::read_u32_unaligned(&self.data, bits, self.read_position);
        self.read_position += bits as usize;
        Ok(value)
    }

    fn pull_bits_u64(&mut self, bits: u32) -> Result<u64> {
        self.check_read(bits as usize)?;
        let value = bits::read_u64_unaligned(&self.data, bits, self.read_position);
        self.read_position += bits as usize;
        Ok(value)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.pull_bits_u32(1)? != 0)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.pull_bits_u32(8)? as u8)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.pull_bits_u32(8)? as u8 as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check_read(16)?;
        let value = if self.read_position & 7 == 0 {
            let at = self.read_position / 8;
            u16::from_le_bytes([self.data[at], self.data[at + 1]])
        } else {
            bits::read_u32_unaligned(&self.data, 16, self.read_position) as u16
        };
        self.read_position += 16;
        Ok(value)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check_read(32)?;
        let value = if self.read_position & 7 == 0 {
            let at = self.read_position / 8;
            u32::from_le_bytes([
                self.data[at],
                self.data[at + 1],
                self.data[at + 2],
                self.data[at + 3],
            ])
        } else {
            bits::read_u32_unaligned(&self.data, 32, self.read_position)
        };
        self.read_position += 32;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.check_read(64)?;
        let value = if self.read_position & 7 == 0 {
            let at = self.read_position / 8;
            u64::from_le_bytes([
                self.data[at],
                self.data[at + 1],
                self.data[at + 2],
                self.data[at + 3],
                self.data[at + 4],
                self.data[at + 5],
                self.data[at + 6],
                self.data[at + 7],
            ])
        } else {
            bits::read_u64_unaligned(&self.data, 64, self.read_position)
        };
        self.read_position += 64;
        Ok(value)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads `bits` (1..=32) into the low bits of the result.
    pub fn read_u32_bits(&mut self, bits: u32) -> Result<u32> {
        assert!((1..=32).contains(&bits), "bit count must be 1..=32");
        self.pull_bits_u32(bits)
    }

    /// Reads a `bits`-wide two's-complement value, sign-extending from
    /// bit `bits - 1`. A 32-bit read is the raw pattern reinterpreted.
    pub fn read_i32_bits(&mut self, bits: u32) -> Result<i32> {
        assert!((1..=32).contains(&bits), "bit count must be 1..=32");
        let raw = self.pull_bits_u32(bits)?;
        let shift = 32 - bits;
        Ok(((raw << shift) as i32) >> shift)
    }

    /// Reads `bits` (1..=64) into the low bits of the result.
    pub fn read_u64_bits(&mut self, bits: u32) -> Result<u64> {
        assert!((1..=64).contains(&bits), "bit count must be 1..=64");
        self.pull_bits_u64(bits)
    }

    pub fn read_i64_bits(&mut self, bits: u32) -> Result<i64> {
        assert!((1..=64).contains(&bits), "bit count must be 1..=64");
        let raw = self.pull_bits_u64(bits)?;
        let shift = 64 - bits;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Reads an unsigned varint of at most five bytes. A longer
    /// continuation chain fails with [`CodecError::MalformedVarint`] and
    /// rewinds the cursor.
    pub fn read_var_u32(&mut self) -> Result<u32> {
        let start = self.read_position;
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let byte = match self.read_u8() {
                Ok(byte) => byte,
                Err(err) => {
                    self.read_position = start;
                    return Err(err);
                }
            };
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 28 {
                self.read_position = start;
                return Err(CodecError::MalformedVarint);
            }
        }
    }

    /// Reads an unsigned varint of at most ten bytes.
    pub fn read_var_u64(&mut self) -> Result<u64> {
        let start = self.read_position;
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let byte = match self.read_u8() {
                Ok(byte) => byte,
                Err(err) => {
                    self.read_position = start;
                    return Err(err);
                }
            };
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                self.read_position = start;
                return Err(CodecError::MalformedVarint);
            }
        }
    }

    /// Undoes the zig-zag mapping: `(n >> 1) ^ -(n & 1)`.
    pub fn read_var_i32(&mut self) -> Result<i32> {
        let n = self.read_var_u32()?;
        Ok((n >> 1) as i32 ^ -((n & 1) as i32))
    }

    pub fn read_var_i64(&mut self) -> Result<i64> {
        let n = self.read_var_u64()?;
        Ok((n >> 1) as i64 ^ -((n & 1) as i64))
    }

    /// Reads a string written by [`MessageBuffer::write_string`].
    ///
    /// A well-formed length prefix that outruns the remaining bits is
    /// treated as hostile input: release builds consume the rest of the
    /// buffer and return an empty string instead of allocating, debug
    /// builds surface [`CodecError::ReadOverflow`].
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.read_position;
        let byte_len = self.read_var_u32()? as usize;
        if byte_len == 0 {
            return Ok(String::new());
        }
        if byte_len as u64 * 8 > self.remaining_bits() as u64 {
            if cfg!(debug_assertions) {
                self.read_position = start;
                return Err(CodecError::ReadOverflow);
            }
            self.read_position = self.bit_length;
            return Ok(String::new());
        }
        let mut bytes = vec![0u8; byte_len];
        bits::read_bytes_unaligned(&self.data, self.read_position, &mut bytes);
        self.read_position += byte_len * 8;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Reads exactly `count` bytes. The bounds check precedes the
    /// allocation so a hostile count cannot force one.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.check_read(count.checked_mul(8).ok_or(CodecError::ReadOverflow)?)?;
        let mut bytes = vec![0u8; count];
        self.read_bytes_into(&mut bytes)?;
        Ok(bytes)
    }

    /// Fills `dst` from the stream.
    pub fn read_bytes_into(&mut self, dst: &mut [u8]) -> Result<()> {
        let bits_needed = dst
            .len()
            .checked_mul(8)
            .ok_or(CodecError::ReadOverflow)?;
        self.check_read(bits_needed)?;
        bits::read_bytes_unaligned(&self.data, self.read_position, dst);
        self.read_position += bits_needed;
        Ok(())
    }

    /// Reads an endpoint written by [`MessageBuffer::write_endpoint`].
    /// The cursor is rewound on failure.
    pub fn read_endpoint(&mut self) -> Result<SocketAddr> {
        let start = self.read_position;
        let result = self.read_endpoint_inner();
        if result.is_err() {
            self.read_position = start;
        }
        result
    }

    fn read_endpoint_inner(&mut self) -> Result<SocketAddr> {
        let len = self.read_u8()?;
        let ip = match len {
            4 => {
                let mut octets = [0u8; 4];
                self.read_bytes_into(&mut octets)?;
                IpAddr::V4(Ipv4Addr::from(octets))
            }
            16 => {
                let mut octets = [0u8; 16];
                self.read_bytes_into(&mut octets)?;
                IpAddr::V6(Ipv6Addr::from(octets))
            }
            other => return Err(CodecError::InvalidEndpoint(other)),
        };
        let port = self.read_u16()?;
        Ok(SocketAddr::new(ip, port))
    }

    /// Decodes `(encoded + 1) / 2^bits`; see
    /// [`MessageBuffer::write_unit_f32`] for the asymmetry this implies.
    pub fn read_unit_f32(&mut self, bits: u32) -> Result<f32> {
        let encoded = self.read_u32_bits(bits)?;
        Ok((encoded as u64 + 1) as f32 / (1u64 << bits) as f32)
    }

    /// Decodes `((encoded + 1) / 2^bits - 0.5) * 2`.
    pub fn read_signed_unit_f32(&mut self, bits: u32) -> Result<f32> {
        let encoded = self.read_u32_bits(bits)?;
        Ok(((encoded as u64 + 1) as f32 / (1u64 << bits) as f32 - 0.5) * 2.0)
    }

    /// Decodes `min + (encoded / (2^bits - 1)) * (max - min)`.
    pub fn read_ranged_f32(&mut self, min: f32, max: f32, bits: u32) -> Result<f32> {
        let encoded = self.read_u32_bits(bits)?;
        let top = ((1u64 << bits) - 1) as f32;
        Ok(min + (encoded as f32 / top) * (max - min))
    }

    /// Reads an integer quantized by [`MessageBuffer::write_ranged_i32`];
    /// `min` and `max` must match the writer's bounds.
    pub fn read_ranged_i32(&mut self, min: i32, max: i32) -> Result<i32> {
        assert!(min <= max, "empty integer range");
        let span = (max as i64 - min as i64) as u64;
        let offset = self.read_u32_bits(bits_to_hold_u64(span))?;
        Ok((min as i64 + offset as i64) as i32)
    }

    pub fn read_ranged_i64(&mut self, min: i64, max: i64) -> Result<i64> {
        assert!(min <= max, "empty integer range");
        let span = max.wrapping_sub(min) as u64;
        let offset = self.read_u64_bits(bits_to_hold_u64(span))?;
        Ok(min.wrapping_add(offset as i64))
    }
}
