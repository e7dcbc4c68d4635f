//! Palette-compressed value arrays: a packed index block followed by its palette.
//!
//! ```text
//! bits > 0:  [words: 4 * ceil(4096 / floor(32 / bits))]
//!            [palette_len: var-int << 1] [value: var-int << 1] * palette_len
//! bits == 0: [value: var-int << 1]
//! ```
//!
//! Every var-int carries a flag in its low bit, so each value is shifted right
//! by one before use.

use crate::bit_packed::{PackedIndices, STORAGE_LEN};
use crate::cursor::ByteCursor;
use crate::error::DecodeError;

/// 4096 values stored either as one constant or as indices into a palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PalettedValues {
    /// Every cell holds the same value.
    Uniform(u32),
    /// Cells hold indices into `palette`.
    Paletted {
        indices: PackedIndices,
        palette: Vec<u32>,
    },
}

impl PalettedValues {
    /// Value at storage index `index`.
    pub fn value_at(&self, index: usize) -> u32 {
        match self {
            Self::Uniform(value) => *value,
            // Indices are validated against the palette when decoded.
            Self::Paletted { indices, palette } => palette[usize::from(indices.get(index))],
        }
    }

    /// Distinct values this array can hold.
    pub fn palette(&self) -> &[u32] {
        match self {
            Self::Uniform(value) => std::slice::from_ref(value),
            Self::Paletted { palette, .. } => palette,
        }
    }

    /// Bits per index (0 for a uniform array).
    pub fn bits(&self) -> u8 {
        match self {
            Self::Uniform(_) => 0,
            Self::Paletted { indices, .. } => indices.bits(),
        }
    }
}

/// Reads one palette-compressed array at `bits` width.
pub fn read_paletted(cursor: &mut ByteCursor<'_>, bits: u8) -> Result<PalettedValues, DecodeError> {
    if bits == 0 {
        let value = cursor.read_var_u32()? >> 1;
        return Ok(PalettedValues::Uniform(value));
    }

    let indices = PackedIndices::read(cursor, bits)?;

    let len = cursor.read_var_u32()? >> 1;
    if len as usize > STORAGE_LEN {
        return Err(DecodeError::InvalidPaletteLength(len as i32));
    }
    let palette = (0..len)
        .map(|_| cursor.read_var_u32().map(|v| v >> 1))
        .collect::<Result<Vec<_>, _>>()?;

    check_indices(&indices, palette.len())?;
    Ok(PalettedValues::Paletted { indices, palette })
}

/// Verifies every stored index resolves inside a palette of `len` entries.
pub(crate) fn check_indices(indices: &PackedIndices, len: usize) -> Result<(), DecodeError> {
    let max = indices.max_index();
    if usize::from(max) >= len {
        return Err(DecodeError::PaletteIndexOutOfRange { index: max, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ByteWriter;

    fn packed_payload(bits: u8, palette: &[u32]) -> Vec<u8> {
        let mut indices = PackedIndices::new(bits);
        for i in 0..STORAGE_LEN {
            indices.set(i, (i % palette.len()) as u16);
        }
        let mut w = ByteWriter::new();
        indices.write(&mut w);
        w.write_var_u32((palette.len() as u32) << 1);
        for &v in palette {
            w.write_var_u32(v << 1);
        }
        w.into_inner()
    }

    #[test]
    fn test_uniform_reads_single_value() {
        let mut cursor = ByteCursor::new(&[0x0E, 0xFF]);
        let values = read_paletted(&mut cursor, 0).unwrap();
        assert_eq!(values, PalettedValues::Uniform(7));
        assert_eq!(values.value_at(1234), 7);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_packed_block_length_independent_of_palette() {
        for bits in [1u8, 2, 3, 4, 5, 6, 8, 16] {
            let small = packed_payload(bits, &[1, 2]);
            let large_palette: Vec<u32> = (0..(1u32 << bits.min(8))).map(|v| v * 1000).collect();
            let large = packed_payload(bits, &large_palette);
            let block = 4 * STORAGE_LEN.div_ceil(32 / bits as usize);

            for data in [&small, &large] {
                let mut cursor = ByteCursor::new(data);
                PackedIndices::read(&mut cursor, bits).unwrap();
                assert_eq!(cursor.position(), block, "bits={bits}");
            }
        }
    }

    #[test]
    fn test_paletted_values_resolve() {
        let data = packed_payload(2, &[10, 20, 30]);
        let mut cursor = ByteCursor::new(&data);
        let values = read_paletted(&mut cursor, 2).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(values.palette(), &[10, 20, 30]);
        assert_eq!(values.value_at(0), 10);
        assert_eq!(values.value_at(1), 20);
        assert_eq!(values.value_at(5), 30);
        assert_eq!(values.bits(), 2);
    }

    #[test]
    fn test_index_outside_palette_rejected() {
        let mut indices = PackedIndices::new(2);
        indices.set(9, 3);
        let mut w = ByteWriter::new();
        indices.write(&mut w);
        w.write_var_u32(2 << 1).write_var_u32(0).write_var_u32(2);
        let data = w.into_inner();

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            read_paletted(&mut cursor, 2),
            Err(DecodeError::PaletteIndexOutOfRange { index: 3, len: 2 })
        );
    }

    #[test]
    fn test_truncated_palette_is_eof() {
        let mut data = packed_payload(1, &[4, 5]);
        data.pop();
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            read_paletted(&mut cursor, 1),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }
}
