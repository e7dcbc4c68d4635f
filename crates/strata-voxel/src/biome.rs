//! Biome layers of a chunk column.
//!
//! After the inline sub-chunks, a column carries one biome layer per vertical
//! slice, starting at the dimension's lowest sub-chunk. There is no count
//! prefix; the stream itself marks where layers end:
//!
//! | Lead byte | Meaning                                              |
//! |-----------|------------------------------------------------------|
//! | `0x00`    | terminator, consumed                                 |
//! | `0xFF`    | repeat the previous layer, consumed                  |
//! | other     | type byte: `bits << 1 | 1`, followed by the values   |

use crate::coords::LocalPos;
use crate::cursor::ByteCursor;
use crate::dimension::Dimension;
use crate::error::DecodeError;
use crate::palette::{PalettedValues, read_paletted};

/// Lead byte that ends the biome section.
pub const BIOME_TERMINATOR: u8 = 0x00;

/// Lead byte that repeats the previous layer.
pub const BIOME_COPY_PREVIOUS: u8 = 0xFF;

/// One sub-chunk-shaped array of biome ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiomeLayer(PalettedValues);

impl BiomeLayer {
    /// A layer where every cell has `biome`.
    pub fn uniform(biome: u32) -> Self {
        Self(PalettedValues::Uniform(biome))
    }

    /// Biome id at a position inside the slice.
    pub fn biome_at(&self, pos: LocalPos) -> u32 {
        self.0.value_at(pos.index())
    }

    /// Distinct biome ids in this layer.
    pub fn palette(&self) -> &[u32] {
        self.0.palette()
    }

    /// Returns `true` if the whole layer is one biome.
    pub fn is_uniform(&self) -> bool {
        matches!(self.0, PalettedValues::Uniform(_))
    }

    pub fn values(&self) -> &PalettedValues {
        &self.0
    }
}

/// Reads one biome layer, type byte included.
pub fn read_biome_layer(cursor: &mut ByteCursor<'_>) -> Result<BiomeLayer, DecodeError> {
    let kind = cursor.read_u8()?;
    // Low bit 0 would mean an id hash table, which the network format never sends.
    if kind & 1 != 1 {
        return Err(DecodeError::UnsupportedBiomePalette(kind));
    }
    read_paletted(cursor, kind >> 1).map(BiomeLayer)
}

/// Decodes biome layers until the terminator, the end of input, or the
/// dimension's layer count is reached.
///
/// Layer `i` of the result covers sub-chunk `dimension.min_sub_chunk_index() + i`.
pub fn decode_biome_column(
    cursor: &mut ByteCursor<'_>,
    dimension: Dimension,
) -> Result<Vec<BiomeLayer>, DecodeError> {
    let mut layers: Vec<BiomeLayer> = Vec::new();

    while layers.len() < dimension.max_sub_chunks() {
        let Some(lead) = cursor.peek_u8() else {
            break;
        };
        match lead {
            BIOME_TERMINATOR => {
                cursor.skip(1)?;
                break;
            }
            BIOME_COPY_PREVIOUS => {
                cursor.skip(1)?;
                let previous = layers
                    .last()
                    .cloned()
                    .ok_or(DecodeError::BiomeCopyWithoutPrevious)?;
                layers.push(previous);
            }
            _ => layers.push(read_biome_layer(cursor)?),
        }
    }

    tracing::trace!(
        layers = layers.len(),
        base = dimension.min_sub_chunk_index(),
        "decoded biome column"
    );
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_packed::{PackedIndices, STORAGE_LEN};
    use crate::cursor::ByteWriter;

    fn uniform_layer(w: &mut ByteWriter, biome: u32) {
        w.write_u8(0x01).write_var_u32(biome << 1);
    }

    fn paletted_layer(w: &mut ByteWriter, bits: u8, palette: &[u32]) {
        let mut indices = PackedIndices::new(bits);
        for i in 0..STORAGE_LEN {
            indices.set(i, (i % palette.len()) as u16);
        }
        w.write_u8((bits << 1) | 1);
        indices.write(w);
        w.write_var_u32((palette.len() as u32) << 1);
        for &b in palette {
            w.write_var_u32(b << 1);
        }
    }

    #[test]
    fn test_terminator_first_yields_no_layers() {
        let data = [0x00, 0x2A];
        let mut cursor = ByteCursor::new(&data);
        let layers = decode_biome_column(&mut cursor, Dimension::Overworld).unwrap();
        assert!(layers.is_empty());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_empty_input_yields_no_layers() {
        let mut cursor = ByteCursor::new(&[]);
        let layers = decode_biome_column(&mut cursor, Dimension::Overworld).unwrap();
        assert!(layers.is_empty());
    }

    #[test]
    fn test_copy_marker_repeats_previous_layer() {
        let mut w = ByteWriter::new();
        paletted_layer(&mut w, 1, &[1, 24]);
        let first_len = w.len();
        w.write_u8(BIOME_COPY_PREVIOUS);
        w.write_u8(BIOME_TERMINATOR);
        let data = w.into_inner();

        let mut cursor = ByteCursor::new(&data);
        let mut probe = cursor.clone();
        read_biome_layer(&mut probe).unwrap();
        assert_eq!(probe.position(), first_len);

        let layers = decode_biome_column(&mut cursor, Dimension::Overworld).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0], layers[1]);
        // One byte for the copy marker, one for the terminator.
        assert_eq!(cursor.position(), first_len + 2);
    }

    #[test]
    fn test_copy_marker_without_previous_is_error() {
        let mut cursor = ByteCursor::new(&[0xFF, 0x00]);
        assert_eq!(
            decode_biome_column(&mut cursor, Dimension::Overworld),
            Err(DecodeError::BiomeCopyWithoutPrevious)
        );
    }

    #[test]
    fn test_hash_table_biomes_rejected() {
        // Low bit clear: 4 bits per entry, id hash table.
        let mut cursor = ByteCursor::new(&[0x08, 0x00]);
        assert_eq!(
            decode_biome_column(&mut cursor, Dimension::Overworld),
            Err(DecodeError::UnsupportedBiomePalette(0x08))
        );
    }

    #[test]
    fn test_mixed_layers() {
        let mut w = ByteWriter::new();
        uniform_layer(&mut w, 1);
        paletted_layer(&mut w, 2, &[1, 4, 7]);
        w.write_u8(BIOME_COPY_PREVIOUS);
        uniform_layer(&mut w, 8);
        w.write_u8(BIOME_TERMINATOR);
        let data = w.into_inner();

        let mut cursor = ByteCursor::new(&data);
        let layers = decode_biome_column(&mut cursor, Dimension::Overworld).unwrap();
        assert_eq!(layers.len(), 4);
        assert!(layers[0].is_uniform());
        assert_eq!(layers[0].biome_at(LocalPos { x: 3, y: 3, z: 3 }), 1);
        assert_eq!(layers[1].palette(), &[1, 4, 7]);
        assert_eq!(layers[1].biome_at(LocalPos { x: 0, y: 1, z: 0 }), 4);
        assert_eq!(layers[2], layers[1]);
        assert_eq!(layers[3].palette(), &[8]);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_stops_at_dimension_layer_count() {
        let mut w = ByteWriter::new();
        for _ in 0..Dimension::Nether.max_sub_chunks() {
            uniform_layer(&mut w, 8);
        }
        let consumed = w.len();
        uniform_layer(&mut w, 9);
        let data = w.into_inner();

        let mut cursor = ByteCursor::new(&data);
        let layers = decode_biome_column(&mut cursor, Dimension::Nether).unwrap();
        assert_eq!(layers.len(), 8);
        assert_eq!(cursor.position(), consumed);
    }
}
