//! Plain binary container for a serialized collision tensor, standing in
//! for the project's HDF5 file format (no native-HDF5 crate is part of
//! this workspace's dependency stack). Layout, little-endian:
//!
//! ```text
//! magic       : 4 bytes  b"WGCT"
//! basis_size  : u32      N_file (the file's momentum/polynomial basis size)
//! basis_type  : u8       0 = Cardinal, 1 = Chebyshev (polynomial axes' basis)
//! data        : f64 * basis_size^4, row-major in file axis order (poly1, poly2, pz, pperp)
//! ```

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ndarray::{Array4, ArrayD};
use wallspeed_grid::Basis;

use crate::error::{CollisionError, Result};

const MAGIC: &[u8; 4] = b"WGCT";

/// In file axis order: `(poly1, poly2, pz, pperp)`.
pub struct RawContainer {
    pub basis_size: usize,
    pub basis_type: Basis,
    pub data: Array4<f64>,
}

pub fn write<W: Write>(mut writer: W, container: &RawContainer) -> Result<()> {
    writer.write_all(MAGIC)?;
    writer.write_u32::<LittleEndian>(container.basis_size as u32)?;
    let basis_tag: u8 = match container.basis_type {
        Basis::Cardinal => 0,
        Basis::Chebyshev => 1,
    };
    writer.write_u8(basis_tag)?;
    for value in container.data.iter() {
        writer.write_f64::<LittleEndian>(*value)?;
    }
    Ok(())
}

pub fn write_file(path: &std::path::Path, container: &RawContainer) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write(std::io::BufWriter::new(file), container)
}

pub fn read<R: Read>(mut reader: R) -> Result<RawContainer> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(CollisionError::Corrupt(
            "bad magic bytes: not a collision container".into(),
        ));
    }
    let basis_size = reader.read_u32::<LittleEndian>()? as usize;
    let basis_tag = reader.read_u8()?;
    let basis_type = match basis_tag {
        0 => Basis::Cardinal,
        1 => Basis::Chebyshev,
        other => {
            return Err(CollisionError::Corrupt(format!(
                "unknown basis tag {other}"
            )))
        }
    };

    let n = basis_size;
    let total = n * n * n * n;
    let mut flat = Vec::with_capacity(total);
    for _ in 0..total {
        flat.push(reader.read_f64::<LittleEndian>()?);
    }
    let data = Array4::from_shape_vec((n, n, n, n), flat)
        .map_err(|e| CollisionError::Corrupt(e.to_string()))?;

    Ok(RawContainer {
        basis_size,
        basis_type,
        data,
    })
}

pub fn read_file(path: &std::path::Path) -> Result<RawContainer> {
    let file = std::fs::File::open(path)?;
    read(std::io::BufReader::new(file))
}

/// Applies the file-to-runtime axis fix-up: flips the momentum axes and
/// permutes `(poly1, poly2, pz, pperp) -> (pz, pperp, poly1, poly2)`.
pub fn fix_axis_order(data: &Array4<f64>) -> ArrayD<f64> {
    let n = data.shape()[0];
    let mut out = Array4::<f64>::zeros((n, n, n, n));
    for p1 in 0..n {
        for p2 in 0..n {
            for pz in 0..n {
                for pp in 0..n {
                    let pz_flipped = n - 1 - pz;
                    let pp_flipped = n - 1 - pp;
                    out[[pz, pp, p1, p2]] = data[[p1, p2, pz_flipped, pp_flipped]];
                }
            }
        }
    }
    out.into_dyn()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let n = 3;
        let data = Array4::from_shape_fn((n, n, n, n), |(i, j, k, l)| {
            (i + 2 * j + 3 * k + 4 * l) as f64
        });
        let container = RawContainer {
            basis_size: n,
            basis_type: Basis::Chebyshev,
            data: data.clone(),
        };
        let mut buf = Vec::new();
        write(&mut buf, &container).unwrap();
        let parsed = read(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(parsed.basis_size, n);
        assert!(matches!(parsed.basis_type, Basis::Chebyshev));
        assert_eq!(parsed.data, data);
    }

    #[test]
    fn fix_axis_order_permutes_and_flips() {
        let n = 2;
        let data = Array4::from_shape_fn((n, n, n, n), |(p1, p2, pz, pp)| {
            (p1 * 1000 + p2 * 100 + pz * 10 + pp) as f64
        });
        let fixed = fix_axis_order(&data);
        // out[pz, pp, p1, p2] = data[p1, p2, n-1-pz, n-1-pp]
        assert_eq!(fixed[[0, 0, 1, 1]], data[[1, 1, 1, 1]]);
        assert_eq!(fixed[[1, 1, 0, 0]], data[[0, 0, 0, 0]]);
    }
}
