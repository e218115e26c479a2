use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, error};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::errors::{LanczosError, Result};
use crate::geometry::GeometryTable;
use crate::scalar::Scalar;

/// One line of a geometry file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondRecord {
    pub term: usize,
    pub i: usize,
    pub orb_i: usize,
    pub j: usize,
    pub orb_j: usize,
    pub re: f64,
    pub im: f64,
}

/// Parse the bonds of a geometry file
/// # Arguments
/// * __`fp`__ - File path to the definition file, in csv format. Each line is
/// `term,i,orb_i,j,orb_j,re` with an optional seventh column for the
/// imaginary part. No header.
pub fn parse_bonds(fp: &Path) -> Result<Vec<BondRecord>> {
    let file = File::open(fp)?;
    parse_bonds_from(file)
}

/// Same as [parse_bonds] from any reader.
pub fn parse_bonds_from<R: Read>(reader: R) -> Result<Vec<BondRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);
    let mut bonds = Vec::new();
    for (k, result) in reader.records().enumerate() {
        let rec = result?;
        let line = rec.position().map(|p| p.line() as usize).unwrap_or(k + 1);
        // Should have 6 or 7 columns.
        if rec.len() != 6 && rec.len() != 7 {
            error!("Invalid number of elements at line {} of the geometry file.", line);
            return Err(LanczosError::Parse {
                line,
                details: format!("expected 6 or 7 columns, got {}", rec.len()),
            });
        }
        let im = if rec.len() == 7 { parse_single_elem(&rec, 6, line)? } else { 0.0 };
        bonds.push(BondRecord {
            term: parse_single_elem(&rec, 0, line)?,
            i: parse_single_elem(&rec, 1, line)?,
            orb_i: parse_single_elem(&rec, 2, line)?,
            j: parse_single_elem(&rec, 3, line)?,
            orb_j: parse_single_elem(&rec, 4, line)?,
            re: parse_single_elem(&rec, 5, line)?,
            im,
        });
    }
    debug!("Read {} bonds.", bonds.len());
    Ok(bonds)
}

fn parse_single_elem<T: FromStr>(line: &StringRecord, col: usize, l: usize) -> Result<T> {
    let field = line.get(col).unwrap_or("");
    field.parse::<T>().map_err(|_| {
        error!("Expected a number in the geometry file at line {}, col {}", l, col);
        LanczosError::Parse {
            line: l,
            details: format!("column {}: cannot parse {:?}", col, field),
        }
    })
}

/// True when any bond needs complex arithmetic.
pub fn is_complex(bonds: &[BondRecord]) -> bool {
    bonds.iter().any(|b| b.im != 0.0)
}

/// Fills a geometry table from parsed bonds.
/// # Arguments
/// * __`sites`__ - Number of sites.
/// * __`orbitals`__ - Orbitals per site of each term.
pub fn build_geometry<S: Scalar>(bonds: &[BondRecord], sites: usize, orbitals: &[usize]) -> Result<GeometryTable<S>> {
    let mut g = GeometryTable::new(sites, orbitals);
    for b in bonds.iter() {
        g.set_bond(b.term, b.i, b.orb_i, b.j, b.orb_j, S::from_re_im(b.re, b.im))?;
    }
    Ok(g)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Geometry;
    use num::complex::Complex;

    #[test]
    fn real_and_complex_lines() {
        let text = "# ring\n0,0,0,1,0,-1.0\n0, 1, 0, 2, 0, -1.0, 0.5\n";
        let bonds = parse_bonds_from(text.as_bytes()).unwrap();
        assert_eq!(bonds.len(), 2);
        assert!(is_complex(&bonds));
        let g: GeometryTable<Complex<f64>> = build_geometry(&bonds, 3, &[1]).unwrap();
        assert_eq!(g.coefficient(2, 0, 1, 0, 0), Complex::new(-1.0, -0.5));
    }

    #[test]
    fn wrong_column_count() {
        let text = "0,0,0,1,0\n";
        match parse_bonds_from(text.as_bytes()) {
            Err(LanczosError::Parse { line, .. }) => assert_eq!(line, 1),
            _ => panic!("Should have errored."),
        }
    }

    #[test]
    fn bond_outside_of_the_lattice() {
        let bonds = parse_bonds_from("0,0,0,4,0,1.0\n".as_bytes()).unwrap();
        assert!(build_geometry::<f64>(&bonds, 3, &[1]).is_err());
    }
}
