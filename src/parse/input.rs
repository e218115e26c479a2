use log::{debug, error, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{LanczosError, Result};
use crate::geometry::GeometryTable;
use crate::green::FrequencyGrid;
use crate::lanczos::{LanczosParams, ProductKind};
use crate::params::ModelParams;
use crate::parse::geometry::{build_geometry, is_complex, parse_bonds, BondRecord};
use crate::scalar::Scalar;
use crate::sector::Sector;
use crate::{OperatorKind, Spin};

/// Parsed `Key=value` input file.
/// # Format
/// One entry per line, `#` starts a comment, vectors are whitespace separated.
/// A key may appear only once.
#[derive(Debug, Clone, Default)]
pub struct InputFile {
    entries: HashMap<String, (usize, String)>,
    dir: Option<PathBuf>,
}

impl FromStr for InputFile {
    type Err = LanczosError;

    fn from_str(text: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for (k, raw) in text.lines().enumerate() {
            let line = k + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let (key, value) = match content.split_once('=') {
                Some(kv) => kv,
                None => {
                    error!("Missing '=' at line {} of the input file.", line);
                    return Err(LanczosError::Parse { line, details: format!("expected Key=value, got {:?}", content) });
                }
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(LanczosError::Parse { line, details: "empty key".to_owned() });
            }
            if let Some((first, _)) = entries.insert(key.to_owned(), (line, value.trim().to_owned())) {
                return Err(LanczosError::Parse {
                    line,
                    details: format!("{} already set at line {}", key, first),
                });
            }
        }
        debug!("Input file with {} entries", entries.len());
        Ok(InputFile { entries, dir: None })
    }
}

impl InputFile {
    /// Reads an input file. Relative paths inside it are resolved from its
    /// directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut input: InputFile = text.parse()?;
        input.dir = path.parent().map(|p| p.to_path_buf());
        Ok(input)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Parsed value of an optional key.
    pub fn value<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some((line, v)) => v.parse::<T>().map(Some).map_err(|_| LanczosError::Parse {
                line: *line,
                details: format!("{}: cannot parse {:?}", key, v),
            }),
        }
    }

    pub fn required<T: FromStr>(&self, key: &str) -> Result<T> {
        self.value(key)?
            .ok_or_else(|| LanczosError::invalid(format!("Missing required key {}.", key)))
    }

    /// Whitespace separated values, empty when the key is absent.
    pub fn vector<T: FromStr>(&self, key: &str) -> Result<Vec<T>> {
        let (line, v) = match self.entries.get(key) {
            None => return Ok(Vec::new()),
            Some(e) => e,
        };
        v.split_whitespace()
            .map(|w| {
                w.parse::<T>().map_err(|_| LanczosError::Parse {
                    line: *line,
                    details: format!("{}: cannot parse {:?}", key, w),
                })
            })
            .collect()
    }

    /// Target sector from either `TargetElectronsUp` and `TargetElectronsDown`,
    /// or `TargetElectronsTotal` and `TargetSzPlusConst`. The latter counts the
    /// up particles, $S^z+N/2$.
    fn target(&self, sites: usize, spin_model: bool) -> Result<Sector> {
        if spin_model {
            let nup: usize = self.required("TargetSzPlusConst")?;
            if nup > sites {
                return Err(LanczosError::invalid(format!("TargetSzPlusConst = {} on {} sites.", nup, sites)));
            }
            return Ok(Sector::new(nup, sites - nup));
        }
        if self.contains("TargetElectronsUp") || self.contains("TargetElectronsDown") {
            return Ok(Sector::new(self.required("TargetElectronsUp")?, self.required("TargetElectronsDown")?));
        }
        let total: usize = self.required("TargetElectronsTotal")?;
        let nup: usize = self.required("TargetSzPlusConst")?;
        if nup > total {
            return Err(LanczosError::invalid(format!(
                "TargetSzPlusConst = {} above TargetElectronsTotal = {}.",
                nup, total
            )));
        }
        Ok(Sector::new(nup, total - nup))
    }

    pub fn model_params(&self) -> Result<ModelParams> {
        let model: String = self.required("Model")?;
        let sites: usize = self.required("TotalNumberOfSites")?;
        let orbitals: usize = self.value("Orbitals")?.unwrap_or(1);
        let spin_model = model == "Heisenberg";
        Ok(ModelParams::new(
            &model,
            sites,
            orbitals,
            self.target(sites, spin_model)?,
            self.vector("hubbardU")?,
            self.vector("potentialV")?,
            self.vector("magneticField")?,
            self.value("TwiceTheSpin")?.unwrap_or(1),
        ))
    }

    pub fn lanczos_params(&self) -> Result<LanczosParams> {
        let defaults = LanczosParams::default();
        let on_the_fly = self.get("SolverOptions").map_or(false, |s| s.contains("InternalProductOnTheFly"));
        Ok(LanczosParams {
            steps: self.value("LanczosSteps")?.unwrap_or(defaults.steps),
            eps: self.value("LanczosEps")?.unwrap_or(defaults.eps),
            seed: self.value("LanczosSeed")?.unwrap_or(defaults.seed),
            product: if on_the_fly { ProductKind::OnTheFly } else { ProductKind::Stored },
        })
    }

    /// Bonds of `GeometryFile`, if any.
    pub fn bonds(&self) -> Result<Option<Vec<BondRecord>>> {
        let file: Option<String> = self.value("GeometryFile")?;
        match file {
            None => Ok(None),
            Some(f) => {
                let path = match &self.dir {
                    Some(d) if Path::new(&f).is_relative() => d.join(&f),
                    _ => PathBuf::from(&f),
                };
                Ok(Some(parse_bonds(&path)?))
            }
        }
    }

    /// True when the run needs complex matrix elements.
    pub fn is_complex(&self) -> Result<bool> {
        let requested = self.get("SolverOptions").map_or(false, |s| s.contains("useComplex"));
        Ok(requested || self.bonds()?.map_or(false, |b| is_complex(&b)))
    }

    /// Geometry from `GeometryFile`, or from `GeometryKind` and `Hoppings`.
    pub fn geometry<S: Scalar>(&self) -> Result<GeometryTable<S>> {
        let sites: usize = self.required("TotalNumberOfSites")?;
        let orbitals: usize = self.value("Orbitals")?.unwrap_or(1);
        let terms: usize = self.required("NumberOfTerms")?;
        if let Some(bonds) = self.bonds()? {
            return build_geometry(&bonds, sites, &vec![orbitals; terms]);
        }
        let hoppings: Vec<S> = self.vector::<f64>("Hoppings")?.into_iter().map(S::from).collect();
        if hoppings.len() != terms {
            return Err(LanczosError::Geometry {
                details: format!("Hoppings has {} values for {} terms", hoppings.len(), terms),
            });
        }
        let periodic = self.get("GeometryOptions").map_or(false, |s| s == "periodic");
        match self.get("GeometryKind").unwrap_or("chain") {
            "chain" => GeometryTable::chain(sites, orbitals, &hoppings, periodic),
            "ladder" => {
                let legs: usize = self.required("LadderLeg")?;
                let rung: Vec<S> = self.vector::<f64>("RungHoppings")?.into_iter().map(S::from).collect();
                let rung = if rung.is_empty() { hoppings.clone() } else { rung };
                if periodic {
                    warn!("GeometryOptions=periodic is ignored for ladders.");
                }
                GeometryTable::ladder(sites, legs, orbitals, &hoppings, &rung)
            }
            other => Err(LanczosError::Geometry { details: format!("unknown GeometryKind {}", other) }),
        }
    }

    pub fn run_options(&self) -> Result<RunOptions> {
        let operators = |key: &str| -> Result<Vec<OperatorKind>> {
            self.vector::<String>(key)?
                .iter()
                .map(|s| s.parse::<OperatorKind>())
                .collect()
        };
        let tsp: Vec<usize> = self.vector("TSPSites")?;
        if tsp.len() % 2 != 0 {
            return Err(LanczosError::invalid("TSPSites holds pairs of sites."));
        }
        let spins = self
            .vector::<String>("Spins")?
            .iter()
            .map(|s| match s.as_str() {
                "up" | "0" => Ok(Spin::Up),
                "down" | "1" => Ok(Spin::Down),
                _ => Err(LanczosError::invalid(format!("Unknown spin {}.", s))),
            })
            .collect::<Result<Vec<Spin>>>()?;
        Ok(RunOptions {
            threads: self.value("Threads")?,
            green: operators("GreenOperators")?,
            correlations: operators("CorrelationOperators")?,
            site_pairs: tsp.chunks(2).map(|c| (c[0], c[1])).collect(),
            spins: if spins.is_empty() { vec![Spin::Up] } else { spins },
            rdm_split: self.value("ReducedDensityMatrixSplit")?,
            omega: self.frequency_grid()?,
        })
    }

    /// Grid of `OmegaTotal` points from `OmegaBegin` to `OmegaEnd`, broadened
    /// by `OmegaEps`. Absent when `OmegaTotal` is not given.
    fn frequency_grid(&self) -> Result<Option<FrequencyGrid>> {
        let total: usize = match self.value("OmegaTotal")? {
            Some(n) => n,
            None => return Ok(None),
        };
        let grid = FrequencyGrid {
            begin: self.required("OmegaBegin")?,
            end: self.required("OmegaEnd")?,
            total,
            eta: self.value("OmegaEps")?.unwrap_or(0.1),
        };
        if grid.eta <= 0.0 {
            return Err(LanczosError::invalid(format!("OmegaEps = {} must be positive.", grid.eta)));
        }
        Ok(Some(grid))
    }
}

/// What to compute once the ground state is known.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub threads: Option<usize>,
    pub green: Vec<OperatorKind>,
    pub correlations: Vec<OperatorKind>,
    /// Site pairs of the dynamical functions.
    pub site_pairs: Vec<(usize, usize)>,
    pub spins: Vec<Spin>,
    pub rdm_split: Option<usize>,
    /// Frequencies where $A(\omega)$ is written.
    pub omega: Option<FrequencyGrid>,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Geometry;

    const HUBBARD: &str = "\
# four site ring
Model=HubbardOneBand
TotalNumberOfSites=4
NumberOfTerms=1
TargetElectronsUp=2
TargetElectronsDown=2
hubbardU=1 1 1 1 # uniform
GeometryKind=chain
GeometryOptions=periodic
Hoppings=-1
SolverOptions=InternalProductOnTheFly
LanczosSteps=100
GreenOperators=c n
TSPSites=0 0 0 1
";

    #[test]
    fn hubbard_input() {
        let input: InputFile = HUBBARD.parse().unwrap();
        let p = input.model_params().unwrap();
        assert_eq!(p.model, "HubbardOneBand");
        assert_eq!(p.target, Sector::new(2, 2));
        assert_eq!(p.hubbard_u, vec![1.0; 4]);
        let l = input.lanczos_params().unwrap();
        assert_eq!(l.steps, 100);
        assert_eq!(l.product, ProductKind::OnTheFly);
        let g: GeometryTable<f64> = input.geometry().unwrap();
        assert_eq!(g.coefficient(3, 0, 0, 0, 0), -1.0);
        let r = input.run_options().unwrap();
        assert_eq!(r.green, vec![OperatorKind::C, OperatorKind::N]);
        assert_eq!(r.site_pairs, vec![(0, 0), (0, 1)]);
        assert_eq!(r.spins, vec![Spin::Up]);
        assert_eq!(r.omega, None);
    }

    #[test]
    fn frequency_grid_keys() {
        let input: InputFile = "OmegaTotal=11\nOmegaBegin=-2\nOmegaEnd=3\n".parse().unwrap();
        let grid = input.run_options().unwrap().omega.unwrap();
        assert_eq!(grid, FrequencyGrid { begin: -2.0, end: 3.0, total: 11, eta: 0.1 });
        let input: InputFile = "OmegaTotal=11\nOmegaBegin=-2\n".parse().unwrap();
        assert!(input.run_options().is_err());
        let input: InputFile = "OmegaTotal=3\nOmegaBegin=0\nOmegaEnd=1\nOmegaEps=0\n".parse().unwrap();
        assert!(input.run_options().is_err());
    }

    #[test]
    fn total_and_sz() {
        let input: InputFile = "TargetElectronsTotal=5\nTargetSzPlusConst=3\n".parse().unwrap();
        assert_eq!(input.target(4, false).unwrap(), Sector::new(3, 2));
        let input: InputFile = "TargetSzPlusConst=1\n".parse().unwrap();
        assert_eq!(input.target(4, true).unwrap(), Sector::new(1, 3));
    }

    #[test]
    fn errors_carry_line_numbers() {
        match "Model=HubbardOneBand\n\nbroken line\n".parse::<InputFile>() {
            Err(LanczosError::Parse { line, .. }) => assert_eq!(line, 3),
            _ => panic!("Should have errored."),
        }
        match "a=1\na=2\n".parse::<InputFile>() {
            Err(LanczosError::Parse { line, .. }) => assert_eq!(line, 2),
            _ => panic!("Should have errored."),
        }
        let input: InputFile = "\n\nLanczosSteps=many\n".parse().unwrap();
        match input.lanczos_params() {
            Err(LanczosError::Parse { line, .. }) => assert_eq!(line, 3),
            _ => panic!("Should have errored."),
        }
    }
}
