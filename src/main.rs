use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, log_enabled, trace, Level};
use num::complex::Complex;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use lanczos::engine::Engine;
use lanczos::basis::HilbertBasis;
use lanczos::geometry::GeometryTable;
use lanczos::lanczos::LanczosParams;
use lanczos::models::{ModelHamiltonian, ModelSelector};
use lanczos::parse::input::{InputFile, RunOptions};
use lanczos::scalar::Scalar;
use lanczos::{LanczosError, Result};

fn main() -> ExitCode {
    // Initialize logger
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <inputfile>", args[0]);
        return ExitCode::FAILURE;
    }
    match run(Path::new(&args[1])) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> Result<()> {
    let input = InputFile::from_path(path)?;
    let options = input.run_options()?;
    if let Some(n) = options.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| LanczosError::invalid(e.to_string()))?;
        info!("Using {} threads.", n);
    }
    if input.is_complex()? {
        info!("Complex matrix elements.");
        run_with::<Complex<f64>>(&input, &options)
    } else {
        run_with::<f64>(&input, &options)
    }
}

fn run_with<S: Scalar>(input: &InputFile, options: &RunOptions) -> Result<()> {
    let params = input.model_params()?;
    let lanczos = input.lanczos_params()?;
    let geometry: GeometryTable<S> = input.geometry()?;
    match ModelSelector::new(&params, &geometry)? {
        ModelSelector::Hubbard(m) => report(&m, lanczos, options),
        ModelSelector::FeAs(m) => report(&m, lanczos, options),
        ModelSelector::Heisenberg(m) => report(&m, lanczos, options),
    }
}

fn report<S: Scalar, M: ModelHamiltonian<S>>(model: &M, lanczos: LanczosParams, options: &RunOptions) -> Result<()> {
    if log_enabled!(Level::Trace) {
        let basis = model.basis();
        for i in 0..basis.size() {
            trace!("{} {}", i, basis.describe(i));
        }
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_prefix(format!("{} ground state", model.name()));
    spinner.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {prefix} {spinner:.cyan/blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    let engine = Engine::new(model, lanczos);
    spinner.finish_and_clear();
    let engine = engine?;

    println!("{}", "#Ground state".bold());
    println!("Energy={}", engine.gs_energy());

    let norb = model.orbitals();
    let pairs = if options.site_pairs.is_empty() { vec![(0, 0)] } else { options.site_pairs.clone() };
    for &what in options.green.iter() {
        for &spin in options.spins.iter() {
            for &(i, j) in pairs.iter() {
                for orb1 in 0..norb {
                    for orb2 in orb1..norb {
                        let gf = engine.spectral_function(what, i, j, spin, (orb1, orb2))?;
                        let header = format!("#gf(i={},j={}) {} {} orbs=({},{})", i, j, what, spin, orb1, orb2);
                        println!("{}", header.green());
                        for f in gf.fractions.iter() {
                            println!("#{:?} weight={} energy={}", f.kind, f.weight, f.energy);
                            for k in 0..f.ab.size() {
                                println!("{} {}", f.ab.a[k], f.ab.b.get(k).copied().unwrap_or(0.0));
                            }
                        }
                        if let Some(grid) = options.omega.as_ref() {
                            println!("#omega A(omega) eta={}", grid.eta);
                            for (w, a) in gf.spectrum(grid) {
                                println!("{} {}", w, a);
                            }
                        }
                    }
                }
            }
        }
    }

    for &what in options.correlations.iter() {
        for &spin in options.spins.iter() {
            for orb1 in 0..norb {
                for orb2 in 0..norb {
                    let c = engine.two_point(what, spin, (orb1, orb2))?;
                    let header = format!("#{}({})^dagger {}({}) orbs=({},{})", what, spin, what, spin, orb1, orb2);
                    println!("{}", header.green());
                    for row in c.iter() {
                        let line: Vec<String> = row.iter().map(|v| format!("{}", v)).collect();
                        println!("{}", line.join(" "));
                    }
                }
            }
        }
    }

    if let Some(split) = options.rdm_split {
        let rho = engine.reduced_density_matrix(split)?;
        println!("{}", format!("#Reduced density matrix, split={}, size={}", split, rho.size()).green());
        let line: Vec<String> = rho.eigenvalues.iter().map(|v| format!("{}", v)).collect();
        println!("{}", line.join(" "));
        println!("Entropy={}", rho.entanglement_entropy());
    }
    Ok(())
}
