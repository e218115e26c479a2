pub mod basis;
pub mod hamiltonian;
