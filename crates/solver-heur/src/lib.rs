pub mod ga;
pub mod sa;

pub use ga::GeneticSolver;
pub use sa::SimulatedAnnealingSolver;
