pub mod intake;
pub mod leads;
