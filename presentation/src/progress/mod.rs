//! Progress reporting while a run is processed

pub mod reporter;
