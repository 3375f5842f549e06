pub mod manifest;
pub mod set;

pub use manifest::{
    artifacts_from_designs, load_manifest, write_manifest, DesignArtifact, DesignManifest,
};
pub use set::{
    check_identifiers, load_set_from_path, resolve_designs, validate, DesignDefaults, DesignEntry,
    DesignSet, ResolvedDesign, SharedInputs,
};
