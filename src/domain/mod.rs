// Domain layer: models and the collaborator ports the import service depends on.

pub mod model;
pub mod ports;
