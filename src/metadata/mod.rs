//! Class metadata side-table.
//!
//! Every piece of declarative information a macro produces (route lists,
//! module options, injectable markers, parameter descriptors, OpenAPI
//! annotations) ends up here, keyed by class identity and an optional member
//! name. The store is an explicit value owned by the container; nothing is
//! kept in process-wide statics.

mod class;
mod store;

pub use class::{ClassId, ClassRef, Instance};
pub use store::MetadataStore;

/// Namespaced metadata keys written by the macros.
pub mod keys {
    pub const INJECTABLE: &str = "injectable";
    pub const CONTROLLER: &str = "controller";
    pub const MODULE: &str = "module";
    pub const PREFIX: &str = "prefix";
    pub const ROUTES: &str = "routes";
    pub const PARAMS: &str = "params";

    pub const SWAGGER_TAGS: &str = "swagger:tags";
    pub const SWAGGER_DESCRIPTION: &str = "swagger:description";
    pub const SWAGGER_OPERATION: &str = "swagger:operation";
    pub const SWAGGER_PARAMS: &str = "swagger:params";
    pub const SWAGGER_BODY: &str = "swagger:body";
    pub const SWAGGER_RESPONSES: &str = "swagger:responses";
}
