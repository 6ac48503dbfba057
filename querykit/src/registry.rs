//! Process-wide model registration via the inventory crate.
//!
//! Every `#[derive(Queryable)]` submits a [`ModelRegistration`], so all models
//! linked into the binary can be enumerated without a central list.

use crate::types::ModelDescriptor;

/// Metadata submitted to the inventory for each derived model.
pub struct ModelRegistration {
    /// The name of the model type (e.g., "Game")
    pub type_name: &'static str,
    /// Endpoint declared on the model, if any (e.g., "games")
    pub endpoint: Option<&'static str>,
    /// Function returning the model's descriptor
    pub descriptor_fn: fn() -> &'static ModelDescriptor,
}

impl ModelRegistration {
    pub fn descriptor(&self) -> &'static ModelDescriptor {
        (self.descriptor_fn)()
    }
}

impl std::fmt::Debug for ModelRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistration")
            .field("type_name", &self.type_name)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

inventory::collect!(ModelRegistration);

/// All registered models, in unspecified order.
pub fn registered_models() -> impl Iterator<Item = &'static ModelRegistration> {
    inventory::iter::<ModelRegistration>()
}

/// Get a registered model by type name.
pub fn get_model_by_name(type_name: &str) -> Option<&'static ModelRegistration> {
    registered_models().find(|m| m.type_name == type_name)
}

/// Get a registered model by declared endpoint.
pub fn get_model_by_endpoint(endpoint: &str) -> Option<&'static ModelRegistration> {
    registered_models().find(|m| m.endpoint == Some(endpoint))
}
