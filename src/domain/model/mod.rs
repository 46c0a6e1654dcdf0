//! Model domain - Model configuration and its validation

mod entity;
mod validation;

pub use entity::{canonical_model_name, ModelConfig};
pub use validation::{
    validate_model_config, validate_model_name, validate_temperature, ModelValidationError,
};
