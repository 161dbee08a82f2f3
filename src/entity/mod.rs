//! Static protocol entities.
//!
//! Entities describe everything the protocol loads onto the robot: modules,
//! pipettes, labware, liquids and additional equipment. They are created once
//! during protocol setup and never change during simulation; the mutable part
//! of the world lives in [`crate::state`].

mod equipment;
mod labware;
mod module;
mod pipette;

pub use equipment::{AdditionalEquipment, EquipmentKind, LiquidEntity};
pub use labware::{LabwareDefinition, LabwareEntity, WellDefinition};
pub use module::{ModuleEntity, ModuleModel, ModuleType};
pub use pipette::{PipetteEntity, PipetteSpec};

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Stable identifier of a loaded module.
    ModuleId
);
string_id!(
    /// Stable identifier of a loaded pipette.
    PipetteId
);
string_id!(
    /// Stable identifier of a loaded labware (tip racks, plates, reservoirs, adapters).
    LabwareId
);
string_id!(
    /// Stable identifier of a user-defined liquid.
    LiquidId
);
string_id!(
    /// Stable identifier of additional equipment (gripper, trash bin, waste chute).
    EquipmentId
);

/// Returns true if `name` can be used as a Python identifier in generated code.
pub(crate) fn is_python_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
