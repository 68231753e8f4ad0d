//! Model categories shared by the remote API and the local cache layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a folder name does not map to a known category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown model folder '{0}'")]
pub struct UnknownCategory(pub String);

/// Kind of model asset.
///
/// The folder name doubles as the host folder key and the cache
/// subdirectory; the remote name is what the listing API filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Bare diffusion model weights.
    DiffusionModels,
    /// All-in-one checkpoints.
    Checkpoints,
    /// LoRA adapters applied on top of a base model.
    Loras,
    /// Variational autoencoders.
    Vae,
}

impl Category {
    /// Every category, in the order the host presents them.
    pub const ALL: [Self; 4] = [
        Self::DiffusionModels,
        Self::Checkpoints,
        Self::Loras,
        Self::Vae,
    ];

    /// Local folder name (host folder key and cache subdirectory).
    pub const fn folder_name(self) -> &'static str {
        match self {
            Self::DiffusionModels => "diffusion_models",
            Self::Checkpoints => "checkpoints",
            Self::Loras => "loras",
            Self::Vae => "vae",
        }
    }

    /// Category name the remote listing API filters on.
    pub const fn remote_name(self) -> &'static str {
        match self {
            Self::DiffusionModels => "Diffusion Model",
            Self::Checkpoints => "Checkpoint",
            Self::Loras => "LoRA",
            Self::Vae => "VAE",
        }
    }

    /// Look up a category by its folder name.
    pub fn from_folder_name(folder: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.folder_name() == folder)
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_folder_name(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}
