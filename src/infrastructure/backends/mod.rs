pub mod claude;
pub mod gemini;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> Result<BackendBox> {
        if name == BackendName::Claude {
            return Ok(Box::<claude::Claude>::default());
        }

        if name == BackendName::Gemini {
            return Ok(Box::<gemini::Gemini>::default());
        }

        bail!(format!("No backend implemented for {name}"))
    }
}
