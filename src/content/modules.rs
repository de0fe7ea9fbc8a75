//! Module placement module
//!
//! A page's modules file declares, per layout position, which modules
//! render there and with which parameters. A position holds a JSON array
//! of module references, so declaration order is render order.

use serde::Deserialize;
use std::collections::HashMap;

/// One module occurrence at a position
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleRef {
    /// Module template name under the modules directory
    pub module: String,
    /// Parameters handed to the module template
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Position name to ordered module list, for one page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PageModules {
    positions: HashMap<String, Vec<ModuleRef>>,
}

impl PageModules {
    /// Modules declared for `position`, in declaration order.
    ///
    /// An unknown position, or one declared with an empty list, yields an
    /// empty slice.
    pub fn modules_for_position(&self, position: &str) -> &[ModuleRef] {
        self.positions.get(position).map_or(&[], Vec::as_slice)
    }

    /// Names of positions with at least one module
    pub fn position_names(&self) -> impl Iterator<Item = &str> {
        self.positions
            .iter()
            .filter(|(_, modules)| !modules.is_empty())
            .map(|(position, _)| position.as_str())
    }
}
