//! Companion module hooks
//!
//! The board has a connector for a plug-in companion module sharing the matrix bus. When it
//! augments the board rather than taking it over, it gets called on every scan tick and on
//! every encoder read. Absence is the default.

use elora_types::{MatrixSnapshot, PadSet};

/// The trait for companion modules.
///
/// Every method has a no-op default, so a module only implements the hooks it needs.
pub trait CompanionModule {
    /// Module housekeeping, run once per tick before the matrix hook.
    async fn task(&mut self) {}

    /// Merge the module's own input into the freshly decoded matrix.
    ///
    /// Returns true if the module changed anything, which is OR-ed into the tick's change flag.
    async fn hook_matrix(&mut self, _matrix: &mut MatrixSnapshot) -> bool {
        false
    }

    /// Populate the reserved pad slots. Writes to the physical pad slots are discarded.
    fn hook_pads(&mut self, _pads: &mut PadSet) {}
}

/// No companion module fitted
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCompanion;

impl CompanionModule for NoCompanion {}

impl<C: CompanionModule> CompanionModule for Option<C> {
    async fn task(&mut self) {
        if let Some(module) = self {
            module.task().await;
        }
    }

    async fn hook_matrix(&mut self, matrix: &mut MatrixSnapshot) -> bool {
        match self {
            Some(module) => module.hook_matrix(matrix).await,
            None => false,
        }
    }

    fn hook_pads(&mut self, pads: &mut PadSet) {
        if let Some(module) = self {
            module.hook_pads(pads);
        }
    }
}
