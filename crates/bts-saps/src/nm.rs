use bts_core::{MoId, NmState};

/// State Changed Event Report for one managed object
#[derive(Debug, Clone)]
pub struct NmStateChangedInd {
    pub mo: MoId,
    pub state: NmState,
}
