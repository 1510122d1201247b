use std::path::PathBuf;

use bts_config::{CfgL1, HwVariant};
use bts_saps::l1::{L1PrimKind, L1Queue};

/// Device node names of one queue, relative to the msgq directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueDevNames {
    /// DSP to ARM direction
    pub read: &'static str,
    /// ARM to DSP direction
    pub write: &'static str,
}

const V1_QUEUES: [L1Queue; 2] = [L1Queue::Sys, L1Queue::L1];
const V2_QUEUES: [L1Queue; 4] = [L1Queue::Sys, L1Queue::L1, L1Queue::Tch, L1Queue::Pdtch];

/// Queues that exist on the given hardware
pub fn queues_for(variant: HwVariant) -> &'static [L1Queue] {
    match variant {
        HwVariant::V1 => &V1_QUEUES,
        HwVariant::V2 => &V2_QUEUES,
    }
}

pub fn dev_names(variant: HwVariant, queue: L1Queue) -> Option<QueueDevNames> {
    let names = match (variant, queue) {
        (HwVariant::V1, L1Queue::Sys) => QueueDevNames {
            read: "femtobts_dsp2arm",
            write: "femtobts_arm2dsp",
        },
        (HwVariant::V1, L1Queue::L1) => QueueDevNames {
            read: "gsml1_dsp2arm",
            write: "gsml1_arm2dsp",
        },
        (HwVariant::V1, _) => return None,
        (HwVariant::V2, L1Queue::Sys) => QueueDevNames {
            read: "superfemto_dsp2arm",
            write: "superfemto_arm2dsp",
        },
        (HwVariant::V2, L1Queue::L1) => QueueDevNames {
            read: "gsml1_sig_dsp2arm",
            write: "gsml1_sig_arm2dsp",
        },
        (HwVariant::V2, L1Queue::Tch) => QueueDevNames {
            read: "gsml1_tch_dsp2arm",
            write: "gsml1_tch_arm2dsp",
        },
        (HwVariant::V2, L1Queue::Pdtch) => QueueDevNames {
            read: "gsml1_pdtch_dsp2arm",
            write: "gsml1_pdtch_arm2dsp",
        },
    };
    Some(names)
}

/// Full paths (read, write) of a queue's device nodes
pub fn dev_paths(cfg: &CfgL1, queue: L1Queue) -> Option<(PathBuf, PathBuf)> {
    let names = dev_names(cfg.hw_variant, queue)?;
    let dir = PathBuf::from(&cfg.dev_dir);
    Some((dir.join(names.read), dir.join(names.write)))
}

/// The one primitive size a queue accepts
pub fn prim_size(cfg: &CfgL1, queue: L1Queue) -> usize {
    match queue.prim_kind() {
        L1PrimKind::System => cfg.sys_prim_size,
        L1PrimKind::GsmL1 => cfg.l1_prim_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_has_no_traffic_queues() {
        assert_eq!(queues_for(HwVariant::V1), &[L1Queue::Sys, L1Queue::L1]);
        assert!(dev_names(HwVariant::V1, L1Queue::Tch).is_none());
        assert!(dev_names(HwVariant::V1, L1Queue::Pdtch).is_none());
    }

    #[test]
    fn test_v2_paths() {
        let cfg = CfgL1::default();
        let (rd, wr) = dev_paths(&cfg, L1Queue::Tch).unwrap();
        assert_eq!(rd, PathBuf::from("/dev/msgq/gsml1_tch_dsp2arm"));
        assert_eq!(wr, PathBuf::from("/dev/msgq/gsml1_tch_arm2dsp"));
        assert_eq!(prim_size(&cfg, L1Queue::Sys), cfg.sys_prim_size);
        assert_eq!(prim_size(&cfg, L1Queue::Pdtch), cfg.l1_prim_size);
    }
}
