use std::collections::VecDeque;

use bts_config::CfgBts;
use bts_core::{AvailState, BtsNr, GsmBand, MoClass, MoId, MoInstance, NmState, OpState, TRX_NUM_TS, TS_MAX_LCHAN, TrxNr};

use crate::abis::sign_link::SignLink;
use crate::ccch::agch_queue::AgchQueue;
use crate::ccch::paging::PagingQueue;

/// An object managed over OML, with its last announced state
#[derive(Debug, Clone)]
pub struct ManagedObject {
    pub id: MoId,
    pub state: NmState,
}

impl ManagedObject {
    /// New objects wait for their hardware layer before they can be used
    pub fn new(class: MoClass, inst: MoInstance) -> Self {
        Self {
            id: MoId { class, inst },
            state: NmState::new(OpState::Disabled, AvailState::Dependency),
        }
    }
}

/// Logical channel on a timeslot
#[derive(Debug)]
pub struct Lchan {
    pub nr: u8,
    dl_tch_queue: VecDeque<Vec<u8>>,
    dl_tch_queue_max: usize,
}

impl Lchan {
    pub fn new(nr: u8, dl_tch_queue_max: usize) -> Self {
        Self {
            nr,
            dl_tch_queue: VecDeque::new(),
            dl_tch_queue_max,
        }
    }

    /// Queues a downlink traffic frame. A full queue loses its oldest frame.
    pub fn dl_tch_enqueue(&mut self, frame: Vec<u8>) {
        if self.dl_tch_queue.len() >= self.dl_tch_queue_max {
            self.dl_tch_queue.pop_front();
            tracing::debug!("lchan {}: dl tch queue full, dropped oldest frame", self.nr);
        }
        self.dl_tch_queue.push_back(frame);
    }

    pub fn dl_tch_dequeue(&mut self) -> Option<Vec<u8>> {
        self.dl_tch_queue.pop_front()
    }

    pub fn dl_tch_queue_len(&self) -> usize {
        self.dl_tch_queue.len()
    }

    pub fn dl_tch_flush(&mut self) {
        self.dl_tch_queue.clear();
    }
}

#[derive(Debug)]
pub struct Timeslot {
    pub nr: u8,
    pub mo: ManagedObject,
    pub lchan: Vec<Lchan>,
}

#[derive(Debug)]
pub struct Trx {
    pub nr: TrxNr,
    pub mo: ManagedObject,
    pub bb_transc: ManagedObject,
    pub ts: Vec<Timeslot>,
    /// Present only while the RSL link of this TRX is up
    pub rsl_link: Option<SignLink>,
}

impl Trx {
    pub fn new(bts_nr: BtsNr, nr: TrxNr, dl_tch_queue_max: usize) -> Self {
        let ts = (0..TRX_NUM_TS as u8)
            .map(|ts_nr| Timeslot {
                nr: ts_nr,
                mo: ManagedObject::new(MoClass::Channel, MoInstance::ts(bts_nr, nr, ts_nr)),
                lchan: (0..TS_MAX_LCHAN as u8).map(|l| Lchan::new(l, dl_tch_queue_max)).collect(),
            })
            .collect();
        Self {
            nr,
            mo: ManagedObject::new(MoClass::RadioCarrier, MoInstance::trx(bts_nr, nr)),
            bb_transc: ManagedObject::new(MoClass::BasebandTransceiver, MoInstance::trx(bts_nr, nr)),
            ts,
            rsl_link: None,
        }
    }
}

/// GPRS objects of a BTS: network service entity, cell and two NS virtual circuits
#[derive(Debug)]
pub struct GprsObjects {
    pub nse: ManagedObject,
    pub cell: ManagedObject,
    pub nsvc: [ManagedObject; 2],
}

/// System information types tracked in `Bts::si_valid`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SysinfoType {
    Type1 = 1,
    Type2 = 2,
    Type3 = 3,
    Type4 = 4,
}

impl SysinfoType {
    pub fn mask(self) -> u32 {
        1 << (self as u8)
    }
}

/// BTS role state: everything the BTS process itself keeps per cell
#[derive(Debug)]
pub struct BtsRole {
    pub paging: PagingQueue,
    pub agch: AgchQueue,
    /// CCCH load indication period in seconds
    pub load_ind_period: u32,
    pub rtp_jitter_buf_ms: u32,
    pub max_ta: u8,
    pub radio_link_timeout: u8,
    /// Supported A5 algorithms, A5/1 = bit 0
    pub ciphers: u8,
}

#[derive(Debug)]
pub struct Bts {
    pub nr: BtsNr,
    pub band: GsmBand,
    pub description: Option<String>,
    pub site_id: u16,
    pub bts_id: u16,
    pub site_mgr: ManagedObject,
    pub mo: ManagedObject,
    pub gprs: GprsObjects,
    pub trx: Vec<Trx>,
    /// Present only while the OML link is up
    pub oml_link: Option<SignLink>,
    pub role: BtsRole,
    /// Bitmask of valid system information, see `SysinfoType::mask`
    pub si_valid: u32,
    pub si3: Option<Vec<u8>>,
    /// Delay between a shutdown request and process exit
    pub shutdown_delay_secs: u64,
}

impl Bts {
    pub fn new(cfg: &CfgBts) -> Self {
        let nr = cfg.bts_nr;
        let inst = MoInstance::bts(nr);
        let trx = (0..cfg.num_trx).map(|t| Trx::new(nr, t, cfg.dl_tch_queue_max)).collect();
        Self {
            nr,
            band: cfg.band,
            description: cfg.description.clone(),
            site_id: cfg.site_id,
            bts_id: cfg.bts_id,
            site_mgr: ManagedObject::new(MoClass::SiteManager, MoInstance::bts(MoInstance::NONE)),
            mo: ManagedObject::new(MoClass::Bts, inst),
            gprs: GprsObjects {
                nse: ManagedObject::new(MoClass::GprsNse, inst),
                cell: ManagedObject::new(MoClass::GprsCell, inst),
                nsvc: [
                    ManagedObject::new(MoClass::GprsNsvc, MoInstance::trx(nr, 0)),
                    ManagedObject::new(MoClass::GprsNsvc, MoInstance::trx(nr, 1)),
                ],
            },
            trx,
            oml_link: None,
            role: BtsRole {
                paging: PagingQueue::new(cfg.paging_queue_size),
                agch: AgchQueue::new(),
                load_ind_period: cfg.load_ind_period,
                rtp_jitter_buf_ms: cfg.rtp_jitter_buf_ms,
                max_ta: cfg.max_ta,
                radio_link_timeout: cfg.radio_link_timeout,
                ciphers: cfg.ciphers,
            },
            si_valid: 0,
            si3: None,
            shutdown_delay_secs: 3,
        }
    }

    pub fn get_trx(&self, trx_nr: TrxNr) -> Option<&Trx> {
        self.trx.iter().find(|t| t.nr == trx_nr)
    }

    pub fn get_trx_mut(&mut self, trx_nr: TrxNr) -> Option<&mut Trx> {
        self.trx.iter_mut().find(|t| t.nr == trx_nr)
    }

    pub fn si_is_valid(&self, si: SysinfoType) -> bool {
        self.si_valid & si.mask() != 0
    }

    /// Stores new system information content and marks it valid.
    /// Only SI3 content is kept, the other types only update validity.
    pub fn set_sysinfo(&mut self, si: SysinfoType, data: &[u8]) {
        if si == SysinfoType::Type3 {
            self.si3 = Some(data.to_vec());
        }
        self.si_valid |= si.mask();
    }

    /// Iterates over every managed object of this BTS in announcement order
    pub fn managed_objects(&self) -> impl Iterator<Item = &ManagedObject> {
        [&self.site_mgr, &self.mo, &self.gprs.nse, &self.gprs.cell, &self.gprs.nsvc[0], &self.gprs.nsvc[1]]
            .into_iter()
            .chain(self.trx.iter().flat_map(|trx| {
                [&trx.mo, &trx.bb_transc]
                    .into_iter()
                    .chain(trx.ts.iter().map(|ts| &ts.mo))
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bts_objects_in_dependency() {
        let cfg = CfgBts { num_trx: 2, ..Default::default() };
        let bts = Bts::new(&cfg);
        assert_eq!(bts.trx.len(), 2);
        assert_eq!(bts.managed_objects().count(), 6 + 2 * 10);
        for mo in bts.managed_objects() {
            assert_eq!(mo.state, NmState::new(OpState::Disabled, AvailState::Dependency));
        }
        assert!(bts.oml_link.is_none());
        assert!(bts.trx.iter().all(|t| t.rsl_link.is_none()));
    }

    #[test]
    fn test_dl_tch_queue_bounded() {
        let mut lchan = Lchan::new(0, 2);
        lchan.dl_tch_enqueue(vec![1]);
        lchan.dl_tch_enqueue(vec![2]);
        lchan.dl_tch_enqueue(vec![3]);
        assert_eq!(lchan.dl_tch_queue_len(), 2);
        assert_eq!(lchan.dl_tch_dequeue(), Some(vec![2]));
        assert_eq!(lchan.dl_tch_dequeue(), Some(vec![3]));
        assert_eq!(lchan.dl_tch_dequeue(), None);
    }

    #[test]
    fn test_sysinfo_validity() {
        let mut bts = Bts::new(&CfgBts::default());
        assert!(!bts.si_is_valid(SysinfoType::Type3));
        bts.set_sysinfo(SysinfoType::Type3, &[0u8; 23]);
        assert!(bts.si_is_valid(SysinfoType::Type3));
        assert_eq!(bts.si_valid, 1 << 3);
    }
}
