//! PCU socket interface messages. Packed layout, native byte order, no padding:
//! a 4-byte header followed by a union whose largest member (DATA) is 173 bytes.

use core::fmt;

use bts_core::PduParseErr;

use crate::pcuif::enums::pcu_if_msg_type::PcuIfMsgType;
use crate::pcuif::enums::pcu_if_sapi::PcuIfSapi;

/// msg_type, bts_nr, spare[2]
pub const PCU_IF_HDR_LEN: usize = 4;
pub const PCU_IF_DATA_LEN: usize = 173;
pub const PCU_IF_RTS_REQ_LEN: usize = 13;
pub const PCU_IF_RACH_IND_LEN: usize = 10;
pub const PCU_IF_INFO_TRX_LEN: usize = 12;
pub const PCU_IF_INFO_IND_LEN: usize = 4 + PCU_IF_NUM_TRX * PCU_IF_INFO_TRX_LEN;
pub const PCU_IF_ACT_REQ_LEN: usize = 4;
pub const PCU_IF_TIME_IND_LEN: usize = 4;
/// Size of the whole struct; every encoded message has this length
pub const PCU_IF_MSG_LEN: usize = PCU_IF_HDR_LEN + PCU_IF_DATA_LEN;

/// Maximum payload of a DATA message
pub const PCU_IF_DATA_MAX: usize = 162;
/// TRX entries in an INFO indication
pub const PCU_IF_NUM_TRX: usize = 8;

/// BTS is active
pub const PCU_IF_FLAG_ACTIVE: u32 = 1 << 0;
/// PDCH of a sysmoBTS is accessed directly
pub const PCU_IF_FLAG_SYSMO: u32 = 1 << 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcuIfData {
    pub sapi: PcuIfSapi,
    /// Up to PCU_IF_DATA_MAX bytes
    pub data: Vec<u8>,
    pub fn_: u32,
    pub arfcn: u16,
    pub trx_nr: u8,
    pub ts_nr: u8,
    pub block_nr: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcuIfRtsReq {
    pub sapi: PcuIfSapi,
    pub fn_: u32,
    pub arfcn: u16,
    pub trx_nr: u8,
    pub ts_nr: u8,
    pub block_nr: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcuIfRachInd {
    pub sapi: PcuIfSapi,
    pub ra: u8,
    /// Timing advance estimate in quarter bits
    pub qta: i16,
    pub fn_: u32,
    pub arfcn: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PcuIfInfoTrx {
    pub arfcn: u16,
    /// One bit per timeslot configured as PDCH
    pub pdch_mask: u8,
    /// Training sequence code per timeslot
    pub tsc: [u8; 8],
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PcuIfInfoInd {
    pub flags: u32,
    pub trx: [PcuIfInfoTrx; PCU_IF_NUM_TRX],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcuIfActReq {
    pub activate: bool,
    pub trx_nr: u8,
    pub ts_nr: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcuIfTimeInd {
    pub fn_: u32,
}

/// The union part of a PCU interface message, selected by msg_type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PcuIfBody {
    DataReq(PcuIfData),
    DataInd(PcuIfData),
    RtsReq(PcuIfRtsReq),
    RachInd(PcuIfRachInd),
    InfoInd(PcuIfInfoInd),
    ActReq(PcuIfActReq),
    TimeInd(PcuIfTimeInd),
}

impl PcuIfBody {
    pub fn msg_type(&self) -> PcuIfMsgType {
        match self {
            PcuIfBody::DataReq(_) => PcuIfMsgType::DataReq,
            PcuIfBody::DataInd(_) => PcuIfMsgType::DataInd,
            PcuIfBody::RtsReq(_) => PcuIfMsgType::RtsReq,
            PcuIfBody::RachInd(_) => PcuIfMsgType::RachInd,
            PcuIfBody::InfoInd(_) => PcuIfMsgType::InfoInd,
            PcuIfBody::ActReq(_) => PcuIfMsgType::ActReq,
            PcuIfBody::TimeInd(_) => PcuIfMsgType::TimeInd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcuIfMsg {
    pub bts_nr: u8,
    pub body: PcuIfBody,
}

fn member_len(msg_type: PcuIfMsgType) -> usize {
    match msg_type {
        PcuIfMsgType::DataReq | PcuIfMsgType::DataInd => PCU_IF_DATA_LEN,
        PcuIfMsgType::RtsReq => PCU_IF_RTS_REQ_LEN,
        PcuIfMsgType::RachInd => PCU_IF_RACH_IND_LEN,
        PcuIfMsgType::InfoInd => PCU_IF_INFO_IND_LEN,
        PcuIfMsgType::ActReq => PCU_IF_ACT_REQ_LEN,
        PcuIfMsgType::TimeInd => PCU_IF_TIME_IND_LEN,
    }
}

fn read_u16_ne(data: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([data[offset], data[offset + 1]])
}

fn read_i16_ne(data: &[u8], offset: usize) -> i16 {
    i16::from_ne_bytes([data[offset], data[offset + 1]])
}

fn read_u32_ne(data: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn write_at(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn parse_sapi(raw: u8) -> Result<PcuIfSapi, PduParseErr> {
    PcuIfSapi::try_from(raw as u64).map_err(|_| PduParseErr::InvalidValue {
        field: "sapi",
        value: raw as u64,
    })
}

impl PcuIfMsg {
    /// Parses a message. The buffer must hold at least the header plus the
    /// member selected by msg_type; trailing bytes are ignored.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, PduParseErr> {
        if buf.len() < PCU_IF_HDR_LEN {
            return Err(PduParseErr::BufferEnded { field: Some("header") });
        }
        let raw_type = buf[0];
        let Ok(msg_type) = PcuIfMsgType::try_from(raw_type as u64) else {
            return Err(PduParseErr::InvalidPduType {
                expected: PcuIfMsgType::DataReq.into_raw(),
                found: raw_type as u64,
            });
        };
        let bts_nr = buf[1];

        if buf.len() < PCU_IF_HDR_LEN + member_len(msg_type) {
            return Err(PduParseErr::BufferEnded { field: Some("body") });
        }
        let u = &buf[PCU_IF_HDR_LEN..];

        let body = match msg_type {
            PcuIfMsgType::DataReq => PcuIfBody::DataReq(Self::parse_data(u)?),
            PcuIfMsgType::DataInd => PcuIfBody::DataInd(Self::parse_data(u)?),
            PcuIfMsgType::RtsReq => PcuIfBody::RtsReq(PcuIfRtsReq {
                sapi: parse_sapi(u[0])?,
                fn_: read_u32_ne(u, 4),
                arfcn: read_u16_ne(u, 8),
                trx_nr: u[10],
                ts_nr: u[11],
                block_nr: u[12],
            }),
            PcuIfMsgType::RachInd => PcuIfBody::RachInd(PcuIfRachInd {
                sapi: parse_sapi(u[0])?,
                ra: u[1],
                qta: read_i16_ne(u, 2),
                fn_: read_u32_ne(u, 4),
                arfcn: read_u16_ne(u, 8),
            }),
            PcuIfMsgType::InfoInd => {
                let mut info = PcuIfInfoInd {
                    flags: read_u32_ne(u, 0),
                    ..Default::default()
                };
                for (i, trx) in info.trx.iter_mut().enumerate() {
                    let off = 4 + i * PCU_IF_INFO_TRX_LEN;
                    trx.arfcn = read_u16_ne(u, off);
                    trx.pdch_mask = u[off + 2];
                    trx.tsc.copy_from_slice(&u[off + 4..off + 12]);
                }
                PcuIfBody::InfoInd(info)
            }
            PcuIfMsgType::ActReq => PcuIfBody::ActReq(PcuIfActReq {
                activate: u[0] != 0,
                trx_nr: u[1],
                ts_nr: u[2],
            }),
            PcuIfMsgType::TimeInd => PcuIfBody::TimeInd(PcuIfTimeInd { fn_: read_u32_ne(u, 0) }),
        };

        Ok(PcuIfMsg { bts_nr, body })
    }

    fn parse_data(u: &[u8]) -> Result<PcuIfData, PduParseErr> {
        let len = u[1] as usize;
        if len > PCU_IF_DATA_MAX {
            return Err(PduParseErr::InvalidValue {
                field: "len",
                value: len as u64,
            });
        }
        Ok(PcuIfData {
            sapi: parse_sapi(u[0])?,
            data: u[2..2 + len].to_vec(),
            fn_: read_u32_ne(u, 164),
            arfcn: read_u16_ne(u, 168),
            trx_nr: u[170],
            ts_nr: u[171],
            block_nr: u[172],
        })
    }

    /// Encodes the full struct. Unused union bytes and spares are zero.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PduParseErr> {
        let mut buf = vec![0u8; PCU_IF_MSG_LEN];
        buf[0] = self.body.msg_type() as u8;
        buf[1] = self.bts_nr;
        let u = &mut buf[PCU_IF_HDR_LEN..];

        match &self.body {
            PcuIfBody::DataReq(d) | PcuIfBody::DataInd(d) => {
                if d.data.len() > PCU_IF_DATA_MAX {
                    return Err(PduParseErr::InvalidValue {
                        field: "len",
                        value: d.data.len() as u64,
                    });
                }
                u[0] = d.sapi as u8;
                u[1] = d.data.len() as u8;
                write_at(u, 2, &d.data);
                write_at(u, 164, &d.fn_.to_ne_bytes());
                write_at(u, 168, &d.arfcn.to_ne_bytes());
                u[170] = d.trx_nr;
                u[171] = d.ts_nr;
                u[172] = d.block_nr;
            }
            PcuIfBody::RtsReq(r) => {
                u[0] = r.sapi as u8;
                write_at(u, 4, &r.fn_.to_ne_bytes());
                write_at(u, 8, &r.arfcn.to_ne_bytes());
                u[10] = r.trx_nr;
                u[11] = r.ts_nr;
                u[12] = r.block_nr;
            }
            PcuIfBody::RachInd(r) => {
                u[0] = r.sapi as u8;
                u[1] = r.ra;
                write_at(u, 2, &r.qta.to_ne_bytes());
                write_at(u, 4, &r.fn_.to_ne_bytes());
                write_at(u, 8, &r.arfcn.to_ne_bytes());
            }
            PcuIfBody::InfoInd(info) => {
                write_at(u, 0, &info.flags.to_ne_bytes());
                for (i, trx) in info.trx.iter().enumerate() {
                    let off = 4 + i * PCU_IF_INFO_TRX_LEN;
                    write_at(u, off, &trx.arfcn.to_ne_bytes());
                    u[off + 2] = trx.pdch_mask;
                    write_at(u, off + 4, &trx.tsc);
                }
            }
            PcuIfBody::ActReq(a) => {
                u[0] = a.activate as u8;
                u[1] = a.trx_nr;
                u[2] = a.ts_nr;
            }
            PcuIfBody::TimeInd(t) => {
                write_at(u, 0, &t.fn_.to_ne_bytes());
            }
        }

        Ok(buf)
    }
}

impl fmt::Display for PcuIfMsg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PcuIfMsg {{ {} bts_nr: {} body: {:?} }}", self.body.msg_type(), self.bts_nr, self.body)
    }
}
