//! IPA framing as used by Abis/IP: a two byte big endian payload length,
//! a one byte stream identifier, then the payload. Stream 0xff carries OML,
//! 0xfe the connection management (CCM) protocol and stream n the RSL of TRX n.

use bts_config::StackConfig;
use bts_core::{PduParseErr, TrxNr};
use bts_saps::abis::SignLinkKind;

pub const IPA_HDR_LEN: usize = 3;

const STREAM_CCM: u8 = 0xfe;
const STREAM_OML: u8 = 0xff;
/// Highest stream id used for RSL
const STREAM_RSL_MAX: u8 = 0x7f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpaStream {
    Rsl(TrxNr),
    Ccm,
    Oml,
    /// Anything else; frames on such streams are discarded
    Other(u8),
}

impl IpaStream {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            STREAM_OML => IpaStream::Oml,
            STREAM_CCM => IpaStream::Ccm,
            0..=STREAM_RSL_MAX => IpaStream::Rsl(raw),
            _ => IpaStream::Other(raw),
        }
    }

    pub fn into_raw(self) -> u8 {
        match self {
            IpaStream::Rsl(trx_nr) => trx_nr,
            IpaStream::Ccm => STREAM_CCM,
            IpaStream::Oml => STREAM_OML,
            IpaStream::Other(raw) => raw,
        }
    }

    /// The signalling link a stream belongs to, if any
    pub fn sign_link_kind(self) -> Option<SignLinkKind> {
        match self {
            IpaStream::Oml => Some(SignLinkKind::Oml),
            IpaStream::Rsl(trx_nr) => Some(SignLinkKind::Rsl { trx_nr }),
            IpaStream::Ccm | IpaStream::Other(_) => None,
        }
    }
}

impl From<SignLinkKind> for IpaStream {
    fn from(kind: SignLinkKind) -> Self {
        match kind {
            SignLinkKind::Oml => IpaStream::Oml,
            SignLinkKind::Rsl { trx_nr } => IpaStream::Rsl(trx_nr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpaFrame {
    pub stream: IpaStream,
    pub payload: Vec<u8>,
}

pub fn encode_frame(stream: IpaStream, payload: &[u8]) -> Result<Vec<u8>, PduParseErr> {
    let len = u16::try_from(payload.len()).map_err(|_| PduParseErr::InvalidValue {
        field: "ipa_len",
        value: payload.len() as u64,
    })?;
    let mut buf = Vec::with_capacity(IPA_HDR_LEN + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.push(stream.into_raw());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Reassembles frames from a byte stream that may deliver partial frames
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn next_frame(&mut self) -> Option<IpaFrame> {
        if self.buf.len() < IPA_HDR_LEN {
            return None;
        }
        let len = u16::from_be_bytes([self.buf[0], self.buf[1]]) as usize;
        if self.buf.len() < IPA_HDR_LEN + len {
            return None;
        }
        let stream = IpaStream::from_raw(self.buf[2]);
        let payload = self.buf[IPA_HDR_LEN..IPA_HDR_LEN + len].to_vec();
        self.buf.drain(..IPA_HDR_LEN + len);
        Some(IpaFrame { stream, payload })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CcmMsgType {
    Ping = 0x00,
    Pong = 0x01,
    IdGet = 0x04,
    IdResp = 0x05,
    IdAck = 0x06,
}

impl TryFrom<u8> for CcmMsgType {
    type Error = ();
    fn try_from(x: u8) -> Result<Self, Self::Error> {
        match x {
            0x00 => Ok(CcmMsgType::Ping),
            0x01 => Ok(CcmMsgType::Pong),
            0x04 => Ok(CcmMsgType::IdGet),
            0x05 => Ok(CcmMsgType::IdResp),
            0x06 => Ok(CcmMsgType::IdAck),
            _ => Err(()),
        }
    }
}

/// Identity tags requested by the BSC in ID_GET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IpaIdTag {
    SerNr = 0x00,
    UnitName = 0x01,
    Location1 = 0x02,
    Location2 = 0x03,
    EquipVers = 0x04,
    SwVersion = 0x05,
    IpAddr = 0x06,
    MacAddr = 0x07,
    UnitId = 0x08,
}

impl TryFrom<u8> for IpaIdTag {
    type Error = ();
    fn try_from(x: u8) -> Result<Self, Self::Error> {
        match x {
            0x00 => Ok(IpaIdTag::SerNr),
            0x01 => Ok(IpaIdTag::UnitName),
            0x02 => Ok(IpaIdTag::Location1),
            0x03 => Ok(IpaIdTag::Location2),
            0x04 => Ok(IpaIdTag::EquipVers),
            0x05 => Ok(IpaIdTag::SwVersion),
            0x06 => Ok(IpaIdTag::IpAddr),
            0x07 => Ok(IpaIdTag::MacAddr),
            0x08 => Ok(IpaIdTag::UnitId),
            _ => Err(()),
        }
    }
}

/// Identity this BTS announces to the BSC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpaUnit {
    pub site_id: u16,
    pub bts_id: u16,
    pub unit_name: String,
    pub equipvers: String,
    pub swversion: String,
    pub location1: String,
    pub location2: String,
    pub serno: String,
    pub mac_addr: [u8; 6],
}

impl IpaUnit {
    /// The description, if set, replaces the model name as unit name
    pub fn from_config(cfg: &StackConfig, mac_addr: [u8; 6]) -> Self {
        let model_name = cfg.abis.model_name.clone();
        Self {
            site_id: cfg.bts.site_id,
            bts_id: cfg.bts.bts_id,
            unit_name: cfg.bts.description.clone().unwrap_or_else(|| model_name.clone()),
            equipvers: String::new(),
            swversion: env!("CARGO_PKG_VERSION").to_string(),
            location1: String::new(),
            location2: model_name,
            serno: String::new(),
            mac_addr,
        }
    }

    fn tag_value(&self, tag: IpaIdTag, trx_nr: TrxNr) -> String {
        match tag {
            IpaIdTag::SerNr => self.serno.clone(),
            IpaIdTag::UnitName => self.unit_name.clone(),
            IpaIdTag::Location1 => self.location1.clone(),
            IpaIdTag::Location2 => self.location2.clone(),
            IpaIdTag::EquipVers => self.equipvers.clone(),
            IpaIdTag::SwVersion => self.swversion.clone(),
            // Filled in by the BSC from the socket
            IpaIdTag::IpAddr => String::new(),
            IpaIdTag::MacAddr => self
                .mac_addr
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(":"),
            IpaIdTag::UnitId => format!("{}/{}/{}", self.site_id, self.bts_id, trx_nr),
        }
    }

    /// Builds an ID_RESP payload for the tags listed in an ID_GET payload.
    /// Unknown tags are skipped.
    pub fn build_id_resp(&self, id_get: &[u8], trx_nr: TrxNr) -> Vec<u8> {
        let mut resp = vec![CcmMsgType::IdResp as u8];
        for raw_tag in parse_id_get(id_get) {
            let Ok(tag) = IpaIdTag::try_from(raw_tag) else {
                tracing::debug!("ID_GET: ignoring unknown tag 0x{:02x}", raw_tag);
                continue;
            };
            let value = self.tag_value(tag, trx_nr);
            // Tag byte plus NUL terminated value
            let len = (value.len() + 2) as u16;
            resp.extend_from_slice(&len.to_be_bytes());
            resp.push(raw_tag);
            resp.extend_from_slice(value.as_bytes());
            resp.push(0);
        }
        resp
    }
}

/// Tags requested in an ID_GET payload (message type byte included).
/// The request is a list of (length = 1, tag) pairs.
pub fn parse_id_get(payload: &[u8]) -> Vec<u8> {
    let mut tags = Vec::new();
    let mut pos = 1;
    while pos + 1 < payload.len() {
        let len = payload[pos] as usize;
        if len == 0 {
            break;
        }
        tags.push(payload[pos + 1]);
        pos += 1 + len;
    }
    tags
}

/// MAC address of a network interface, all zeroes if it cannot be read
pub fn read_mac_addr(dev_name: &str) -> [u8; 6] {
    let path = format!("/sys/class/net/{}/address", dev_name);
    let mut mac = [0u8; 6];
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            for (i, part) in text.trim().split(':').take(6).enumerate() {
                mac[i] = u8::from_str_radix(part, 16).unwrap_or(0);
            }
        }
        Err(e) => tracing::warn!("cannot read MAC address of {}: {}", dev_name, e),
    }
    mac
}
